// ==========================================
// 迁移管道集成测试
// ==========================================
// 测试目标: 端到端场景 A/B/C、幂等重跑、错误策略
// ==========================================


use catalog_importer::importer::ImportError;
use catalog_importer::logging;
use rusqlite::params;
use test_helpers::*;

// ==========================================
// 场景 A: 首次完整迁移
// ==========================================

#[test]
fn test_scenario_a_full_import() {
    logging::init_test();

    let (_src_file, src_path) = create_source_snapshot().expect("创建源快照失败");
    let (_dst_file, dst_path) = create_target_db().expect("创建目标库失败");
    insert_pedal_fixture(&open_connection(&src_path)).expect("写入夹具失败");

    let summary = run_import(&src_path, &dst_path).expect("迁移应该成功");
    assert_eq!(summary.stage_counts.len(), 6, "应跑完全部 6 个阶段");

    let conn = open_connection(&dst_path);

    // 类型与属性架构
    assert_eq!(count_rows(&conn, "product_type"), 1);
    assert_eq!(count_rows(&conn, "attribute"), 2);
    assert_eq!(count_rows(&conn, "attribute_product"), 1);
    assert_eq!(count_rows(&conn, "attribute_variant"), 1);

    // 反义标志位取反: value_optional=0 -> value_required=1
    let (required, variant_only): (i64, i64) = conn
        .query_row(
            "SELECT value_required, is_variant_only FROM attribute WHERE slug = 'voltage'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(required, 1);
    assert_eq!(variant_only, 1);

    // 预声明值 Red/Blue + 临时值 9V/18V
    assert_eq!(count_rows(&conn, "attribute_value"), 4);

    // 分类直插保留树坐标
    let (lft, rght, tree_id): (i64, i64, i64) = conn
        .query_row(
            "SELECT lft, rght, tree_id FROM category WHERE id = ?1",
            params![SRC_CATEGORY_EFFECTS],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!((lft, rght, tree_id), (1, 2, 1));

    // 商品
    let (name, published): (String, i64) = conn
        .query_row(
            "SELECT name, is_published FROM product",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(name, "Fuzz");
    assert_eq!(published, 1);

    // 变体派生展示名: 单槽位直接等于值名
    let fz1_name: String = conn
        .query_row(
            "SELECT name FROM product_variant WHERE sku = 'FZ-1'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(fz1_name, "9V");

    // 库存: FZ-1 取源值 7，FZ-2 无记录按 0 计
    let fz1_stock: i64 = conn
        .query_row(
            "SELECT s.quantity FROM stock s \
             JOIN product_variant v ON v.id = s.variant_id WHERE v.sku = 'FZ-1'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(fz1_stock, 7);
    let fz2_stock: i64 = conn
        .query_row(
            "SELECT s.quantity FROM stock s \
             JOIN product_variant v ON v.id = s.variant_id WHERE v.sku = 'FZ-2'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(fz2_stock, 0);

    // 种子数据: 两个运费区 + 一个仓库, 双向关联
    assert_eq!(count_rows(&conn, "shipping_zone"), 2);
    assert_eq!(count_rows(&conn, "warehouse"), 1);
    assert_eq!(count_rows(&conn, "warehouse_shipping_zone"), 2);
    let warehouse_slug: String = conn
        .query_row("SELECT slug FROM warehouse", [], |row| row.get(0))
        .unwrap();
    assert_eq!(warehouse_slug, "headquater-graz");
}

// ==========================================
// 幂等性: 重跑不产生重复行
// ==========================================

#[test]
fn test_rerun_is_idempotent() {
    logging::init_test();

    let (_src_file, src_path) = create_source_snapshot().expect("创建源快照失败");
    let (_dst_file, dst_path) = create_target_db().expect("创建目标库失败");
    insert_pedal_fixture(&open_connection(&src_path)).expect("写入夹具失败");

    run_import(&src_path, &dst_path).expect("首次迁移应该成功");
    let first = table_counts(&dst_path);

    run_import(&src_path, &dst_path).expect("重跑应该成功");
    let second = table_counts(&dst_path);

    assert_eq!(first, second, "重跑后所有表的行数必须不变");
}

// ==========================================
// 场景 B: 选值变化 → 整体替换而非追加
// ==========================================

#[test]
fn test_scenario_b_assignment_replacement() {
    logging::init_test();

    let (_src_file, src_path) = create_source_snapshot().expect("创建源快照失败");
    let (_dst_file, dst_path) = create_target_db().expect("创建目标库失败");
    insert_pedal_fixture(&open_connection(&src_path)).expect("写入夹具失败");

    run_import(&src_path, &dst_path).expect("首次迁移应该成功");

    // 源端把 Fuzz 的 Color 从 Red 改为 Blue
    let src_conn = open_connection(&src_path);
    src_conn
        .execute(
            "UPDATE products_product SET attributes = ?1 WHERE id = ?2",
            params![
                format!(r#"{{"{}": {}}}"#, SRC_ATTR_COLOR, SRC_VALUE_BLUE),
                SRC_PRODUCT_FUZZ
            ],
        )
        .unwrap();

    run_import(&src_path, &dst_path).expect("重跑应该成功");

    let conn = open_connection(&dst_path);
    assert_eq!(count_rows(&conn, "product"), 1, "商品不得重复");

    // 选集恰为 {Blue}，旧值 Red 不得残留
    let selected: Vec<String> = {
        let mut stmt = conn
            .prepare(
                "SELECT av.slug FROM assigned_product_attribute_value link \
                 JOIN attribute_value av ON av.id = link.value_id",
            )
            .unwrap();
        let rows = stmt.query_map([], |row| row.get(0)).unwrap();
        rows.collect::<Result<_, _>>().unwrap()
    };
    assert_eq!(selected, vec!["blue".to_string()]);
}

// ==========================================
// 场景 C: 外部测试结果元数据
// ==========================================

#[test]
fn test_scenario_c_test_result_metadata() {
    logging::init_test();

    let (_src_file, src_path) = create_source_snapshot().expect("创建源快照失败");
    let (_dst_file, dst_path) = create_target_db().expect("创建目标库失败");
    insert_pedal_fixture(&open_connection(&src_path)).expect("写入夹具失败");

    run_import(&src_path, &dst_path).expect("迁移应该成功");

    let conn = open_connection(&dst_path);

    // 带负载的变体: 负载原样嵌入 dca75_result 键下
    let fz1_metadata: String = conn
        .query_row(
            "SELECT metadata FROM product_variant WHERE sku = 'FZ-1'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&fz1_metadata).unwrap();
    let expected: serde_json::Value = serde_json::from_str(FZ1_TEST_RESULT).unwrap();
    assert_eq!(parsed["dca75_result"], expected);

    // 无负载的变体: 空对象
    let fz2_metadata: String = conn
        .query_row(
            "SELECT metadata FROM product_variant WHERE sku = 'FZ-2'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(fz2_metadata, "{}");
}

// ==========================================
// sort_order 仅创建时写入
// ==========================================

#[test]
fn test_sort_order_untouched_on_rerun() {
    logging::init_test();

    let (_src_file, src_path) = create_source_snapshot().expect("创建源快照失败");
    let (_dst_file, dst_path) = create_target_db().expect("创建目标库失败");
    insert_pedal_fixture(&open_connection(&src_path)).expect("写入夹具失败");

    run_import(&src_path, &dst_path).expect("首次迁移应该成功");

    // 源端改动 Red 的 position
    open_connection(&src_path)
        .execute(
            "UPDATE products_attributechoicevalue SET position = 5 WHERE id = ?1",
            params![SRC_VALUE_RED],
        )
        .unwrap();

    run_import(&src_path, &dst_path).expect("重跑应该成功");

    let sort_order: i64 = open_connection(&dst_path)
        .query_row(
            "SELECT sort_order FROM attribute_value WHERE slug = 'red'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(sort_order, 0, "已存在值的 sort_order 不得被重跑覆盖");
}

// ==========================================
// 展示名确定性
// ==========================================

#[test]
fn test_variant_name_determinism() {
    logging::init_test();

    let (_src_file, src_path) = create_source_snapshot().expect("创建源快照失败");
    let (_dst_file, dst_path) = create_target_db().expect("创建目标库失败");
    let src_conn = open_connection(&src_path);
    insert_pedal_fixture(&src_conn).expect("写入夹具失败");

    // FZ-3 与 FZ-1 赋值完全相同
    src_conn
        .execute(
            "INSERT INTO products_productvariant \
             (id, sku, price_override, price_override_currency, product_id, attributes) \
             VALUES (2002, 'FZ-3', NULL, NULL, ?1, ?2)",
            params![
                SRC_PRODUCT_FUZZ,
                format!(r#"{{"{}": "9V"}}"#, SRC_ATTR_VOLTAGE)
            ],
        )
        .unwrap();

    run_import(&src_path, &dst_path).expect("迁移应该成功");

    let conn = open_connection(&dst_path);
    let name_of = |sku: &str| -> String {
        conn.query_row(
            "SELECT name FROM product_variant WHERE sku = ?1",
            params![sku],
            |row| row.get(0),
        )
        .unwrap()
    };

    assert_eq!(name_of("FZ-1"), name_of("FZ-3"), "相同赋值必须得到相同展示名");
    assert_ne!(name_of("FZ-1"), name_of("FZ-2"));

    // 源端改值后重跑，展示名确定性地跟随变化
    src_conn
        .execute(
            "UPDATE products_productvariant SET attributes = ?1 WHERE id = ?2",
            params![
                format!(r#"{{"{}": "18V"}}"#, SRC_ATTR_VOLTAGE),
                SRC_VARIANT_FZ1
            ],
        )
        .unwrap();
    run_import(&src_path, &dst_path).expect("重跑应该成功");

    let conn = open_connection(&dst_path);
    let fz1_name: String = conn
        .query_row(
            "SELECT name FROM product_variant WHERE sku = 'FZ-1'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(fz1_name, "18V");
}

// ==========================================
// 错误策略: 架构不一致与负载非法一律致命
// ==========================================

#[test]
fn test_undeclared_product_attribute_is_fatal() {
    logging::init_test();

    let (_src_file, src_path) = create_source_snapshot().expect("创建源快照失败");
    let (_dst_file, dst_path) = create_target_db().expect("创建目标库失败");
    let src_conn = open_connection(&src_path);
    insert_pedal_fixture(&src_conn).expect("写入夹具失败");

    // Voltage 只在变体级声明，放进商品负载必须致命
    src_conn
        .execute(
            "UPDATE products_product SET attributes = ?1 WHERE id = ?2",
            params![
                format!(r#"{{"{}": {}}}"#, SRC_ATTR_VOLTAGE, SRC_VALUE_RED),
                SRC_PRODUCT_FUZZ
            ],
        )
        .unwrap();

    let err = run_import(&src_path, &dst_path).unwrap_err();
    assert!(
        matches!(err, ImportError::SchemaConsistency { .. }),
        "未声明属性必须触发架构不一致错误, 实际: {err}"
    );
}

#[test]
fn test_undeclared_variant_attribute_is_fatal() {
    logging::init_test();

    let (_src_file, src_path) = create_source_snapshot().expect("创建源快照失败");
    let (_dst_file, dst_path) = create_target_db().expect("创建目标库失败");
    let src_conn = open_connection(&src_path);
    insert_pedal_fixture(&src_conn).expect("写入夹具失败");

    // Color 只在商品级声明，放进变体负载必须致命
    src_conn
        .execute(
            "UPDATE products_productvariant SET attributes = ?1 WHERE id = ?2",
            params![
                format!(r#"{{"{}": "Red"}}"#, SRC_ATTR_COLOR),
                SRC_VARIANT_FZ1
            ],
        )
        .unwrap();

    let err = run_import(&src_path, &dst_path).unwrap_err();
    assert!(matches!(err, ImportError::SchemaConsistency { .. }));
}

#[test]
fn test_malformed_payload_is_fatal() {
    logging::init_test();

    let (_src_file, src_path) = create_source_snapshot().expect("创建源快照失败");
    let (_dst_file, dst_path) = create_target_db().expect("创建目标库失败");
    let src_conn = open_connection(&src_path);
    insert_pedal_fixture(&src_conn).expect("写入夹具失败");

    src_conn
        .execute(
            "UPDATE products_product SET attributes = 'not json' WHERE id = ?1",
            params![SRC_PRODUCT_FUZZ],
        )
        .unwrap();

    let err = run_import(&src_path, &dst_path).unwrap_err();
    assert!(matches!(err, ImportError::MalformedPayload { .. }));
}

#[test]
fn test_dangling_attribute_reference_is_fatal() {
    logging::init_test();

    let (_src_file, src_path) = create_source_snapshot().expect("创建源快照失败");
    let (_dst_file, dst_path) = create_target_db().expect("创建目标库失败");
    let src_conn = open_connection(&src_path);
    insert_pedal_fixture(&src_conn).expect("写入夹具失败");

    // 负载引用从未声明过的属性 id → 翻译缺失
    src_conn
        .execute(
            "UPDATE products_product SET attributes = '{\"999\": 100}' WHERE id = ?1",
            params![SRC_PRODUCT_FUZZ],
        )
        .unwrap();

    let err = run_import(&src_path, &dst_path).unwrap_err();
    assert!(matches!(err, ImportError::MissingTranslation { .. }));
}

#[test]
fn test_missing_snapshot_is_fatal_at_startup() {
    logging::init_test();

    let (_dst_file, dst_path) = create_target_db().expect("创建目标库失败");

    let err = run_import("/nonexistent/snapshot.db", &dst_path).unwrap_err();
    assert!(matches!(err, ImportError::SnapshotNotFound(_)));
}

#[test]
fn test_product_without_category_link_is_fatal() {
    logging::init_test();

    let (_src_file, src_path) = create_source_snapshot().expect("创建源快照失败");
    let (_dst_file, dst_path) = create_target_db().expect("创建目标库失败");
    let src_conn = open_connection(&src_path);
    insert_pedal_fixture(&src_conn).expect("写入夹具失败");

    src_conn
        .execute(
            "DELETE FROM products_product_categories WHERE product_id = ?1",
            params![SRC_PRODUCT_FUZZ],
        )
        .unwrap();

    let err = run_import(&src_path, &dst_path).unwrap_err();
    assert!(matches!(err, ImportError::MissingCategoryLink(_)));
}
