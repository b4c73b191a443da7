// ==========================================
// 商品目录迁移工具 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免外键约束部分开启
// - 统一 busy_timeout，减少偶发 busy 错误
// - 提供目标库的幂等建表入口（空库可直接运行迁移与测试）
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开目标库连接并应用统一配置
pub fn open_target_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_connection(&conn)?;
    Ok(conn)
}

/// 幂等初始化目标库 schema
///
/// 说明：
/// - 目标库的正式 schema 由目录服务自身维护；这里的建表语句
///   仅保证迁移工具（及其测试）可以在空库上独立运行
/// - 全部使用 CREATE TABLE IF NOT EXISTS，重复执行无副作用
/// - category 表的 id 来自源库（源/目标共享分类 id），因此不自增
pub fn init_target_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS product_type (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            has_variants INTEGER NOT NULL DEFAULT 1,
            UNIQUE (name, slug)
        );

        CREATE TABLE IF NOT EXISTS attribute (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            value_required INTEGER NOT NULL DEFAULT 0,
            is_variant_only INTEGER NOT NULL DEFAULT 0,
            UNIQUE (name, slug)
        );

        -- 商品级属性槽位（attribute <-> product_type 关联）
        CREATE TABLE IF NOT EXISTS attribute_product (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            attribute_id INTEGER NOT NULL REFERENCES attribute(id),
            product_type_id INTEGER NOT NULL REFERENCES product_type(id),
            UNIQUE (attribute_id, product_type_id)
        );

        -- 变体级属性槽位
        CREATE TABLE IF NOT EXISTS attribute_variant (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            attribute_id INTEGER NOT NULL REFERENCES attribute(id),
            product_type_id INTEGER NOT NULL REFERENCES product_type(id),
            UNIQUE (attribute_id, product_type_id)
        );

        CREATE TABLE IF NOT EXISTS attribute_value (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            attribute_id INTEGER NOT NULL REFERENCES attribute(id),
            UNIQUE (name, slug, attribute_id)
        );

        -- 分类树：树坐标（lft/rght/tree_id/level）由源库直接提供
        CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            lft INTEGER NOT NULL,
            rght INTEGER NOT NULL,
            tree_id INTEGER NOT NULL,
            level INTEGER NOT NULL,
            parent_id INTEGER REFERENCES category(id),
            background_image TEXT NOT NULL DEFAULT '',
            seo_description TEXT NOT NULL DEFAULT '',
            seo_title TEXT NOT NULL DEFAULT '',
            background_image_alt TEXT NOT NULL DEFAULT '',
            description_json TEXT NOT NULL DEFAULT '{}',
            metadata TEXT NOT NULL DEFAULT '{}',
            private_metadata TEXT NOT NULL DEFAULT '{}'
        );

        CREATE TABLE IF NOT EXISTS product (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_type_id INTEGER NOT NULL REFERENCES product_type(id),
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            category_id INTEGER NOT NULL REFERENCES category(id),
            price_amount REAL NOT NULL,
            currency TEXT NOT NULL,
            is_published INTEGER NOT NULL DEFAULT 1,
            UNIQUE (product_type_id, name, category_id, price_amount, currency)
        );

        -- EAV 赋值记录（商品侧）
        CREATE TABLE IF NOT EXISTS assigned_product_attribute (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES product(id),
            assignment_id INTEGER NOT NULL REFERENCES attribute_product(id),
            UNIQUE (product_id, assignment_id)
        );

        CREATE TABLE IF NOT EXISTS assigned_product_attribute_value (
            assigned_id INTEGER NOT NULL REFERENCES assigned_product_attribute(id),
            value_id INTEGER NOT NULL REFERENCES attribute_value(id),
            PRIMARY KEY (assigned_id, value_id)
        );

        CREATE TABLE IF NOT EXISTS product_variant (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sku TEXT NOT NULL,
            name TEXT NOT NULL DEFAULT '',
            price_override_amount REAL,
            currency TEXT,
            product_id INTEGER NOT NULL REFERENCES product(id),
            metadata TEXT NOT NULL DEFAULT '{}'
        );

        -- EAV 赋值记录（变体侧）
        CREATE TABLE IF NOT EXISTS assigned_variant_attribute (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            variant_id INTEGER NOT NULL REFERENCES product_variant(id),
            assignment_id INTEGER NOT NULL REFERENCES attribute_variant(id),
            UNIQUE (variant_id, assignment_id)
        );

        CREATE TABLE IF NOT EXISTS assigned_variant_attribute_value (
            assigned_id INTEGER NOT NULL REFERENCES assigned_variant_attribute(id),
            value_id INTEGER NOT NULL REFERENCES attribute_value(id),
            PRIMARY KEY (assigned_id, value_id)
        );

        CREATE TABLE IF NOT EXISTS address (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            company_name TEXT NOT NULL DEFAULT '',
            street_address TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            postal_code TEXT NOT NULL DEFAULT '',
            country TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS shipping_zone (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            countries TEXT NOT NULL DEFAULT '',
            is_default INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS warehouse (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            address_id INTEGER NOT NULL REFERENCES address(id),
            email TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS warehouse_shipping_zone (
            warehouse_id INTEGER NOT NULL REFERENCES warehouse(id),
            shipping_zone_id INTEGER NOT NULL REFERENCES shipping_zone(id),
            PRIMARY KEY (warehouse_id, shipping_zone_id)
        );

        CREATE TABLE IF NOT EXISTS stock (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            warehouse_id INTEGER NOT NULL REFERENCES warehouse(id),
            variant_id INTEGER NOT NULL REFERENCES product_variant(id),
            quantity INTEGER NOT NULL DEFAULT 0,
            UNIQUE (warehouse_id, variant_id)
        );
        "#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_target_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_connection(&conn).unwrap();
        init_target_schema(&conn).unwrap();
        // 重复执行无副作用
        init_target_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='product'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
