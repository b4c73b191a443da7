// ==========================================
// 商品目录迁移工具 - 商品变体阶段
// ==========================================
// 职责: 幂等 upsert 变体、库存、临时属性值与属性赋值，
//       整体写入外部测试结果元数据，重算派生展示名
// 约束: 变体属性负载为 {源属性 id -> 原始字符串值} ——
//       与商品不同，值不预先声明，需按需创建可选值行
// 红线: 元数据整体写入；库存数量覆盖写入；赋值选集整体替换
// ==========================================

use crate::domain::catalog::NewVariant;
use crate::domain::types::EntityKind;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::slug::slugify;
use crate::importer::{ImportContext, Stage};
use crate::repository::{Repositories, SlotScope};
use serde_json::{json, Value};
use tracing::debug;

pub(crate) const STAGE: Stage = Stage {
    name: "variants",
    reads: &[EntityKind::Product, EntityKind::Attribute],
    populates: &[EntityKind::Variant],
    run,
};

/// 外部测试结果在变体元数据中的固定键
const TEST_RESULT_METADATA_KEY: &str = "dca75_result";

/// 展示名槽位间的固定分隔符（店面端依赖该精确派生）
const NAME_SEPARATOR: &str = " / ";

/// 显式转换规则: 解析变体属性负载 {属性 id -> 原始字符串值}
fn parse_raw_value_map(variant_id: i64, raw: &str) -> ImportResult<Vec<(i64, String)>> {
    let map: serde_json::Map<String, Value> =
        serde_json::from_str(raw).map_err(|e| ImportError::MalformedPayload {
            entity: "variant",
            id: variant_id,
            message: e.to_string(),
        })?;

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        let attr_id: i64 = key.parse().map_err(|_| ImportError::MalformedPayload {
            entity: "variant",
            id: variant_id,
            message: format!("非整数属性 id: {key:?}"),
        })?;
        let raw_value = match value {
            Value::String(s) => s,
            // 数字值照原样转为字符串（旧数据中电压等字段偶见未加引号）
            Value::Number(n) => n.to_string(),
            other => {
                return Err(ImportError::MalformedPayload {
                    entity: "variant",
                    id: variant_id,
                    message: format!("属性值类型非法: {other}"),
                })
            }
        };
        pairs.push((attr_id, raw_value));
    }

    pairs.sort_by_key(|(attr_id, _)| *attr_id);
    Ok(pairs)
}

/// 包装外部测试结果为变体元数据对象
///
/// 有负载: {"dca75_result": <解析后的 JSON>}；无负载: {}
/// 整体替换既有元数据，绝不部分合并
fn build_metadata(variant_id: i64, payload: Option<String>) -> ImportResult<Value> {
    match payload {
        Some(raw) => {
            let parsed: Value =
                serde_json::from_str(&raw).map_err(|e| ImportError::MalformedPayload {
                    entity: "variant_test_result",
                    id: variant_id,
                    message: e.to_string(),
                })?;
            Ok(json!({ TEST_RESULT_METADATA_KEY: parsed }))
        }
        None => Ok(json!({})),
    }
}

/// 按商品类型声明的变体槽位顺序重算展示名
///
/// 每个有选值的槽位取值名称，按 " / " 拼接；
/// 店面端依赖该精确派生，每次赋值变化后必须重算
fn generate_variant_name(
    repos: &Repositories,
    variant_id: i64,
    product_type_id: i64,
) -> ImportResult<String> {
    let mut parts = Vec::new();

    for slot_id in repos.attributes.list_variant_slots(product_type_id)? {
        let names = repos.variants.assigned_value_names(variant_id, slot_id)?;
        if !names.is_empty() {
            parts.push(names.join(", "));
        }
    }

    Ok(parts.join(NAME_SEPARATOR))
}

fn run(ctx: &mut ImportContext) -> ImportResult<usize> {
    let warehouse_id = ctx
        .warehouse_id
        .ok_or_else(|| ImportError::WarehouseNotSeeded("variants".to_string()))?;

    let mut imported = 0;

    for src in ctx.snapshot.variants()? {
        let product_id = ctx.registry.resolve(EntityKind::Product, src.product_id)?;
        let product = ctx.repos.products.find_by_id(product_id)?.ok_or_else(|| {
            ImportError::InternalError(format!("已登记的商品 {product_id} 在目标库中不存在"))
        })?;

        let variant = ctx.repos.variants.get_or_create(&NewVariant {
            sku: src.sku.clone(),
            price_override_amount: src.price_override,
            currency: src.price_override_currency.clone(),
            product_id,
        })?;
        ctx.registry
            .record(EntityKind::Variant, src.id, variant.entity.id)?;

        // 外部测试结果元数据（整体写入）
        let metadata = build_metadata(src.id, ctx.snapshot.test_result_payload(src.id)?)?;
        ctx.repos
            .variants
            .set_metadata(variant.entity.id, &metadata)?;

        // 库存: 无记录按 0 计，数量覆盖写入
        let quantity = ctx.snapshot.stock_quantity(src.id)?.unwrap_or(0);
        ctx.repos
            .warehouses
            .upsert_stock(warehouse_id, variant.entity.id, quantity)?;

        // 临时属性值与赋值
        for (src_attr_id, raw_value) in parse_raw_value_map(src.id, &src.attributes_json)? {
            let attribute_id = ctx.registry.resolve(EntityKind::Attribute, src_attr_id)?;

            // 属性必须在该类型的变体级槽位中声明，否则为架构不一致
            let slot_id = ctx
                .repos
                .attributes
                .find_slot(SlotScope::Variant, attribute_id, product.product_type_id)?
                .ok_or(ImportError::SchemaConsistency {
                    attribute_id,
                    product_type_id: product.product_type_id,
                    scope: "变体级",
                })?;

            let value = ctx.repos.attributes.get_or_create_value(
                &raw_value,
                &slugify(&raw_value),
                attribute_id,
                0,
            )?;

            let assignment = ctx
                .repos
                .variants
                .get_or_create_assignment(variant.entity.id, slot_id)?;
            ctx.repos
                .variants
                .set_assignment_values(assignment.entity, &[value.entity.id])?;
        }

        // 赋值落定后重算派生展示名
        let name = generate_variant_name(&ctx.repos, variant.entity.id, product.product_type_id)?;
        ctx.repos.variants.update_name(variant.entity.id, &name)?;

        debug!(
            sku = %src.sku,
            variant_id = variant.entity.id,
            name = %name,
            quantity,
            "变体已导入"
        );

        imported += 1;
    }

    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_value_map() {
        let pairs = parse_raw_value_map(1, r#"{"11": "9V", "12": 18}"#).unwrap();
        assert_eq!(pairs, vec![(11, "9V".to_string()), (12, "18".to_string())]);
    }

    #[test]
    fn test_parse_raw_value_map_rejects_garbage() {
        assert!(matches!(
            parse_raw_value_map(1, "[1,2]"),
            Err(ImportError::MalformedPayload { .. })
        ));
        assert!(matches!(
            parse_raw_value_map(1, r#"{"11": null}"#),
            Err(ImportError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_build_metadata() {
        let with_payload = build_metadata(1, Some(r#"{"score": 42}"#.to_string())).unwrap();
        assert_eq!(with_payload, json!({"dca75_result": {"score": 42}}));

        let empty = build_metadata(1, None).unwrap();
        assert_eq!(empty, json!({}));
    }
}
