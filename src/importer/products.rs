// ==========================================
// 商品目录迁移工具 - 商品阶段
// ==========================================
// 职责: 幂等 upsert 商品及其属性赋值，登记商品翻译
// 约束: 商品属性负载为 {源属性 id -> 源属性值 id} 的
//       JSON 映射，两侧均经标识翻译登记表解析
// 红线: 赋值选集整体替换 —— 重复导入选值变化时旧值必须清除
// ==========================================

use crate::domain::catalog::NewProduct;
use crate::domain::types::EntityKind;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::slug::slugify;
use crate::importer::{ImportContext, Stage};
use crate::repository::SlotScope;
use serde_json::Value;
use tracing::warn;

pub(crate) const STAGE: Stage = Stage {
    name: "products",
    reads: &[
        EntityKind::ProductType,
        EntityKind::Attribute,
        EntityKind::AttributeValue,
    ],
    populates: &[EntityKind::Product],
    run,
};

/// 显式转换规则: 解析商品属性负载 {属性 id -> 属性值 id}
///
/// JSON 的键恒为字符串，id 需再解析为整数；值侧兼容
/// 数字与字符串两种编码（旧系统两种写法都存在）
pub(crate) fn parse_id_map(entity: &'static str, id: i64, raw: &str) -> ImportResult<Vec<(i64, i64)>> {
    let map: serde_json::Map<String, Value> =
        serde_json::from_str(raw).map_err(|e| ImportError::MalformedPayload {
            entity,
            id,
            message: e.to_string(),
        })?;

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        let attr_id = parse_payload_id(entity, id, &Value::String(key))?;
        let value_id = parse_payload_id(entity, id, &value)?;
        pairs.push((attr_id, value_id));
    }

    // 按属性 id 稳定排序，保证重跑时赋值顺序一致
    pairs.sort_by_key(|(attr_id, _)| *attr_id);
    Ok(pairs)
}

fn parse_payload_id(entity: &'static str, id: i64, value: &Value) -> ImportResult<i64> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| ImportError::MalformedPayload {
            entity,
            id,
            message: format!("非整数 id: {n}"),
        }),
        Value::String(s) => s.parse().map_err(|_| ImportError::MalformedPayload {
            entity,
            id,
            message: format!("非整数 id: {s:?}"),
        }),
        other => Err(ImportError::MalformedPayload {
            entity,
            id,
            message: format!("id 类型非法: {other}"),
        }),
    }
}

fn run(ctx: &mut ImportContext) -> ImportResult<usize> {
    let mut imported = 0;

    for src in ctx.snapshot.products()? {
        // 源模型为多对多关联，但旧数据每个商品只有一条；
        // 取首条，出现多条时告警（截断行为与旧系统一致）
        let category_ids = ctx.snapshot.product_category_ids(src.id)?;
        let category_id = *category_ids
            .first()
            .ok_or(ImportError::MissingCategoryLink(src.id))?;
        if category_ids.len() > 1 {
            warn!(
                product_id = src.id,
                count = category_ids.len(),
                "商品存在多条分类关联，仅迁移首条"
            );
        }

        if !ctx.repos.categories.exists(category_id)? {
            return Err(ImportError::CategoryNotFound {
                product_id: src.id,
                category_id,
            });
        }

        let product_type_id = ctx
            .registry
            .resolve(EntityKind::ProductType, src.product_class_id)?;

        let product = ctx.repos.products.get_or_create(&NewProduct {
            product_type_id,
            name: src.name.clone(),
            slug: slugify(&src.name),
            category_id,
            price_amount: src.price,
            currency: src.price_currency.clone(),
        })?;

        ctx.registry
            .record(EntityKind::Product, src.id, product.entity.id)?;

        // 属性赋值
        for (src_attr_id, src_value_id) in parse_id_map("product", src.id, &src.attributes_json)? {
            let attribute_id = ctx.registry.resolve(EntityKind::Attribute, src_attr_id)?;
            let value_id = ctx
                .registry
                .resolve(EntityKind::AttributeValue, src_value_id)?;

            // 属性必须在该类型的商品级槽位中声明，否则为架构不一致
            let slot_id = ctx
                .repos
                .attributes
                .find_slot(SlotScope::Product, attribute_id, product_type_id)?
                .ok_or(ImportError::SchemaConsistency {
                    attribute_id,
                    product_type_id,
                    scope: "商品级",
                })?;

            let assignment = ctx
                .repos
                .products
                .get_or_create_assignment(product.entity.id, slot_id)?;
            ctx.repos
                .products
                .set_assignment_values(assignment.entity, &[value_id])?;
        }

        imported += 1;
    }

    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_map_numeric_and_string_values() {
        let pairs = parse_id_map("product", 1, r#"{"10": 100, "11": "101"}"#).unwrap();
        assert_eq!(pairs, vec![(10, 100), (11, 101)]);
    }

    #[test]
    fn test_parse_id_map_rejects_garbage() {
        assert!(matches!(
            parse_id_map("product", 1, "not json"),
            Err(ImportError::MalformedPayload { .. })
        ));
        assert!(matches!(
            parse_id_map("product", 1, r#"{"x": 1}"#),
            Err(ImportError::MalformedPayload { .. })
        ));
        assert!(matches!(
            parse_id_map("product", 1, r#"{"10": true}"#),
            Err(ImportError::MalformedPayload { .. })
        ));
    }
}
