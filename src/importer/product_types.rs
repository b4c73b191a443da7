// ==========================================
// 商品目录迁移工具 - 商品类型与属性架构阶段
// ==========================================
// 职责: upsert 商品类型，构建其商品级/变体级属性槽位，
//       登记类型与属性的标识翻译
// 约束: 属性按自然键 (name, slug) 共享 —— 同一属性被
//       多个类型（或两种作用域）引用时不重复建行
// ==========================================

use crate::domain::types::EntityKind;
use crate::importer::error::ImportResult;
use crate::importer::slug::slugify;
use crate::importer::snapshot::SrcAttribute;
use crate::importer::{ImportContext, Stage};
use crate::repository::SlotScope;
use tracing::debug;

pub(crate) const STAGE: Stage = Stage {
    name: "product_types",
    reads: &[],
    populates: &[EntityKind::ProductType, EntityKind::Attribute],
    run,
};

/// 显式转换规则: 旧库的 value_optional 是反义标志位，
/// 目标端的 value_required 取其否定
fn value_required_from_legacy(value_optional: bool) -> bool {
    !value_optional
}

fn run(ctx: &mut ImportContext) -> ImportResult<usize> {
    let mut imported = 0;

    for src_type in ctx.snapshot.product_types()? {
        let slug = slugify(&src_type.name);
        let product_type =
            ctx.repos
                .product_types
                .get_or_create(&src_type.name, &slug, src_type.has_variants)?;
        ctx.registry
            .record(EntityKind::ProductType, src_type.id, product_type.entity.id)?;

        debug!(
            source_id = src_type.id,
            target_id = product_type.entity.id,
            created = product_type.created,
            "商品类型 {} 已就绪",
            src_type.name
        );

        // 商品级属性槽位
        let product_attr_ids = ctx.snapshot.product_attribute_ids(src_type.id)?;
        for attr in ctx.snapshot.attributes_by_ids(&product_attr_ids)? {
            import_attribute(ctx, &attr, product_type.entity.id, SlotScope::Product)?;
        }

        // 变体级属性槽位
        let variant_attr_ids = ctx.snapshot.variant_attribute_ids(src_type.id)?;
        for attr in ctx.snapshot.attributes_by_ids(&variant_attr_ids)? {
            import_attribute(ctx, &attr, product_type.entity.id, SlotScope::Variant)?;
        }

        imported += 1;
    }

    Ok(imported)
}

/// upsert 单个属性及其在该商品类型下的槽位，并登记翻译
fn import_attribute(
    ctx: &mut ImportContext,
    attr: &SrcAttribute,
    product_type_id: i64,
    scope: SlotScope,
) -> ImportResult<()> {
    let value_required = value_required_from_legacy(attr.value_optional);
    // is_variant_only 仅在变体级作用域下置位
    let is_variant_only = scope == SlotScope::Variant;

    let attribute =
        ctx.repos
            .attributes
            .get_or_create(&attr.name, &attr.slug, value_required, is_variant_only)?;

    ctx.repos
        .attributes
        .ensure_slot(scope, attribute.entity.id, product_type_id)?;

    ctx.registry
        .record(EntityKind::Attribute, attr.id, attribute.entity.id)?;

    Ok(())
}
