// ==========================================
// 商品目录迁移工具 - 属性可选值阶段
// ==========================================
// 职责: 在所属属性下幂等物化预声明的属性可选值，
//       登记属性值的标识翻译
// 红线: sort_order 仅在创建时取源 position；已存在的行
//       不回写（保留导入后的人工调序）
// ==========================================

use crate::domain::types::EntityKind;
use crate::importer::error::ImportResult;
use crate::importer::{ImportContext, Stage};
use tracing::debug;

pub(crate) const STAGE: Stage = Stage {
    name: "attribute_values",
    reads: &[EntityKind::Attribute],
    populates: &[EntityKind::AttributeValue],
    run,
};

fn run(ctx: &mut ImportContext) -> ImportResult<usize> {
    let mut imported = 0;

    for src_value in ctx.snapshot.attribute_values()? {
        let attribute_id = ctx
            .registry
            .resolve(EntityKind::Attribute, src_value.attribute_id)?;

        let value = ctx.repos.attributes.get_or_create_value(
            &src_value.name,
            &src_value.slug,
            attribute_id,
            src_value.position,
        )?;

        if !value.created && value.entity.sort_order != src_value.position {
            debug!(
                value = %src_value.slug,
                stored = value.entity.sort_order,
                source = src_value.position,
                "保留已有 sort_order，不覆盖"
            );
        }

        ctx.registry
            .record(EntityKind::AttributeValue, src_value.id, value.entity.id)?;

        imported += 1;
    }

    Ok(imported)
}
