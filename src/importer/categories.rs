// ==========================================
// 商品目录迁移工具 - 分类阶段
// ==========================================
// 职责: 将源库已排好序的嵌套集合分类树直插目标库
// 红线: 树坐标 (lft/rght/tree_id/level) 由源库提供，
//       原样写入，不经目标库的树维护逻辑重算
// 说明: 分类不走标识翻译登记 —— 源/目标共享分类 id
// ==========================================

use crate::domain::catalog::CategoryRow;
use crate::importer::error::ImportResult;
use crate::importer::{ImportContext, Stage};
use tracing::debug;

pub(crate) const STAGE: Stage = Stage {
    name: "categories",
    reads: &[],
    populates: &[],
    run,
};

fn run(ctx: &mut ImportContext) -> ImportResult<usize> {
    let mut inserted = 0;

    for src in ctx.snapshot.categories()? {
        let row = CategoryRow {
            id: src.id,
            name: src.name,
            slug: src.slug,
            description: src.description,
            lft: src.lft,
            rght: src.rght,
            tree_id: src.tree_id,
            level: src.level,
            parent_id: src.parent_id,
        };

        if ctx.repos.categories.insert_raw(&row)? {
            inserted += 1;
        } else {
            debug!(category_id = row.id, "分类已存在，跳过");
        }
    }

    Ok(inserted)
}
