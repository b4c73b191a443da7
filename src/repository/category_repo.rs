// ==========================================
// 商品目录迁移工具 - 分类仓储
// ==========================================
// 红线: 本仓储是刻意的底层直插通道 —— 源库已携带完整的
//       嵌套集合树坐标 (lft/rght/tree_id/level)，按常规
//       树维护 API 插入会重算坐标并可能偏离源树，因此
//       这里原样写入并在冲突时跳过。该通道仅限分类使用，
//       不得推广为通用模式。
// ==========================================

use crate::domain::catalog::CategoryRow;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// CategoryRepository - 分类仓储
// ==========================================

/// 分类仓储
/// 职责: 分类行的直插（冲突跳过）与存在性查询
pub struct CategoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CategoryRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 直插分类行，id 冲突时跳过（幂等）
    ///
    /// 装饰性字段（图片、SEO 文案）写空占位，结构化元数据写空对象
    ///
    /// # 返回
    /// - Ok(true): 实际插入
    /// - Ok(false): 已存在，跳过
    pub fn insert_raw(&self, row: &CategoryRow) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            r#"
            INSERT INTO category (
                id, name, slug, description, lft, rght, tree_id, level, parent_id,
                background_image, seo_description, seo_title, background_image_alt,
                description_json, metadata, private_metadata
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, '', '', '', '', '{}', '{}', '{}')
            ON CONFLICT DO NOTHING
            "#,
            params![
                row.id,
                row.name,
                row.slug,
                row.description,
                row.lft,
                row.rght,
                row.tree_id,
                row.level,
                row.parent_id,
            ],
        )?;

        Ok(affected > 0)
    }

    /// 按 id 判断分类是否存在
    ///
    /// 商品与分类的关联按原始 id 直接匹配（源/目标共享分类 id），
    /// 不经过标识翻译登记表
    pub fn exists(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM category WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(found.is_some())
    }
}
