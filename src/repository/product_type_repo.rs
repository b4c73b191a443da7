// ==========================================
// 商品目录迁移工具 - 商品类型仓储
// ==========================================
// 红线: Repository 不含迁移流程逻辑
// ==========================================

use crate::domain::catalog::ProductType;
use crate::domain::types::Upserted;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// ProductTypeRepository - 商品类型仓储
// ==========================================

/// 商品类型仓储
/// 职责: 管理 product_type 表的幂等 upsert 与查询
pub struct ProductTypeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductTypeRepository {
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

    /// 按自然键 (name, slug) 幂等 upsert 商品类型
    ///
    /// # 返回
    /// - Ok(Upserted<ProductType>): 实体与"是否新建"标记
    /// - Err: 数据库错误
    pub fn get_or_create(
        &self,
        name: &str,
        slug: &str,
        has_variants: bool,
    ) -> RepositoryResult<Upserted<ProductType>> {
        let conn = self.get_conn()?;

        let existing = conn
            .query_row(
                "SELECT id, name, slug, has_variants FROM product_type WHERE name = ?1 AND slug = ?2",
                params![name, slug],
                |row| {
                    Ok(ProductType {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        slug: row.get(2)?,
                        has_variants: row.get::<_, i64>(3)? != 0,
                    })
                },
            )
            .optional()?;

        if let Some(product_type) = existing {
            return Ok(Upserted::existing(product_type));
        }

        conn.execute(
            "INSERT INTO product_type (name, slug, has_variants) VALUES (?1, ?2, ?3)",
            params![name, slug, has_variants as i64],
        )?;

        Ok(Upserted::created(ProductType {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            slug: slug.to_string(),
            has_variants,
        }))
    }

    /// 按 id 查询商品类型
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ProductType>> {
        let conn = self.get_conn()?;

        let product_type = conn
            .query_row(
                "SELECT id, name, slug, has_variants FROM product_type WHERE id = ?1",
                params![id],
                |row| {
                    Ok(ProductType {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        slug: row.get(2)?,
                        has_variants: row.get::<_, i64>(3)? != 0,
                    })
                },
            )
            .optional()?;

        Ok(product_type)
    }
}
