// ==========================================
// 商品目录迁移工具 - 商品仓储
// ==========================================
// 红线: Repository 不含迁移流程逻辑
// ==========================================

use crate::domain::catalog::{NewProduct, Product};
use crate::domain::types::Upserted;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// ProductRepository - 商品仓储
// ==========================================

/// 商品仓储
/// 职责: 管理 product 表及商品侧 EAV 赋值记录
pub struct ProductRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepository {
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

    /// 按自然键幂等 upsert 商品
    ///
    /// 自然键: (product_type_id, name, category_id, price_amount, currency)
    /// 商品统一按已发布 (is_published = 1) 导入
    pub fn get_or_create(&self, new: &NewProduct) -> RepositoryResult<Upserted<Product>> {
        let conn = self.get_conn()?;

        let existing = conn
            .query_row(
                "SELECT id, product_type_id, name, slug, category_id, price_amount, currency, is_published \
                 FROM product \
                 WHERE product_type_id = ?1 AND name = ?2 AND category_id = ?3 \
                   AND price_amount = ?4 AND currency = ?5",
                params![
                    new.product_type_id,
                    new.name,
                    new.category_id,
                    new.price_amount,
                    new.currency
                ],
                Self::map_product,
            )
            .optional()?;

        if let Some(product) = existing {
            return Ok(Upserted::existing(product));
        }

        conn.execute(
            "INSERT INTO product \
             (product_type_id, name, slug, category_id, price_amount, currency, is_published) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
            params![
                new.product_type_id,
                new.name,
                new.slug,
                new.category_id,
                new.price_amount,
                new.currency
            ],
        )?;

        Ok(Upserted::created(Product {
            id: conn.last_insert_rowid(),
            product_type_id: new.product_type_id,
            name: new.name.clone(),
            slug: new.slug.clone(),
            category_id: new.category_id,
            price_amount: new.price_amount,
            currency: new.currency.clone(),
            is_published: true,
        }))
    }

    /// 按 id 查询商品
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;

        let product = conn
            .query_row(
                "SELECT id, product_type_id, name, slug, category_id, price_amount, currency, is_published \
                 FROM product WHERE id = ?1",
                params![id],
                Self::map_product,
            )
            .optional()?;

        Ok(product)
    }

    /// 幂等 upsert 商品与槽位之间的赋值记录
    ///
    /// # 返回
    /// - Ok(Upserted<i64>): 赋值记录 id 与"是否新建"标记
    pub fn get_or_create_assignment(
        &self,
        product_id: i64,
        slot_id: i64,
    ) -> RepositoryResult<Upserted<i64>> {
        let conn = self.get_conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM assigned_product_attribute \
                 WHERE product_id = ?1 AND assignment_id = ?2",
                params![product_id, slot_id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(assigned_id) = existing {
            return Ok(Upserted::existing(assigned_id));
        }

        conn.execute(
            "INSERT INTO assigned_product_attribute (product_id, assignment_id) VALUES (?1, ?2)",
            params![product_id, slot_id],
        )?;

        Ok(Upserted::created(conn.last_insert_rowid()))
    }

    /// 整体替换赋值记录的属性值选集
    ///
    /// 红线: 替换而非追加 —— 重复导入若选值变化，旧值必须被清除
    pub fn set_assignment_values(
        &self,
        assigned_id: i64,
        value_ids: &[i64],
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "DELETE FROM assigned_product_attribute_value WHERE assigned_id = ?1",
            params![assigned_id],
        )?;

        for value_id in value_ids {
            conn.execute(
                "INSERT INTO assigned_product_attribute_value (assigned_id, value_id) \
                 VALUES (?1, ?2)",
                params![assigned_id, value_id],
            )?;
        }

        Ok(())
    }

    /// 查询赋值记录当前的属性值选集（测试与校验用）
    pub fn assignment_value_ids(&self, assigned_id: i64) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT value_id FROM assigned_product_attribute_value \
             WHERE assigned_id = ?1 ORDER BY value_id",
        )?;

        let ids = stmt
            .query_map(params![assigned_id], |row| row.get(0))?
            .collect::<SqliteResult<Vec<i64>>>()?;

        Ok(ids)
    }

    fn map_product(row: &rusqlite::Row<'_>) -> SqliteResult<Product> {
        Ok(Product {
            id: row.get(0)?,
            product_type_id: row.get(1)?,
            name: row.get(2)?,
            slug: row.get(3)?,
            category_id: row.get(4)?,
            price_amount: row.get(5)?,
            currency: row.get(6)?,
            is_published: row.get::<_, i64>(7)? != 0,
        })
    }
}
