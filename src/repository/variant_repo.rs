// ==========================================
// 商品目录迁移工具 - 商品变体仓储
// ==========================================
// 红线: Repository 不含迁移流程逻辑
// 约束: 自然键中 price_override_amount / currency 可为 NULL，
//       匹配使用 IS 而非 = （SQLite 中 NULL = NULL 不成立）
// ==========================================

use crate::domain::catalog::{NewVariant, ProductVariant};
use crate::domain::types::Upserted;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// VariantRepository - 商品变体仓储
// ==========================================

/// 商品变体仓储
/// 职责: 管理 product_variant 表及变体侧 EAV 赋值记录
pub struct VariantRepository {
    conn: Arc<Mutex<Connection>>,
}

impl VariantRepository {
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

    /// 按自然键幂等 upsert 变体
    ///
    /// 自然键: (sku, price_override_amount, currency, product_id)
    /// 新建时 metadata 为空对象，展示名为空串（随后由导入层整体写入）
    pub fn get_or_create(&self, new: &NewVariant) -> RepositoryResult<Upserted<ProductVariant>> {
        let conn = self.get_conn()?;

        let existing = conn
            .query_row(
                "SELECT id, sku, name, price_override_amount, currency, product_id, metadata \
                 FROM product_variant \
                 WHERE sku = ?1 AND price_override_amount IS ?2 AND currency IS ?3 \
                   AND product_id = ?4",
                params![new.sku, new.price_override_amount, new.currency, new.product_id],
                Self::map_variant,
            )
            .optional()?;

        if let Some(variant) = existing {
            return Ok(variant.map(Upserted::existing)?);
        }

        conn.execute(
            "INSERT INTO product_variant (sku, price_override_amount, currency, product_id) \
             VALUES (?1, ?2, ?3, ?4)",
            params![new.sku, new.price_override_amount, new.currency, new.product_id],
        )?;

        Ok(Upserted::created(ProductVariant {
            id: conn.last_insert_rowid(),
            sku: new.sku.clone(),
            name: String::new(),
            price_override_amount: new.price_override_amount,
            currency: new.currency.clone(),
            product_id: new.product_id,
            metadata: serde_json::json!({}),
        }))
    }

    /// 按 id 查询变体
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ProductVariant>> {
        let conn = self.get_conn()?;

        let variant = conn
            .query_row(
                "SELECT id, sku, name, price_override_amount, currency, product_id, metadata \
                 FROM product_variant WHERE id = ?1",
                params![id],
                Self::map_variant,
            )
            .optional()?;

        variant.transpose().map_err(Into::into)
    }

    /// 整体写入变体元数据
    ///
    /// 红线: 不与既有内容合并 —— 每次导入以本次内容为准
    pub fn set_metadata(
        &self,
        variant_id: i64,
        metadata: &serde_json::Value,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            "UPDATE product_variant SET metadata = ?1 WHERE id = ?2",
            params![metadata.to_string(), variant_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ProductVariant".to_string(),
                id: variant_id.to_string(),
            });
        }

        Ok(())
    }

    /// 持久化派生展示名（仅更新 name 字段）
    pub fn update_name(&self, variant_id: i64, name: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            "UPDATE product_variant SET name = ?1 WHERE id = ?2",
            params![name, variant_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ProductVariant".to_string(),
                id: variant_id.to_string(),
            });
        }

        Ok(())
    }

    /// 幂等 upsert 变体与槽位之间的赋值记录
    pub fn get_or_create_assignment(
        &self,
        variant_id: i64,
        slot_id: i64,
    ) -> RepositoryResult<Upserted<i64>> {
        let conn = self.get_conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM assigned_variant_attribute \
                 WHERE variant_id = ?1 AND assignment_id = ?2",
                params![variant_id, slot_id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(assigned_id) = existing {
            return Ok(Upserted::existing(assigned_id));
        }

        conn.execute(
            "INSERT INTO assigned_variant_attribute (variant_id, assignment_id) VALUES (?1, ?2)",
            params![variant_id, slot_id],
        )?;

        Ok(Upserted::created(conn.last_insert_rowid()))
    }

    /// 整体替换赋值记录的属性值选集
    ///
    /// 红线: 替换而非追加
    pub fn set_assignment_values(
        &self,
        assigned_id: i64,
        value_ids: &[i64],
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "DELETE FROM assigned_variant_attribute_value WHERE assigned_id = ?1",
            params![assigned_id],
        )?;

        for value_id in value_ids {
            conn.execute(
                "INSERT INTO assigned_variant_attribute_value (assigned_id, value_id) \
                 VALUES (?1, ?2)",
                params![assigned_id, value_id],
            )?;
        }

        Ok(())
    }

    /// 查询变体在某槽位下当前选中的属性值名称（按 sort_order 排序）
    ///
    /// 展示名派生依赖该查询：每个槽位取当前选集的名称
    pub fn assigned_value_names(
        &self,
        variant_id: i64,
        slot_id: i64,
    ) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT av.name \
             FROM assigned_variant_attribute ava \
             JOIN assigned_variant_attribute_value link ON link.assigned_id = ava.id \
             JOIN attribute_value av ON av.id = link.value_id \
             WHERE ava.variant_id = ?1 AND ava.assignment_id = ?2 \
             ORDER BY av.sort_order, av.id",
        )?;

        let names = stmt
            .query_map(params![variant_id, slot_id], |row| row.get(0))?
            .collect::<SqliteResult<Vec<String>>>()?;

        Ok(names)
    }

    fn map_variant(
        row: &rusqlite::Row<'_>,
    ) -> SqliteResult<Result<ProductVariant, RepositoryError>> {
        let metadata_raw: String = row.get(6)?;
        let metadata = match serde_json::from_str(&metadata_raw) {
            Ok(value) => value,
            Err(e) => {
                return Ok(Err(RepositoryError::FieldValueError {
                    field: "product_variant.metadata".to_string(),
                    message: e.to_string(),
                }))
            }
        };

        Ok(Ok(ProductVariant {
            id: row.get(0)?,
            sku: row.get(1)?,
            name: row.get(2)?,
            price_override_amount: row.get(3)?,
            currency: row.get(4)?,
            product_id: row.get(5)?,
            metadata,
        }))
    }
}
