// ==========================================
// 商品目录迁移工具 - 属性/属性值/槽位仓储
// ==========================================
// 红线: Repository 不含迁移流程逻辑
// 约束: 属性自然键 (name, slug) 独立于商品类型，
//       同一属性可被多个商品类型通过槽位共享
// ==========================================

use crate::domain::catalog::{Attribute, AttributeValue};
use crate::domain::types::Upserted;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

/// 属性槽位作用域（商品级 / 变体级）
///
/// 槽位即属性与商品类型的关联记录，两种作用域分别存于
/// attribute_product / attribute_variant 两张关联表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotScope {
    Product,
    Variant,
}

impl SlotScope {
    fn table(&self) -> &'static str {
        match self {
            SlotScope::Product => "attribute_product",
            SlotScope::Variant => "attribute_variant",
        }
    }
}

// ==========================================
// AttributeRepository - 属性仓储
// ==========================================

/// 属性仓储
/// 职责: 管理 attribute / attribute_value 及两张槽位关联表
pub struct AttributeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AttributeRepository {
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

    /// 按自然键 (name, slug) 幂等 upsert 属性
    ///
    /// 说明: 已存在时不回写 value_required / is_variant_only ——
    /// 属性可能先以商品级身份创建，再被另一类型以变体级引用，
    /// 此时按自然键共享同一行，不重复建行
    pub fn get_or_create(
        &self,
        name: &str,
        slug: &str,
        value_required: bool,
        is_variant_only: bool,
    ) -> RepositoryResult<Upserted<Attribute>> {
        let conn = self.get_conn()?;

        let existing = conn
            .query_row(
                "SELECT id, name, slug, value_required, is_variant_only \
                 FROM attribute WHERE name = ?1 AND slug = ?2",
                params![name, slug],
                Self::map_attribute,
            )
            .optional()?;

        if let Some(attribute) = existing {
            return Ok(Upserted::existing(attribute));
        }

        conn.execute(
            "INSERT INTO attribute (name, slug, value_required, is_variant_only) \
             VALUES (?1, ?2, ?3, ?4)",
            params![name, slug, value_required as i64, is_variant_only as i64],
        )?;

        Ok(Upserted::created(Attribute {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            slug: slug.to_string(),
            value_required,
            is_variant_only,
        }))
    }

    /// 幂等 upsert 属性与商品类型之间的槽位关联
    ///
    /// # 返回
    /// - Ok(Upserted<i64>): 槽位 id 与"是否新建"标记
    pub fn ensure_slot(
        &self,
        scope: SlotScope,
        attribute_id: i64,
        product_type_id: i64,
    ) -> RepositoryResult<Upserted<i64>> {
        let conn = self.get_conn()?;
        let table = scope.table();

        let existing: Option<i64> = conn
            .query_row(
                &format!(
                    "SELECT id FROM {table} WHERE attribute_id = ?1 AND product_type_id = ?2"
                ),
                params![attribute_id, product_type_id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(slot_id) = existing {
            return Ok(Upserted::existing(slot_id));
        }

        conn.execute(
            &format!("INSERT INTO {table} (attribute_id, product_type_id) VALUES (?1, ?2)"),
            params![attribute_id, product_type_id],
        )?;

        Ok(Upserted::created(conn.last_insert_rowid()))
    }

    /// 查询属性在某商品类型下的槽位 id
    ///
    /// # 返回
    /// - Ok(Some(i64)): 槽位 id
    /// - Ok(None): 该属性未在此类型的对应作用域声明
    pub fn find_slot(
        &self,
        scope: SlotScope,
        attribute_id: i64,
        product_type_id: i64,
    ) -> RepositoryResult<Option<i64>> {
        let conn = self.get_conn()?;

        let slot_id = conn
            .query_row(
                &format!(
                    "SELECT id FROM {} WHERE attribute_id = ?1 AND product_type_id = ?2",
                    scope.table()
                ),
                params![attribute_id, product_type_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(slot_id)
    }

    /// 按声明顺序列出某商品类型的全部变体级槽位
    ///
    /// 顺序即创建顺序（id 升序），变体展示名的拼接依赖该顺序
    pub fn list_variant_slots(&self, product_type_id: i64) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT id FROM attribute_variant WHERE product_type_id = ?1 ORDER BY id",
        )?;

        let slots = stmt
            .query_map(params![product_type_id], |row| row.get(0))?
            .collect::<SqliteResult<Vec<i64>>>()?;

        Ok(slots)
    }

    /// 按自然键 (name, slug, attribute_id) 幂等 upsert 属性值
    ///
    /// 红线: sort_order 仅在新建时写入；匹配到已有行时不覆盖，
    /// 以保留导入后的人工调序
    pub fn get_or_create_value(
        &self,
        name: &str,
        slug: &str,
        attribute_id: i64,
        sort_order: i64,
    ) -> RepositoryResult<Upserted<AttributeValue>> {
        let conn = self.get_conn()?;

        let existing = conn
            .query_row(
                "SELECT id, name, slug, sort_order, attribute_id FROM attribute_value \
                 WHERE name = ?1 AND slug = ?2 AND attribute_id = ?3",
                params![name, slug, attribute_id],
                Self::map_value,
            )
            .optional()?;

        if let Some(value) = existing {
            return Ok(Upserted::existing(value));
        }

        conn.execute(
            "INSERT INTO attribute_value (name, slug, sort_order, attribute_id) \
             VALUES (?1, ?2, ?3, ?4)",
            params![name, slug, sort_order, attribute_id],
        )?;

        Ok(Upserted::created(AttributeValue {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            slug: slug.to_string(),
            sort_order,
            attribute_id,
        }))
    }

    /// 按 id 查询属性值
    pub fn find_value_by_id(&self, id: i64) -> RepositoryResult<Option<AttributeValue>> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT id, name, slug, sort_order, attribute_id FROM attribute_value \
                 WHERE id = ?1",
                params![id],
                Self::map_value,
            )
            .optional()?;

        Ok(value)
    }

    fn map_attribute(row: &rusqlite::Row<'_>) -> SqliteResult<Attribute> {
        Ok(Attribute {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            value_required: row.get::<_, i64>(3)? != 0,
            is_variant_only: row.get::<_, i64>(4)? != 0,
        })
    }

    fn map_value(row: &rusqlite::Row<'_>) -> SqliteResult<AttributeValue> {
        Ok(AttributeValue {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            sort_order: row.get(3)?,
            attribute_id: row.get(4)?,
        })
    }
}
