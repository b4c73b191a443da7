// ==========================================
// 商品目录迁移工具 - 源快照读取器
// ==========================================
// 职责: 旧系统 SQLite 快照的只读访问
// 约束: 连接以 READ_ONLY 打开，绝不改写快照
// 约束: 全部查询参数化；批量按 id 取数通过生成
//       "?" 占位符的 IN 子句实现，不拼接字面值
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Result as SqliteResult};
use std::path::Path;

// ==========================================
// 源记录类型（字段与旧库列一一对应）
// ==========================================

/// 源商品类型行（products_productclass）
#[derive(Debug, Clone)]
pub struct SrcProductType {
    pub id: i64,
    pub name: String,
    pub has_variants: bool,
}

/// 源属性行（products_productattribute）
///
/// value_optional 为旧库的反义标志位，目标端的 value_required
/// 必须取反 —— 取反规则见 product_types 阶段的显式转换函数
#[derive(Debug, Clone)]
pub struct SrcAttribute {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub value_optional: bool,
}

/// 源属性可选值行（products_attributechoicevalue）
#[derive(Debug, Clone)]
pub struct SrcAttributeValue {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub attribute_id: i64,
    pub position: i64,
}

/// 源分类行（products_category）
///
/// hidden 标志在迁移中丢弃（目标模型无对应字段）
#[derive(Debug, Clone)]
pub struct SrcCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub lft: i64,
    pub rght: i64,
    pub tree_id: i64,
    pub level: i64,
    pub parent_id: Option<i64>,
}

/// 源商品行（products_product）
///
/// attributes_json: {源属性 id -> 源属性值 id} 的 JSON 映射
#[derive(Debug, Clone)]
pub struct SrcProduct {
    pub id: i64,
    pub name: String,
    pub product_class_id: i64,
    pub price: f64,
    pub price_currency: String,
    pub attributes_json: String,
}

/// 源变体行（products_productvariant）
///
/// attributes_json: {源属性 id -> 原始字符串值} 的 JSON 映射，
/// 与商品不同，变体属性值不预先声明可选值行
#[derive(Debug, Clone)]
pub struct SrcVariant {
    pub id: i64,
    pub sku: String,
    pub price_override: Option<f64>,
    pub price_override_currency: Option<String>,
    pub product_id: i64,
    pub attributes_json: String,
}

// ==========================================
// SnapshotReader - 源快照读取器
// ==========================================
pub struct SnapshotReader {
    conn: Connection,
}

impl SnapshotReader {
    /// 以只读方式打开源快照
    ///
    /// 快照缺失或不可读在启动时即致命
    pub fn open(db_path: &str) -> ImportResult<Self> {
        if !Path::new(db_path).exists() {
            return Err(ImportError::SnapshotNotFound(db_path.to_string()));
        }

        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| ImportError::SnapshotOpenError {
            path: db_path.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { conn })
    }

    /// 读取全部商品类型（按 id 升序）
    pub fn product_types(&self) -> ImportResult<Vec<SrcProductType>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, has_variants FROM products_productclass ORDER BY id")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SrcProductType {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    has_variants: row.get::<_, i64>(2)? != 0,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 读取某商品类型声明的商品级属性 id 列表
    pub fn product_attribute_ids(&self, product_class_id: i64) -> ImportResult<Vec<i64>> {
        self.linked_attribute_ids(
            "SELECT productattribute_id FROM products_productclass_product_attributes \
             WHERE productclass_id = ?1 ORDER BY productattribute_id",
            product_class_id,
        )
    }

    /// 读取某商品类型声明的变体级属性 id 列表
    pub fn variant_attribute_ids(&self, product_class_id: i64) -> ImportResult<Vec<i64>> {
        self.linked_attribute_ids(
            "SELECT productattribute_id FROM products_productclass_variant_attributes \
             WHERE productclass_id = ?1 ORDER BY productattribute_id",
            product_class_id,
        )
    }

    fn linked_attribute_ids(&self, sql: &str, product_class_id: i64) -> ImportResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(sql)?;

        let ids = stmt
            .query_map(params![product_class_id], |row| row.get(0))?
            .collect::<SqliteResult<Vec<i64>>>()?;

        Ok(ids)
    }

    /// 批量按 id 集合读取属性行
    ///
    /// IN 子句由重复的 "?" 占位符生成，id 作为绑定参数传入，
    /// 集合大小不影响安全性
    pub fn attributes_by_ids(&self, ids: &[i64]) -> ImportResult<Vec<SrcAttribute>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!(
            "SELECT id, name, slug, value_optional FROM products_productattribute \
             WHERE id IN ({placeholders}) ORDER BY id"
        );

        let mut stmt = self.conn.prepare(&sql)?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(ids.iter()), |row| {
                Ok(SrcAttribute {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    slug: row.get(2)?,
                    value_optional: row.get::<_, i64>(3)? != 0,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 读取全部属性可选值（按 id 升序）
    pub fn attribute_values(&self) -> ImportResult<Vec<SrcAttributeValue>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, slug, attribute_id, position \
             FROM products_attributechoicevalue ORDER BY id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SrcAttributeValue {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    slug: row.get(2)?,
                    attribute_id: row.get(3)?,
                    position: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 读取全部分类行（树坐标原样返回，hidden 在此处丢弃）
    pub fn categories(&self) -> ImportResult<Vec<SrcCategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, slug, description, lft, rght, tree_id, level, parent_id \
             FROM products_category ORDER BY tree_id, lft",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SrcCategory {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    slug: row.get(2)?,
                    description: row.get(3)?,
                    lft: row.get(4)?,
                    rght: row.get(5)?,
                    tree_id: row.get(6)?,
                    level: row.get(7)?,
                    parent_id: row.get(8)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 读取全部商品（按 id 升序）
    pub fn products(&self) -> ImportResult<Vec<SrcProduct>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, product_class_id, price, price_currency, attributes \
             FROM products_product ORDER BY id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SrcProduct {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    product_class_id: row.get(2)?,
                    price: row.get(3)?,
                    price_currency: row.get(4)?,
                    attributes_json: row.get(5)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 读取某商品的分类关联 id 列表（按 category_id 升序）
    ///
    /// 源模型是多对多关联；商品导入阶段取首条（见该阶段注释）
    pub fn product_category_ids(&self, product_id: i64) -> ImportResult<Vec<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT category_id FROM products_product_categories \
             WHERE product_id = ?1 ORDER BY category_id",
        )?;

        let ids = stmt
            .query_map(params![product_id], |row| row.get(0))?
            .collect::<SqliteResult<Vec<i64>>>()?;

        Ok(ids)
    }

    /// 读取全部变体（按 id 升序）
    pub fn variants(&self) -> ImportResult<Vec<SrcVariant>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, sku, price_override, price_override_currency, product_id, attributes \
             FROM products_productvariant ORDER BY id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SrcVariant {
                    id: row.get(0)?,
                    sku: row.get(1)?,
                    price_override: row.get(2)?,
                    price_override_currency: row.get(3)?,
                    product_id: row.get(4)?,
                    attributes_json: row.get(5)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// 读取某变体的库存数量（无记录时返回 None）
    pub fn stock_quantity(&self, variant_id: i64) -> ImportResult<Option<i64>> {
        let quantity = self
            .conn
            .query_row(
                "SELECT quantity FROM products_stock WHERE variant_id = ?1",
                params![variant_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(quantity)
    }

    /// 读取某变体的外部测试结果负载（零或一条）
    ///
    /// 返回原始 JSON 文本，解析与包装由变体导入阶段负责
    pub fn test_result_payload(&self, variant_id: i64) -> ImportResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT data FROM products_dca75result WHERE variant_id = ?1",
                params![variant_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(payload)
    }
}
