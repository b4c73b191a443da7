// ==========================================
// 商品目录迁移工具 - 仓库/运费区/库存仓储
// ==========================================
// 红线: Repository 不含迁移流程逻辑
// 用途: 种子数据初始化与库存导入
// ==========================================

use crate::domain::types::Upserted;
use crate::domain::warehouse::{Address, ShippingZone, Stock, Warehouse};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// countries 字段的存储分隔符（逗号分隔国家代码）
const COUNTRY_SEPARATOR: &str = ",";

// ==========================================
// WarehouseRepository - 仓库仓储
// ==========================================

/// 仓库仓储
/// 职责: 管理 warehouse / shipping_zone / address / stock 表
pub struct WarehouseRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WarehouseRepository {
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

    /// 按自然键 name 幂等 upsert 运费区
    pub fn get_or_create_zone(
        &self,
        name: &str,
        countries: &[&str],
        is_default: bool,
    ) -> RepositoryResult<Upserted<ShippingZone>> {
        let conn = self.get_conn()?;

        let existing = conn
            .query_row(
                "SELECT id, name, countries, is_default FROM shipping_zone WHERE name = ?1",
                params![name],
                |row| {
                    Ok(ShippingZone {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        countries: split_countries(&row.get::<_, String>(2)?),
                        is_default: row.get::<_, i64>(3)? != 0,
                    })
                },
            )
            .optional()?;

        if let Some(zone) = existing {
            return Ok(Upserted::existing(zone));
        }

        let joined = countries.join(COUNTRY_SEPARATOR);
        conn.execute(
            "INSERT INTO shipping_zone (name, countries, is_default) VALUES (?1, ?2, ?3)",
            params![name, joined, is_default as i64],
        )?;

        Ok(Upserted::created(ShippingZone {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            countries: countries.iter().map(|c| c.to_string()).collect(),
            is_default,
        }))
    }

    /// 按全部字段幂等 upsert 地址，返回地址 id
    pub fn get_or_create_address(&self, address: &Address) -> RepositoryResult<Upserted<i64>> {
        let conn = self.get_conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM address \
                 WHERE first_name = ?1 AND last_name = ?2 AND company_name = ?3 \
                   AND street_address = ?4 AND city = ?5 AND postal_code = ?6 \
                   AND country = ?7 AND phone = ?8",
                params![
                    address.first_name,
                    address.last_name,
                    address.company_name,
                    address.street_address,
                    address.city,
                    address.postal_code,
                    address.country,
                    address.phone,
                ],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(Upserted::existing(id));
        }

        conn.execute(
            "INSERT INTO address \
             (first_name, last_name, company_name, street_address, city, postal_code, country, phone) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                address.first_name,
                address.last_name,
                address.company_name,
                address.street_address,
                address.city,
                address.postal_code,
                address.country,
                address.phone,
            ],
        )?;

        Ok(Upserted::created(conn.last_insert_rowid()))
    }

    /// 按自然键 (name, slug) 幂等 upsert 仓库
    pub fn get_or_create_warehouse(
        &self,
        name: &str,
        slug: &str,
        address_id: i64,
        email: &str,
    ) -> RepositoryResult<Upserted<Warehouse>> {
        let conn = self.get_conn()?;

        let existing = conn
            .query_row(
                "SELECT id, name, slug, address_id, email FROM warehouse \
                 WHERE name = ?1 AND slug = ?2",
                params![name, slug],
                |row| {
                    Ok(Warehouse {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        slug: row.get(2)?,
                        address_id: row.get(3)?,
                        email: row.get(4)?,
                    })
                },
            )
            .optional()?;

        if let Some(warehouse) = existing {
            return Ok(Upserted::existing(warehouse));
        }

        conn.execute(
            "INSERT INTO warehouse (name, slug, address_id, email) VALUES (?1, ?2, ?3, ?4)",
            params![name, slug, address_id, email],
        )?;

        Ok(Upserted::created(Warehouse {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            slug: slug.to_string(),
            address_id,
            email: email.to_string(),
        }))
    }

    /// 幂等关联仓库与运费区
    pub fn link_zone(&self, warehouse_id: i64, zone_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "INSERT INTO warehouse_shipping_zone (warehouse_id, shipping_zone_id) \
             VALUES (?1, ?2) ON CONFLICT DO NOTHING",
            params![warehouse_id, zone_id],
        )?;

        Ok(())
    }

    /// 按自然键 (warehouse_id, variant_id) 幂等 upsert 库存
    ///
    /// 红线: quantity 覆盖写入源库当前值，不做累加
    pub fn upsert_stock(
        &self,
        warehouse_id: i64,
        variant_id: i64,
        quantity: i64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "INSERT INTO stock (warehouse_id, variant_id, quantity) VALUES (?1, ?2, ?3) \
             ON CONFLICT (warehouse_id, variant_id) DO UPDATE SET quantity = excluded.quantity",
            params![warehouse_id, variant_id, quantity],
        )?;

        Ok(())
    }

    /// 按自然键查询库存记录
    pub fn find_stock(
        &self,
        warehouse_id: i64,
        variant_id: i64,
    ) -> RepositoryResult<Option<Stock>> {
        let conn = self.get_conn()?;

        let stock = conn
            .query_row(
                "SELECT id, warehouse_id, variant_id, quantity FROM stock \
                 WHERE warehouse_id = ?1 AND variant_id = ?2",
                params![warehouse_id, variant_id],
                |row| {
                    Ok(Stock {
                        id: row.get(0)?,
                        warehouse_id: row.get(1)?,
                        variant_id: row.get(2)?,
                        quantity: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(stock)
    }
}

/// 拆分 countries 存储串为国家代码列表
fn split_countries(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(COUNTRY_SEPARATOR).map(|c| c.to_string()).collect()
}
