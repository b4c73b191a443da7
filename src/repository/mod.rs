// ==========================================
// 商品目录迁移工具 - 数据仓储层
// ==========================================
// 职责: 目标目录库的数据访问接口,屏蔽数据库细节
// 红线: Repository 不含迁移流程逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 所有写入为自然键幂等 upsert（分类的底层直插除外）
// ==========================================

pub mod attribute_repo;
pub mod category_repo;
pub mod error;
pub mod product_repo;
pub mod product_type_repo;
pub mod variant_repo;
pub mod warehouse_repo;

// 重导出核心仓储
pub use attribute_repo::{AttributeRepository, SlotScope};
pub use category_repo::CategoryRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use product_repo::ProductRepository;
pub use product_type_repo::ProductTypeRepository;
pub use variant_repo::VariantRepository;
pub use warehouse_repo::WarehouseRepository;

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// Repositories - 目标库仓储集合
// ==========================================
// 说明: 所有仓储共享同一个连接，迁移驱动器以该连接
//       为单位做分阶段事务（BEGIN IMMEDIATE / COMMIT）
pub struct Repositories {
    conn: Arc<Mutex<Connection>>,
    pub product_types: ProductTypeRepository,
    pub attributes: AttributeRepository,
    pub categories: CategoryRepository,
    pub products: ProductRepository,
    pub variants: VariantRepository,
    pub warehouses: WarehouseRepository,
}

impl Repositories {
    /// 基于共享连接构建全部仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            product_types: ProductTypeRepository::from_connection(Arc::clone(&conn)),
            attributes: AttributeRepository::from_connection(Arc::clone(&conn)),
            categories: CategoryRepository::from_connection(Arc::clone(&conn)),
            products: ProductRepository::from_connection(Arc::clone(&conn)),
            variants: VariantRepository::from_connection(Arc::clone(&conn)),
            warehouses: WarehouseRepository::from_connection(Arc::clone(&conn)),
            conn,
        }
    }

    /// 获取共享连接（事务控制用）
    pub fn lock_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}
