// ==========================================
// 商品目录迁移工具 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 一次性批处理迁移管道 (可安全重复执行)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 目标库数据访问
pub mod repository;

// 导入层 - 迁移管道
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/目标库建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EntityKind, Upserted};

// 领域实体
pub use domain::{
    Address, Attribute, AttributeValue, CategoryRow, Product, ProductType, ProductVariant,
    ShippingZone, Stock, Warehouse,
};

// 仓储层
pub use repository::{Repositories, RepositoryError, RepositoryResult};

// 导入层
pub use importer::{
    CatalogImporter, ImportError, ImportResult, RunSummary, TranslationRegistry,
};

// 配置
pub use config::{ImporterConfig, SeedConfig};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "商品目录迁移工具";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
