// ==========================================
// 商品目录迁移工具 - 领域模型层
// ==========================================
// 职责: 定义目录领域实体与通用类型
// 红线: 不含数据访问逻辑,不含迁移流程逻辑
// ==========================================

pub mod catalog;
pub mod types;
pub mod warehouse;

// 重导出核心类型
pub use catalog::{
    Attribute, AttributeValue, CategoryRow, NewProduct, NewVariant, Product, ProductType,
    ProductVariant,
};
pub use types::{EntityKind, Upserted};
pub use warehouse::{Address, ShippingZone, Stock, Warehouse};
