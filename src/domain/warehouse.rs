// ==========================================
// 商品目录迁移工具 - 仓储/物流领域模型
// ==========================================
// 用途: 种子数据初始化与库存导入
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Address - 仓库地址（固定种子数据）
// ==========================================
// 自然键: 全部字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub street_address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

// ==========================================
// ShippingZone - 运费区
// ==========================================
// 自然键: name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingZone {
    pub id: i64,
    pub name: String,
    pub countries: Vec<String>,
    pub is_default: bool,
}

// ==========================================
// Warehouse - 仓库
// ==========================================
// 自然键: (name, slug)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub address_id: i64,
    pub email: String,
}

// ==========================================
// Stock - 库存记录
// ==========================================
// 自然键: (warehouse_id, variant_id)
// 红线: quantity 为覆盖写入（取源库当前值），不做累加
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub id: i64,
    pub warehouse_id: i64,
    pub variant_id: i64,
    pub quantity: i64,
}
