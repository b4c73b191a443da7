// ==========================================
// 商品目录迁移工具 - 目录领域模型
// ==========================================
// 对齐: 目标库 schema（db.rs init_target_schema）
// 约束: 各实体的自然键见各结构体注释，幂等 upsert 以自然键匹配
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ProductType - 商品类型
// ==========================================
// 自然键: (name, slug)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductType {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub has_variants: bool,
}

// ==========================================
// Attribute - 属性
// ==========================================
// 自然键: (name, slug) —— 与商品类型无关，同一属性可被多个类型共享
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub value_required: bool,
    pub is_variant_only: bool,
}

// ==========================================
// AttributeValue - 属性可选值
// ==========================================
// 自然键: (name, slug, attribute_id)
// 红线: sort_order 仅在创建时写入，重复导入不得覆盖（保留人工调序）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub sort_order: i64,
    pub attribute_id: i64,
}

// ==========================================
// CategoryRow - 分类行（树坐标来自源库）
// ==========================================
// 红线: lft/rght/tree_id/level 原样写入，本管道不做树维护
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRow {
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

// ==========================================
// Product - 商品
// ==========================================
// 自然键: (product_type_id, name, category_id, price_amount, currency)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub product_type_id: i64,
    pub name: String,
    pub slug: String,
    pub category_id: i64,
    pub price_amount: f64,
    pub currency: String,
    pub is_published: bool,
}

/// 商品 upsert 入参（id 由目标库生成）
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub product_type_id: i64,
    pub name: String,
    pub slug: String,
    pub category_id: i64,
    pub price_amount: f64,
    pub currency: String,
}

// ==========================================
// ProductVariant - 商品变体
// ==========================================
// 自然键: (sku, price_override_amount, currency, product_id)
// 说明: name 为派生展示名，由变体属性值按槽位顺序拼接而来
// 说明: metadata 整体写入（不与既有内容合并）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub price_override_amount: Option<f64>,
    pub currency: Option<String>,
    pub product_id: i64,
    pub metadata: serde_json::Value,
}

/// 变体 upsert 入参
#[derive(Debug, Clone)]
pub struct NewVariant {
    pub sku: String,
    pub price_override_amount: Option<f64>,
    pub currency: Option<String>,
    pub product_id: i64,
}
