// ==========================================
// 商品目录迁移工具 - 领域通用类型
// ==========================================
// 职责: 标识翻译的实体种类、幂等 upsert 的结果包装
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// EntityKind - 标识翻译的实体种类
// ==========================================
// 用途: 标识翻译登记表的命名空间
// 约束: 分类不走翻译登记（源/目标共享分类 id）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    ProductType,
    Attribute,
    AttributeValue,
    Product,
    Variant,
}

impl EntityKind {
    /// 日志与错误信息用的稳定名称
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::ProductType => "product_type",
            EntityKind::Attribute => "attribute",
            EntityKind::AttributeValue => "attribute_value",
            EntityKind::Product => "product",
            EntityKind::Variant => "variant",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// Upserted - 幂等 upsert 结果
// ==========================================
// 用途: get_or_create 类操作统一返回实体与"是否新建"标记
// 约束: "仅在创建时赋值"类规则（如 sort_order）依赖 created 标记
#[derive(Debug, Clone)]
pub struct Upserted<T> {
    pub entity: T,
    pub created: bool,
}

impl<T> Upserted<T> {
    pub fn created(entity: T) -> Self {
        Self {
            entity,
            created: true,
        }
    }

    pub fn existing(entity: T) -> Self {
        Self {
            entity,
            created: false,
        }
    }
}
