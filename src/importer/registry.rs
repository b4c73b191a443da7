// ==========================================
// 商品目录迁移工具 - 标识翻译登记表
// ==========================================
// 职责: (实体种类, 源代理 id) -> 目标实体 id 的进程内索引
// 生命周期: 单次运行内有效，每次运行从零重建（无持久化副本，
//           崩溃后重跑依赖目标库自然键的幂等 upsert 重新推导）
// 红线: resolve 未命中是编排缺陷或源数据悬挂引用，一律致命
// ==========================================

use crate::domain::types::EntityKind;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::{HashMap, HashSet};

// ==========================================
// TranslationRegistry - 标识翻译登记表
// ==========================================
#[derive(Debug, Default)]
pub struct TranslationRegistry {
    entries: HashMap<(EntityKind, i64), i64>,
    populated: HashSet<EntityKind>,
}

impl TranslationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一条源 id -> 目标 id 的翻译
    ///
    /// 相同映射重复登记为幂等空操作（同一属性可被多个类型引用）；
    /// 同一源 id 指向不同目标是契约违规，致命
    pub fn record(
        &mut self,
        kind: EntityKind,
        source_id: i64,
        target_id: i64,
    ) -> ImportResult<()> {
        if let Some(&existing) = self.entries.get(&(kind, source_id)) {
            if existing != target_id {
                return Err(ImportError::ConflictingTranslation {
                    kind,
                    source_id,
                    existing,
                    new: target_id,
                });
            }
            return Ok(());
        }

        self.entries.insert((kind, source_id), target_id);
        Ok(())
    }

    /// 解析源 id 对应的目标 id
    pub fn resolve(&self, kind: EntityKind, source_id: i64) -> ImportResult<i64> {
        self.entries
            .get(&(kind, source_id))
            .copied()
            .ok_or(ImportError::MissingTranslation { kind, source_id })
    }

    /// 标记某实体种类的登记表已由对应阶段填充完毕
    ///
    /// 空源表也会标记 —— "已填充"指阶段跑过，而非存在条目
    pub fn mark_populated(&mut self, kind: EntityKind) {
        self.populated.insert(kind);
    }

    /// 判断某实体种类的登记表是否已填充（驱动器前置检查用）
    pub fn is_populated(&self, kind: EntityKind) -> bool {
        self.populated.contains(&kind)
    }

    /// 某实体种类已登记的条目数
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entries.keys().filter(|(k, _)| *k == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_resolve() {
        let mut registry = TranslationRegistry::new();
        registry.record(EntityKind::Attribute, 10, 1).unwrap();

        assert_eq!(registry.resolve(EntityKind::Attribute, 10).unwrap(), 1);
        assert_eq!(registry.count(EntityKind::Attribute), 1);
    }

    #[test]
    fn test_resolve_missing_is_error() {
        let registry = TranslationRegistry::new();

        let err = registry.resolve(EntityKind::Product, 99).unwrap_err();
        assert!(matches!(
            err,
            ImportError::MissingTranslation {
                kind: EntityKind::Product,
                source_id: 99
            }
        ));
    }

    #[test]
    fn test_identical_rerecord_is_noop() {
        let mut registry = TranslationRegistry::new();
        registry.record(EntityKind::Attribute, 10, 1).unwrap();
        // 同一属性在商品级与变体级两次登记
        registry.record(EntityKind::Attribute, 10, 1).unwrap();

        assert_eq!(registry.count(EntityKind::Attribute), 1);
    }

    #[test]
    fn test_conflicting_rerecord_is_fatal() {
        let mut registry = TranslationRegistry::new();
        registry.record(EntityKind::Attribute, 10, 1).unwrap();

        let err = registry.record(EntityKind::Attribute, 10, 2).unwrap_err();
        assert!(matches!(err, ImportError::ConflictingTranslation { .. }));
    }

    #[test]
    fn test_kinds_are_separate_namespaces() {
        let mut registry = TranslationRegistry::new();
        registry.record(EntityKind::Attribute, 7, 1).unwrap();
        registry.record(EntityKind::AttributeValue, 7, 2).unwrap();

        assert_eq!(registry.resolve(EntityKind::Attribute, 7).unwrap(), 1);
        assert_eq!(registry.resolve(EntityKind::AttributeValue, 7).unwrap(), 2);
    }

    #[test]
    fn test_populated_bookkeeping() {
        let mut registry = TranslationRegistry::new();
        assert!(!registry.is_populated(EntityKind::ProductType));

        registry.mark_populated(EntityKind::ProductType);
        assert!(registry.is_populated(EntityKind::ProductType));
    }
}
