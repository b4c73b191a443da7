// ==========================================
// 商品目录迁移工具 - 导入层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 策略: 无逐条隔离 —— 任何错误中止整次运行，
//       依赖幂等重跑而非回滚恢复
// ==========================================

use crate::domain::types::EntityKind;
use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入层错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 源快照错误 =====
    #[error("源快照不存在: {0}")]
    SnapshotNotFound(String),

    #[error("源快照打开失败: {path}: {message}")]
    SnapshotOpenError { path: String, message: String },

    #[error("源快照查询失败: {0}")]
    SnapshotQueryError(String),

    // ===== 标识翻译错误 =====
    #[error("标识翻译缺失: kind={kind}, source_id={source_id} —— 源数据悬挂引用或阶段顺序错误")]
    MissingTranslation { kind: EntityKind, source_id: i64 },

    #[error("标识翻译冲突: kind={kind}, source_id={source_id} 已登记为 {existing}，新值 {new}")]
    ConflictingTranslation {
        kind: EntityKind,
        source_id: i64,
        existing: i64,
        new: i64,
    },

    // ===== 阶段编排错误 =====
    #[error("阶段顺序违规: 阶段 {stage} 依赖的 {kind} 登记表尚未填充")]
    OrderingViolation { stage: String, kind: EntityKind },

    #[error("阶段顺序违规: 阶段 {0} 依赖的仓库种子数据尚未初始化")]
    WarehouseNotSeeded(String),

    // ===== 数据一致性错误 =====
    #[error(
        "属性架构不一致: 属性 {attribute_id} 未在商品类型 {product_type_id} 的{scope}槽位中声明"
    )]
    SchemaConsistency {
        attribute_id: i64,
        product_type_id: i64,
        scope: &'static str,
    },

    #[error("属性负载解析失败: {entity} id={id}: {message}")]
    MalformedPayload {
        entity: &'static str,
        id: i64,
        message: String,
    },

    #[error("商品 {product_id} 关联的分类 {category_id} 在目标库中不存在")]
    CategoryNotFound { product_id: i64, category_id: i64 },

    #[error("商品 {0} 没有任何分类关联")]
    MissingCategoryLink(i64),

    // ===== 仓储层透传 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<rusqlite::Error>
// 导入层直接触碰 SQLite 的只有源快照读取，目标库错误均经仓储层包装
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::SnapshotQueryError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
