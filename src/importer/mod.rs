// ==========================================
// 商品目录迁移工具 - 导入层（迁移管道）
// ==========================================
// 职责: 按依赖序编排各迁移阶段
// 顺序: 类型/属性 → 属性值 → 分类 → 商品 → 种子数据 → 变体/库存
// 约束: 每个阶段显式声明其读取与填充的登记表，
//       驱动器在运行前校验依赖，顺序错误立即失败
// 约束: 每个阶段包裹在一个目标库事务中（最小可接受粒度），
//       阶段失败回滚本阶段；跨阶段恢复依赖幂等重跑
// ==========================================

// 模块声明
pub mod attribute_values;
pub mod categories;
pub mod error;
pub mod product_types;
pub mod products;
pub mod registry;
pub mod seed;
pub mod slug;
pub mod snapshot;
pub mod variants;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use registry::TranslationRegistry;
pub use snapshot::SnapshotReader;

use crate::config::ImporterConfig;
use crate::domain::types::EntityKind;
use crate::repository::Repositories;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

// ==========================================
// Stage - 阶段描述符
// ==========================================
// reads/populates 声明该阶段消费与产出的翻译登记表，
// 驱动器据此做前置校验
pub(crate) struct Stage {
    pub name: &'static str,
    pub reads: &'static [EntityKind],
    pub populates: &'static [EntityKind],
    pub run: fn(&mut ImportContext) -> ImportResult<usize>,
}

/// 依赖序阶段表（唯一合法顺序）
const STAGES: &[&Stage] = &[
    &product_types::STAGE,
    &attribute_values::STAGE,
    &categories::STAGE,
    &products::STAGE,
    &seed::STAGE,
    &variants::STAGE,
];

// ==========================================
// ImportContext - 阶段共享上下文
// ==========================================
pub struct ImportContext {
    pub snapshot: SnapshotReader,
    pub repos: Repositories,
    pub registry: TranslationRegistry,
    pub config: ImporterConfig,
    /// 种子数据阶段产出的仓库 id，变体阶段的库存写入依赖它
    pub warehouse_id: Option<i64>,
}

// ==========================================
// RunSummary - 单次运行摘要
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    /// 各阶段处理的记录数（阶段名, 数量）
    pub stage_counts: Vec<(String, usize)>,
}

// ==========================================
// CatalogImporter - 迁移管道驱动器
// ==========================================
pub struct CatalogImporter {
    ctx: ImportContext,
}

impl CatalogImporter {
    /// 构建迁移管道
    ///
    /// 源快照在此处打开（缺失即致命），目标连接由调用方提供
    /// （main 入口负责 PRAGMA 配置与 schema 引导）
    pub fn new(config: ImporterConfig, target_conn: Connection) -> ImportResult<Self> {
        let snapshot = SnapshotReader::open(&config.source_db_path)?;
        let repos = Repositories::new(Arc::new(Mutex::new(target_conn)));

        Ok(Self {
            ctx: ImportContext {
                snapshot,
                repos,
                registry: TranslationRegistry::new(),
                config,
                warehouse_id: None,
            },
        })
    }

    /// 执行完整迁移
    ///
    /// 成功 = 跑完全部阶段无错误；任何错误立即中止（无逐条跳过），
    /// 已提交阶段的写入保留，重跑安全
    pub fn run(mut self) -> ImportResult<RunSummary> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let start = Instant::now();

        info!("==================================================");
        info!("[+] 开始目录迁移 run_id={}", run_id);
        info!("源快照: {}", self.ctx.config.source_db_path);
        info!("目标库: {}", self.ctx.config.target_db_path);
        info!("==================================================");

        let mut stage_counts = Vec::with_capacity(STAGES.len());

        for stage in STAGES {
            // 前置校验: 声明的依赖登记表必须已填充
            for kind in stage.reads {
                if !self.ctx.registry.is_populated(*kind) {
                    return Err(ImportError::OrderingViolation {
                        stage: stage.name.to_string(),
                        kind: *kind,
                    });
                }
            }

            info!("阶段 [{}] 开始", stage.name);
            let count = self.run_stage_in_transaction(stage)?;

            for kind in stage.populates {
                self.ctx.registry.mark_populated(*kind);
            }

            info!("阶段 [{}] 完成, 处理 {} 条", stage.name, count);
            stage_counts.push((stage.name.to_string(), count));
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!("[+] 目录迁移完成, 耗时 {} ms", elapsed_ms);

        Ok(RunSummary {
            run_id,
            started_at,
            elapsed_ms,
            stage_counts,
        })
    }

    /// 在单个目标库事务中执行阶段
    ///
    /// 失败回滚本阶段的全部写入后向上传播错误
    fn run_stage_in_transaction(&mut self, stage: &Stage) -> ImportResult<usize> {
        self.exec_tx_control("BEGIN IMMEDIATE")?;

        match (stage.run)(&mut self.ctx) {
            Ok(count) => {
                self.exec_tx_control("COMMIT")?;
                Ok(count)
            }
            Err(e) => {
                error!("阶段 [{}] 失败: {}", stage.name, e);
                if let Err(rollback_err) = self.exec_tx_control("ROLLBACK") {
                    error!("阶段 [{}] 回滚失败: {}", stage.name, rollback_err);
                }
                Err(e)
            }
        }
    }

    /// 在目标库连接上执行事务控制语句
    fn exec_tx_control(&self, sql: &str) -> ImportResult<()> {
        let conn = self.ctx.repos.lock_conn()?;
        conn.execute_batch(sql).map_err(|e| {
            ImportError::Repository(crate::repository::RepositoryError::DatabaseTransactionError(
                e.to_string(),
            ))
        })
    }
}
