// ==========================================
// 商品目录迁移工具 - 配置层
// ==========================================
// 职责: 迁移运行参数与种子数据常量
// 来源: 环境变量覆写 + 内置默认值
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认源快照路径（与旧系统导出约定一致）
pub const DEFAULT_SOURCE_DB_PATH: &str = "stockmanagement/stockmanagement.db";

/// 默认目标库路径
pub const DEFAULT_TARGET_DB_PATH: &str = "catalog.db";

/// 迁移运行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImporterConfig {
    /// 源快照（只读 SQLite）路径
    pub source_db_path: String,

    /// 目标目录库路径
    pub target_db_path: String,

    /// 本国国家代码（本国运费区的唯一国家）
    pub home_country: String,

    /// 种子数据常量
    pub seed: SeedConfig,
}

/// 运费区 / 仓库种子数据常量
///
/// 这些值只在首次运行时创建实体，之后按自然键幂等匹配
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// 本国运费区名称
    pub home_zone_name: String,

    /// 其余国家运费区名称
    pub world_zone_name: String,

    /// 仓库名称（slug 由名称派生）
    pub warehouse_name: String,

    /// 仓库联系邮箱
    pub warehouse_email: String,

    // ===== 仓库地址 =====
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub company_name: String,
    pub street_address: String,
    pub city: String,
    pub postal_code: String,
    pub phone: String,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            source_db_path: DEFAULT_SOURCE_DB_PATH.to_string(),
            target_db_path: DEFAULT_TARGET_DB_PATH.to_string(),
            home_country: "AT".to_string(),
            seed: SeedConfig::default(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            home_zone_name: "Austria".to_string(),
            world_zone_name: "World".to_string(),
            // 注意: 源系统的历史拼写，店面端依赖该名称，不要修正
            warehouse_name: "Headquater Graz".to_string(),
            warehouse_email: "warehouse@howlingwolfpedals.at".to_string(),
            contact_first_name: "Warehouse".to_string(),
            contact_last_name: "Team".to_string(),
            company_name: "Howling Wolf Pedals".to_string(),
            street_address: "Körösistraße 56".to_string(),
            city: "Graz".to_string(),
            postal_code: "8010".to_string(),
            phone: "+43 316 000000".to_string(),
        }
    }
}

impl ImporterConfig {
    /// 从环境变量加载配置（未设置的项使用默认值）
    ///
    /// # 环境变量
    /// - CATALOG_SOURCE_DB: 源快照路径
    /// - CATALOG_TARGET_DB: 目标库路径
    /// - CATALOG_HOME_COUNTRY: 本国国家代码
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("CATALOG_SOURCE_DB") {
            config.source_db_path = path;
        }
        if let Ok(path) = std::env::var("CATALOG_TARGET_DB") {
            config.target_db_path = path;
        }
        if let Ok(country) = std::env::var("CATALOG_HOME_COUNTRY") {
            config.home_country = country;
        }
        config
    }

    /// 构造指定路径的配置（测试与库调用入口）
    pub fn with_paths(source_db_path: &str, target_db_path: &str) -> Self {
        Self {
            source_db_path: source_db_path.to_string(),
            target_db_path: target_db_path.to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ImporterConfig::default();
        assert_eq!(config.home_country, "AT");
        assert_eq!(config.seed.home_zone_name, "Austria");
        assert_eq!(config.seed.warehouse_name, "Headquater Graz");
    }

    #[test]
    fn test_with_paths() {
        let config = ImporterConfig::with_paths("/tmp/src.db", "/tmp/dst.db");
        assert_eq!(config.source_db_path, "/tmp/src.db");
        assert_eq!(config.target_db_path, "/tmp/dst.db");
    }
}
