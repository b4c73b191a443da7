// ==========================================
// 商品目录迁移工具 - 主入口
// ==========================================
// 调用面: 无参数一次性批处理；成功 = 跑完无错误退出 0，
//         失败 = 错误向上传播退出非 0（宿主进程惯例）
// ==========================================

use catalog_importer::importer::CatalogImporter;
use catalog_importer::{config::ImporterConfig, db, logging};
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    info!("==================================================");
    info!("{}", catalog_importer::APP_NAME);
    info!("系统版本: {}", catalog_importer::VERSION);
    info!("==================================================");

    // 加载配置
    let config = ImporterConfig::from_env();

    // 打开目标库并引导 schema（幂等）
    let target_conn = db::open_target_connection(&config.target_db_path)?;
    db::init_target_schema(&target_conn)?;

    // 执行迁移
    let importer = CatalogImporter::new(config, target_conn)?;
    let summary = importer.run()?;

    for (stage, count) in &summary.stage_counts {
        info!("  {} -> {} 条", stage, count);
    }
    info!("运行 {} 结束", summary.run_id);

    Ok(())
}
