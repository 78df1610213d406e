//! iam-rbac 启动入口
//!
//! 加载配置、应用数据库迁移并检查存储是否可用

use std::error::Error;

use iam_rbac::AccessContext;
use iam_rbac::infrastructure::persistence::migrations;
use rbac_bootstrap::{Infrastructure, RuntimeConfig, start};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let runtime = RuntimeConfig {
        config_dir: std::env::var("RBAC_CONFIG_DIR").unwrap_or_else(|_| "config".to_string()),
        install_metrics: false,
    };
    let (config, _metrics) = start(&runtime)?;

    let infra = Infrastructure::from_config(config).await?;
    let result = infra.migrate(&migrations()).await?;
    info!(
        applied = ?result.applied,
        skipped = result.skipped.len(),
        "Schema up to date"
    );

    let context = AccessContext::from_infrastructure(&infra);
    let roles = context.role_queries.handle_list_active().await?;
    let permissions = context.permission_queries.handle_list_active().await?;
    let menus = context.menu_queries.handle_list_active().await?;

    info!(
        roles = roles.len(),
        permissions = permissions.len(),
        menus = menus.len(),
        "RBAC store ready"
    );

    Ok(())
}
