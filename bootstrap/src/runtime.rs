//! 服务运行时

use metrics_exporter_prometheus::PrometheusHandle;
use rbac_config::AppConfig;
use rbac_errors::{AppError, AppResult};
use rbac_telemetry::{describe_metrics, init_metrics, init_tracing, init_tracing_json};
use tracing::{info, warn};

/// 服务运行时配置
pub struct RuntimeConfig {
    pub config_dir: String,
    /// 是否安装 Prometheus recorder
    pub install_metrics: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            config_dir: "config".to_string(),
            install_metrics: true,
        }
    }
}

/// 初始化服务运行时
pub fn init_runtime(config: &AppConfig) {
    // 初始化 tracing
    let installed = if config.is_production() || config.telemetry.json {
        init_tracing_json(&config.telemetry.log_level)
    } else {
        init_tracing(&config.telemetry.log_level)
    };

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        subscriber_installed = installed,
        "Runtime initialized"
    );
}

/// 启动运行时：加载配置、初始化日志和指标
///
/// 返回加载后的配置以及 Prometheus handle（未安装或已被占用时为 `None`）
pub fn start(runtime: &RuntimeConfig) -> AppResult<(AppConfig, Option<PrometheusHandle>)> {
    let config = AppConfig::load(&runtime.config_dir)
        .map_err(|e| AppError::internal(format!("Failed to load config: {}", e)))?;

    init_runtime(&config);

    let handle = if runtime.install_metrics {
        match init_metrics() {
            Ok(handle) => {
                describe_metrics();
                Some(handle)
            }
            Err(e) => {
                warn!("Failed to install metrics recorder: {}", e);
                None
            }
        }
    } else {
        None
    };

    Ok((config, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_without_config_files_uses_defaults() {
        let runtime = RuntimeConfig {
            config_dir: "/nonexistent-rbac-config".to_string(),
            install_metrics: false,
        };

        let (config, handle) = start(&runtime).expect("defaults should load");
        assert!(handle.is_none());
        assert_eq!(config.access.default_page_size, 10);
    }
}
