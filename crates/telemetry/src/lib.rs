//! telemetry - 可观测性库

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// 初始化 tracing
///
/// 全局 subscriber 已存在时返回 `false`（例如在测试中重复初始化）
pub fn init_tracing(log_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

/// 初始化 JSON 格式的 tracing（生产环境）
pub fn init_tracing_json(log_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .is_ok()
}

/// 初始化 Prometheus metrics
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// 授权检查相关的指标名称
pub mod names {
    pub const AUTHORIZATION_CHECKS_TOTAL: &str = "authorization_checks_total";
    pub const AUTHORIZATION_CHECK_ERRORS_TOTAL: &str = "authorization_check_errors_total";
    pub const AUTHORIZATION_CHECK_DURATION_MS: &str = "authorization_check_duration_ms";
}

/// 注册指标描述，便于 Prometheus 展示
pub fn describe_metrics() {
    metrics::describe_counter!(
        names::AUTHORIZATION_CHECKS_TOTAL,
        "Authorization decisions grouped by kind and decision"
    );
    metrics::describe_counter!(
        names::AUTHORIZATION_CHECK_ERRORS_TOTAL,
        "Authorization checks that failed with a store error"
    );
    metrics::describe_histogram!(
        names::AUTHORIZATION_CHECK_DURATION_MS,
        metrics::Unit::Milliseconds,
        "Latency of authorization checks"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let first = init_tracing("debug");
        let second = init_tracing_json("info");
        assert!(!(first && second));
        assert!(!second);
    }
}
