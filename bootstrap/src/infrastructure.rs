//! 基础设施资源管理
//!
//! 未配置数据库时不创建连接池，服务退回内存存储

use rbac_adapter_postgres::{
    Migration, MigrationManager, MigrationResult, PostgresConfig, TransactionManager,
    check_connection, create_pool,
};
use rbac_config::{AppConfig, DatabaseConfig};
use rbac_errors::{AppError, AppResult};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::{info, warn};

/// 基础设施资源容器
pub struct Infrastructure {
    /// 应用配置
    config: AppConfig,
    /// PostgreSQL 连接池（可选）
    postgres_pool: Option<PgPool>,
}

impl Infrastructure {
    /// 从配置创建基础设施资源
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let postgres_pool = match &config.database {
            Some(database) => {
                let pool = Self::connect(database).await?;
                info!(
                    "PostgreSQL connection pool created (max_connections: {})",
                    database.max_connections
                );
                Some(pool)
            }
            None => {
                info!("Database not configured, using in-memory store");
                None
            }
        };

        Ok(Self {
            config,
            postgres_pool,
        })
    }

    /// 仅使用内存存储的基础设施
    pub fn in_memory(config: AppConfig) -> Self {
        Self {
            config,
            postgres_pool: None,
        }
    }

    async fn connect(database: &DatabaseConfig) -> AppResult<PgPool> {
        let pg_config = PostgresConfig::new(database.url.expose_secret())
            .with_max_connections(database.max_connections);
        let pool = create_pool(&pg_config).await?;
        check_connection(&pool).await?;
        Ok(pool)
    }

    /// 获取应用配置
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取 PostgreSQL 连接池
    pub fn postgres_pool(&self) -> Option<PgPool> {
        self.postgres_pool.clone()
    }

    /// 检查-修改序列是否使用 SERIALIZABLE 隔离级别
    pub fn serializable(&self) -> bool {
        self.config
            .database
            .as_ref()
            .map(|d| d.serializable)
            .unwrap_or(false)
    }

    /// 获取事务管理器
    pub fn transaction_manager(&self) -> Option<TransactionManager> {
        self.postgres_pool.clone().map(TransactionManager::new)
    }

    /// 执行数据库迁移，未配置数据库时直接返回空结果
    pub async fn migrate(&self, migrations: &[Migration]) -> AppResult<MigrationResult> {
        let Some(pool) = &self.postgres_pool else {
            return Ok(MigrationResult::default());
        };

        let result = MigrationManager::new(pool.clone()).migrate(migrations).await?;
        if !result.is_success() {
            for failed in &result.errors {
                warn!(
                    version = failed.version,
                    "Migration failed: {}", failed.error
                );
            }
            return Err(AppError::database("Schema migration failed"));
        }

        info!(applied = result.applied_count(), "Schema migrations finished");
        Ok(result)
    }
}
