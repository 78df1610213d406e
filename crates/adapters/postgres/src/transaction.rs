//! PostgreSQL 事务管理

use rbac_errors::{AppError, AppResult};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

/// 事务隔离级别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IsolationLevel {
    /// PostgreSQL 默认级别
    #[default]
    ReadCommitted,
    RepeatableRead,
    /// 检查后修改的分配操作需要该级别
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

/// 生成 `SET TRANSACTION` 语句，与默认设置相同时返回 `None`
pub fn set_transaction_statement(level: IsolationLevel, read_only: bool) -> Option<String> {
    match (level, read_only) {
        (IsolationLevel::ReadCommitted, false) => None,
        (level, false) => Some(format!("SET TRANSACTION ISOLATION LEVEL {}", level.as_sql())),
        (level, true) => Some(format!(
            "SET TRANSACTION ISOLATION LEVEL {}, READ ONLY",
            level.as_sql()
        )),
    }
}

/// 事务管理器
#[derive(Clone)]
pub struct TransactionManager {
    pool: PgPool,
}

impl TransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 以默认隔离级别开始事务
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.begin_with_isolation(IsolationLevel::default()).await
    }

    /// 开始读写事务并设置隔离级别
    pub async fn begin_with_isolation(
        &self,
        level: IsolationLevel,
    ) -> AppResult<Transaction<'static, Postgres>> {
        self.begin_configured(level, false).await
    }

    /// 开始只读事务
    pub async fn begin_read_only(
        &self,
        level: IsolationLevel,
    ) -> AppResult<Transaction<'static, Postgres>> {
        self.begin_configured(level, true).await
    }

    /// `SET TRANSACTION` 必须是事务内的第一条语句
    async fn begin_configured(
        &self,
        level: IsolationLevel,
        read_only: bool,
    ) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        if let Some(statement) = set_transaction_statement(level, read_only) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::database(format!("Failed to set transaction mode: {}", e))
                })?;
            debug!(isolation = level.as_sql(), read_only, "Transaction mode applied");
        }

        Ok(tx)
    }
}
