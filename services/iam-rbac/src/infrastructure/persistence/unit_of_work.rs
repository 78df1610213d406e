//! PostgreSQL Unit of Work 实现

use std::sync::Arc;

use async_trait::async_trait;
use rbac_adapter_postgres::{IsolationLevel, TransactionManager};
use rbac_errors::{AppError, AppResult};
use sqlx::{Postgres, Transaction};
use tokio::sync::Mutex;

use super::tx_repositories::{
    SharedTx, TxMenuRepository, TxPermissionRepository, TxRoleMenuRepository,
    TxRolePermissionRepository, TxRoleRepository, TxUserRepository, TxUserRoleRepository,
};
use crate::domain::menu::{MenuRepository, RoleMenuRepository};
use crate::domain::role::{PermissionRepository, RolePermissionRepository, RoleRepository};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use crate::domain::user::{UserRepository, UserRoleRepository};

/// Postgres Unit of Work 工厂
pub struct PostgresUnitOfWorkFactory {
    transactions: TransactionManager,
    isolation: IsolationLevel,
}

impl PostgresUnitOfWorkFactory {
    /// `serializable` 为 true 时以 SERIALIZABLE 隔离级别开启事务
    pub fn new(transactions: TransactionManager, serializable: bool) -> Self {
        let isolation = if serializable {
            IsolationLevel::Serializable
        } else {
            IsolationLevel::ReadCommitted
        };

        Self {
            transactions,
            isolation,
        }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.transactions.begin_with_isolation(self.isolation).await?;

        Ok(Box::new(PostgresUnitOfWork::new(tx)))
    }

    async fn begin_read_only(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.transactions.begin_read_only(self.isolation).await?;

        Ok(Box::new(PostgresUnitOfWork::new(tx)))
    }
}

/// Postgres Unit of Work 实现
pub struct PostgresUnitOfWork {
    tx: SharedTx,
    user_repo: TxUserRepository,
    role_repo: TxRoleRepository,
    permission_repo: TxPermissionRepository,
    menu_repo: TxMenuRepository,
    user_role_repo: TxUserRoleRepository,
    role_permission_repo: TxRolePermissionRepository,
    role_menu_repo: TxRoleMenuRepository,
}

impl PostgresUnitOfWork {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        let tx = Arc::new(Mutex::new(Some(tx)));

        Self {
            user_repo: TxUserRepository::new(tx.clone()),
            role_repo: TxRoleRepository::new(tx.clone()),
            permission_repo: TxPermissionRepository::new(tx.clone()),
            menu_repo: TxMenuRepository::new(tx.clone()),
            user_role_repo: TxUserRoleRepository::new(tx.clone()),
            role_permission_repo: TxRolePermissionRepository::new(tx.clone()),
            role_menu_repo: TxRoleMenuRepository::new(tx.clone()),
            tx,
        }
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    fn users(&self) -> &dyn UserRepository {
        &self.user_repo
    }

    fn roles(&self) -> &dyn RoleRepository {
        &self.role_repo
    }

    fn permissions(&self) -> &dyn PermissionRepository {
        &self.permission_repo
    }

    fn menus(&self) -> &dyn MenuRepository {
        &self.menu_repo
    }

    fn user_roles(&self) -> &dyn UserRoleRepository {
        &self.user_role_repo
    }

    fn role_permissions(&self) -> &dyn RolePermissionRepository {
        &self.role_permission_repo
    }

    fn role_menus(&self) -> &dyn RoleMenuRepository {
        &self.role_menu_repo
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        tx.rollback()
            .await
            .map_err(|e| AppError::database(format!("Failed to rollback transaction: {}", e)))?;

        Ok(())
    }
}
