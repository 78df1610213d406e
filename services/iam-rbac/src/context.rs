//! 服务上下文
//!
//! 集中构造所有处理器，存储通过 `UnitOfWorkFactory` 显式注入

use std::sync::Arc;

use rbac_bootstrap::Infrastructure;
use rbac_config::AccessConfig;
use tracing::info;

use crate::application::{
    AssignmentCommandHandler, AuthorizationService, MenuCommandHandler, MenuQueryHandler,
    PermissionCommandHandler, PermissionQueryHandler, RoleCommandHandler, RoleQueryHandler,
    UserCommandHandler, UserQueryHandler,
};
use crate::domain::UnitOfWorkFactory;
use crate::infrastructure::{InMemoryStore, PostgresUnitOfWorkFactory};

/// RBAC 服务上下文
pub struct AccessContext {
    pub authorization: AuthorizationService,
    pub assignments: AssignmentCommandHandler,
    pub user_commands: UserCommandHandler,
    pub user_queries: UserQueryHandler,
    pub role_commands: RoleCommandHandler,
    pub role_queries: RoleQueryHandler,
    pub permission_commands: PermissionCommandHandler,
    pub permission_queries: PermissionQueryHandler,
    pub menu_commands: MenuCommandHandler,
    pub menu_queries: MenuQueryHandler,
}

impl AccessContext {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, access: AccessConfig) -> Self {
        Self {
            authorization: AuthorizationService::new(uow_factory.clone()),
            assignments: AssignmentCommandHandler::new(uow_factory.clone()),
            user_commands: UserCommandHandler::new(uow_factory.clone()),
            user_queries: UserQueryHandler::new(uow_factory.clone(), access.clone()),
            role_commands: RoleCommandHandler::new(uow_factory.clone()),
            role_queries: RoleQueryHandler::new(uow_factory.clone(), access.clone()),
            permission_commands: PermissionCommandHandler::new(uow_factory.clone()),
            permission_queries: PermissionQueryHandler::new(uow_factory.clone(), access),
            menu_commands: MenuCommandHandler::new(uow_factory.clone()),
            menu_queries: MenuQueryHandler::new(uow_factory),
        }
    }

    /// 按基础设施选择存储：配置了数据库用 PostgreSQL，否则用内存存储
    pub fn from_infrastructure(infra: &Infrastructure) -> Self {
        let access = infra.config().access.clone();

        match infra.transaction_manager() {
            Some(transactions) => {
                info!(serializable = infra.serializable(), "Using PostgreSQL store");
                let factory = PostgresUnitOfWorkFactory::new(transactions, infra.serializable());
                Self::new(Arc::new(factory), access)
            }
            None => {
                info!("Using in-memory store");
                Self::in_memory(access)
            }
        }
    }

    /// 使用全新的内存存储
    pub fn in_memory(access: AccessConfig) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), access)
    }
}
