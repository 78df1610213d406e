//! 内存 Unit of Work 实现
//!
//! 写事务独占存储，效果等同于串行化事务；只读事务共享读锁，可以并行执行。
//! 写事务在第一次修改时复制出草稿，提交时整体写回，丢弃或回滚则什么都不发生。

use std::sync::Arc;

use async_trait::async_trait;
use rbac_errors::{AppError, AppResult};
use tokio::sync::{Mutex, RwLock};

use super::repositories::{
    MemMenuRepository, MemPermissionRepository, MemRoleMenuRepository,
    MemRolePermissionRepository, MemRoleRepository, MemUserRepository, MemUserRoleRepository,
    SharedState, StateAccess,
};
use super::state::MemoryState;
use crate::domain::menu::{MenuRepository, RoleMenuRepository};
use crate::domain::role::{PermissionRepository, RolePermissionRepository, RoleRepository};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use crate::domain::user::{UserRepository, UserRoleRepository};

/// 内存存储，同时作为 Unit of Work 工厂
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().write_owned().await;
        Ok(Box::new(InMemoryUnitOfWork::new(StateAccess::Write {
            guard,
            draft: None,
        })))
    }

    async fn begin_read_only(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().read_owned().await;
        Ok(Box::new(InMemoryUnitOfWork::new(StateAccess::Read(guard))))
    }
}

/// 内存 Unit of Work
pub struct InMemoryUnitOfWork {
    access: SharedState,
    user_repo: MemUserRepository,
    role_repo: MemRoleRepository,
    permission_repo: MemPermissionRepository,
    menu_repo: MemMenuRepository,
    user_role_repo: MemUserRoleRepository,
    role_permission_repo: MemRolePermissionRepository,
    role_menu_repo: MemRoleMenuRepository,
}

impl InMemoryUnitOfWork {
    fn new(access: StateAccess) -> Self {
        let access: SharedState = Arc::new(Mutex::new(Some(access)));

        Self {
            user_repo: MemUserRepository::new(access.clone()),
            role_repo: MemRoleRepository::new(access.clone()),
            permission_repo: MemPermissionRepository::new(access.clone()),
            menu_repo: MemMenuRepository::new(access.clone()),
            user_role_repo: MemUserRoleRepository::new(access.clone()),
            role_permission_repo: MemRolePermissionRepository::new(access.clone()),
            role_menu_repo: MemRoleMenuRepository::new(access.clone()),
            access,
        }
    }

    async fn take_access(&self) -> AppResult<StateAccess> {
        self.access
            .lock()
            .await
            .take()
            .ok_or_else(|| AppError::internal("Unit of work already consumed"))
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
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
        if let StateAccess::Write {
            mut guard,
            draft: Some(draft),
        } = self.take_access().await?
        {
            *guard = draft;
        }

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.take_access().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::role::{Role, RoleId};

    fn role(id: &str) -> Role {
        Role::new(id.to_string(), None).with_id(RoleId::from(id))
    }

    #[tokio::test]
    async fn test_commit_persists_changes() {
        let store = InMemoryStore::new();

        let uow = store.begin().await.unwrap();
        uow.roles().create(&role("admin")).await.unwrap();
        uow.commit().await.unwrap();

        let uow = store.begin().await.unwrap();
        let found = uow.roles().find_by_id(&RoleId::from("admin")).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_rollback_discards_changes() {
        let store = InMemoryStore::new();

        let uow = store.begin().await.unwrap();
        uow.roles().create(&role("admin")).await.unwrap();
        uow.rollback().await.unwrap();

        let uow = store.begin().await.unwrap();
        let found = uow.roles().find_by_id(&RoleId::from("admin")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_discards_changes() {
        let store = InMemoryStore::new();

        {
            let uow = store.begin().await.unwrap();
            uow.roles().create(&role("admin")).await.unwrap();
        }

        let uow = store.begin().await.unwrap();
        let found = uow.roles().find_by_name("admin").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_reads_see_uncommitted_writes_of_same_unit() {
        let store = InMemoryStore::new();

        let uow = store.begin().await.unwrap();
        assert!(uow.roles().find_by_name("admin").await.unwrap().is_none());
        uow.roles().create(&role("admin")).await.unwrap();
        assert!(uow.roles().find_by_name("admin").await.unwrap().is_some());
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_read_only_units_run_concurrently() {
        let store = InMemoryStore::new();
        let uow = store.begin().await.unwrap();
        uow.roles().create(&role("admin")).await.unwrap();
        uow.commit().await.unwrap();

        let first = store.begin_read_only().await.unwrap();
        let second = tokio::time::timeout(Duration::from_secs(1), store.begin_read_only())
            .await
            .expect("read-only units must not wait for each other")
            .unwrap();

        assert!(first.roles().find_by_name("admin").await.unwrap().is_some());
        assert!(second.roles().find_by_name("admin").await.unwrap().is_some());

        first.rollback().await.unwrap();
        second.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_read_only_unit_rejects_writes() {
        let store = InMemoryStore::new();

        let uow = store.begin_read_only().await.unwrap();
        let result = uow.roles().create(&role("admin")).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
        uow.commit().await.unwrap();

        let uow = store.begin_read_only().await.unwrap();
        assert!(uow.roles().find_by_name("admin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_writer_waits_for_open_readers() {
        let store = InMemoryStore::new();

        let reader = store.begin_read_only().await.unwrap();
        let blocked = tokio::time::timeout(Duration::from_millis(50), store.begin()).await;
        assert!(blocked.is_err());

        reader.rollback().await.unwrap();
        let writer = tokio::time::timeout(Duration::from_secs(1), store.begin())
            .await
            .expect("writer should proceed once readers finish")
            .unwrap();
        writer.rollback().await.unwrap();
    }
}
