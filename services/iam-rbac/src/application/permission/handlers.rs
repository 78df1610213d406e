//! 权限命令处理器

use std::sync::Arc;

use rbac_errors::{AppError, AppResult};
use tracing::info;

use super::commands::*;
use crate::domain::UnitOfWorkFactory;
use crate::domain::role::Permission;
use crate::error::AccessError;

/// 权限命令处理器
pub struct PermissionCommandHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl PermissionCommandHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 创建权限
    pub async fn handle_create(&self, cmd: CreatePermissionCommand) -> AppResult<Permission> {
        cmd.validate().map_err(AppError::bad_request)?;

        let uow = self.uow_factory.begin().await?;

        if uow.permissions().find_by_name(&cmd.name).await?.is_some() {
            return Err(AccessError::PermissionAlreadyExists.into());
        }

        let permission = cmd.into_permission();
        uow.permissions().create(&permission).await?;
        uow.commit().await?;

        info!(
            permission_id = %permission.id,
            capability = %permission.capability(),
            "Permission created"
        );
        Ok(permission)
    }

    /// 更新权限
    pub async fn handle_update(&self, cmd: UpdatePermissionCommand) -> AppResult<Permission> {
        cmd.validate().map_err(AppError::bad_request)?;

        let uow = self.uow_factory.begin().await?;

        let mut permission = uow
            .permissions()
            .find_by_id(&cmd.permission_id)
            .await?
            .ok_or(AccessError::PermissionNotFound)?;

        if let Some(ref name) = cmd.name
            && name != &permission.name
            && uow.permissions().find_by_name(name).await?.is_some()
        {
            return Err(AccessError::PermissionAlreadyExists.into());
        }

        cmd.apply_to(&mut permission);
        uow.permissions().update(&permission).await?;
        uow.commit().await?;

        info!(permission_id = %permission.id, "Permission updated");
        Ok(permission)
    }

    /// 删除权限，同时解除其与角色的关联
    pub async fn handle_delete(&self, cmd: DeletePermissionCommand) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        uow.permissions()
            .find_by_id(&cmd.permission_id)
            .await?
            .ok_or(AccessError::PermissionNotFound)?;

        uow.permissions().delete(&cmd.permission_id).await?;
        uow.commit().await?;

        info!(permission_id = %cmd.permission_id, "Permission deleted");
        Ok(())
    }
}
