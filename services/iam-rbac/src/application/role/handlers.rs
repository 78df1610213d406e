//! 角色命令处理器

use std::sync::Arc;

use rbac_errors::{AppError, AppResult};
use tracing::info;

use super::commands::*;
use crate::domain::UnitOfWorkFactory;
use crate::domain::role::Role;
use crate::error::AccessError;

/// 角色命令处理器
///
/// 删除角色涉及关联校验，由 `AssignmentCommandHandler` 负责
pub struct RoleCommandHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl RoleCommandHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 创建角色
    pub async fn handle_create(&self, cmd: CreateRoleCommand) -> AppResult<Role> {
        cmd.validate().map_err(AppError::bad_request)?;

        let uow = self.uow_factory.begin().await?;

        // 检查名称是否已存在
        if uow.roles().find_by_name(&cmd.name).await?.is_some() {
            return Err(AccessError::RoleAlreadyExists.into());
        }

        let role = cmd.into_role();
        uow.roles().create(&role).await?;
        uow.commit().await?;

        info!(role_id = %role.id, name = %role.name, "Role created");
        Ok(role)
    }

    /// 更新角色
    pub async fn handle_update(&self, cmd: UpdateRoleCommand) -> AppResult<Role> {
        cmd.validate().map_err(AppError::bad_request)?;

        let uow = self.uow_factory.begin().await?;

        let mut role = uow
            .roles()
            .find_by_id(&cmd.role_id)
            .await?
            .ok_or(AccessError::RoleNotFound)?;

        if let Some(ref name) = cmd.name
            && name != &role.name
            && uow.roles().find_by_name(name).await?.is_some()
        {
            return Err(AccessError::RoleAlreadyExists.into());
        }

        cmd.apply_to(&mut role);
        uow.roles().update(&role).await?;
        uow.commit().await?;

        info!(role_id = %role.id, "Role updated");
        Ok(role)
    }
}
