//! 关系分配命令处理器
//!
//! 所有校验与修改都在同一个 Unit of Work 中完成，
//! 任何校验失败都会在修改之前返回，未提交的 Unit of Work 随之回滚

use std::sync::Arc;

use rbac_errors::AppResult;
use tracing::info;

use super::commands::*;
use crate::domain::UnitOfWorkFactory;
use crate::error::AccessError;

/// 关系分配命令处理器
pub struct AssignmentCommandHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl AssignmentCommandHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 设置用户角色
    pub async fn handle_set_user_roles(&self, cmd: SetUserRolesCommand) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        uow.users()
            .find_by_id(&cmd.user_id)
            .await?
            .ok_or(AccessError::UserNotFound)?;

        let role_ids = dedup_ids(&cmd.role_ids);
        let found = uow.roles().find_by_ids(&role_ids).await?;
        if found.len() != role_ids.len() {
            return Err(AccessError::RolesNotFound.into());
        }

        uow.user_roles()
            .replace_user_roles(&cmd.user_id, &role_ids)
            .await?;
        uow.commit().await?;

        info!(user_id = %cmd.user_id, roles = role_ids.len(), "User roles replaced");
        Ok(())
    }

    /// 设置角色菜单
    pub async fn handle_set_role_menus(&self, cmd: SetRoleMenusCommand) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        uow.roles()
            .find_by_id(&cmd.role_id)
            .await?
            .ok_or(AccessError::RoleNotFound)?;

        let menu_ids = dedup_ids(&cmd.menu_ids);
        let found = uow.menus().find_by_ids(&menu_ids).await?;
        if found.len() != menu_ids.len() {
            return Err(AccessError::MenusNotFound.into());
        }

        uow.role_menus()
            .replace_role_menus(&cmd.role_id, &menu_ids)
            .await?;
        uow.commit().await?;

        info!(role_id = %cmd.role_id, menus = menu_ids.len(), "Role menus replaced");
        Ok(())
    }

    /// 设置角色权限
    pub async fn handle_set_role_permissions(
        &self,
        cmd: SetRolePermissionsCommand,
    ) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        uow.roles()
            .find_by_id(&cmd.role_id)
            .await?
            .ok_or(AccessError::RoleNotFound)?;

        let permission_ids = dedup_ids(&cmd.permission_ids);
        let found = uow.permissions().find_by_ids(&permission_ids).await?;
        if found.len() != permission_ids.len() {
            return Err(AccessError::PermissionsNotFound.into());
        }

        uow.role_permissions()
            .replace_role_permissions(&cmd.role_id, &permission_ids)
            .await?;
        uow.commit().await?;

        info!(
            role_id = %cmd.role_id,
            permissions = permission_ids.len(),
            "Role permissions replaced"
        );
        Ok(())
    }

    /// 删除角色
    ///
    /// 仍有用户持有该角色时拒绝，删除时同时清空菜单与权限关联
    pub async fn handle_delete_role(&self, cmd: DeleteRoleCommand) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        uow.roles()
            .find_by_id(&cmd.role_id)
            .await?
            .ok_or(AccessError::RoleNotFound)?;

        if uow.user_roles().count_users_with_role(&cmd.role_id).await? > 0 {
            return Err(AccessError::RoleInUse.into());
        }

        uow.role_menus().clear_role_menus(&cmd.role_id).await?;
        uow.role_permissions()
            .clear_role_permissions(&cmd.role_id)
            .await?;
        uow.roles().delete(&cmd.role_id).await?;
        uow.commit().await?;

        info!(role_id = %cmd.role_id, "Role deleted");
        Ok(())
    }

    /// 删除菜单，存在子菜单时拒绝
    pub async fn handle_delete_menu(&self, cmd: DeleteMenuCommand) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        uow.menus()
            .find_by_id(&cmd.menu_id)
            .await?
            .ok_or(AccessError::MenuNotFound)?;

        if uow.menus().count_children(&cmd.menu_id).await? > 0 {
            return Err(AccessError::MenuHasChildren.into());
        }

        uow.menus().delete(&cmd.menu_id).await?;
        uow.commit().await?;

        info!(menu_id = %cmd.menu_id, "Menu deleted");
        Ok(())
    }
}
