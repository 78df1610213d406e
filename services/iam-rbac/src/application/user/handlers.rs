//! 用户命令处理器

use std::sync::Arc;

use rbac_errors::{AppError, AppResult};
use tracing::info;

use super::commands::*;
use crate::domain::UnitOfWorkFactory;
use crate::domain::user::User;
use crate::error::AccessError;

/// 用户命令处理器
pub struct UserCommandHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl UserCommandHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 创建用户
    pub async fn handle_create(&self, cmd: CreateUserCommand) -> AppResult<User> {
        cmd.validate().map_err(AppError::bad_request)?;

        let uow = self.uow_factory.begin().await?;

        if uow.users().find_by_email(&cmd.email).await?.is_some() {
            return Err(AccessError::EmailAlreadyExists.into());
        }

        let user = cmd.into_user();
        uow.users().create(&user).await?;
        uow.commit().await?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// 更新用户，修改邮箱时重新检查唯一性（排除自身）
    pub async fn handle_update(&self, cmd: UpdateUserCommand) -> AppResult<User> {
        cmd.validate().map_err(AppError::bad_request)?;

        let uow = self.uow_factory.begin().await?;

        let mut user = uow
            .users()
            .find_by_id(&cmd.user_id)
            .await?
            .ok_or(AccessError::UserNotFound)?;

        if let Some(ref email) = cmd.email
            && let Some(existing) = uow.users().find_by_email(email).await?
            && existing.id != user.id
        {
            return Err(AccessError::EmailAlreadyExists.into());
        }

        cmd.apply_to(&mut user);
        uow.users().update(&user).await?;
        uow.commit().await?;

        info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// 删除用户，同时清空其角色关联
    pub async fn handle_delete(&self, cmd: DeleteUserCommand) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        uow.users()
            .find_by_id(&cmd.user_id)
            .await?
            .ok_or(AccessError::UserNotFound)?;

        uow.user_roles().clear_user_roles(&cmd.user_id).await?;
        uow.users().delete(&cmd.user_id).await?;
        uow.commit().await?;

        info!(user_id = %cmd.user_id, "User deleted");
        Ok(())
    }
}
