//! 用户相关命令定义

use rbac_common::UserId;

use crate::application::validation::{require, required_max_len};
use crate::domain::user::{USER_NAME_MAX_LEN, User, is_valid_email};

fn validate_email(email: &str) -> Result<(), String> {
    if !is_valid_email(email) {
        return Err("Invalid email".to_string());
    }
    Ok(())
}

/// 创建用户命令
///
/// `password_hash` 由上游生成，这里不做任何校验之外的处理
#[derive(Clone)]
pub struct CreateUserCommand {
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

impl CreateUserCommand {
    pub fn validate(&self) -> Result<(), String> {
        validate_email(&self.email)?;
        require("Password hash", &self.password_hash)?;
        required_max_len("Name", &self.name, USER_NAME_MAX_LEN)
    }

    pub fn into_user(self) -> User {
        User::new(self.email, self.password_hash, self.name)
    }
}

impl std::fmt::Debug for CreateUserCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserCommand")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// 更新用户命令，只修改提供的字段
#[derive(Clone)]
pub struct UpdateUserCommand {
    pub user_id: UserId,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
}

impl UpdateUserCommand {
    pub fn validate(&self) -> Result<(), String> {
        if self.email.is_none() && self.password_hash.is_none() && self.name.is_none() {
            return Err("At least one field must be provided".to_string());
        }
        if let Some(ref email) = self.email {
            validate_email(email)?;
        }
        if let Some(ref hash) = self.password_hash {
            require("Password hash", hash)?;
        }
        if let Some(ref name) = self.name {
            required_max_len("Name", name, USER_NAME_MAX_LEN)?;
        }
        Ok(())
    }

    pub fn apply_to(self, user: &mut User) {
        if let Some(email) = self.email {
            user.change_email(email);
        }
        if let Some(hash) = self.password_hash {
            user.set_password_hash(hash);
        }
        if let Some(name) = self.name {
            user.rename(name);
        }
    }
}

impl std::fmt::Debug for UpdateUserCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateUserCommand")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// 删除用户命令
#[derive(Debug, Clone)]
pub struct DeleteUserCommand {
    pub user_id: UserId,
}
