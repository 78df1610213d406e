//! 角色相关命令定义

use crate::application::validation::{max_len_opt, required_max_len};
use crate::domain::role::{ROLE_NAME_MAX_LEN, Role, RoleId};

const ROLE_DESCRIPTION_MAX_LEN: usize = 500;

/// 创建角色命令
#[derive(Debug, Clone)]
pub struct CreateRoleCommand {
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl CreateRoleCommand {
    /// 验证命令参数
    pub fn validate(&self) -> Result<(), String> {
        required_max_len("Role name", &self.name, ROLE_NAME_MAX_LEN)?;
        max_len_opt(
            "Role description",
            self.description.as_deref(),
            ROLE_DESCRIPTION_MAX_LEN,
        )
    }

    /// 将命令转换为角色实体
    pub fn into_role(self) -> Role {
        let mut role = Role::new(self.name, self.description);
        if self.is_active == Some(false) {
            role.deactivate();
        }
        role
    }
}

/// 更新角色命令，只修改提供的字段
///
/// `description` 为 `Some(None)` 时清空描述
#[derive(Debug, Clone)]
pub struct UpdateRoleCommand {
    pub role_id: RoleId,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl UpdateRoleCommand {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_none() && self.description.is_none() && self.is_active.is_none() {
            return Err("At least one field must be provided".to_string());
        }
        if let Some(ref name) = self.name {
            required_max_len("Role name", name, ROLE_NAME_MAX_LEN)?;
        }
        max_len_opt(
            "Role description",
            self.description.as_ref().and_then(Option::as_deref),
            ROLE_DESCRIPTION_MAX_LEN,
        )
    }

    /// 合并到已有角色
    pub fn apply_to(self, role: &mut Role) {
        if let Some(name) = self.name {
            role.rename(name);
        }
        if let Some(description) = self.description {
            role.update_description(description);
        }
        match self.is_active {
            Some(true) => role.activate(),
            Some(false) => role.deactivate(),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_validation() {
        let cmd = CreateRoleCommand {
            name: "x".repeat(51),
            description: None,
            is_active: None,
        };
        assert!(cmd.validate().is_err());

        let cmd = CreateRoleCommand {
            name: "auditor".to_string(),
            description: None,
            is_active: Some(false),
        };
        assert!(cmd.validate().is_ok());
        assert!(!cmd.into_role().is_active);
    }

    #[test]
    fn test_update_requires_a_field() {
        let cmd = UpdateRoleCommand {
            role_id: RoleId::from("r1"),
            name: None,
            description: None,
            is_active: None,
        };
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_update_merges_supplied_fields_only() {
        let mut role = Role::new("editor".to_string(), Some("Edits content".to_string()));
        UpdateRoleCommand {
            role_id: role.id.clone(),
            name: None,
            description: None,
            is_active: Some(false),
        }
        .apply_to(&mut role);

        assert_eq!(role.name, "editor");
        assert_eq!(role.description.as_deref(), Some("Edits content"));
        assert!(!role.is_active);
    }

    #[test]
    fn test_update_can_set_and_clear_description() {
        let mut role = Role::new("editor".to_string(), Some("Edits content".to_string()));

        let cmd = UpdateRoleCommand {
            role_id: role.id.clone(),
            name: None,
            description: Some(Some("x".repeat(501))),
            is_active: None,
        };
        assert!(cmd.validate().is_err());

        UpdateRoleCommand {
            role_id: role.id.clone(),
            name: None,
            description: Some(Some("Publishes content".to_string())),
            is_active: None,
        }
        .apply_to(&mut role);
        assert_eq!(role.description.as_deref(), Some("Publishes content"));

        let clear = UpdateRoleCommand {
            role_id: role.id.clone(),
            name: None,
            description: Some(None),
            is_active: None,
        };
        assert!(clear.validate().is_ok());
        clear.apply_to(&mut role);
        assert_eq!(role.description, None);
        assert_eq!(role.name, "editor");
    }
}
