//! 权限相关命令定义

use crate::application::validation::{max_len_opt, required_max_len};
use crate::domain::role::{
    PERMISSION_ACTION_MAX_LEN, PERMISSION_CATEGORY_MAX_LEN, PERMISSION_DESCRIPTION_MAX_LEN,
    PERMISSION_NAME_MAX_LEN, PERMISSION_RESOURCE_MAX_LEN, Permission, PermissionId,
};

/// action 与 resource 用 `:` 拼接成能力字符串，因此自身不能包含 `:`
fn capability_part(field: &str, value: &str, max: usize) -> Result<(), String> {
    required_max_len(field, value, max)?;
    if value.contains(':') {
        return Err(format!("{} cannot contain ':'", field));
    }
    Ok(())
}

/// 创建权限命令
#[derive(Debug, Clone)]
pub struct CreatePermissionCommand {
    pub name: String,
    pub action: String,
    pub resource: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

impl CreatePermissionCommand {
    pub fn validate(&self) -> Result<(), String> {
        required_max_len("Permission name", &self.name, PERMISSION_NAME_MAX_LEN)?;
        capability_part("Action", &self.action, PERMISSION_ACTION_MAX_LEN)?;
        capability_part("Resource", &self.resource, PERMISSION_RESOURCE_MAX_LEN)?;
        max_len_opt(
            "Description",
            self.description.as_deref(),
            PERMISSION_DESCRIPTION_MAX_LEN,
        )?;
        max_len_opt(
            "Category",
            self.category.as_deref(),
            PERMISSION_CATEGORY_MAX_LEN,
        )
    }

    pub fn into_permission(self) -> Permission {
        let mut permission = Permission::new(self.name, self.action, self.resource);
        permission.description = self.description;
        permission.category = self.category;
        if self.is_active == Some(false) {
            permission.deactivate();
        }
        permission
    }
}

/// 更新权限命令，只修改提供的字段
#[derive(Debug, Clone)]
pub struct UpdatePermissionCommand {
    pub permission_id: PermissionId,
    pub name: Option<String>,
    pub action: Option<String>,
    pub resource: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdatePermissionCommand {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_none()
            && self.action.is_none()
            && self.resource.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.is_active.is_none()
        {
            return Err("At least one field must be provided".to_string());
        }
        if let Some(ref name) = self.name {
            required_max_len("Permission name", name, PERMISSION_NAME_MAX_LEN)?;
        }
        if let Some(ref action) = self.action {
            capability_part("Action", action, PERMISSION_ACTION_MAX_LEN)?;
        }
        if let Some(ref resource) = self.resource {
            capability_part("Resource", resource, PERMISSION_RESOURCE_MAX_LEN)?;
        }
        max_len_opt(
            "Description",
            self.description.as_deref(),
            PERMISSION_DESCRIPTION_MAX_LEN,
        )?;
        max_len_opt(
            "Category",
            self.category.as_deref(),
            PERMISSION_CATEGORY_MAX_LEN,
        )
    }

    pub fn apply_to(self, permission: &mut Permission) {
        if let Some(name) = self.name {
            permission.name = name;
        }
        if let Some(action) = self.action {
            permission.action = action;
        }
        if let Some(resource) = self.resource {
            permission.resource = resource;
        }
        if let Some(description) = self.description {
            permission.description = Some(description);
        }
        if let Some(category) = self.category {
            permission.category = Some(category);
        }
        if let Some(is_active) = self.is_active {
            permission.is_active = is_active;
        }
        permission.audit_info.update();
    }
}

/// 删除权限命令
#[derive(Debug, Clone)]
pub struct DeletePermissionCommand {
    pub permission_id: PermissionId,
}
