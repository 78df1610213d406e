//! 权限实体

use derive_more::{Display, From};
use rbac_common::{AuditInfo, new_string_id};
use serde::{Deserialize, Serialize};

use crate::domain::access::Capability;

/// 权限 ID
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display("{_0}")]
#[serde(transparent)]
pub struct PermissionId(pub String);

impl PermissionId {
    pub fn new() -> Self {
        Self(new_string_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PermissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for PermissionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

pub const PERMISSION_NAME_MAX_LEN: usize = 100;
pub const PERMISSION_ACTION_MAX_LEN: usize = 100;
pub const PERMISSION_RESOURCE_MAX_LEN: usize = 100;
pub const PERMISSION_DESCRIPTION_MAX_LEN: usize = 200;
pub const PERMISSION_CATEGORY_MAX_LEN: usize = 50;

/// 权限实体
///
/// 能力键是 `(action, resource)`，`name` 只是独立的唯一标签，
/// 不能假设它等于 `action:resource`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub action: String,
    pub resource: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_active: bool,
    #[serde(flatten)]
    pub audit_info: AuditInfo,
}

impl Permission {
    pub fn new(name: String, action: String, resource: String) -> Self {
        Self {
            id: PermissionId::new(),
            name,
            action,
            resource,
            description: None,
            category: None,
            is_active: true,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn with_id(mut self, id: PermissionId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// 权限对应的能力
    pub fn capability(&self) -> Capability {
        Capability::new(self.action.clone(), self.resource.clone())
    }

    /// 是否精确匹配指定能力
    pub fn grants(&self, capability: &Capability) -> bool {
        self.action == capability.action && self.resource == capability.resource
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.audit_info.update();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.audit_info.update();
    }
}

impl PartialEq for Permission {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Permission {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_grants_exact_pair() {
        let permission = Permission::new(
            "users.read".to_string(),
            "read".to_string(),
            "user".to_string(),
        );

        assert!(permission.grants(&Capability::new("read", "user")));
        assert!(!permission.grants(&Capability::new("read", "users")));
        assert!(!permission.grants(&Capability::new("write", "user")));
        assert_eq!(permission.capability().to_string(), "read:user");
    }

    #[test]
    fn test_permission_builders() {
        let permission = Permission::new("p".to_string(), "a".to_string(), "r".to_string())
            .with_id(PermissionId::from("p1"))
            .with_description("desc")
            .with_category("system");

        assert_eq!(permission.id.as_str(), "p1");
        assert_eq!(permission.category.as_deref(), Some("system"));
        assert_eq!(permission.description.as_deref(), Some("desc"));
    }
}
