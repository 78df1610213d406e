//! 角色实体

use derive_more::{Display, From};
use rbac_common::{AuditInfo, new_string_id};
use serde::{Deserialize, Serialize};

/// 角色 ID
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display("{_0}")]
#[serde(transparent)]
pub struct RoleId(pub String);

impl RoleId {
    pub fn new() -> Self {
        Self(new_string_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::str::FromStr for RoleId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

/// 角色名称最大长度
pub const ROLE_NAME_MAX_LEN: usize = 50;

/// 角色实体
///
/// 角色是用户与权限、菜单之间唯一的间接层
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    #[serde(flatten)]
    pub audit_info: AuditInfo,
}

impl Role {
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            id: RoleId::new(),
            name,
            description,
            is_active: true,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn with_id(mut self, id: RoleId) -> Self {
        self.id = id;
        self
    }

    pub fn rename(&mut self, name: String) {
        self.name = name;
        self.audit_info.update();
    }

    pub fn update_description(&mut self, description: Option<String>) {
        self.description = description;
        self.audit_info.update();
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

impl PartialEq for Role {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Role {}

/// 下拉选择使用的角色摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
}

impl From<&Role> for RoleSummary {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id.clone(),
            name: role.name.clone(),
            description: role.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_creation() {
        let role = Role::new("admin".to_string(), Some("Administrators".to_string()));

        assert_eq!(role.name, "admin");
        assert!(role.is_active);
        assert!(!role.id.as_str().is_empty());
    }

    #[test]
    fn test_role_equality_by_id() {
        let a = Role::new("a".to_string(), None).with_id(RoleId::from("r1"));
        let b = Role::new("b".to_string(), None).with_id(RoleId::from("r1"));

        assert_eq!(a, b);
    }

    #[test]
    fn test_role_serializes_camel_case() {
        let mut role = Role::new("editor".to_string(), None);
        role.deactivate();

        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["isActive"], false);
        assert!(json.get("createdAt").is_some());
    }
}
