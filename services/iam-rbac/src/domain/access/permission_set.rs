//! 已解析的权限集合

use std::collections::BTreeMap;

use serde::Serialize;

use super::capability::Capability;
use crate::domain::role::{Permission, PermissionId};

/// 按权限 ID 去重、仅包含启用权限的集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeMap<PermissionId, Permission>,
}

impl PermissionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 由角色授予的权限构建，停用的权限被过滤，重复的权限只保留一份
    pub fn from_granted(granted: impl IntoIterator<Item = Permission>) -> Self {
        let permissions = granted
            .into_iter()
            .filter(|p| p.is_active)
            .map(|p| (p.id.clone(), p))
            .collect();
        Self { permissions }
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    pub fn contains(&self, id: &PermissionId) -> bool {
        self.permissions.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.values()
    }

    /// 是否存在精确匹配 `(action, resource)` 的权限
    pub fn allows(&self, capability: &Capability) -> bool {
        self.permissions.values().any(|p| p.grants(capability))
    }

    /// 并集
    pub fn union(mut self, other: PermissionSet) -> Self {
        self.permissions.extend(other.permissions);
        self
    }

    pub fn ids(&self) -> Vec<PermissionId> {
        self.permissions.keys().cloned().collect()
    }

    pub fn into_vec(self) -> Vec<Permission> {
        self.permissions.into_values().collect()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self::from_granted(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission(id: &str, action: &str, resource: &str) -> Permission {
        Permission::new(id.to_string(), action.to_string(), resource.to_string())
            .with_id(PermissionId::from(id))
    }

    #[test]
    fn test_dedupes_by_id_and_drops_inactive() {
        let mut inactive = permission("p3", "delete", "user");
        inactive.deactivate();

        let set = PermissionSet::from_granted(vec![
            permission("p1", "read", "user"),
            permission("p1", "read", "user"),
            permission("p2", "write", "user"),
            inactive,
        ]);

        assert_eq!(set.len(), 2);
        assert!(set.contains(&PermissionId::from("p1")));
        assert!(!set.contains(&PermissionId::from("p3")));
        assert!(!set.allows(&Capability::new("delete", "user")));
    }

    #[test]
    fn test_allows_exact_pair_only() {
        let set: PermissionSet = vec![permission("p1", "read", "user")].into_iter().collect();

        assert!(set.allows(&Capability::new("read", "user")));
        assert!(!set.allows(&Capability::new("read", "role")));
    }

    #[test]
    fn test_union() {
        let a = PermissionSet::from_granted(vec![permission("p1", "read", "user")]);
        let b = PermissionSet::from_granted(vec![
            permission("p1", "read", "user"),
            permission("p2", "read", "role"),
        ]);

        let all = a.union(b);
        assert_eq!(all.ids(), vec![PermissionId::from("p1"), PermissionId::from("p2")]);
    }
}
