//! 授权评估器
//!
//! 纯函数，只依赖已经解析好的权限集合与角色列表

use super::capability::Capability;
use super::decision::{AccessDecision, DenyReason};
use super::permission_set::PermissionSet;
use crate::domain::role::Role;

/// 授权评估器
pub struct AccessEvaluator;

impl AccessEvaluator {
    /// 能力检查
    ///
    /// 所有要求的能力都必须被满足（逻辑与）；
    /// 无法解析的能力字符串永远不被满足
    pub fn check_capabilities<S: AsRef<str>>(
        required: &[S],
        granted: &PermissionSet,
    ) -> AccessDecision {
        let satisfied = required.iter().all(|raw| {
            Capability::parse(raw.as_ref())
                .map(|cap| granted.allows(&cap))
                .unwrap_or(false)
        });

        if satisfied {
            AccessDecision::Allow
        } else {
            AccessDecision::Deny(DenyReason::InsufficientPermission)
        }
    }

    /// 角色检查
    ///
    /// 持有任一要求的角色名称即通过（逻辑或），要求为空时直接通过
    pub fn check_roles<S: AsRef<str>>(required: &[S], held: &[Role]) -> AccessDecision {
        if required.is_empty() {
            return AccessDecision::Allow;
        }

        let satisfied = required
            .iter()
            .any(|name| held.iter().any(|role| role.name == name.as_ref()));

        if satisfied {
            AccessDecision::Allow
        } else {
            AccessDecision::Deny(DenyReason::InsufficientRole)
        }
    }
}
