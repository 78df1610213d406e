//! 授权决策

use std::fmt;

use rbac_common::UserId;
use rbac_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// 已认证的调用方
///
/// 凭据校验由上游完成，这里只承载“调用方已认证为用户 U”这一事实
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
}

impl Identity {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DenyReason {
    Unauthenticated,
    IdentityNotFound,
    InsufficientPermission,
    InsufficientRole,
}

impl DenyReason {
    /// HTTP 层应使用的状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated | Self::IdentityNotFound => 401,
            Self::InsufficientPermission | Self::InsufficientRole => 403,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Please authenticate",
            Self::IdentityNotFound => "User not found",
            Self::InsufficientPermission => "Insufficient permissions",
            Self::InsufficientRole => "Insufficient role",
        }
    }

    /// 指标标签
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::IdentityNotFound => "identity_not_found",
            Self::InsufficientPermission => "insufficient_permission",
            Self::InsufficientRole => "insufficient_role",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<DenyReason> for AppError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated | DenyReason::IdentityNotFound => {
                AppError::unauthenticated(reason.message())
            }
            DenyReason::InsufficientPermission | DenyReason::InsufficientRole => {
                AppError::forbidden(reason.message())
            }
        }
    }
}

/// 授权结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Allow => None,
            Self::Deny(reason) => Some(*reason),
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny(reason) => reason.as_label(),
        }
    }

    /// 转换为错误结果，供 HTTP 层直接使用 `?`
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(reason.into()),
        }
    }
}
