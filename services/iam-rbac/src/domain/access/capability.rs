//! 能力值对象
//!
//! 对外格式为 `"<action>:<resource>"`，在第一个 `:` 处拆分

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 一个 `(action, resource)` 能力
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capability {
    pub action: String,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid capability: {0}, expected \"action:resource\"")]
pub struct CapabilityParseError(pub String);

impl Capability {
    pub fn new(action: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            resource: resource.into(),
        }
    }

    /// 解析能力字符串，缺少 `:` 或任一部分为空时返回 `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let (action, resource) = raw.split_once(':')?;
        if action.is_empty() || resource.is_empty() {
            return None;
        }
        Some(Self::new(action, resource))
    }
}

impl FromStr for Capability {
    type Err = CapabilityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CapabilityParseError(s.to_string()))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.action, self.resource)
    }
}
