//! 授权领域模块

pub mod capability;
pub mod decision;
pub mod evaluator;
pub mod permission_set;

pub use capability::{Capability, CapabilityParseError};
pub use decision::{AccessDecision, DenyReason, Identity};
pub use evaluator::AccessEvaluator;
pub use permission_set::PermissionSet;
