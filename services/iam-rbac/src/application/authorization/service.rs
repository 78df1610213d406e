//! 授权检查服务
//!
//! 在 CRUD 处理器执行之前作为前置门禁调用

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use rbac_errors::AppResult;
use rbac_telemetry::names;
use tracing::debug;

use super::resolver::PermissionResolver;
use crate::domain::UnitOfWorkFactory;
use crate::domain::access::{AccessDecision, AccessEvaluator, DenyReason, Identity, PermissionSet};
use crate::domain::role::{Role, RoleId};
use crate::error::AccessError;

/// 检查类型（指标标签）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckKind {
    Capability,
    Role,
}

impl CheckKind {
    fn as_label(&self) -> &'static str {
        match self {
            CheckKind::Capability => "capability",
            CheckKind::Role => "role",
        }
    }
}

/// 授权服务
///
/// 决策步骤:
/// 1. 未认证，拒绝 (Unauthenticated)
/// 2. 要求列表为空，允许（仅需登录）
/// 3. 查找用户，不存在则拒绝 (IdentityNotFound)
/// 4. 解析用户角色对应的权限，或直接比对角色名称
///
/// 所有读取在同一个 Unit of Work 中完成，检查本身没有副作用
pub struct AuthorizationService {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl AuthorizationService {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 能力检查，所有 `"action:resource"` 都必须满足
    pub async fn authorize<S>(
        &self,
        identity: Option<&Identity>,
        required: &[S],
    ) -> AppResult<AccessDecision>
    where
        S: AsRef<str> + Sync,
    {
        let start = Instant::now();
        let result = self.authorize_internal(identity, required).await;
        record(CheckKind::Capability, &result, start);
        result
    }

    /// 角色检查，持有任一角色名称即通过
    pub async fn authorize_role<S>(
        &self,
        identity: Option<&Identity>,
        required_roles: &[S],
    ) -> AppResult<AccessDecision>
    where
        S: AsRef<str> + Sync,
    {
        let start = Instant::now();
        let result = self.authorize_role_internal(identity, required_roles).await;
        record(CheckKind::Role, &result, start);
        result
    }

    /// 获取用户当前被授予的权限集合
    pub async fn granted_permissions(&self, identity: &Identity) -> AppResult<PermissionSet> {
        let uow = self.uow_factory.begin_read_only().await?;

        if uow.users().find_by_id(&identity.user_id).await?.is_none() {
            return Err(AccessError::UserNotFound.into());
        }

        let roles = uow.user_roles().find_roles_by_user(&identity.user_id).await?;
        let permissions = PermissionResolver::resolve(uow.role_permissions(), &role_ids(&roles)).await?;

        uow.rollback().await?;
        Ok(permissions)
    }

    async fn authorize_internal<S>(
        &self,
        identity: Option<&Identity>,
        required: &[S],
    ) -> AppResult<AccessDecision>
    where
        S: AsRef<str> + Sync,
    {
        let Some(identity) = identity else {
            return Ok(AccessDecision::Deny(DenyReason::Unauthenticated));
        };

        if required.is_empty() {
            return Ok(AccessDecision::Allow);
        }

        let uow = self.uow_factory.begin_read_only().await?;

        let Some(roles) = self.held_roles(uow.as_ref(), identity).await? else {
            return Ok(AccessDecision::Deny(DenyReason::IdentityNotFound));
        };

        let granted = PermissionResolver::resolve(uow.role_permissions(), &role_ids(&roles)).await?;
        uow.rollback().await?;

        let decision = AccessEvaluator::check_capabilities(required, &granted);
        debug!(
            user_id = %identity.user_id,
            required = required.len(),
            granted = granted.len(),
            decision = decision.as_label(),
            "Capability check evaluated"
        );

        Ok(decision)
    }

    async fn authorize_role_internal<S>(
        &self,
        identity: Option<&Identity>,
        required_roles: &[S],
    ) -> AppResult<AccessDecision>
    where
        S: AsRef<str> + Sync,
    {
        let Some(identity) = identity else {
            return Ok(AccessDecision::Deny(DenyReason::Unauthenticated));
        };

        if required_roles.is_empty() {
            return Ok(AccessDecision::Allow);
        }

        let uow = self.uow_factory.begin_read_only().await?;

        let Some(roles) = self.held_roles(uow.as_ref(), identity).await? else {
            return Ok(AccessDecision::Deny(DenyReason::IdentityNotFound));
        };
        uow.rollback().await?;

        let decision = AccessEvaluator::check_roles(required_roles, &roles);
        debug!(
            user_id = %identity.user_id,
            held = roles.len(),
            decision = decision.as_label(),
            "Role check evaluated"
        );

        Ok(decision)
    }

    /// 用户持有的角色，用户不存在时返回 `None`
    async fn held_roles(
        &self,
        uow: &dyn crate::domain::UnitOfWork,
        identity: &Identity,
    ) -> AppResult<Option<Vec<Role>>> {
        if uow.users().find_by_id(&identity.user_id).await?.is_none() {
            debug!(user_id = %identity.user_id, "Authenticated user no longer exists");
            return Ok(None);
        }

        let roles = uow.user_roles().find_roles_by_user(&identity.user_id).await?;
        Ok(Some(roles))
    }
}

fn role_ids(roles: &[Role]) -> Vec<RoleId> {
    roles.iter().map(|r| r.id.clone()).collect()
}

/// 记录指标
fn record(kind: CheckKind, result: &AppResult<AccessDecision>, start: Instant) {
    match result {
        Ok(decision) => {
            counter!(names::AUTHORIZATION_CHECKS_TOTAL,
                "kind" => kind.as_label(),
                "decision" => decision.as_label()
            )
            .increment(1);
        }
        Err(_) => {
            counter!(names::AUTHORIZATION_CHECK_ERRORS_TOTAL, "kind" => kind.as_label())
                .increment(1);
        }
    }

    histogram!(names::AUTHORIZATION_CHECK_DURATION_MS, "kind" => kind.as_label())
        .record(start.elapsed().as_secs_f64() * 1000.0);
}
