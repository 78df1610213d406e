use rbac_errors::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("User not found")]
    UserNotFound,
    #[error("Role not found")]
    RoleNotFound,
    #[error("Permission not found")]
    PermissionNotFound,
    #[error("Menu not found")]
    MenuNotFound,
    #[error("Email already taken")]
    EmailAlreadyExists,
    #[error("Role already exists")]
    RoleAlreadyExists,
    #[error("Permission already exists")]
    PermissionAlreadyExists,
    #[error("One or more roles not found")]
    RolesNotFound,
    #[error("One or more menus not found")]
    MenusNotFound,
    #[error("One or more permissions not found")]
    PermissionsNotFound,
    #[error("Role is still assigned to users")]
    RoleInUse,
    #[error("Menu has child menus, delete them first")]
    MenuHasChildren,
    #[error("Parent menu not found")]
    ParentMenuNotFound,
    #[error("Menu cannot be its own ancestor")]
    MenuCycle,
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<AccessError> for AppError {
    fn from(error: AccessError) -> Self {
        let message = error.to_string();
        match error {
            AccessError::UserNotFound
            | AccessError::RoleNotFound
            | AccessError::PermissionNotFound
            | AccessError::MenuNotFound => AppError::NotFound(message),
            AccessError::EmailAlreadyExists
            | AccessError::RoleAlreadyExists
            | AccessError::PermissionAlreadyExists => AppError::Conflict(message),
            AccessError::RolesNotFound
            | AccessError::MenusNotFound
            | AccessError::PermissionsNotFound
            | AccessError::RoleInUse
            | AccessError::MenuHasChildren
            | AccessError::ParentMenuNotFound
            | AccessError::MenuCycle => AppError::BadRequest(message),
            AccessError::Validation(msg) => AppError::BadRequest(msg),
        }
    }
}
