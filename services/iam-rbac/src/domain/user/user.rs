//! 用户实体

use rbac_common::{AuditInfo, UserId};
use serde::{Deserialize, Serialize};

pub const USER_NAME_MAX_LEN: usize = 100;

/// 用户实体
///
/// 凭据哈希由上游生成，仅作为不透明字符串保存，不会被序列化输出
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub is_email_verified: bool,
    #[serde(flatten)]
    pub audit_info: AuditInfo,
}

impl User {
    pub fn new(email: String, password_hash: String, name: String) -> Self {
        Self {
            id: UserId::new(),
            email,
            password_hash,
            name,
            is_email_verified: false,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    pub fn change_email(&mut self, email: String) {
        if self.email != email {
            self.email = email;
            self.is_email_verified = false;
        }
        self.audit_info.update();
    }

    pub fn rename(&mut self, name: String) {
        self.name = name;
        self.audit_info.update();
    }

    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.audit_info.update();
    }

    pub fn verify_email(&mut self) {
        self.is_email_verified = true;
        self.audit_info.update();
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("name", &self.name)
            .field("is_email_verified", &self.is_email_verified)
            .field("audit_info", &self.audit_info)
            .finish()
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

/// 校验邮箱格式
pub fn is_valid_email(email: &str) -> bool {
    email_address::EmailAddress::is_valid(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::new(
            "alice@example.com".to_string(),
            "$argon2id$opaque".to_string(),
            "Alice".to_string(),
        )
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let json = serde_json::to_value(sample()).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["email"], "alice@example.com");
        assert_eq!(json["isEmailVerified"], false);
    }

    #[test]
    fn test_debug_redacts_password_hash() {
        let output = format!("{:?}", sample());
        assert!(!output.contains("argon2id"));
        assert!(output.contains("[REDACTED]"));
    }

    #[test]
    fn test_change_email_resets_verification() {
        let mut user = sample();
        user.verify_email();
        user.change_email("alice@example.com".to_string());
        assert!(user.is_email_verified);

        user.change_email("alice@corp.example".to_string());
        assert!(!user.is_email_verified);
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("bob@example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email(""));
    }
}
