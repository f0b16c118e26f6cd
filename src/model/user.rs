use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller identity forwarded by the authenticating gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_guid: Uuid,
    pub user_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Raw bearer token, passed through to the controller.
    #[serde(skip_serializing, default)]
    pub token: String,
}

impl UserContext {
    pub fn new(user_guid: Uuid, user_name: impl Into<String>) -> Self {
        Self {
            user_guid,
            user_name: user_name.into(),
            roles: Vec::new(),
            token: String::new(),
        }
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    /// Anonymous caller used when the gateway forwarded no identity.
    pub fn anonymous() -> Self {
        Self {
            user_guid: Uuid::nil(),
            user_name: "anonymous".to_string(),
            roles: Vec::new(),
            token: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_check_ignores_case() {
        let user =
            UserContext::new(Uuid::new_v4(), "alice").with_roles(vec!["Console.Admin".to_string()]);
        assert!(user.has_role("console.admin"));
        assert!(!user.has_role("console.operator"));
    }
}
