//! Back-office admin account.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ambre_core::{AdminId, Email};

/// An admin account.
///
/// The password hash never leaves the repository layer; this model is safe
/// to serialize into profile responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: AdminId,
    pub username: String,
    pub email: Email,
    pub name: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The public subset returned from register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AdminSummary {
    pub id: AdminId,
    pub name: String,
    pub email: Email,
    pub username: String,
}

impl From<&Admin> for AdminSummary {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.name.clone(),
            email: admin.email.clone(),
            username: admin.username.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_serialization_has_no_password_field() {
        let admin = Admin {
            id: AdminId::new(1),
            username: "admin".to_string(),
            email: Email::parse("admin@ambre.example").unwrap(),
            name: "Store Admin".to_string(),
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&admin).unwrap();
        assert_eq!(json["username"], "admin");
        assert_eq!(json["lastLogin"], serde_json::Value::Null);
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_summary_subset() {
        let admin = Admin {
            id: AdminId::new(2),
            username: "aria".to_string(),
            email: Email::parse("aria@ambre.example").unwrap(),
            name: "Aria".to_string(),
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let summary = AdminSummary::from(&admin);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json.as_object().unwrap().keys().count(),
            4,
            "summary exposes exactly id, name, email, username"
        );
    }
}
