/// User document definitions
///
/// A user keeps everything tied to local (email + password) authentication
/// under `local`, the same shape the templates and helpers read from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Colors handed out to new accounts for avatars and member chips
pub const USER_COLORS: [&str; 8] = [
    "#1abc9c", "#3498db", "#9b59b6", "#e67e22", "#e74c3c", "#2ecc71", "#f1c40f", "#34495e",
];

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Internal document id (stored in the session)
    pub id: String,
    /// Local-strategy profile
    pub local: LocalProfile,
    pub created_at: DateTime<Utc>,
}

/// Profile and credentials for the local strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalProfile {
    /// Public handle used in profile URLs (e.g., "jdoe")
    pub userid: String,
    pub firstname: String,
    pub lastname: String,
    /// Login identifier, also what project member lists contain
    pub email: String,
    /// Argon2 PHC string
    pub password: String,
    #[serde(rename = "userColor")]
    pub user_color: String,
    /// `projectid`s of projects this user belongs to
    pub projects: Vec<String>,
}

/// Display shape of a project member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    /// "firstname lastname"
    pub name: String,
    pub email: String,
    pub color: String,
}

impl User {
    /// Create a fresh account document with a new internal id
    pub fn new(local: LocalProfile) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            local,
            created_at: Utc::now(),
        }
    }

    /// Project this user into the member list shape
    pub fn member_summary(&self) -> MemberSummary {
        MemberSummary {
            name: format!("{} {}", self.local.firstname, self.local.lastname),
            email: self.local.email.clone(),
            color: self.local.user_color.clone(),
        }
    }
}

/// Derive a userid candidate from an email's local part
///
/// Keeps ASCII alphanumerics only, lowercased. Falls back to "user".
pub fn userid_base(email: &str) -> String {
    let local_part = email.split('@').next().unwrap_or_default();
    let base: String = local_part
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if base.is_empty() {
        "user".to_string()
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> LocalProfile {
        LocalProfile {
            userid: "ada".into(),
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: "hash".into(),
            user_color: "#3498db".into(),
            projects: vec![],
        }
    }

    #[test]
    fn summary_joins_names() {
        let user = User::new(profile());
        assert_eq!(
            user.member_summary(),
            MemberSummary {
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                color: "#3498db".into(),
            }
        );
    }

    #[test]
    fn user_color_serializes_camel_case() {
        let json = serde_json::to_value(User::new(profile())).unwrap();
        assert_eq!(json["local"]["userColor"], "#3498db");
    }

    #[test]
    fn userid_base_strips_punctuation() {
        assert_eq!(userid_base("J.Doe+tag@example.com"), "jdoetag");
        assert_eq!(userid_base("@example.com"), "user");
    }
}
