/// Project document definitions
///
/// A project is identified publicly by its `projectid` (the slug used in
/// URLs) and internally by `id`. Membership is a list of member emails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project and its member list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Internal document id
    pub id: String,
    /// URL-safe project identifier (e.g., "apollo")
    pub projectid: String,
    /// Human-readable project name
    pub name: String,
    /// Emails of the project's members
    pub members: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Create a project whose only member is `owner_email`
    pub fn new(projectid: impl Into<String>, name: impl Into<String>, owner_email: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            projectid: projectid.into(),
            name: name.into(),
            members: vec![owner_email.to_string()],
            created_at: Utc::now(),
        }
    }
}

/// Whether `projectid` is usable as a URL path segment
pub fn is_valid_projectid(projectid: &str) -> bool {
    !projectid.is_empty()
        && projectid.len() <= 64
        && projectid
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
