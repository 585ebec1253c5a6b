//! Identity directory access
//!
//! The directory is owned by the identity provider; this service only lists
//! its users.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("failed to read directory export: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse directory export: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A user as listed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryUser {
    pub username: String,
    /// Provider attributes such as `given_name` or `custom:payroll_number`
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl DirectoryUser {
    pub fn new<'a>(
        username: impl Into<String>,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            username: username.into(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Listing of the identity directory's users.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError>;
}

/// Directory held in memory, typically loaded from a JSON export.
#[derive(Debug, Clone, Default)]
pub struct StaticStaffDirectory {
    users: Vec<DirectoryUser>,
}

impl StaticStaffDirectory {
    pub fn new(users: Vec<DirectoryUser>) -> Self {
        Self { users }
    }

    /// Loads a JSON array of users.
    pub async fn from_file(path: &Path) -> Result<Self, DirectoryError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let users: Vec<DirectoryUser> = serde_json::from_str(&raw)?;
        info!(
            users = users.len(),
            path = %path.display(),
            "Staff directory loaded"
        );
        Ok(Self::new(users))
    }
}

#[async_trait]
impl StaffDirectory for StaticStaffDirectory {
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError> {
        Ok(self.users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_user_deserialize() {
        let json = r#"[{"username": "jsmith", "attributes": {"given_name": "Jo", "custom:payroll_number": "1042"}}]"#;
        let users: Vec<DirectoryUser> = serde_json::from_str(json).unwrap();
        assert_eq!(users[0].attribute("given_name"), Some("Jo"));
        assert_eq!(users[0].attribute("custom:payroll_number"), Some("1042"));
        assert_eq!(users[0].attribute("family_name"), None);
    }

    #[tokio::test]
    async fn test_from_missing_file() {
        let result = StaticStaffDirectory::from_file(Path::new("/nonexistent/staff.json")).await;
        assert!(matches!(result, Err(DirectoryError::Io(_))));
    }
}
