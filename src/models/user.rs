use serde::{Deserialize, Serialize};

/// Profile snapshot returned by the auth endpoints and kept alongside the
/// session token. Not refreshed until the next login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Reporter/assignee snapshot embedded in issue responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
}

/// Entry in the `/users` listing, used for assignee selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_profile_without_roles() {
        let json = r#"{"id": 7, "username": "bob", "fullName": "Bob Example", "email": "bob@example.com"}"#;
        let profile: UserProfile = serde_json::from_str(json).expect("Failed to parse profile");
        assert_eq!(profile.username, "bob");
        assert_eq!(profile.full_name, "Bob Example");
        assert!(profile.roles.is_empty());
    }

    #[test]
    fn parse_profile_with_roles() {
        let json = r#"{"id": 7, "username": "bob", "fullName": "Bob Example", "email": "bob@example.com", "roles": ["ADMIN"]}"#;
        let profile: UserProfile = serde_json::from_str(json).expect("Failed to parse profile");
        assert_eq!(profile.roles, vec!["ADMIN".to_string()]);
    }
}
