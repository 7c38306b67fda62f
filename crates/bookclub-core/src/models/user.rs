use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[serde(alias = "USER", alias = "User")]
    User,
    #[serde(alias = "ADMIN", alias = "Admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// The other role, for one-key promote/demote
    pub fn toggled(&self) -> Role {
        match self {
            Role::User => Role::Admin,
            Role::Admin => Role::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full profile as returned by `/me` and `/users/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub fav_authors: Vec<String>,
    #[serde(default)]
    pub fav_genres: Vec<String>,
    #[serde(default)]
    pub fav_books: Vec<String>,
    #[serde(default)]
    pub discuss_books: Vec<String>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Name for the navigation bar: first name, else email, else "Profile"
    pub fn display_name(&self) -> &str {
        if !self.first_name.trim().is_empty() {
            &self.first_name
        } else if !self.email.trim().is_empty() {
            &self.email
        } else {
            "Profile"
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Row in the admin users listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl UserSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Membership application submitted from the registration form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub fav_authors: Vec<String>,
    pub fav_genres: Vec<String>,
    pub fav_books: Vec<String>,
    pub discuss_books: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    #[serde(default)]
    pub message: String,
    pub user_id: i64,
}

/// Partial profile update; `None` fields are left untouched by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fav_authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fav_genres: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fav_books: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discuss_books: Option<Vec<String>>,
}

/// Response to a role change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleChange {
    #[serde(default)]
    pub message: String,
    pub id: i64,
    #[serde(default)]
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_is_case_tolerant() {
        let role: Role = serde_json::from_str(r#""ADMIN""#).unwrap();
        assert_eq!(role, Role::Admin);
        let role: Role = serde_json::from_str(r#""user""#).unwrap();
        assert_eq!(role, Role::User);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
        assert_eq!(Role::Admin.toggled(), Role::User);
    }

    #[test]
    fn test_parse_profile() {
        let json = r#"{"id": 3, "first_name": "Anna", "last_name": "K", "email": "anna@example.com",
            "phone": null, "birth_date": "1990-05-01", "role": "admin",
            "fav_authors": ["Tolstoy", "Chekhov", "Bulgakov"], "fav_genres": [], "fav_books": [], "discuss_books": []}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert!(profile.is_admin());
        assert_eq!(profile.full_name(), "Anna K");
        assert_eq!(profile.fav_authors.len(), 3);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut profile: UserProfile =
            serde_json::from_str(r#"{"id": 1, "email": "reader@example.com"}"#).unwrap();
        assert_eq!(profile.display_name(), "reader@example.com");
        profile.email.clear();
        assert_eq!(profile.display_name(), "Profile");
        profile.first_name = "Ivan".to_string();
        assert_eq!(profile.display_name(), "Ivan");
    }

    #[test]
    fn test_profile_update_skips_untouched_fields() {
        let update = ProfileUpdate {
            first_name: Some("Anna".to_string()),
            fav_genres: Some(vec!["Drama".to_string()]),
            ..ProfileUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "first_name": "Anna", "fav_genres": ["Drama"] }));
    }
}
