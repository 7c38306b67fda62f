use serde::{Deserialize, Serialize};

/// Who is signing in: an email address or a phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Identifier {
    Email(String),
    Phone(String),
}

impl Identifier {
    /// Classify raw input: anything containing `@` is an email.
    pub fn parse(input: &str) -> Identifier {
        let input = input.trim();
        if input.contains('@') {
            Identifier::Email(input.to_string())
        } else {
            Identifier::Phone(input.to_string())
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Identifier::Email(v) | Identifier::Phone(v) => v,
        }
    }

    pub fn is_email(&self) -> bool {
        matches!(self, Identifier::Email(_))
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Body of `/auth/verify-code`: the identifier plus the received code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyRequest {
    #[serde(flatten)]
    pub identifier: Identifier,
    pub code: String,
}

/// Response to `/auth/send-code`. A backend in development mode echoes
/// the code back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendCodeResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub dev_mode: bool,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_classification() {
        assert!(Identifier::parse(" anna@example.com ").is_email());
        assert_eq!(
            Identifier::parse("+7 999 123 45 67"),
            Identifier::Phone("+7 999 123 45 67".to_string())
        );
    }

    #[test]
    fn test_identifier_serializes_as_single_field() {
        let body = serde_json::to_value(Identifier::Email("a@b.co".to_string())).unwrap();
        assert_eq!(body, json!({ "email": "a@b.co" }));

        let verify = VerifyRequest {
            identifier: Identifier::Phone("+79991234567".to_string()),
            code: "123456".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&verify).unwrap(),
            json!({ "phone": "+79991234567", "code": "123456" })
        );
    }

    #[test]
    fn test_send_code_dev_mode() {
        let parsed: SendCodeResponse =
            serde_json::from_value(json!({ "message": "sent", "dev_mode": true, "code": "4821" })).unwrap();
        assert!(parsed.dev_mode);
        assert_eq!(parsed.code.as_deref(), Some("4821"));

        let parsed: SendCodeResponse = serde_json::from_value(json!({ "message": "sent" })).unwrap();
        assert!(!parsed.dev_mode);
        assert!(parsed.code.is_none());
    }
}
