use serde::{Deserialize, Serialize};

/// Confirmation returned when signing up for a meeting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRegistration {
    #[serde(default)]
    pub message: String,
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    #[serde(default)]
    pub registered_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub book_title: Option<String>,
    #[serde(default)]
    pub book_date: Option<String>,
    #[serde(default)]
    pub book_location: Option<String>,
}

/// A meeting the current user is registered for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyMeeting {
    pub id: i64,
    pub book_id: i64,
    #[serde(default)]
    pub registered_at: Option<String>,
    #[serde(default)]
    pub book_title: String,
    #[serde(default)]
    pub book_author: String,
    #[serde(default)]
    pub book_date: Option<String>,
    #[serde(default)]
    pub book_location: Option<String>,
    #[serde(default)]
    pub book_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MyMeetings {
    #[serde(default)]
    pub items: Vec<MyMeeting>,
}

impl MyMeetings {
    pub fn contains_book(&self, book_id: i64) -> bool {
        self.items.iter().any(|m| m.book_id == book_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub registration_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_phone: Option<String>,
    #[serde(default)]
    pub registered_at: Option<String>,
}

/// Admin view of who signed up for a meeting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingParticipants {
    pub book_id: i64,
    #[serde(default)]
    pub book_title: String,
    #[serde(default)]
    pub book_date: Option<String>,
    #[serde(default)]
    pub book_location: Option<String>,
    #[serde(default)]
    pub total_participants: u64,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_my_meetings_contains_book() {
        let meetings: MyMeetings = serde_json::from_value(json!({
            "items": [
                { "id": 1, "book_id": 7, "registered_at": "2024-03-01T10:00:00",
                  "book_title": "Dune", "book_author": "Herbert" }
            ]
        }))
        .unwrap();
        assert!(meetings.contains_book(7));
        assert!(!meetings.contains_book(8));
    }

    #[test]
    fn test_parse_participants() {
        let parsed: MeetingParticipants = serde_json::from_value(json!({
            "book_id": 7, "book_title": "Dune", "book_date": "2024-04-01", "book_location": "Library",
            "total_participants": 1,
            "participants": [{ "registration_id": 3, "user_id": 9, "user_name": "Anna K",
                               "user_email": "anna@example.com", "user_phone": null,
                               "registered_at": "2024-03-01T10:00:00" }]
        }))
        .unwrap();
        assert_eq!(parsed.total_participants, 1);
        assert_eq!(parsed.participants[0].user_name, "Anna K");
    }
}
