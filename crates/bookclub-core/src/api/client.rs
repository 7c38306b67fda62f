//! Typed client for the book club REST API.
//!
//! `BookClub` maps each backend endpoint to one method. Public endpoints go
//! straight to the gateway; authenticated ones fail with
//! `ApiError::MissingToken` before touching the network when no token is
//! stored. Role checks are left to the backend (403).

use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::models::{
    Book, BookInput, BookQuery, BookReceipt, Favorite, FavoriteInput, Identifier,
    MeetingParticipants, MeetingRegistration, MyMeetings, Paginated, ProfileUpdate, Registration,
    RegistrationReceipt, Review, ReviewInput, Role, RoleChange, SendCodeResponse, UserProfile,
    UserSummary, VerifyRequest, VerifyResponse,
};

use super::{ApiError, Gateway, RequestOptions};

// ============================================================================
// Constants
// ============================================================================

/// Message for a verify-code response that carries no token
pub const ACCESS_TOKEN_MISSING: &str = "Access token missing from response";

#[derive(Debug, serde::Serialize)]
struct RoleInput {
    role: Role,
}

/// Some deployments answer `/books/current` with `{"book": ...}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CurrentBook {
    Bare(Option<Book>),
    Wrapped { book: Option<Book> },
}

/// Client for the book club backend.
/// Clone is cheap - the gateway shares its transport and token storage.
#[derive(Clone)]
pub struct BookClub {
    gateway: Gateway,
}

impl BookClub {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn has_token(&self) -> bool {
        self.gateway.token().is_present()
    }

    fn require_token(&self) -> Result<(), ApiError> {
        if self.has_token() {
            Ok(())
        } else {
            Err(ApiError::MissingToken)
        }
    }

    // ========================================================================
    // Books
    // ========================================================================

    /// The book of the month, if one is set
    pub async fn current_book(&self) -> Result<Option<Book>, ApiError> {
        let current: CurrentBook = self
            .gateway
            .request("/books/current", RequestOptions::get())
            .await?;
        Ok(match current {
            CurrentBook::Bare(book) | CurrentBook::Wrapped { book } => book,
        })
    }

    pub async fn books(&self, query: &BookQuery) -> Result<Paginated<Book>, ApiError> {
        let mut options = RequestOptions::get()
            .query("page", query.page)
            .query("limit", query.limit);
        if let Some(ref search) = query.search {
            options = options.query("search", search);
        }
        self.gateway.request("/books", options).await
    }

    pub async fn book(&self, id: i64) -> Result<Book, ApiError> {
        self.gateway
            .request(&format!("/books/{}", id), RequestOptions::get())
            .await
    }

    pub async fn create_book(&self, input: &BookInput) -> Result<BookReceipt, ApiError> {
        self.require_token()?;
        let options = RequestOptions::method(Method::POST).json(input)?;
        let receipt: BookReceipt = self.gateway.request("/books", options).await?;
        info!(id = receipt.id, title = %receipt.title, "Book created");
        Ok(receipt)
    }

    pub async fn update_book(&self, id: i64, input: &BookInput) -> Result<BookReceipt, ApiError> {
        self.require_token()?;
        let options = RequestOptions::method(Method::PUT).json(input)?;
        self.gateway.request(&format!("/books/{}", id), options).await
    }

    pub async fn delete_book(&self, id: i64) -> Result<(), ApiError> {
        self.require_token()?;
        self.gateway
            .execute(&format!("/books/{}", id), RequestOptions::method(Method::DELETE))
            .await?;
        info!(id, "Book deleted");
        Ok(())
    }

    /// Make a book the book of the month
    pub async fn set_current_book(&self, id: i64) -> Result<(), ApiError> {
        self.require_token()?;
        self.gateway
            .execute(
                &format!("/books/{}/set-current", id),
                RequestOptions::method(Method::PUT),
            )
            .await
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn register(&self, registration: &Registration) -> Result<RegistrationReceipt, ApiError> {
        let options = RequestOptions::method(Method::POST).json(registration)?;
        self.gateway.request("/register", options).await
    }

    /// Profile of the signed-in user
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.require_token()?;
        self.gateway.request("/me", RequestOptions::get()).await
    }

    pub async fn update_me(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.require_token()?;
        let options = RequestOptions::method(Method::PATCH).json(update)?;
        self.gateway.request("/me", options).await
    }

    pub async fn users(&self, page: u32, limit: u32) -> Result<Paginated<UserSummary>, ApiError> {
        self.require_token()?;
        let options = RequestOptions::get().query("page", page).query("limit", limit);
        self.gateway.request("/users", options).await
    }

    pub async fn user(&self, id: i64) -> Result<UserProfile, ApiError> {
        self.require_token()?;
        self.gateway
            .request(&format!("/users/{}", id), RequestOptions::get())
            .await
    }

    pub async fn update_user_role(&self, id: i64, role: Role) -> Result<RoleChange, ApiError> {
        self.require_token()?;
        let options = RequestOptions::method(Method::PUT).json(&RoleInput { role })?;
        let change: RoleChange = self
            .gateway
            .request(&format!("/users/{}/role", id), options)
            .await?;
        info!(id, role = %change.role, "User role changed");
        Ok(change)
    }

    // ========================================================================
    // Sign-in
    // ========================================================================

    /// Ask the backend to deliver a one-time code to the identifier
    pub async fn send_code(&self, identifier: &Identifier) -> Result<SendCodeResponse, ApiError> {
        let options = RequestOptions::method(Method::POST).json(identifier)?;
        let response: SendCodeResponse = self.gateway.request("/auth/send-code", options).await?;
        debug!(dev_mode = response.dev_mode, "Verification code requested");
        Ok(response)
    }

    /// Exchange a code for a session token and store it.
    pub async fn verify_code(&self, identifier: &Identifier, code: &str) -> Result<VerifyResponse, ApiError> {
        let body = VerifyRequest {
            identifier: identifier.clone(),
            code: code.trim().to_string(),
        };
        let options = RequestOptions::method(Method::POST).json(&body)?;
        let response: VerifyResponse = self.gateway.request("/auth/verify-code", options).await?;

        let token = response
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse(ACCESS_TOKEN_MISSING.to_string()))?;
        self.gateway.token().save(token).map_err(ApiError::storage)?;
        info!(user_id = ?response.user_id, "Signed in");
        Ok(response)
    }

    /// Forget the session token locally
    pub fn sign_out(&self) -> Result<(), ApiError> {
        self.gateway.token().clear().map_err(ApiError::storage)?;
        info!("Signed out");
        Ok(())
    }

    // ========================================================================
    // Meetings
    // ========================================================================

    pub async fn register_for_meeting(&self, book_id: i64) -> Result<MeetingRegistration, ApiError> {
        self.require_token()?;
        self.gateway
            .request(
                &format!("/meetings/register/{}", book_id),
                RequestOptions::method(Method::POST),
            )
            .await
    }

    pub async fn cancel_meeting(&self, book_id: i64) -> Result<(), ApiError> {
        self.require_token()?;
        self.gateway
            .execute(
                &format!("/meetings/register/{}", book_id),
                RequestOptions::method(Method::DELETE),
            )
            .await
    }

    pub async fn my_meetings(&self) -> Result<MyMeetings, ApiError> {
        self.require_token()?;
        self.gateway.request("/meetings/my", RequestOptions::get()).await
    }

    /// Whether the signed-in user is registered for the book's meeting.
    /// No token or any failure reads as "not registered".
    pub async fn is_registered_for(&self, book_id: i64) -> bool {
        if !self.has_token() {
            return false;
        }
        match self.my_meetings().await {
            Ok(meetings) => meetings.contains_book(book_id),
            Err(e) => {
                warn!(book_id, error = %e, "Could not check meeting registration");
                false
            }
        }
    }

    pub async fn meeting_participants(&self, book_id: i64) -> Result<MeetingParticipants, ApiError> {
        self.require_token()?;
        self.gateway
            .request(
                &format!("/meetings/{}/participants", book_id),
                RequestOptions::get(),
            )
            .await
    }

    // ========================================================================
    // Favorites & reviews
    // ========================================================================

    pub async fn add_favorite(&self, book_id: i64) -> Result<Favorite, ApiError> {
        self.require_token()?;
        let options = RequestOptions::method(Method::POST).json(&FavoriteInput { book_id })?;
        self.gateway.request("/favorites", options).await
    }

    pub async fn favorites(&self, page: u32, limit: u32) -> Result<Paginated<Favorite>, ApiError> {
        self.require_token()?;
        let options = RequestOptions::get().query("page", page).query("limit", limit);
        self.gateway.request("/favorites", options).await
    }

    pub async fn remove_favorite(&self, book_id: i64) -> Result<(), ApiError> {
        self.require_token()?;
        self.gateway
            .execute(
                &format!("/favorites/{}", book_id),
                RequestOptions::method(Method::DELETE),
            )
            .await
    }

    pub async fn add_review(&self, book_id: i64, input: &ReviewInput) -> Result<Review, ApiError> {
        if !input.rating_in_range() {
            return Err(ApiError::InvalidRequest(format!(
                "Rating must be between 1 and 5, got {}",
                input.rating
            )));
        }
        self.require_token()?;
        let options = RequestOptions::method(Method::POST).json(input)?;
        self.gateway
            .request(&format!("/books/{}/reviews", book_id), options)
            .await
    }

    /// Newest reviews first
    pub async fn reviews(&self, book_id: i64, page: u32, limit: u32) -> Result<Paginated<Review>, ApiError> {
        let options = RequestOptions::get().query("page", page).query("limit", limit);
        self.gateway
            .request(&format!("/books/{}/reviews", book_id), options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::AUTHORIZATION;
    use serde_json::json;

    use super::*;
    use crate::api::testing::harness;
    use crate::api::MISSING_TOKEN_MESSAGE;
    use crate::auth::TokenStore;

    fn sent_json(request: &crate::api::HttpRequest) -> serde_json::Value {
        match request.body {
            Some(crate::api::Body::Json(ref text)) => serde_json::from_str(text).unwrap(),
            ref other => panic!("unexpected body {:?}", other),
        }
    }

    fn book_input() -> BookInput {
        BookInput {
            title: "Solaris".to_string(),
            author: "Stanislaw Lem".to_string(),
            date: "2025-04-10".to_string(),
            location: "Cafe".to_string(),
            description: None,
        }
    }

    fn profile_json() -> serde_json::Value {
        json!({
            "id": 5, "first_name": "Anna", "last_name": "Karenina", "email": "anna@example.com",
            "phone": "+79991234567", "birth_date": "1990-05-01", "role": "user",
            "fav_authors": ["a", "b", "c"], "fav_genres": ["d", "e", "f"],
            "fav_books": ["g", "h", "i"], "discuss_books": ["j", "k", "l"]
        })
    }

    #[tokio::test]
    async fn test_me_without_token_never_hits_network() {
        let h = harness("profile");
        let err = h.client().me().await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
        assert_eq!(err.message(), MISSING_TOKEN_MESSAGE);
        assert_eq!(err.status(), None);
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_book_without_token_fails_locally() {
        let h = harness("admin");
        let err = h.client().delete_book(3).await.unwrap_err();
        assert!(err.message().contains("token not found"));
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_verify_then_me_uses_new_token() {
        let h = harness("auth");
        let client = h.client();
        h.transport.push_json(
            200,
            json!({ "access_token": "tok-123", "token_type": "bearer", "user_id": 5, "expires_in": 3600 }),
        );
        h.transport.push_json(200, profile_json());

        let identifier = Identifier::Email("anna@example.com".to_string());
        let verified = client.verify_code(&identifier, " 123456 ").await.unwrap();
        assert_eq!(verified.access_token.as_deref(), Some("tok-123"));
        assert_eq!(h.tokens.get("auth_token").unwrap().as_deref(), Some("tok-123"));

        let requests = h.transport.requests();
        let sent: serde_json::Value = match requests[0].body {
            Some(crate::api::Body::Json(ref text)) => serde_json::from_str(text).unwrap(),
            ref other => panic!("unexpected body {:?}", other),
        };
        assert_eq!(sent, json!({ "email": "anna@example.com", "code": "123456" }));

        let me = client.me().await.unwrap();
        assert_eq!(me.first_name, "Anna");
        let last = h.transport.last_request();
        assert_eq!(last.headers.get(AUTHORIZATION).unwrap(), "Bearer tok-123");
    }

    #[tokio::test]
    async fn test_verify_without_token_in_response() {
        let h = harness("auth");
        h.transport.push_json(200, json!({ "message": "ok" }));
        let err = h
            .client()
            .verify_code(&Identifier::Phone("+79991234567".to_string()), "1111")
            .await
            .unwrap_err();
        assert!(err.message().contains(ACCESS_TOKEN_MISSING));
        assert!(h.tokens.get("auth_token").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_profile_fetch_is_stable() {
        let h = harness("profile");
        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_json(200, profile_json());
        h.transport.push_json(200, profile_json());
        let client = h.client();
        let first = client.me().await.unwrap();
        let second = client.me().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_books_sends_paging_and_search() {
        let h = harness("index");
        h.transport.push_json(
            200,
            json!({ "page": 2, "limit": 5, "total": 6, "pages": 2, "items": [] }),
        );
        let query = BookQuery::page(2, 5).with_search("Lem");
        let page = h.client().books(&query).await.unwrap();
        assert_eq!(page.page, 2);
        assert!(page.has_prev());
        assert_eq!(
            h.transport.last_request().url.as_str(),
            "http://localhost:8000/books?page=2&limit=5&search=Lem"
        );
    }

    #[tokio::test]
    async fn test_current_book_accepts_both_shapes() {
        let h = harness("index");
        let book = json!({ "id": 1, "title": "Dune", "author": "Herbert", "date": "2025-03-14", "location": "Library" });
        h.transport.push_json(200, book.clone());
        h.transport.push_json(200, json!({ "book": book }));
        h.transport.push_raw(200, b"null".to_vec());
        let client = h.client();
        assert_eq!(client.current_book().await.unwrap().unwrap().id, 1);
        assert_eq!(client.current_book().await.unwrap().unwrap().title, "Dune");
        assert!(client.current_book().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_meeting_no_content() {
        let h = harness("index");
        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_raw(204, Vec::new());
        h.client().cancel_meeting(7).await.unwrap();
        let request = h.transport.last_request();
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.url.path(), "/meetings/register/7");
    }

    #[tokio::test]
    async fn test_is_registered_for() {
        let h = harness("index");
        let client = h.client();
        assert!(!client.is_registered_for(7).await);
        assert_eq!(h.transport.request_count(), 0);

        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_json(
            200,
            json!({ "items": [{ "id": 1, "book_id": 7, "book_title": "Dune", "book_author": "Herbert" }] }),
        );
        assert!(client.is_registered_for(7).await);

        h.transport.push_json(500, json!({ "detail": "boom" }));
        assert!(!client.is_registered_for(7).await);
    }

    #[tokio::test]
    async fn test_role_change_sends_lowercase_role() {
        let h = harness("admin");
        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_json(
            200,
            json!({ "message": "Role updated", "id": 9, "email": "x@y.z", "role": "admin" }),
        );
        let change = h.client().update_user_role(9, Role::Admin).await.unwrap();
        assert_eq!(change.role, Role::Admin);
        match h.transport.last_request().body {
            Some(crate::api::Body::Json(text)) => assert_eq!(text, r#"{"role":"admin"}"#),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_review_rating_checked_locally() {
        let h = harness("index");
        h.tokens.set("auth_token", "tok").unwrap();
        let input = ReviewInput { rating: 6, comment: None };
        let err = h.client().add_review(1, &input).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_book_detail() {
        let h = harness("index");
        h.transport.push_json(
            200,
            json!({ "id": 4, "title": "Dune", "author": "Herbert", "date": "2025-03-14",
                    "location": "Library", "description": null, "avg_rating": 4.0 }),
        );
        let book = h.client().book(4).await.unwrap();
        assert_eq!(book.rating_display(), "4.0/5");
        let request = h.transport.last_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.path(), "/books/4");
        assert!(request.headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_create_book() {
        let h = harness("admin");
        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_json(
            201,
            json!({ "message": "created", "id": 12, "title": "Solaris", "author": "Stanislaw Lem",
                    "date": "2025-04-10", "location": "Cafe", "description": null }),
        );
        let receipt = h.client().create_book(&book_input()).await.unwrap();
        assert_eq!(receipt.id, 12);
        let request = h.transport.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.path(), "/books");
        assert_eq!(
            sent_json(&request),
            json!({ "title": "Solaris", "author": "Stanislaw Lem", "date": "2025-04-10",
                    "location": "Cafe", "description": null })
        );
    }

    #[tokio::test]
    async fn test_update_book() {
        let h = harness("admin");
        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_json(
            200,
            json!({ "message": "updated", "id": 12, "title": "Solaris", "author": "Stanislaw Lem",
                    "date": "2025-04-10", "location": "Cafe", "description": "Ocean" }),
        );
        let receipt = h.client().update_book(12, &book_input()).await.unwrap();
        assert_eq!(receipt.description.as_deref(), Some("Ocean"));
        let request = h.transport.last_request();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.url.path(), "/books/12");
        assert_eq!(sent_json(&request)["title"], "Solaris");
    }

    #[tokio::test]
    async fn test_set_current_book() {
        let h = harness("admin");
        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_json(200, json!({ "message": "ok", "id": 12 }));
        h.client().set_current_book(12).await.unwrap();
        let request = h.transport.last_request();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.url.path(), "/books/12/set-current");
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_register() {
        let h = harness("register");
        h.transport.push_json(201, json!({ "message": "welcome", "user_id": 31 }));
        let registration = Registration {
            first_name: "Anna".to_string(),
            last_name: "Karenina".to_string(),
            email: "anna@example.com".to_string(),
            phone: None,
            birth_date: Some("1990-05-01".to_string()),
            fav_authors: vec!["a".into(), "b".into(), "c".into()],
            fav_genres: vec!["d".into(), "e".into(), "f".into()],
            fav_books: vec!["g".into(), "h".into(), "i".into()],
            discuss_books: vec!["j".into(), "k".into(), "l".into()],
        };
        let receipt = h.client().register(&registration).await.unwrap();
        assert_eq!(receipt.user_id, 31);
        let request = h.transport.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.path(), "/register");
        let sent = sent_json(&request);
        assert_eq!(sent["email"], "anna@example.com");
        assert_eq!(sent["phone"], serde_json::Value::Null);
        assert_eq!(sent["fav_genres"], json!(["d", "e", "f"]));
    }

    #[tokio::test]
    async fn test_update_me() {
        let h = harness("profile");
        h.tokens.set("auth_token", "tok").unwrap();
        let mut updated = profile_json();
        updated["message"] = json!("saved");
        updated["phone"] = json!("+79990000000");
        h.transport.push_json(200, updated);
        let update = ProfileUpdate {
            phone: Some("+79990000000".to_string()),
            ..ProfileUpdate::default()
        };
        let profile = h.client().update_me(&update).await.unwrap();
        assert_eq!(profile.phone.as_deref(), Some("+79990000000"));
        let request = h.transport.last_request();
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.url.path(), "/me");
        assert_eq!(sent_json(&request), json!({ "phone": "+79990000000" }));
    }

    #[tokio::test]
    async fn test_users_page() {
        let h = harness("admin");
        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_json(
            200,
            json!({ "page": 1, "limit": 10, "total": 1, "pages": 1, "items": [
                { "id": 5, "first_name": "Anna", "last_name": "Karenina", "email": "anna@example.com",
                  "phone": null, "birth_date": null, "role": "admin" }
            ]}),
        );
        let users = h.client().users(1, 10).await.unwrap();
        assert_eq!(users.items[0].role, Role::Admin);
        assert_eq!(users.items[0].full_name(), "Anna Karenina");
        assert_eq!(
            h.transport.last_request().url.as_str(),
            "http://localhost:8000/users?page=1&limit=10"
        );
    }

    #[tokio::test]
    async fn test_user_detail() {
        let h = harness("admin");
        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_json(200, profile_json());
        let user = h.client().user(5).await.unwrap();
        assert_eq!(user.fav_books.len(), 3);
        let request = h.transport.last_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.path(), "/users/5");
    }

    #[tokio::test]
    async fn test_register_for_meeting() {
        let h = harness("index");
        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_json(
            201,
            json!({ "message": "registered", "id": 8, "user_id": 5, "book_id": 7,
                    "registered_at": "2025-03-01T10:00:00", "status": "registered",
                    "book_title": "Dune", "book_date": "2025-03-14", "book_location": "Library" }),
        );
        let registration = h.client().register_for_meeting(7).await.unwrap();
        assert_eq!(registration.book_title.as_deref(), Some("Dune"));
        let request = h.transport.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.path(), "/meetings/register/7");
        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
    }

    #[tokio::test]
    async fn test_meeting_participants() {
        let h = harness("admin");
        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_json(
            200,
            json!({ "book_id": 7, "book_title": "Dune", "book_date": "2025-03-14",
                    "book_location": "Library", "total_participants": 2, "participants": [
                { "registration_id": 1, "user_id": 5, "user_name": "Anna Karenina",
                  "user_email": "anna@example.com", "user_phone": null, "registered_at": "2025-03-01T10:00:00" },
                { "registration_id": 2, "user_id": 6, "user_name": "Ivan",
                  "user_email": "ivan@example.com", "user_phone": "+79991234567", "registered_at": null }
            ]}),
        );
        let participants = h.client().meeting_participants(7).await.unwrap();
        assert_eq!(participants.total_participants, 2);
        assert_eq!(participants.participants[1].user_phone.as_deref(), Some("+79991234567"));
        assert_eq!(h.transport.last_request().url.path(), "/meetings/7/participants");
    }

    #[tokio::test]
    async fn test_add_favorite() {
        let h = harness("index");
        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_json(
            201,
            json!({ "message": "added", "id": 3, "user_id": 5, "book_id": 7,
                    "created_at": "2025-03-01T10:00:00" }),
        );
        let favorite = h.client().add_favorite(7).await.unwrap();
        assert_eq!(favorite.id, 3);
        assert!(favorite.book.is_none());
        let request = h.transport.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.path(), "/favorites");
        assert_eq!(sent_json(&request), json!({ "book_id": 7 }));
    }

    #[tokio::test]
    async fn test_favorites_page() {
        let h = harness("profile");
        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_json(
            200,
            json!({ "page": 1, "limit": 50, "total": 1, "pages": 1, "items": [
                { "id": 3, "created_at": "2025-03-01T10:00:00", "book": {
                    "id": 7, "title": "Dune", "author": "Herbert", "date": "2025-03-14",
                    "location": "Library", "description": null } }
            ]}),
        );
        let favorites = h.client().favorites(1, 50).await.unwrap();
        assert_eq!(favorites.items[0].book.as_ref().unwrap().title, "Dune");
        assert_eq!(
            h.transport.last_request().url.as_str(),
            "http://localhost:8000/favorites?page=1&limit=50"
        );
    }

    #[tokio::test]
    async fn test_remove_favorite() {
        let h = harness("profile");
        h.tokens.set("auth_token", "tok").unwrap();
        h.transport.push_raw(204, Vec::new());
        h.client().remove_favorite(7).await.unwrap();
        let request = h.transport.last_request();
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.url.path(), "/favorites/7");
    }

    #[tokio::test]
    async fn test_reviews_page() {
        let h = harness("index");
        h.transport.push_json(
            200,
            json!({ "page": 1, "limit": 10, "total": 1, "pages": 1, "items": [
                { "id": 2, "user_id": 5, "book_id": 3, "rating": 4, "comment": "Great",
                  "created_at": "2025-03-20T18:00:00" }
            ]}),
        );
        let reviews = h.client().reviews(3, 1, 10).await.unwrap();
        assert_eq!(reviews.total, 1);
        assert_eq!(reviews.items[0].stars(), "★★★★☆");
        assert_eq!(reviews.items[0].comment.as_deref(), Some("Great"));
        let request = h.transport.last_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.as_str(), "http://localhost:8000/books/3/reviews?page=1&limit=10");
    }

    #[tokio::test]
    async fn test_sign_out_clears_token() {
        let h = harness("profile");
        h.tokens.set("auth_token", "tok").unwrap();
        let client = h.client();
        assert!(client.has_token());
        client.sign_out().unwrap();
        assert!(!client.has_token());
    }
}
