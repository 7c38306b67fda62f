//! Core library for the book club client.
//!
//! Holds everything below the screens: the request gateway and typed API
//! client, session token storage, configuration, form validation, page
//! routing and the per-page session context.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod navigation;
pub mod pagination;
pub mod session;
pub mod utils;
pub mod validation;

pub use api::{ApiError, BookClub, Gateway, GatewayConfig, HttpTransport, RequestOptions};
pub use config::Config;
pub use navigation::{DetachedNavigator, Navigator, Page, Route};
pub use pagination::{PageCursor, RequestTracker, Ticket};
pub use session::PageSession;
pub use validation::{Field, ValidationErrors};
