//! Wire types for the book club backend.

pub mod book;
pub mod favorite;
pub mod meeting;
pub mod review;
pub mod sign_in;
pub mod user;

pub use book::{Book, BookInput, BookQuery, BookReceipt, Paginated};
pub use favorite::Favorite;
pub(crate) use favorite::FavoriteInput;
pub use meeting::{MeetingParticipants, MeetingRegistration, MyMeeting, MyMeetings, Participant};
pub use review::{Review, ReviewInput, MAX_RATING, MIN_RATING};
pub use sign_in::{Identifier, SendCodeResponse, VerifyRequest, VerifyResponse};
pub use user::{
    ProfileUpdate, Registration, RegistrationReceipt, Role, RoleChange, UserProfile, UserSummary,
};
