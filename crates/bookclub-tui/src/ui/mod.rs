//! Terminal UI module using ratatui.
//!
//! - `render`: Main frame rendering and layout
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `pages`: Page-specific content (home, sign-in, registration, profile, admin)

pub mod input;
pub mod pages;
pub mod render;
pub mod styles;
