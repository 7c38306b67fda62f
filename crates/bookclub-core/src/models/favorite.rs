use serde::{Deserialize, Serialize};

use super::Book;

/// A bookmarked book. The book is `None` when it has since been deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    #[serde(default)]
    pub book: Option<Book>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct FavoriteInput {
    pub book_id: i64,
}
