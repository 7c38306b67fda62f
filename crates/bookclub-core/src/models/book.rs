use serde::{Deserialize, Serialize};

/// A book of the month. Each book is also a club meeting: it carries the
/// meeting date and location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avg_rating: Option<f64>,
}

impl Book {
    /// "Title - Author"
    pub fn headline(&self) -> String {
        format!("{} - {}", self.title, self.author)
    }

    pub fn rating_display(&self) -> String {
        match self.avg_rating {
            Some(rating) => format!("{:.1}/5", rating),
            None => "no ratings".to_string(),
        }
    }
}

/// Body for creating or replacing a book
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub date: String,
    pub location: String,
    pub description: Option<String>,
}

impl From<&Book> for BookInput {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            date: book.date.clone(),
            location: book.location.clone(),
            description: book.description.clone(),
        }
    }
}

/// Response to create/update: the stored book plus a confirmation message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookReceipt {
    #[serde(default)]
    pub message: Option<String>,
    pub id: i64,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Listing filter for the books endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct BookQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl Default for BookQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
        }
    }
}

impl BookQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search: None,
        }
    }

    /// Blank search text means no filter
    pub fn with_search(mut self, search: &str) -> Self {
        let trimmed = search.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
    pub items: Vec<T>,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            total: 0,
            pages: 0,
            items: Vec::new(),
        }
    }
}

impl<T> Paginated<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_books_page() {
        let json = r#"{"page": 1, "limit": 10, "total": 2, "pages": 1, "items": [
            {"id": 7, "title": "Dune", "author": "Frank Herbert", "date": "2025-03-14", "location": "Library", "description": null, "avg_rating": 4.5},
            {"id": 6, "title": "Solaris", "author": "Stanislaw Lem", "date": "2025-02-10", "location": "Cafe", "description": "Ocean", "avg_rating": null}
        ]}"#;
        let page: Paginated<Book> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].rating_display(), "4.5/5");
        assert_eq!(page.items[1].rating_display(), "no ratings");
        assert!(!page.has_next());
        assert!(!page.has_prev());
    }

    #[test]
    fn test_book_query_blank_search_is_none() {
        assert_eq!(BookQuery::default().with_search("   ").search, None);
        assert_eq!(
            BookQuery::default().with_search(" Lem ").search.as_deref(),
            Some("Lem")
        );
    }

    #[test]
    fn test_book_input_from_book() {
        let book = Book {
            id: 1,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            date: "2025-03-14".to_string(),
            location: "Library".to_string(),
            description: None,
            avg_rating: Some(5.0),
        };
        let input = BookInput::from(&book);
        assert_eq!(input.title, "Dune");
        assert_eq!(input.location, "Library");
        assert_eq!(book.headline(), "Dune - Frank Herbert");
    }
}
