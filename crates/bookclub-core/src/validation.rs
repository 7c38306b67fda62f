//! Local form checks run before any request is made.
//!
//! Every check reports per-field errors so a screen can show them inline.
//! A form that passes converts into the wire model it submits.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::models::{BookInput, Identifier, ProfileUpdate, Registration, ReviewInput};

// ============================================================================
// Constants
// ============================================================================

/// Entries required in each favourites group on the registration form
pub const GROUP_SIZE: usize = 3;

pub const MIN_AGE: i32 = 5;
pub const MAX_AGE: i32 = 120;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    FirstName,
    LastName,
    Email,
    Phone,
    BirthDate,
    Genres,
    Authors,
    Books,
    DiscussBooks,
    Title,
    Author,
    Date,
    Location,
    Description,
    Identifier,
    Code,
    Rating,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::FirstName => "First name",
            Field::LastName => "Last name",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::BirthDate => "Birth date",
            Field::Genres => "Favourite genres",
            Field::Authors => "Favourite authors",
            Field::Books => "Favourite books",
            Field::DiscussBooks => "Books to discuss",
            Field::Title => "Title",
            Field::Author => "Author",
            Field::Date => "Date",
            Field::Location => "Location",
            Field::Description => "Description",
            Field::Identifier => "Email or phone",
            Field::Code => "Code",
            Field::Rating => "Rating",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// All problems found in one form
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", summary(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field.label(), e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First message recorded for a field
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn has(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

// ============================================================================
// Field checks
// ============================================================================

/// `something@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Needs some dot with at least one character on each side
    domain
        .match_indices('.')
        .any(|(dot, _)| dot > 0 && dot < domain.len() - 1)
}

/// Split a full name into first name (first word) and last name (the rest).
pub fn split_name(full_name: &str) -> (String, String) {
    let mut words = full_name.split_whitespace();
    let first = words.next().unwrap_or_default().to_string();
    let last = words.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Strip the formatting characters people type into phone numbers
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect()
}

/// Russian numbers (`+7` or `8` then 10 digits) or any international
/// number of 10 to 15 digits after `+`.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone = normalize_phone(phone);
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    if let Some(rest) = phone.strip_prefix("+7") {
        if rest.len() == 10 && all_digits(rest) {
            return true;
        }
    }
    if let Some(rest) = phone.strip_prefix('8') {
        if rest.len() == 10 && all_digits(rest) {
            return true;
        }
    }
    match phone.strip_prefix('+') {
        Some(rest) => (10..=15).contains(&rest.len()) && all_digits(rest),
        None => false,
    }
}

/// Parse a `YYYY-MM-DD` birth date that is not in the future and gives an
/// age between 5 and 120 on `today`.
pub fn parse_birth_date(text: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| "Use the YYYY-MM-DD format".to_string())?;
    if date > today {
        return Err("Birth date cannot be in the future".to_string());
    }
    let age = age_on(date, today);
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(format!("Age must be between {} and {}", MIN_AGE, MAX_AGE));
    }
    Ok(date)
}

fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Comma-separated text into trimmed, non-empty entries
pub fn parse_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn collect_group(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn optional(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ============================================================================
// Forms
// ============================================================================

/// The membership application as typed by the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub genres: Vec<String>,
    pub authors: Vec<String>,
    pub books: Vec<String>,
    pub discuss_books: Vec<String>,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<Registration, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(Field::Name, "Name is required");
        }
        let email = self.email.trim();
        if email.is_empty() {
            errors.push(Field::Email, "Email is required");
        } else if !is_valid_email(email) {
            errors.push(Field::Email, "Enter a valid email address");
        }

        let groups = [
            (Field::Genres, &self.genres),
            (Field::Authors, &self.authors),
            (Field::Books, &self.books),
            (Field::DiscussBooks, &self.discuss_books),
        ];
        for (field, entries) in groups {
            if collect_group(entries).len() != GROUP_SIZE {
                errors.push(field, "Fill in all three fields");
            }
        }

        let (first_name, last_name) = split_name(name);
        errors.into_result(|| Registration {
            first_name,
            last_name,
            email: email.to_string(),
            phone: None,
            birth_date: None,
            fav_authors: collect_group(&self.authors),
            fav_genres: collect_group(&self.genres),
            fav_books: collect_group(&self.books),
            discuss_books: collect_group(&self.discuss_books),
        })
    }
}

/// Profile edit form; list fields are comma-separated text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: String,
    pub fav_authors: String,
    pub fav_genres: String,
    pub fav_books: String,
    pub discuss_books: String,
}

impl ProfileForm {
    pub fn from_profile(profile: &crate::models::UserProfile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            birth_date: profile.birth_date.clone().unwrap_or_default(),
            fav_authors: profile.fav_authors.join(", "),
            fav_genres: profile.fav_genres.join(", "),
            fav_books: profile.fav_books.join(", "),
            discuss_books: profile.discuss_books.join(", "),
        }
    }

    pub fn validate(&self, today: NaiveDate) -> Result<ProfileUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.first_name.trim().is_empty() {
            errors.push(Field::FirstName, "First name is required");
        }

        let phone = optional(&self.phone);
        if let Some(ref phone) = phone {
            if !is_valid_phone(phone) {
                errors.push(Field::Phone, "Enter a phone like +7 999 123-45-67");
            }
        }

        let birth_date = optional(&self.birth_date);
        if let Some(ref text) = birth_date {
            if let Err(message) = parse_birth_date(text, today) {
                errors.push(Field::BirthDate, message);
            }
        }

        errors.into_result(|| ProfileUpdate {
            first_name: optional(&self.first_name),
            last_name: Some(self.last_name.trim().to_string()),
            phone,
            birth_date,
            fav_authors: Some(parse_list(&self.fav_authors)),
            fav_genres: Some(parse_list(&self.fav_genres)),
            fav_books: Some(parse_list(&self.fav_books)),
            discuss_books: Some(parse_list(&self.discuss_books)),
        })
    }
}

/// Admin form for creating or editing a book
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub date: String,
    pub location: String,
    pub description: String,
}

impl BookForm {
    pub fn from_book(book: &crate::models::Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            date: book.date.clone(),
            location: book.location.clone(),
            description: book.description.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<BookInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let required = [
            (Field::Title, &self.title),
            (Field::Author, &self.author),
            (Field::Date, &self.date),
            (Field::Location, &self.location),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.push(field, format!("{} is required", field.label()));
            }
        }

        errors.into_result(|| BookInput {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            date: self.date.trim().to_string(),
            location: self.location.trim().to_string(),
            description: optional(&self.description),
        })
    }
}

/// Identifier check before requesting a code
pub fn validate_identifier(input: &str) -> Result<Identifier, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if input.trim().is_empty() {
        errors.push(Field::Identifier, "Enter an email or phone number");
    }
    errors.into_result(|| Identifier::parse(input))
}

/// Code check before verifying
pub fn validate_code(code: &str) -> Result<String, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if code.trim().is_empty() {
        errors.push(Field::Code, "Enter the code you received");
    }
    errors.into_result(|| code.trim().to_string())
}

pub fn validate_review(rating: u8, comment: &str) -> Result<ReviewInput, ValidationErrors> {
    let input = ReviewInput {
        rating,
        comment: optional(comment),
    };
    let mut errors = ValidationErrors::default();
    if !input.rating_in_range() {
        errors.push(Field::Rating, "Choose a rating from 1 to 5");
    }
    errors.into_result(|| input)
}
