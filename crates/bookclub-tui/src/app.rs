//! Application state management for the book club TUI.
//!
//! This module contains the core `App` struct that manages all application
//! state: the current route and page session, per-page view state, and the
//! background task channel that API calls report back through.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Local;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use bookclub_core::api::{ApiError, BookClub, Gateway, HttpTransport};
use bookclub_core::config::Config;
use bookclub_core::models::{
    Book, BookQuery, BookReceipt, Favorite, Identifier, MeetingParticipants, MyMeeting,
    MyMeetings, Paginated, RegistrationReceipt, Review, SendCodeResponse, UserProfile,
    UserSummary, VerifyResponse,
};
use bookclub_core::navigation::{Navigator, Page, Route};
use bookclub_core::pagination::{PageCursor, RequestTracker, Ticket};
use bookclub_core::session::PageSession;
use bookclub_core::validation::{
    self, BookForm, Field, ProfileForm, RegistrationForm, ValidationErrors,
};

use crate::forms::{can_add_char, FormState, Input};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A page load reports at most four results, so 32 leaves headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Events shown per page on the home screen
const EVENTS_PER_PAGE: u32 = 5;

/// Rows per page in the admin lists
const ADMIN_PAGE_SIZE: u32 = 10;

/// Favourites fetched for the profile page
const FAVORITES_LIMIT: u32 = 50;

/// Newest reviews shown under an event
const REVIEWS_LIMIT: u32 = 10;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    /// Keystrokes go to the active text input
    Editing,
    ShowingHelp,
    ConfirmingQuit,
    /// Waiting for a 1-5 rating of the selected event
    Rating,
    /// Waiting for y/n before deleting the book with this id
    ConfirmingDelete(i64),
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// Inline feedback for the last action on the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct HomeState {
    pub current_book: Option<Book>,
    pub current_loaded: bool,
    pub registered: bool,
    pub events: Vec<Book>,
    pub cursor: PageCursor,
    pub search: String,
    pub selection: usize,
    /// Reviews of the selected event, once requested
    pub reviews: Option<(i64, Paginated<Review>)>,
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignInStep {
    #[default]
    Identifier,
    Code,
}

#[derive(Debug, Default)]
pub struct SignInState {
    pub step: SignInStep,
    pub identifier: String,
    pub code: String,
    /// Code echoed back by a backend running in development mode
    pub dev_code: Option<String>,
    pub busy: bool,
}

#[derive(Debug)]
pub struct RegisterState {
    pub form: FormState,
    pub busy: bool,
}

impl Default for RegisterState {
    fn default() -> Self {
        Self {
            form: registration_form(),
            busy: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileSection {
    #[default]
    Meetings,
    Favorites,
}

#[derive(Debug, Default)]
pub struct ProfileState {
    pub meetings: Vec<MyMeeting>,
    pub favorites: Vec<Favorite>,
    pub section: ProfileSection,
    pub selection: usize,
    /// Open while the profile is being edited
    pub form: Option<FormState>,
    pub busy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminView {
    #[default]
    Books,
    Users,
}

/// The book form in the admin area; `id` is None for a new book
#[derive(Debug)]
pub struct BookEditor {
    pub id: Option<i64>,
    pub form: FormState,
}

#[derive(Debug, Default)]
pub struct AdminState {
    pub view: AdminView,
    pub books: Vec<Book>,
    pub books_cursor: PageCursor,
    pub book_selection: usize,
    pub users: Vec<UserSummary>,
    pub users_cursor: PageCursor,
    pub user_selection: usize,
    pub editor: Option<BookEditor>,
    pub participants: Option<MeetingParticipants>,
    /// Signed in, but not as an admin
    pub denied: bool,
}

// ============================================================================
// Forms
// ============================================================================

fn registration_form() -> FormState {
    const GROUPS: [(Field, [&str; 3]); 4] = [
        (Field::Genres, ["Genre 1", "Genre 2", "Genre 3"]),
        (Field::Authors, ["Author 1", "Author 2", "Author 3"]),
        (Field::Books, ["Book 1", "Book 2", "Book 3"]),
        (Field::DiscussBooks, ["To discuss 1", "To discuss 2", "To discuss 3"]),
    ];
    let mut inputs = vec![
        Input::new("Full name", Field::Name),
        Input::new("Email", Field::Email),
    ];
    for (field, labels) in GROUPS {
        inputs.extend(labels.into_iter().map(|label| Input::new(label, field)));
    }
    FormState::new(inputs)
}

fn profile_form(values: &ProfileForm) -> FormState {
    FormState::new(vec![
        Input::new("First name", Field::FirstName).with_value(&values.first_name),
        Input::new("Last name", Field::LastName).with_value(&values.last_name),
        Input::new("Phone", Field::Phone).with_value(&values.phone),
        Input::new("Birth date", Field::BirthDate).with_value(&values.birth_date),
        Input::new("Authors", Field::Authors).with_value(&values.fav_authors),
        Input::new("Genres", Field::Genres).with_value(&values.fav_genres),
        Input::new("Books", Field::Books).with_value(&values.fav_books),
        Input::new("To discuss", Field::DiscussBooks).with_value(&values.discuss_books),
    ])
}

fn book_form(values: &BookForm) -> FormState {
    FormState::new(vec![
        Input::new("Title", Field::Title).with_value(&values.title),
        Input::new("Author", Field::Author).with_value(&values.author),
        Input::new("Date", Field::Date).with_value(&values.date),
        Input::new("Location", Field::Location).with_value(&values.location),
        Input::new("Description", Field::Description).with_value(&values.description),
    ])
}

// ============================================================================
// Navigation
// ============================================================================

/// Navigator backed by the app: remembers the current route and forwards
/// navigation requests (such as the 401 redirect) over a channel that the
/// main loop drains.
pub struct ChannelNavigator {
    current: Mutex<String>,
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    pub fn new(initial: &str) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let navigator = Self {
            current: Mutex::new(initial.to_string()),
            tx,
        };
        (navigator, rx)
    }

    pub fn set_current(&self, href: &str) {
        match self.current.lock() {
            Ok(mut current) => *current = href.to_string(),
            Err(poisoned) => *poisoned.into_inner() = href.to_string(),
        }
    }
}

impl Navigator for ChannelNavigator {
    fn current_path(&self) -> String {
        match self.current.lock() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn navigate(&self, href: &str) {
        if self.tx.send(href.to_string()).is_err() {
            warn!(href, "Navigation channel closed");
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// What to refetch after a successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reload {
    Nothing,
    CurrentBook,
    Profile,
    AdminBooks,
    AdminUsers,
    Reviews(i64),
}

/// Results sent back from background API tasks.
enum TaskResult {
    /// Navigation state: the signed-in user's profile
    User(Result<UserProfile, ApiError>),
    /// Book of the month and whether the user is registered for its meeting
    CurrentBook {
        book: Result<Option<Book>, ApiError>,
        registered: bool,
    },
    Events(Ticket, Result<Paginated<Book>, ApiError>),
    Reviews(i64, Result<Paginated<Review>, ApiError>),
    CodeSent(Identifier, Result<SendCodeResponse, ApiError>),
    Verified(Result<VerifyResponse, ApiError>),
    Registered(Result<RegistrationReceipt, ApiError>),
    Meetings(Result<MyMeetings, ApiError>),
    Favorites(Result<Paginated<Favorite>, ApiError>),
    ProfileSaved(Result<UserProfile, ApiError>),
    AdminBooks(Ticket, Result<Paginated<Book>, ApiError>),
    AdminUsers(Ticket, Result<Paginated<UserSummary>, ApiError>),
    Participants(Result<MeetingParticipants, ApiError>),
    BookSaved(Result<BookReceipt, ApiError>),
    /// Outcome of a mutation: success message or error
    Action {
        outcome: Result<String, ApiError>,
        reload: Reload,
    },
}

/// A result tagged with the page visit that requested it
struct TaskMessage {
    visit: Ticket,
    result: TaskResult,
}

/// Handle given to background tasks for reporting results
#[derive(Clone)]
struct Reporter {
    tx: mpsc::Sender<TaskMessage>,
    visit: Ticket,
}

impl Reporter {
    async fn send(&self, result: TaskResult) {
        let message = TaskMessage {
            visit: self.visit,
            result,
        };
        if self.tx.send(message).await.is_err() {
            debug!("App closed, dropping task result");
        }
    }
}

async fn current_book_status(client: &BookClub) -> TaskResult {
    let book = client.current_book().await;
    let registered = match book {
        Ok(Some(ref b)) => client.is_registered_for(b.id).await,
        _ => false,
    };
    TaskResult::CurrentBook { book, registered }
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    config_path: Option<PathBuf>,
    pub client: BookClub,
    navigator: Arc<ChannelNavigator>,
    nav_rx: mpsc::UnboundedReceiver<String>,

    // Background task channel
    task_tx: mpsc::Sender<TaskMessage>,
    task_rx: mpsc::Receiver<TaskMessage>,

    // Routing
    pub state: AppState,
    pub route: Route,
    pub session: PageSession,
    visits: RequestTracker,
    visit: Ticket,

    // Page state
    pub notice: Option<Notice>,
    pub home: HomeState,
    pub sign_in: SignInState,
    pub register: RegisterState,
    pub profile: ProfileState,
    pub admin: AdminState,

    // Stale-response guards for list views
    events_tracker: RequestTracker,
    admin_books_tracker: RequestTracker,
    admin_users_tracker: RequestTracker,
}

impl App {
    /// Create the app with the configured backend and token storage
    pub fn new(config: Config) -> Result<Self> {
        let store = config.token_store()?;
        let (navigator, nav_rx) = ChannelNavigator::new(Page::Home.path());
        let navigator = Arc::new(navigator);
        let transport = Arc::new(HttpTransport::new()?);

        let gateway_config = config.gateway_config();
        info!(
            base_url = %gateway_config.base_url,
            token_key = %gateway_config.token_key,
            backend = ?config.token_backend,
            "Connecting to backend"
        );
        let gateway = Gateway::new(&gateway_config, transport, store, navigator.clone());

        let mut app = Self::with_client(config, BookClub::new(gateway), navigator, nav_rx);
        app.config_path = Config::path().ok();
        Ok(app)
    }

    fn with_client(
        config: Config,
        client: BookClub,
        navigator: Arc<ChannelNavigator>,
        nav_rx: mpsc::UnboundedReceiver<String>,
    ) -> Self {
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let visits = RequestTracker::new();
        let visit = visits.issue();

        Self {
            config,
            config_path: None,
            client,
            navigator,
            nav_rx,

            task_tx,
            task_rx,

            state: AppState::Normal,
            route: Route::to(Page::Home),
            session: PageSession::new(),
            visits,
            visit,

            notice: None,
            home: HomeState {
                cursor: PageCursor::new(EVENTS_PER_PAGE),
                ..HomeState::default()
            },
            sign_in: SignInState::default(),
            register: RegisterState::default(),
            profile: ProfileState::default(),
            admin: AdminState::default(),

            events_tracker: RequestTracker::new(),
            admin_books_tracker: RequestTracker::new(),
            admin_users_tracker: RequestTracker::new(),
        }
    }

    pub fn page(&self) -> Page {
        self.route.page
    }

    pub fn is_signed_in(&self) -> bool {
        self.client.has_token()
    }

    /// Run a task in the background, reporting to the current page visit
    fn spawn<F, Fut>(&self, task: F)
    where
        F: FnOnce(BookClub, Reporter) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let reporter = Reporter {
            tx: self.task_tx.clone(),
            visit: self.visit,
        };
        tokio::spawn(task(self.client.clone(), reporter));
    }

    fn save_config(&self) {
        if let Some(ref path) = self.config_path {
            if let Err(e) = self.config.save_to(path) {
                warn!(error = %e, "Failed to save config");
            }
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Show a page. Pages that need a token send the user to sign in first.
    pub fn go_to(&mut self, route: Route) {
        let route = if route.page.requires_token() && !self.client.has_token() {
            debug!(page = %route.page, "No token, redirecting to sign-in");
            Route::sign_in_from(route.page)
        } else {
            route
        };
        info!(route = %route, "Navigating");

        self.route = route;
        self.navigator.set_current(&route.href());
        self.visit = self.visits.issue();
        self.session.reset();
        self.notice = None;

        self.state = match route.page {
            Page::SignIn | Page::Register => AppState::Editing,
            _ => AppState::Normal,
        };

        match route.page {
            Page::Home => {
                self.home = HomeState {
                    cursor: PageCursor::new(EVENTS_PER_PAGE),
                    ..HomeState::default()
                };
                self.load_home();
            }
            Page::SignIn => {
                self.sign_in = SignInState {
                    identifier: self.config.last_identifier.clone().unwrap_or_default(),
                    ..SignInState::default()
                };
            }
            Page::Register => self.register = RegisterState::default(),
            Page::Profile => {
                self.profile = ProfileState::default();
                self.load_profile(true);
            }
            Page::Admin => {
                self.admin = AdminState {
                    books_cursor: PageCursor::new(ADMIN_PAGE_SIZE),
                    users_cursor: PageCursor::new(ADMIN_PAGE_SIZE),
                    ..AdminState::default()
                };
                self.load_admin();
            }
        }
    }

    pub fn go_to_page(&mut self, page: Page) {
        self.go_to(Route::to(page));
    }

    /// Forget the token and return home
    pub fn sign_out(&mut self) {
        if let Err(e) = self.client.sign_out() {
            warn!(error = %e, "Failed to clear token");
        }
        self.session.clear_user();
        self.go_to_page(Page::Home);
        self.notice = Some(Notice::info("Signed out"));
    }

    /// Reload whatever the current page shows
    pub fn refresh(&mut self) {
        let route = self.route;
        self.go_to(route);
    }

    // =========================================================================
    // Page loads
    // =========================================================================

    /// Refresh the user first, then load the current book and events together.
    fn load_home(&mut self) {
        self.home.loading = true;
        let events = self.home_query();
        let ticket = self.events_tracker.issue();
        self.spawn(move |client, reporter| async move {
            if client.has_token() {
                reporter.send(TaskResult::User(client.me().await)).await;
            }
            let (current, page) = futures::join!(current_book_status(&client), client.books(&events));
            reporter.send(current).await;
            reporter.send(TaskResult::Events(ticket, page)).await;
        });
    }

    fn home_query(&self) -> BookQuery {
        BookQuery::page(self.home.cursor.page, self.home.cursor.limit).with_search(&self.home.search)
    }

    fn load_events(&mut self) {
        self.home.loading = true;
        let query = self.home_query();
        let ticket = self.events_tracker.issue();
        self.spawn(move |client, reporter| async move {
            let page = client.books(&query).await;
            reporter.send(TaskResult::Events(ticket, page)).await;
        });
    }

    fn load_current_book(&mut self) {
        self.spawn(|client, reporter| async move {
            reporter.send(current_book_status(&client).await).await;
        });
    }

    fn load_profile(&mut self, with_user: bool) {
        self.profile.busy = true;
        self.spawn(move |client, reporter| async move {
            if with_user {
                let user = client.me().await;
                let failed = user.is_err();
                reporter.send(TaskResult::User(user)).await;
                if failed {
                    return;
                }
            }
            let (meetings, favorites) =
                futures::join!(client.my_meetings(), client.favorites(1, FAVORITES_LIMIT));
            reporter.send(TaskResult::Meetings(meetings)).await;
            reporter.send(TaskResult::Favorites(favorites)).await;
        });
    }

    /// Check the role, then load both admin lists.
    fn load_admin(&mut self) {
        let books = self.admin_books_tracker.issue();
        let users = self.admin_users_tracker.issue();
        let books_page = self.admin.books_cursor.page;
        let users_page = self.admin.users_cursor.page;
        self.spawn(move |client, reporter| async move {
            let user = client.me().await;
            let is_admin = user.as_ref().is_ok_and(UserProfile::is_admin);
            reporter.send(TaskResult::User(user)).await;
            if !is_admin {
                return;
            }
            let query = BookQuery::page(books_page, ADMIN_PAGE_SIZE);
            let (book_list, user_list) =
                futures::join!(client.books(&query), client.users(users_page, ADMIN_PAGE_SIZE));
            reporter.send(TaskResult::AdminBooks(books, book_list)).await;
            reporter.send(TaskResult::AdminUsers(users, user_list)).await;
        });
    }

    fn load_admin_books(&mut self) {
        let ticket = self.admin_books_tracker.issue();
        let query = BookQuery::page(self.admin.books_cursor.page, ADMIN_PAGE_SIZE);
        self.spawn(move |client, reporter| async move {
            let page = client.books(&query).await;
            reporter.send(TaskResult::AdminBooks(ticket, page)).await;
        });
    }

    fn load_admin_users(&mut self) {
        let ticket = self.admin_users_tracker.issue();
        let page = self.admin.users_cursor.page;
        self.spawn(move |client, reporter| async move {
            let list = client.users(page, ADMIN_PAGE_SIZE).await;
            reporter.send(TaskResult::AdminUsers(ticket, list)).await;
        });
    }

    // =========================================================================
    // Home actions
    // =========================================================================

    pub fn selected_event(&self) -> Option<&Book> {
        self.home.events.get(self.home.selection)
    }

    pub fn events_next_page(&mut self) {
        if let Some(page) = self.home.cursor.next() {
            self.home.cursor.page = page;
            self.home.selection = 0;
            self.load_events();
        }
    }

    pub fn events_prev_page(&mut self) {
        if let Some(page) = self.home.cursor.prev() {
            self.home.cursor.page = page;
            self.home.selection = 0;
            self.load_events();
        }
    }

    /// Apply the search text typed on the home page
    pub fn submit_search(&mut self) {
        self.home.cursor.first();
        self.home.selection = 0;
        self.state = AppState::Normal;
        self.load_events();
    }

    pub fn push_search_char(&mut self, c: char) {
        if can_add_char(self.home.search.chars().count(), c) {
            self.home.search.push(c);
        }
    }

    /// Sign up for the book-of-the-month meeting
    pub fn register_for_meeting(&mut self) {
        if !self.require_sign_in() {
            return;
        }
        let Some(book) = self.home.current_book.clone() else {
            self.notice = Some(Notice::info("No book of the month yet"));
            return;
        };
        self.spawn(move |client, reporter| async move {
            let outcome = client.register_for_meeting(book.id).await.map(|r| {
                if r.message.is_empty() {
                    format!("Registered for {}", book.title)
                } else {
                    r.message
                }
            });
            reporter
                .send(TaskResult::Action {
                    outcome,
                    reload: Reload::CurrentBook,
                })
                .await;
        });
    }

    pub fn cancel_current_meeting(&mut self) {
        if !self.require_sign_in() {
            return;
        }
        if let Some(book) = self.home.current_book.clone() {
            self.cancel_meeting(book.id, Reload::CurrentBook);
        }
    }

    fn cancel_meeting(&mut self, book_id: i64, reload: Reload) {
        self.spawn(move |client, reporter| async move {
            let outcome = client
                .cancel_meeting(book_id)
                .await
                .map(|_| "Registration cancelled".to_string());
            reporter.send(TaskResult::Action { outcome, reload }).await;
        });
    }

    pub fn favorite_selected_event(&mut self) {
        if !self.require_sign_in() {
            return;
        }
        let Some(book) = self.selected_event().cloned() else {
            return;
        };
        self.spawn(move |client, reporter| async move {
            let outcome = client
                .add_favorite(book.id)
                .await
                .map(|_| format!("Added {} to favourites", book.title));
            reporter
                .send(TaskResult::Action {
                    outcome,
                    reload: Reload::Nothing,
                })
                .await;
        });
    }

    pub fn load_reviews_for_selected(&mut self) {
        if let Some(book_id) = self.selected_event().map(|b| b.id) {
            self.load_reviews(book_id);
        }
    }

    fn load_reviews(&mut self, book_id: i64) {
        self.spawn(move |client, reporter| async move {
            let reviews = client.reviews(book_id, 1, REVIEWS_LIMIT).await;
            reporter.send(TaskResult::Reviews(book_id, reviews)).await;
        });
    }

    /// Rate the selected event from 1 to 5 stars
    pub fn rate_selected_event(&mut self, rating: u8) {
        self.state = AppState::Normal;
        if !self.require_sign_in() {
            return;
        }
        let Some(book_id) = self.selected_event().map(|b| b.id) else {
            return;
        };
        let input = match validation::validate_review(rating, "") {
            Ok(input) => input,
            Err(errors) => {
                self.show_validation(&errors);
                return;
            }
        };
        self.spawn(move |client, reporter| async move {
            let outcome = client
                .add_review(book_id, &input)
                .await
                .map(|review| format!("Rated {}", review.stars()));
            reporter.send(TaskResult::Action { outcome, reload: Reload::Reviews(book_id) }).await;
        });
    }

    /// Actions that need an account send the user to sign in, coming back here
    fn require_sign_in(&mut self) -> bool {
        if self.client.has_token() {
            return true;
        }
        let from = self.page();
        self.go_to(Route::sign_in_from(from));
        self.notice = Some(Notice::info("Sign in to continue"));
        false
    }

    // =========================================================================
    // Sign-in
    // =========================================================================

    pub fn sign_in_input(&mut self) -> &mut String {
        match self.sign_in.step {
            SignInStep::Identifier => &mut self.sign_in.identifier,
            SignInStep::Code => &mut self.sign_in.code,
        }
    }

    pub fn submit_sign_in(&mut self) {
        if self.sign_in.busy {
            return;
        }
        match self.sign_in.step {
            SignInStep::Identifier => self.send_code(),
            SignInStep::Code => self.verify_code(),
        }
    }

    fn send_code(&mut self) {
        let identifier = match validation::validate_identifier(&self.sign_in.identifier) {
            Ok(identifier) => identifier,
            Err(errors) => {
                self.show_validation(&errors);
                return;
            }
        };
        self.start_send_code(identifier);
    }

    /// Ask for another code once the countdown has run out
    pub fn resend_code(&mut self) {
        let remaining = self.session.cooldown.remaining();
        if remaining > 0 {
            self.notice = Some(Notice::info(format!("You can request a new code in {}s", remaining)));
            return;
        }
        if let Some(identifier) = self.session.pending_identifier.clone() {
            self.start_send_code(identifier);
        }
    }

    fn start_send_code(&mut self, identifier: Identifier) {
        self.sign_in.busy = true;
        self.notice = Some(Notice::info("Sending code..."));
        self.spawn(move |client, reporter| async move {
            let response = client.send_code(&identifier).await;
            reporter.send(TaskResult::CodeSent(identifier, response)).await;
        });
    }

    fn verify_code(&mut self) {
        let code = match validation::validate_code(&self.sign_in.code) {
            Ok(code) => code,
            Err(errors) => {
                self.show_validation(&errors);
                return;
            }
        };
        let Some(identifier) = self.session.pending_identifier.clone() else {
            self.back_to_identifier();
            return;
        };
        self.sign_in.busy = true;
        self.notice = Some(Notice::info("Checking code..."));
        self.spawn(move |client, reporter| async move {
            let response = client.verify_code(&identifier, &code).await;
            reporter.send(TaskResult::Verified(response)).await;
        });
    }

    /// Return to the first step to use a different email or phone
    pub fn back_to_identifier(&mut self) {
        self.session.change_identifier();
        self.sign_in.step = SignInStep::Identifier;
        self.sign_in.code.clear();
        self.sign_in.dev_code = None;
        self.notice = None;
        self.state = AppState::Editing;
    }

    // =========================================================================
    // Registration
    // =========================================================================

    pub fn submit_registration(&mut self) {
        if self.register.busy {
            return;
        }
        let form = &self.register.form;
        let application = RegistrationForm {
            name: form.value(0).to_string(),
            email: form.value(1).to_string(),
            genres: form.values(2, 3),
            authors: form.values(5, 3),
            books: form.values(8, 3),
            discuss_books: form.values(11, 3),
        };
        let registration = match application.validate() {
            Ok(registration) => registration,
            Err(errors) => {
                self.register.form.set_errors(errors);
                self.notice = Some(Notice::error("Please fix the highlighted fields"));
                return;
            }
        };
        self.register.form.clear_errors();
        self.register.busy = true;
        self.notice = Some(Notice::info("Sending application..."));
        self.spawn(move |client, reporter| async move {
            let receipt = client.register(&registration).await;
            reporter.send(TaskResult::Registered(receipt)).await;
        });
    }

    // =========================================================================
    // Profile
    // =========================================================================

    pub fn start_profile_edit(&mut self) {
        let Some(ref user) = self.session.current_user else {
            return;
        };
        self.profile.form = Some(profile_form(&ProfileForm::from_profile(user)));
        self.state = AppState::Editing;
    }

    pub fn cancel_profile_edit(&mut self) {
        self.profile.form = None;
        self.state = AppState::Normal;
    }

    pub fn submit_profile(&mut self) {
        let Some(ref mut form) = self.profile.form else {
            return;
        };
        let values = ProfileForm {
            first_name: form.value(0).to_string(),
            last_name: form.value(1).to_string(),
            phone: form.value(2).to_string(),
            birth_date: form.value(3).to_string(),
            fav_authors: form.value(4).to_string(),
            fav_genres: form.value(5).to_string(),
            fav_books: form.value(6).to_string(),
            discuss_books: form.value(7).to_string(),
        };
        let update = match values.validate(Local::now().date_naive()) {
            Ok(update) => update,
            Err(errors) => {
                form.set_errors(errors);
                return;
            }
        };
        form.clear_errors();
        self.profile.busy = true;
        self.spawn(move |client, reporter| async move {
            let saved = client.update_me(&update).await;
            reporter.send(TaskResult::ProfileSaved(saved)).await;
        });
    }

    pub fn toggle_profile_section(&mut self) {
        self.profile.section = match self.profile.section {
            ProfileSection::Meetings => ProfileSection::Favorites,
            ProfileSection::Favorites => ProfileSection::Meetings,
        };
        self.profile.selection = 0;
    }

    pub fn profile_list_len(&self) -> usize {
        match self.profile.section {
            ProfileSection::Meetings => self.profile.meetings.len(),
            ProfileSection::Favorites => self.profile.favorites.len(),
        }
    }

    /// Cancel the selected registration or drop the selected favourite
    pub fn remove_profile_selection(&mut self) {
        let index = self.profile.selection;
        match self.profile.section {
            ProfileSection::Meetings => {
                if let Some(book_id) = self.profile.meetings.get(index).map(|m| m.book_id) {
                    self.cancel_meeting(book_id, Reload::Profile);
                }
            }
            ProfileSection::Favorites => {
                let Some(book_id) = self
                    .profile
                    .favorites
                    .get(index)
                    .and_then(|f| f.book.as_ref())
                    .map(|b| b.id)
                else {
                    return;
                };
                self.spawn(move |client, reporter| async move {
                    let outcome = client
                        .remove_favorite(book_id)
                        .await
                        .map(|_| "Removed from favourites".to_string());
                    reporter
                        .send(TaskResult::Action {
                            outcome,
                            reload: Reload::Profile,
                        })
                        .await;
                });
            }
        }
    }

    // =========================================================================
    // Admin
    // =========================================================================

    pub fn toggle_admin_view(&mut self) {
        self.admin.view = match self.admin.view {
            AdminView::Books => AdminView::Users,
            AdminView::Users => AdminView::Books,
        };
        self.admin.participants = None;
    }

    pub fn selected_admin_book(&self) -> Option<&Book> {
        self.admin.books.get(self.admin.book_selection)
    }

    pub fn admin_next_page(&mut self) {
        match self.admin.view {
            AdminView::Books => {
                if let Some(page) = self.admin.books_cursor.next() {
                    self.admin.books_cursor.page = page;
                    self.admin.book_selection = 0;
                    self.load_admin_books();
                }
            }
            AdminView::Users => {
                if let Some(page) = self.admin.users_cursor.next() {
                    self.admin.users_cursor.page = page;
                    self.admin.user_selection = 0;
                    self.load_admin_users();
                }
            }
        }
    }

    pub fn admin_prev_page(&mut self) {
        match self.admin.view {
            AdminView::Books => {
                if let Some(page) = self.admin.books_cursor.prev() {
                    self.admin.books_cursor.page = page;
                    self.admin.book_selection = 0;
                    self.load_admin_books();
                }
            }
            AdminView::Users => {
                if let Some(page) = self.admin.users_cursor.prev() {
                    self.admin.users_cursor.page = page;
                    self.admin.user_selection = 0;
                    self.load_admin_users();
                }
            }
        }
    }

    pub fn new_book(&mut self) {
        self.admin.editor = Some(BookEditor {
            id: None,
            form: book_form(&BookForm::default()),
        });
        self.state = AppState::Editing;
    }

    pub fn edit_selected_book(&mut self) {
        let Some(book) = self.selected_admin_book() else {
            return;
        };
        let editor = BookEditor {
            id: Some(book.id),
            form: book_form(&BookForm::from_book(book)),
        };
        self.admin.editor = Some(editor);
        self.state = AppState::Editing;
    }

    pub fn close_book_editor(&mut self) {
        self.admin.editor = None;
        self.state = AppState::Normal;
    }

    pub fn submit_book(&mut self) {
        let Some(ref mut editor) = self.admin.editor else {
            return;
        };
        let form = &editor.form;
        let values = BookForm {
            title: form.value(0).to_string(),
            author: form.value(1).to_string(),
            date: form.value(2).to_string(),
            location: form.value(3).to_string(),
            description: form.value(4).to_string(),
        };
        let input = match values.validate() {
            Ok(input) => input,
            Err(errors) => {
                editor.form.set_errors(errors);
                return;
            }
        };
        editor.form.clear_errors();
        let id = editor.id;
        self.spawn(move |client, reporter| async move {
            let saved = match id {
                Some(id) => client.update_book(id, &input).await,
                None => client.create_book(&input).await,
            };
            reporter.send(TaskResult::BookSaved(saved)).await;
        });
    }

    pub fn confirm_delete_selected_book(&mut self) {
        if let Some(id) = self.selected_admin_book().map(|b| b.id) {
            self.state = AppState::ConfirmingDelete(id);
        }
    }

    pub fn delete_book(&mut self, id: i64) {
        self.state = AppState::Normal;
        self.spawn(move |client, reporter| async move {
            let outcome = client.delete_book(id).await.map(|_| "Book deleted".to_string());
            reporter
                .send(TaskResult::Action {
                    outcome,
                    reload: Reload::AdminBooks,
                })
                .await;
        });
    }

    pub fn set_selected_book_current(&mut self) {
        let Some(book) = self.selected_admin_book().cloned() else {
            return;
        };
        self.spawn(move |client, reporter| async move {
            let outcome = client
                .set_current_book(book.id)
                .await
                .map(|_| format!("{} is now the book of the month", book.title));
            reporter
                .send(TaskResult::Action {
                    outcome,
                    reload: Reload::AdminBooks,
                })
                .await;
        });
    }

    pub fn show_participants(&mut self) {
        let Some(book_id) = self.selected_admin_book().map(|b| b.id) else {
            return;
        };
        self.spawn(move |client, reporter| async move {
            let participants = client.meeting_participants(book_id).await;
            reporter.send(TaskResult::Participants(participants)).await;
        });
    }

    /// Promote a user to admin or demote an admin to user
    pub fn toggle_selected_user_role(&mut self) {
        let Some(user) = self.admin.users.get(self.admin.user_selection).cloned() else {
            return;
        };
        if self.session.current_user.as_ref().is_some_and(|me| me.id == user.id) {
            self.notice = Some(Notice::error("You cannot change your own role"));
            return;
        }
        let role = user.role.toggled();
        self.spawn(move |client, reporter| async move {
            let outcome = client
                .update_user_role(user.id, role)
                .await
                .map(|change| format!("{} is now {}", change.email, change.role));
            reporter
                .send(TaskResult::Action {
                    outcome,
                    reload: Reload::AdminUsers,
                })
                .await;
        });
    }

    // =========================================================================
    // Background results
    // =========================================================================

    /// Apply finished background work and pending navigation requests
    pub fn check_background_tasks(&mut self) {
        let mut messages = Vec::new();
        while let Ok(message) = self.task_rx.try_recv() {
            messages.push(message);
        }
        for message in messages {
            if message.visit != self.visit {
                debug!(visit = message.visit.id(), "Dropping result from an earlier page visit");
                continue;
            }
            self.process_result(message.result);
        }

        let mut redirects = Vec::new();
        while let Ok(href) = self.nav_rx.try_recv() {
            redirects.push(href);
        }
        if let Some(href) = redirects.pop() {
            self.session.clear_user();
            self.go_to(Route::parse(&href));
        }
    }

    fn show_validation(&mut self, errors: &ValidationErrors) {
        self.notice = Some(Notice::error(errors.to_string()));
    }

    /// Log a failed call and show it on the page
    fn report_error(&mut self, context: &str, error: &ApiError) {
        warn!(context, error = %error, status = ?error.status(), "Request failed");
        if error.needs_sign_in() {
            self.session.clear_user();
        }
        self.notice = Some(Notice::error(format!("{}: {}", context, error.message())));
    }

    fn process_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::User(Ok(user)) => {
                debug!(user_id = user.id, role = %user.role, "User refreshed");
                self.admin.denied = self.page() == Page::Admin && !user.is_admin();
                self.session.set_user(user);
            }
            TaskResult::User(Err(e)) => {
                self.session.clear_user();
                self.profile.busy = false;
                if !e.is_unauthorized() {
                    self.report_error("Could not load your profile", &e);
                }
            }
            TaskResult::CurrentBook { book, registered } => {
                self.home.current_loaded = true;
                match book {
                    Ok(book) => {
                        self.home.current_book = book;
                        self.home.registered = registered;
                    }
                    Err(e) => self.report_error("Could not load the book of the month", &e),
                }
            }
            TaskResult::Events(ticket, page) => {
                let Some(page) = self.events_tracker.accept(ticket, page) else {
                    return;
                };
                self.home.loading = false;
                match page {
                    Ok(page) => {
                        self.home.cursor.update(page.page, page.pages);
                        self.home.events = page.items;
                        self.home.selection = self
                            .home
                            .selection
                            .min(self.home.events.len().saturating_sub(1));
                        self.home.reviews = None;
                    }
                    Err(e) => self.report_error("Could not load events", &e),
                }
            }
            TaskResult::Reviews(book_id, reviews) => match reviews {
                Ok(reviews) => self.home.reviews = Some((book_id, reviews)),
                Err(e) => self.report_error("Could not load reviews", &e),
            },
            TaskResult::CodeSent(identifier, response) => {
                self.sign_in.busy = false;
                match response {
                    Ok(response) => {
                        info!(identifier = %identifier, "Verification code sent");
                        self.config.last_identifier = Some(identifier.value().to_string());
                        self.save_config();
                        self.session.code_sent(identifier);
                        self.sign_in.step = SignInStep::Code;
                        self.sign_in.code.clear();
                        self.sign_in.dev_code = response.code.filter(|_| response.dev_mode);
                        let text = if response.message.is_empty() {
                            "Code sent".to_string()
                        } else {
                            response.message
                        };
                        self.notice = Some(Notice::success(text));
                        self.state = AppState::Editing;
                    }
                    Err(e) => self.report_error("Could not send the code", &e),
                }
            }
            TaskResult::Verified(response) => {
                self.sign_in.busy = false;
                match response {
                    Ok(_) => {
                        let next = self.route.after_sign_in();
                        info!(next = %next, "Signed in");
                        self.go_to_page(next);
                        self.notice = Some(Notice::success("Signed in"));
                    }
                    Err(e) => self.report_error("Sign-in failed", &e),
                }
            }
            TaskResult::Registered(receipt) => {
                self.register.busy = false;
                match receipt {
                    Ok(receipt) => {
                        info!(user_id = receipt.user_id, "Registration submitted");
                        self.register.form.clear_values();
                        let text = if receipt.message.is_empty() {
                            "Application sent. You can now sign in.".to_string()
                        } else {
                            receipt.message
                        };
                        self.notice = Some(Notice::success(text));
                    }
                    Err(e) => self.report_error("Registration failed", &e),
                }
            }
            TaskResult::Meetings(meetings) => {
                self.profile.busy = false;
                match meetings {
                    Ok(meetings) => {
                        self.profile.meetings = meetings.items;
                        self.clamp_profile_selection();
                    }
                    Err(e) => self.report_error("Could not load your meetings", &e),
                }
            }
            TaskResult::Favorites(favorites) => match favorites {
                Ok(page) => {
                    self.profile.favorites = page.items;
                    self.clamp_profile_selection();
                }
                Err(e) => self.report_error("Could not load favourites", &e),
            },
            TaskResult::ProfileSaved(saved) => {
                self.profile.busy = false;
                match saved {
                    Ok(user) => {
                        self.session.set_user(user);
                        self.profile.form = None;
                        self.state = AppState::Normal;
                        self.notice = Some(Notice::success("Profile saved"));
                    }
                    Err(e) => self.report_error("Could not save your profile", &e),
                }
            }
            TaskResult::AdminBooks(ticket, page) => {
                let Some(page) = self.admin_books_tracker.accept(ticket, page) else {
                    return;
                };
                match page {
                    Ok(page) => {
                        self.admin.books_cursor.update(page.page, page.pages);
                        self.admin.books = page.items;
                        self.admin.book_selection = self
                            .admin
                            .book_selection
                            .min(self.admin.books.len().saturating_sub(1));
                    }
                    Err(e) => self.report_error("Could not load books", &e),
                }
            }
            TaskResult::AdminUsers(ticket, page) => {
                let Some(page) = self.admin_users_tracker.accept(ticket, page) else {
                    return;
                };
                match page {
                    Ok(page) => {
                        self.admin.users_cursor.update(page.page, page.pages);
                        self.admin.users = page.items;
                        self.admin.user_selection = self
                            .admin
                            .user_selection
                            .min(self.admin.users.len().saturating_sub(1));
                    }
                    Err(e) => self.report_error("Could not load users", &e),
                }
            }
            TaskResult::Participants(participants) => match participants {
                Ok(participants) => self.admin.participants = Some(participants),
                Err(e) => self.report_error("Could not load participants", &e),
            },
            TaskResult::BookSaved(saved) => match saved {
                Ok(receipt) => {
                    self.close_book_editor();
                    let text = receipt
                        .message
                        .unwrap_or_else(|| format!("Saved {}", receipt.title));
                    self.notice = Some(Notice::success(text));
                    self.load_admin_books();
                }
                Err(e) => self.report_error("Could not save the book", &e),
            },
            TaskResult::Action { outcome, reload } => match outcome {
                Ok(message) => {
                    self.notice = Some(Notice::success(message));
                    self.reload(reload);
                }
                Err(e) => self.report_error("Action failed", &e),
            },
        }
    }

    fn reload(&mut self, reload: Reload) {
        match reload {
            Reload::Nothing => {}
            Reload::CurrentBook => self.load_current_book(),
            Reload::Profile => self.load_profile(false),
            Reload::AdminBooks => self.load_admin_books(),
            Reload::AdminUsers => self.load_admin_users(),
            Reload::Reviews(book_id) => self.load_reviews(book_id),
        }
    }

    fn clamp_profile_selection(&mut self) {
        self.profile.selection = self
            .profile
            .selection
            .min(self.profile_list_len().saturating_sub(1));
    }
}

// ============================================================================
// Tests
// ============================================================================
