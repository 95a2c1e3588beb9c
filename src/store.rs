//! Application state: catalog view, user, cart, reading session, theme.
//!
//! The store is an ordinary value handed to the UI by reference. It performs
//! no authorization checks; the UI gates cart and reading actions on
//! [`LibraryStore::is_logged_in`].

use crate::cart::Cart;
use crate::catalog::{self, Book, SortKey, ALL_CATEGORIES};
use crate::error::StoreError;
use crate::leaderboard::{self, LeaderboardEntry};
use crate::reading_session::{ReadingSession, POINTS_PER_MINUTE};
use crate::storage::{KeyValueStore, Theme, THEME_KEY, USER_KEY};
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub points: u32,
    pub reading_time: u32, // minutes
    pub books_read: u32,
}

impl User {
    fn fresh(name: &str, email: &str) -> Self {
        Self {
            id: Utc::now().timestamp_millis().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            points: 0,
            reading_time: 0,
            books_read: 0,
        }
    }
}

pub struct LibraryStore<S: KeyValueStore> {
    storage: S,
    books: &'static [Book],
    theme: Theme,
    user: Option<User>,
    selected_category: String,
    search_query: String,
    sort_key: SortKey,
    cart: Cart,
    reading: Option<ReadingSession>,
    leaderboard: Vec<LeaderboardEntry>,
}

impl<S: KeyValueStore> LibraryStore<S> {
    /// Builds the store and restores the theme and user from `storage`.
    pub fn new(storage: S) -> Self {
        let theme = storage
            .get(THEME_KEY)
            .and_then(|v| Theme::parse(&v))
            .unwrap_or_default();

        let user = storage.get(USER_KEY).and_then(|raw| {
            match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("ignoring unreadable saved user: {}", e);
                    None
                }
            }
        });
        if let Some(user) = &user {
            info!("restored session for {}", user.email);
        }

        Self {
            storage,
            books: catalog::catalog(),
            theme,
            user,
            selected_category: ALL_CATEGORIES.to_string(),
            search_query: String::new(),
            sort_key: SortKey::default(),
            cart: Cart::new(),
            reading: None,
            leaderboard: leaderboard::mock_leaderboard(),
        }
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // Theme

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(e) = self.storage.set(THEME_KEY, theme.as_str()) {
            warn!("failed to save theme: {}", e);
        }
    }

    pub fn toggle_theme(&mut self) {
        self.set_theme(self.theme.toggled());
    }

    // User

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Mock login: any non-empty email and password is accepted. The name is
    /// the part of the email before `@`.
    pub fn login(&mut self, email: &str, password: &str) -> Result<&User, StoreError> {
        if email.is_empty() || password.is_empty() {
            return Err(StoreError::InvalidCredentials);
        }
        let name = email.split('@').next().unwrap_or(email);
        self.begin_session(User::fresh(name, email))
    }

    /// Mock signup: any non-empty name, email and password is accepted.
    pub fn signup(&mut self, name: &str, email: &str, password: &str) -> Result<&User, StoreError> {
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(StoreError::InvalidCredentials);
        }
        self.begin_session(User::fresh(name, email))
    }

    fn begin_session(&mut self, user: User) -> Result<&User, StoreError> {
        info!("signed in as {}", user.email);
        let user = self.user.insert(user);
        persist_user(&mut self.storage, user);
        Ok(&*user)
    }

    /// Clears the user, the cart and any open reading session.
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!("signed out {}", user.email);
        }
        if let Err(e) = self.storage.remove(USER_KEY) {
            warn!("failed to remove saved user: {}", e);
        }
        self.cart.clear();
        self.reading = None;
    }

    /// No-op without a user.
    pub fn update_user_points(&mut self, points: u32) {
        if let Some(user) = self.user.as_mut() {
            user.points = user.points.saturating_add(points);
            debug!("{} now has {} points", user.email, user.points);
            persist_user(&mut self.storage, user);
        }
    }

    /// Credits whole minutes of reading to the user.
    pub fn update_reading_progress(&mut self, minutes: u32) {
        if let Some(user) = self.user.as_mut() {
            user.reading_time = user.reading_time.saturating_add(minutes);
        }
        self.update_user_points(minutes.saturating_mul(POINTS_PER_MINUTE));
    }

    // Catalog

    pub fn books(&self) -> &[Book] {
        self.books
    }

    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn categories(&self) -> Vec<String> {
        catalog::categories(self.books)
    }

    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    pub fn set_selected_category(&mut self, category: &str) {
        self.selected_category = category.to_string();
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_string();
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
    }

    /// Resets category and search to their defaults.
    pub fn clear_filters(&mut self) {
        self.selected_category = ALL_CATEGORIES.to_string();
        self.search_query.clear();
    }

    pub fn filtered_books(&self) -> Vec<&Book> {
        catalog::filter_books(self.books, &self.selected_category, &self.search_query)
    }

    /// Filtered books in the order of the current sort key.
    pub fn visible_books(&self) -> Vec<&Book> {
        let mut books = self.filtered_books();
        catalog::sort_books(&mut books, self.sort_key);
        books
    }

    // Cart

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn add_to_cart(&mut self, book: &Book) {
        if self.cart.add(book) {
            info!("added {} ({}) to cart", book.title, book.id);
        }
    }

    pub fn remove_from_cart(&mut self, id: &str) {
        if self.cart.remove(id) {
            info!("removed {} from cart", id);
        }
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    pub fn in_cart(&self, id: &str) -> bool {
        self.cart.contains(id)
    }

    pub fn cart_len(&self) -> usize {
        self.cart.len()
    }

    pub fn cart_total(&self) -> f64 {
        self.cart.total()
    }

    // Reading

    pub fn reading(&self) -> Option<&ReadingSession> {
        self.reading.as_ref()
    }

    pub fn reading_mut(&mut self) -> Option<&mut ReadingSession> {
        self.reading.as_mut()
    }

    /// Replaces any session already open.
    pub fn start_reading(&mut self, book: &Book) {
        info!("reading {} ({})", book.title, book.id);
        self.reading = Some(ReadingSession::new(book.clone()));
    }

    /// Stops the ticker. A partial final minute earns nothing.
    pub fn close_reading(&mut self) {
        if let Some(session) = self.reading.take() {
            info!(
                "closed {} after {}s, {} points earned",
                session.book.title, session.elapsed_secs, session.points_earned
            );
        }
    }

    /// One second of reading. Credits the user as soon as a minute completes.
    pub fn tick_reading(&mut self) {
        let Some(minutes) = self.reading.as_mut().and_then(ReadingSession::tick) else {
            return;
        };
        self.update_reading_progress(minutes);
    }

    // Leaderboard

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    /// Rank of the live user within the static board, if their email is on it.
    pub fn user_rank(&self) -> Option<usize> {
        let user = self.user.as_ref()?;
        leaderboard::rank_of(&self.leaderboard, &user.email)
    }
}

fn persist_user<S: KeyValueStore>(storage: &mut S, user: &User) {
    let result = serde_json::to_string(user)
        .map_err(Into::into)
        .and_then(|json| storage.set(USER_KEY, &json));
    if let Err(e) = result {
        warn!("failed to save user: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> LibraryStore<MemoryStorage> {
        LibraryStore::new(MemoryStorage::new())
    }

    fn logged_in() -> LibraryStore<MemoryStorage> {
        let mut store = store();
        store.login("reader@example.com", "secret").unwrap();
        store
    }

    #[test]
    fn login_requires_both_fields() {
        let mut store = store();
        assert_eq!(store.login("", "pw").unwrap_err(), StoreError::InvalidCredentials);
        assert_eq!(store.login("a@b.c", "").unwrap_err(), StoreError::InvalidCredentials);
        assert!(!store.is_logged_in());
        assert!(store.storage().get(USER_KEY).is_none());
    }

    #[test]
    fn login_derives_name_and_persists() {
        let mut store = store();
        let user = store.login("jane.doe@example.com", "pw").unwrap().clone();
        assert_eq!(user.name, "jane.doe");
        assert_eq!((user.points, user.reading_time, user.books_read), (0, 0, 0));

        let saved: User = serde_json::from_str(&store.storage().get(USER_KEY).unwrap()).unwrap();
        assert_eq!(saved, user);
    }

    #[test]
    fn signup_requires_all_fields() {
        let mut store = store();
        assert!(store.signup("", "a@b.c", "pw").is_err());
        assert!(store.storage().get(USER_KEY).is_none());

        let user = store.signup("Jane", "a@b.c", "pw").unwrap().clone();
        assert_eq!(user.name, "Jane");
        let saved: User = serde_json::from_str(&store.storage().get(USER_KEY).unwrap()).unwrap();
        assert_eq!(saved, user);
    }

    #[test]
    fn saved_user_uses_camel_case_keys() {
        let store = logged_in();
        let raw = store.storage().get(USER_KEY).unwrap();
        assert!(raw.contains("\"readingTime\""));
        assert!(raw.contains("\"booksRead\""));
    }

    #[test]
    fn restores_theme_and_user_on_startup() {
        let mut first = logged_in();
        first.toggle_theme();
        first.update_user_points(30);

        let second = LibraryStore::new(first.storage().clone());
        assert_eq!(second.theme(), Theme::Dark);
        assert_eq!(second.user().map(|u| u.points), Some(30));
    }

    #[test]
    fn corrupt_saved_user_is_ignored() {
        let mut storage = MemoryStorage::new();
        storage.set(USER_KEY, "{oops").unwrap();
        storage.set(THEME_KEY, "purple").unwrap();
        let store = LibraryStore::new(storage);
        assert!(store.user().is_none());
        assert_eq!(store.theme(), Theme::Light);
    }

    #[test]
    fn add_to_cart_twice_keeps_one() {
        let mut store = logged_in();
        let book = store.books()[0].clone();
        store.add_to_cart(&book);
        store.add_to_cart(&book);
        assert_eq!(store.cart_len(), 1);
        assert!(store.in_cart(&book.id));
    }

    #[test]
    fn cart_total_tracks_members() {
        let mut store = store();
        assert_eq!(store.cart_total(), 0.0);

        let picks: Vec<Book> = store.books()[..3].to_vec();
        for book in &picks {
            store.add_to_cart(book);
        }
        store.remove_from_cart("2");
        store.remove_from_cart("missing");
        assert!((store.cart_total() - (12.99 + 14.99)).abs() < 1e-9);

        store.clear_cart();
        assert_eq!(store.cart_total(), 0.0);
    }

    #[test]
    fn logout_clears_cart_and_session() {
        let mut store = logged_in();
        let book = store.books()[2].clone();
        store.add_to_cart(&book);
        store.start_reading(&book);

        store.logout();

        assert!(store.user().is_none());
        assert_eq!(store.cart_len(), 0);
        assert!(store.reading().is_none());
        assert!(store.storage().get(USER_KEY).is_none());
    }

    #[test]
    fn reading_credits_user_each_minute() {
        let mut store = logged_in();
        let book = store.books()[0].clone();
        store.start_reading(&book);

        for _ in 0..119 {
            store.tick_reading();
        }
        assert_eq!(store.user().unwrap().points, 10);
        assert_eq!(store.user().unwrap().reading_time, 1);

        store.tick_reading();
        assert_eq!(store.user().unwrap().points, 20);
        assert_eq!(store.reading().unwrap().points_earned, 20);

        let saved: User = serde_json::from_str(&store.storage().get(USER_KEY).unwrap()).unwrap();
        assert_eq!(saved.points, 20);
    }

    #[test]
    fn closing_early_forfeits_partial_minute() {
        let mut store = logged_in();
        let book = store.books()[0].clone();
        store.start_reading(&book);
        for _ in 0..59 {
            store.tick_reading();
        }
        store.close_reading();
        store.tick_reading();
        assert_eq!(store.user().unwrap().points, 0);
    }

    #[test]
    fn points_stop_at_the_ceiling() {
        let mut storage = MemoryStorage::new();
        let raw = r#"{"id":"1","name":"n","email":"e","points":4294967290,"readingTime":0,"booksRead":0}"#;
        storage.set(USER_KEY, raw).unwrap();
        let mut store = LibraryStore::new(storage);
        assert_eq!(store.user().map(|u| u.points), Some(u32::MAX - 5));

        store.update_reading_progress(1);
        assert_eq!(store.user().unwrap().points, u32::MAX);
        assert_eq!(store.user().unwrap().reading_time, 1);

        store.update_reading_progress(u32::MAX);
        assert_eq!(store.user().unwrap().points, u32::MAX);
        assert_eq!(store.user().unwrap().reading_time, u32::MAX);
    }

    #[test]
    fn points_without_user_are_dropped() {
        let mut store = store();
        store.update_user_points(50);
        assert!(store.user().is_none());
        assert!(store.storage().get(USER_KEY).is_none());
    }

    #[test]
    fn filters_and_clear() {
        let mut store = store();
        store.set_search_query("QUANTUM");
        let titles: Vec<&str> = store.filtered_books().iter().map(|b| b.title.as_str()).collect();
        assert!(!titles.is_empty());
        assert!(titles.iter().all(|t| *t == "The Quantum Mystery"));

        store.set_selected_category("Romance");
        assert!(store.filtered_books().is_empty());

        store.clear_filters();
        assert_eq!(store.selected_category(), ALL_CATEGORIES);
        assert_eq!(store.search_query(), "");
        assert_eq!(store.filtered_books().len(), store.books().len());
    }

    #[test]
    fn visible_books_follow_sort_key() {
        let mut store = store();
        store.set_sort_key(SortKey::Price);
        let books = store.visible_books();
        assert_eq!(books[0].title, "Love in Paris");
        assert!(books.windows(2).all(|w| w[0].price <= w[1].price));
    }

    #[test]
    fn live_points_do_not_move_leaderboard() {
        let mut store = store();
        store.login("alex@email.com", "pw").unwrap();
        store.update_user_points(5000);
        assert_eq!(store.user_rank(), Some(1));
        assert_eq!(store.leaderboard()[0].points, 850);

        store.logout();
        store.login("new@reader.com", "pw").unwrap();
        assert_eq!(store.user_rank(), None);
    }
}
