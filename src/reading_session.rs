use crate::catalog::Book;
use chrono::{DateTime, Utc};

pub const POINTS_PER_MINUTE: u32 = 10;
pub const PAGES_PER_CHAPTER: u32 = 10;

const FILLER: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.

Duis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur. Excepteur sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit anim id est laborum.

Sed ut perspiciatis unde omnis iste natus error sit voluptatem accusantium doloremque laudantium, totam rem aperiam, eaque ipsa quae ab illo inventore veritatis et quasi architecto beatae vitae dicta sunt explicabo.

Nemo enim ipsam voluptatem quia voluptas sit aspernatur aut odit aut fugit, sed quia consequuntur magni dolores eos qui ratione voluptatem sequi nesciunt.";

/// An open reading view. Dropping it is the only way to stop the ticker.
#[derive(Debug, Clone)]
pub struct ReadingSession {
    pub started: DateTime<Utc>,
    pub book: Book,
    pub current_page: u32,
    pub elapsed_secs: u64,
    pub points_earned: u32,
}

impl ReadingSession {
    pub fn new(book: Book) -> Self {
        Self {
            started: Utc::now(),
            book,
            current_page: 1,
            elapsed_secs: 0,
            points_earned: 0,
        }
    }

    /// Advances the clock by one second. Returns the number of minutes to
    /// credit to the reader, which is `Some(1)` exactly when a full minute
    /// has just completed.
    pub fn tick(&mut self) -> Option<u32> {
        self.elapsed_secs += 1;
        if self.elapsed_secs % 60 == 0 {
            self.points_earned = (self.elapsed_secs / 60) as u32 * POINTS_PER_MINUTE;
            Some(1)
        } else {
            None
        }
    }

    pub fn next_page(&mut self) {
        if self.current_page < self.book.pages {
            self.current_page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    pub fn restart(&mut self) {
        self.current_page = 1;
    }

    pub fn chapter(&self) -> u32 {
        self.current_page.div_ceil(PAGES_PER_CHAPTER)
    }

    pub fn progress_percent(&self) -> u32 {
        (self.current_page as f64 / self.book.pages as f64 * 100.0).round() as u32
    }

    pub fn progress_ratio(&self) -> f64 {
        (self.current_page as f64 / self.book.pages as f64).clamp(0.0, 1.0)
    }

    /// `m:ss`
    pub fn elapsed_display(&self) -> String {
        format!("{}:{:02}", self.elapsed_secs / 60, self.elapsed_secs % 60)
    }

    /// Mock content for the current page.
    pub fn page_text(&self) -> String {
        format!(
            "Page {} of \"{}\"\n\nThis is the content of page {}. {}",
            self.current_page, self.book.title, self.current_page, FILLER
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog;

    fn run(session: &mut ReadingSession, secs: u64) -> u32 {
        (0..secs).filter_map(|_| session.tick()).sum()
    }

    #[test]
    fn points_accrue_per_completed_minute() {
        let book = catalog()[0].clone();

        let mut s = ReadingSession::new(book.clone());
        assert_eq!(run(&mut s, 59), 0);
        assert_eq!(s.points_earned, 0);

        let mut s = ReadingSession::new(book.clone());
        assert_eq!(run(&mut s, 119), 1);
        assert_eq!(s.points_earned, 10);

        let mut s = ReadingSession::new(book);
        assert_eq!(run(&mut s, 120), 2);
        assert_eq!(s.points_earned, 20);
    }

    #[test]
    fn credit_fires_on_the_boundary_tick_only() {
        let mut s = ReadingSession::new(catalog()[1].clone());
        assert_eq!(run(&mut s, 59), 0);
        assert_eq!(s.tick(), Some(1));
        assert_eq!(s.tick(), None);
        assert_eq!(s.elapsed_display(), "1:01");
    }

    #[test]
    fn pages_clamp_to_book_bounds() {
        let mut book = catalog()[3].clone();
        book.pages = 3;
        let mut s = ReadingSession::new(book);

        s.prev_page();
        assert_eq!(s.current_page, 1);
        s.next_page();
        s.next_page();
        s.next_page();
        assert_eq!(s.current_page, 3);
        assert_eq!(s.progress_percent(), 100);

        s.restart();
        assert_eq!(s.current_page, 1);
        assert_eq!(s.progress_percent(), 33);
    }

    #[test]
    fn chapters_span_ten_pages() {
        let mut s = ReadingSession::new(catalog()[2].clone());
        assert_eq!(s.chapter(), 1);
        s.current_page = 10;
        assert_eq!(s.chapter(), 1);
        s.current_page = 11;
        assert_eq!(s.chapter(), 2);
    }

    #[test]
    fn page_text_names_page_and_title() {
        let mut s = ReadingSession::new(catalog()[2].clone());
        s.next_page();
        assert!(s.page_text().starts_with("Page 2 of \"The Quantum Mystery\""));
    }
}
