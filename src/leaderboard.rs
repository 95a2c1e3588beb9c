//! Reading contest leaderboard.
//!
//! The ranking is a fixed list of mock readers. The live user's points are
//! never merged into it, so a reader only sees their own rank when their
//! email happens to match one of the entries.

use crate::store::User;

/// Points needed to win the contest.
pub const POINTS_GOAL: u32 = 1000;

pub type LeaderboardEntry = User;

pub fn mock_leaderboard() -> Vec<LeaderboardEntry> {
    let mut entries = vec![
        mock("1", "Alex Reader", "alex@email.com", 850, 85, 12),
        mock("2", "Sarah Bookworm", "sarah@email.com", 720, 72, 8),
        mock("3", "Mike Scholar", "mike@email.com", 680, 68, 15),
        mock("4", "Emma Pages", "emma@email.com", 520, 52, 6),
    ];
    entries.sort_by(|a, b| b.points.cmp(&a.points));
    entries
}

fn mock(id: &str, name: &str, email: &str, points: u32, reading_time: u32, books_read: u32) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        points,
        reading_time,
        books_read,
    }
}

/// 1-based rank of the entry with this email.
pub fn rank_of(entries: &[LeaderboardEntry], email: &str) -> Option<usize> {
    entries.iter().position(|e| e.email == email).map(|i| i + 1)
}

/// Percentage of the goal reached, capped at 100.
pub fn progress_to_goal(points: u32) -> f64 {
    (points as f64 / POINTS_GOAL as f64 * 100.0).min(100.0)
}

pub fn is_winner(points: u32) -> bool {
    points >= POINTS_GOAL
}
