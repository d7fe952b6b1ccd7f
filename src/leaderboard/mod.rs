//! Client-side leaderboard.
//!
//! Keeps, for every (user, question) pair, the best and the most recent
//! submission, and renders a score-sorted board.

mod clock;
mod render;
mod store;

pub use clock::{Clock, FixedClock, SystemClock, format_timestamp};
pub use render::format_board;
pub use store::{LeaderboardEntry, LeaderboardStore, MAX_ENTRIES_PER_GROUP, process_entries};
