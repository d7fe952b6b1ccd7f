//! Answer Bench - client for a question/answer evaluation benchmark.
//!
//! Users pick a question, submit a free-text answer and get back a score
//! computed by a remote evaluation service. Scores are collected on a
//! leaderboard that keeps, per user and question, the best submission and
//! the latest one.
//!
//! # Quick Start
//!
//! ```no_run
//! use answer_bench::{BenchClient, BenchSession, Config, leaderboard::format_board};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let mut session = BenchSession::new(BenchClient::new(config.api));
//!
//!     // Load questions and the current board
//!     session.fetch_questions().await?;
//!     session.refresh_leaderboard().await?;
//!
//!     // Submit an answer; its score is merged into the board
//!     let result = session.submit_answer("q1", "my answer", "alice").await?;
//!     println!("Score: {:.4}", result.score);
//!
//!     println!("{}", format_board(&session.leaderboard().sorted_view(), Some(10)));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **BenchClient**: HTTP client for the evaluation service
//! - **LeaderboardStore**: in-memory board with the highest/newest merge
//! - **BenchSession**: submission flow tying the two together

pub mod client;
pub mod config;
pub mod error;
pub mod leaderboard;
pub mod models;
pub mod session;

// Re-export commonly used types
pub use client::{BenchApi, BenchClient};
pub use config::Config;
pub use error::{BenchError, Operation, Result};
pub use leaderboard::{Clock, LeaderboardEntry, LeaderboardStore, SystemClock};
pub use models::{AnswerInput, EvaluationResult, Question, RawEntry};
pub use session::BenchSession;
