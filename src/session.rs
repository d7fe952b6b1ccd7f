//! Submission flow and question provider.
//!
//! A [`BenchSession`] ties the remote API to an owned leaderboard: it loads
//! questions and the board, submits answers and merges each returned score
//! into the board. A failed remote call leaves all local state as it was.

use crate::client::BenchApi;
use crate::error::{BenchError, Result};
use crate::leaderboard::{Clock, LeaderboardEntry, LeaderboardStore, SystemClock};
use crate::models::{AnswerInput, EvaluationResult, Question};

/// Client-side state of one benchmark user.
pub struct BenchSession<A: BenchApi, C: Clock = SystemClock> {
    api: A,
    store: LeaderboardStore<C>,
    questions: Vec<Question>,
    selected: Option<usize>,
    last_result: Option<EvaluationResult>,
}

impl<A: BenchApi> BenchSession<A> {
    /// Create a session with an empty leaderboard.
    pub fn new(api: A) -> Self {
        Self::with_store(api, LeaderboardStore::new())
    }
}

impl<A: BenchApi, C: Clock> BenchSession<A, C> {
    /// Create a session around an existing store.
    pub fn with_store(api: A, store: LeaderboardStore<C>) -> Self {
        Self {
            api,
            store,
            questions: Vec::new(),
            selected: None,
            last_result: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn leaderboard(&self) -> &LeaderboardStore<C> {
        &self.store
    }

    /// Questions from the last successful fetch.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn selected_question(&self) -> Option<&Question> {
        self.selected.and_then(|i| self.questions.get(i))
    }

    /// Result of the last successful submission.
    pub fn last_result(&self) -> Option<&EvaluationResult> {
        self.last_result.as_ref()
    }

    /// Select a fetched question by id. Unknown ids clear the selection.
    pub fn select_question(&mut self, question_id: &str) -> Option<&Question> {
        self.selected = self.questions.iter().position(|q| q.id == question_id);
        self.selected_question()
    }

    /// Fetch the available questions.
    pub async fn fetch_questions(&mut self) -> Result<&[Question]> {
        let questions = self.api.questions().await?;
        tracing::info!("Fetched {} questions", questions.len());

        let selected_id = self.selected_question().map(|q| q.id.clone());
        self.questions = questions;
        self.selected = selected_id.and_then(|id| self.questions.iter().position(|q| q.id == id));

        Ok(&self.questions)
    }

    /// Rebuild the leaderboard from the server listing.
    pub async fn refresh_leaderboard(&mut self) -> Result<&[LeaderboardEntry]> {
        let rows = self.api.leaderboard().await?;
        tracing::info!("Fetched {} leaderboard rows", rows.len());
        Ok(self.store.load(rows))
    }

    /// Submit an answer and merge its score into the leaderboard.
    ///
    /// Blank inputs are rejected before any request is made.
    pub async fn submit_answer(
        &mut self,
        question_id: &str,
        answer: &str,
        username: &str,
    ) -> Result<EvaluationResult> {
        if question_id.trim().is_empty() {
            return Err(BenchError::MissingInput("question"));
        }
        if answer.trim().is_empty() {
            return Err(BenchError::MissingInput("answer"));
        }
        if username.trim().is_empty() {
            return Err(BenchError::MissingInput("username"));
        }

        let input = AnswerInput::new(question_id, answer, username);
        let result = self.api.evaluate(&input).await?;
        tracing::info!(
            "{} scored {:.4} on {}",
            username,
            result.score,
            question_id
        );

        self.store.update(result.score, username, question_id);
        self.last_result = Some(result.clone());

        Ok(result)
    }

    /// Submit an answer to the selected question.
    pub async fn submit_selected(&mut self, answer: &str, username: &str) -> Result<EvaluationResult> {
        let question_id = self
            .selected_question()
            .map(|q| q.id.clone())
            .ok_or(BenchError::MissingInput("question"))?;
        self.submit_answer(&question_id, answer, username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;
    use crate::leaderboard::FixedClock;
    use crate::models::RawEntry;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        questions: Vec<Question>,
        rows: Vec<RawEntry>,
        scores: Mutex<VecDeque<f64>>,
        submissions: Mutex<Vec<AnswerInput>>,
        offline: bool,
    }

    impl FakeApi {
        fn with_scores(scores: &[f64]) -> Self {
            Self {
                scores: Mutex::new(scores.iter().copied().collect()),
                ..Default::default()
            }
        }

        fn offline() -> Self {
            Self {
                offline: true,
                ..Default::default()
            }
        }

        fn submission_count(&self) -> usize {
            self.submissions.lock().unwrap().len()
        }
    }

    fn result(score: f64) -> EvaluationResult {
        EvaluationResult {
            score,
            tfidf_similarity: 0.5,
            bleu_score: 0.2,
            rouge_l_score: 0.3,
            prompt_relevance_ratio: 0.8,
            gpt_score: 0.7,
            bertscore: None,
        }
    }

    #[async_trait]
    impl BenchApi for FakeApi {
        async fn questions(&self) -> Result<Vec<Question>> {
            if self.offline {
                return Err(BenchError::network(Operation::FetchQuestions, "connection refused"));
            }
            Ok(self.questions.clone())
        }

        async fn evaluate(&self, input: &AnswerInput) -> Result<EvaluationResult> {
            if self.offline {
                return Err(BenchError::network(Operation::Submit, "HTTP error! status: 500"));
            }
            self.submissions.lock().unwrap().push(input.clone());
            let score = self.scores.lock().unwrap().pop_front().unwrap_or(0.0);
            Ok(result(score))
        }

        async fn leaderboard(&self) -> Result<Vec<RawEntry>> {
            if self.offline {
                return Err(BenchError::network(Operation::FetchLeaderboard, "timed out"));
            }
            Ok(self.rows.clone())
        }
    }

    fn session(api: FakeApi) -> BenchSession<FakeApi, FixedClock> {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        BenchSession::with_store(api, LeaderboardStore::with_clock(clock))
    }

    fn question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            prompt: format!("Prompt for {}", id),
        }
    }

    #[test]
    fn test_submit_merges_scores() {
        let mut session = session(FakeApi::with_scores(&[0.8, 0.5, 0.9]));

        tokio_test::block_on(async {
            let first = session.submit_answer("q1", "answer", "alice").await.unwrap();
            assert_eq!(first.score, 0.8);
            session.submit_answer("q1", "answer", "alice").await.unwrap();
            session.submit_answer("q1", "answer", "alice").await.unwrap();
        });

        let group = session.leaderboard().group("alice", "q1");
        assert_eq!(group.len(), 2);
        let best = group.iter().find(|e| e.is_highest).unwrap();
        assert_eq!(best.score, 0.9);
        assert!(best.is_newest);
        assert_eq!(session.last_result().map(|r| r.score), Some(0.9));
        assert_eq!(session.api().submission_count(), 3);
    }

    #[test]
    fn test_submit_sends_inputs() {
        let mut session = session(FakeApi::with_scores(&[0.4]));

        tokio_test::block_on(session.submit_answer("q7", "the answer", "bob")).unwrap();

        let sent = session.api().submissions.lock().unwrap();
        assert_eq!(sent[0].question_id, "q7");
        assert_eq!(sent[0].student_answer, "the answer");
        assert_eq!(sent[0].username, "bob");
    }

    #[test]
    fn test_submit_rejects_blank_inputs() {
        let mut session = session(FakeApi::with_scores(&[0.4]));

        tokio_test::block_on(async {
            let err = session.submit_answer("q1", "  ", "alice").await.unwrap_err();
            assert!(matches!(err, BenchError::MissingInput("answer")));
            let err = session.submit_answer("q1", "answer", "").await.unwrap_err();
            assert!(matches!(err, BenchError::MissingInput("username")));
            let err = session.submit_answer("", "answer", "alice").await.unwrap_err();
            assert!(matches!(err, BenchError::MissingInput("question")));
        });

        assert_eq!(session.api().submission_count(), 0);
        assert!(session.leaderboard().is_empty());
    }

    #[test]
    fn test_failed_calls_leave_state_untouched() {
        let mut session = session(FakeApi::offline());

        tokio_test::block_on(async {
            let err = session.submit_answer("q1", "answer", "alice").await.unwrap_err();
            assert_eq!(
                err.user_message(),
                "Failed to submit answer. Please try again later."
            );

            let err = session.refresh_leaderboard().await.unwrap_err();
            assert_eq!(err.operation(), Some(Operation::FetchLeaderboard));

            let err = session.fetch_questions().await.unwrap_err();
            assert_eq!(err.operation(), Some(Operation::FetchQuestions));
        });

        assert!(session.leaderboard().is_empty());
        assert!(session.questions().is_empty());
        assert!(session.last_result().is_none());
    }

    #[test]
    fn test_refresh_then_submit() {
        let api = FakeApi {
            rows: vec![
                RawEntry::new("alice", 0.6, "q1", "2024-04-30T10:00:00"),
                RawEntry::new("alice", 0.3, "q1", "2024-04-30T11:00:00"),
                RawEntry::new("alice", 0.1, "q1", "2024-04-30T12:00:00"),
                RawEntry::new("bob", 0.7, "q1", "2024-04-30T10:30:00"),
            ],
            scores: Mutex::new(VecDeque::from(vec![0.95])),
            ..Default::default()
        };
        let mut session = session(api);

        let loaded = tokio_test::block_on(session.refresh_leaderboard()).unwrap().len();
        assert_eq!(loaded, 3);

        tokio_test::block_on(session.submit_answer("q1", "answer", "alice")).unwrap();

        let view = session.leaderboard().question_view("q1");
        let rows: Vec<_> = view
            .iter()
            .map(|e| (e.username.as_str(), e.score, e.is_highest, e.is_newest))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("alice", 0.95, true, true),
                ("bob", 0.7, true, true),
                ("alice", 0.6, false, false),
            ]
        );
        assert_eq!(view[0].timestamp, "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn test_select_and_submit_selected() {
        let api = FakeApi {
            questions: vec![question("q1"), question("q2")],
            scores: Mutex::new(VecDeque::from(vec![0.5])),
            ..Default::default()
        };
        let mut session = session(api);

        let err = tokio_test::block_on(session.submit_selected("answer", "alice")).unwrap_err();
        assert!(matches!(err, BenchError::MissingInput("question")));

        tokio_test::block_on(session.fetch_questions()).unwrap();
        assert!(session.select_question("q9").is_none());
        assert_eq!(session.select_question("q2").map(|q| q.prompt.as_str()), Some("Prompt for q2"));

        tokio_test::block_on(session.submit_selected("answer", "alice")).unwrap();
        assert_eq!(session.leaderboard().group("alice", "q2").len(), 1);
    }

    #[test]
    fn test_refetch_keeps_selection() {
        let api = FakeApi {
            questions: vec![question("q1"), question("q2")],
            ..Default::default()
        };
        let mut session = session(api);

        tokio_test::block_on(session.fetch_questions()).unwrap();
        session.select_question("q2");
        tokio_test::block_on(session.fetch_questions()).unwrap();

        assert_eq!(session.selected_question().map(|q| q.id.as_str()), Some("q2"));
    }
}
