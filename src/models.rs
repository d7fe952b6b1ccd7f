//! Wire types exchanged with the evaluation service.

use serde::{Deserialize, Serialize};

/// A benchmark question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
}

/// Request body for `POST /evaluate`.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerInput {
    pub question_id: String,
    pub student_answer: String,
    pub username: String,
}

impl AnswerInput {
    pub fn new(
        question_id: impl Into<String>,
        student_answer: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            student_answer: student_answer.into(),
            username: username.into(),
        }
    }
}

/// Scores returned by the evaluation service for one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Weighted overall score; this is what the leaderboard ranks by.
    pub score: f64,
    pub tfidf_similarity: f64,
    pub bleu_score: f64,
    pub rouge_l_score: f64,
    pub prompt_relevance_ratio: f64,
    /// Model-judged score. Older servers call it `chatgpt_score`.
    #[serde(alias = "chatgpt_score")]
    pub gpt_score: f64,
    /// Only reported by servers that run BERTScore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bertscore: Option<f64>,
}

impl EvaluationResult {
    /// Named sub-metrics, in display order.
    pub fn metrics(&self) -> Vec<(&'static str, f64)> {
        let mut metrics = vec![
            ("TF-IDF similarity", self.tfidf_similarity),
            ("BLEU", self.bleu_score),
            ("ROUGE-L", self.rouge_l_score),
            ("Prompt relevance", self.prompt_relevance_ratio),
            ("GPT score", self.gpt_score),
        ];
        if let Some(bertscore) = self.bertscore {
            metrics.push(("BERTScore", bertscore));
        }
        metrics
    }
}

/// One historical submission as returned by `GET /leaderboard`.
///
/// Any flags the server attaches are ignored; they are recomputed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    pub username: String,
    pub score: f64,
    pub question_id: String,
    pub timestamp: String,
}

impl RawEntry {
    pub fn new(
        username: impl Into<String>,
        score: f64,
        question_id: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            score,
            question_id: question_id.into(),
            timestamp: timestamp.into(),
        }
    }
}
