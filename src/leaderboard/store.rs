//! Leaderboard state and the highest/newest merge.

use super::clock::{Clock, SystemClock, format_timestamp};
use crate::models::RawEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Entries kept per (user, question) group: the highest and the newest.
pub const MAX_ENTRIES_PER_GROUP: usize = 2;

/// A ranked leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: f64,
    pub question_id: String,
    /// ISO-8601 submission time.
    pub timestamp: String,
    /// Holds the best score of its group.
    #[serde(rename = "isHighest", alias = "is_highest", default)]
    pub is_highest: bool,
    /// The latest submission of its group.
    #[serde(rename = "isNewest", alias = "is_newest", default)]
    pub is_newest: bool,
}

impl LeaderboardEntry {
    fn from_raw(raw: RawEntry, is_highest: bool, is_newest: bool) -> Self {
        Self {
            username: raw.username,
            score: raw.score,
            question_id: raw.question_id,
            timestamp: raw.timestamp,
            is_highest,
            is_newest,
        }
    }

    fn submitted(
        username: &str,
        question_id: &str,
        score: f64,
        timestamp: String,
        is_highest: bool,
    ) -> Self {
        Self {
            username: username.to_string(),
            score,
            question_id: question_id.to_string(),
            timestamp,
            is_highest,
            is_newest: true,
        }
    }

    /// Whether this entry belongs to the given group.
    pub fn is_in_group(&self, username: &str, question_id: &str) -> bool {
        self.username == username && self.question_id == question_id
    }
}

impl From<LeaderboardEntry> for RawEntry {
    fn from(entry: LeaderboardEntry) -> Self {
        RawEntry {
            username: entry.username,
            score: entry.score,
            question_id: entry.question_id,
            timestamp: entry.timestamp,
        }
    }
}

/// Rank rows by descending score, keeping input order among equal scores.
fn sort_by_score_desc<T>(items: &mut [T], score: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| score(b).total_cmp(&score(a)));
}

/// Reduce a flat list of submissions to at most two flagged entries per
/// (user, question) group.
///
/// The best-scoring submission of each group is marked highest (and newest
/// if it is alone); the runner-up is marked newest. Everything below is
/// dropped. Groups come out in order of first appearance.
pub fn process_entries(raw: Vec<RawEntry>) -> Vec<LeaderboardEntry> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Vec<RawEntry>> = HashMap::new();

    for entry in raw {
        let key = (entry.username.clone(), entry.question_id.clone());
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(entry);
    }

    let mut processed = Vec::new();

    for key in order {
        let Some(mut entries) = groups.remove(&key) else {
            continue;
        };
        sort_by_score_desc(&mut entries, |e| e.score);

        let alone = entries.len() == 1;
        let mut ranked = entries.into_iter().take(MAX_ENTRIES_PER_GROUP);

        if let Some(highest) = ranked.next() {
            processed.push(LeaderboardEntry::from_raw(highest, true, alone));
        }
        if let Some(newest) = ranked.next() {
            processed.push(LeaderboardEntry::from_raw(newest, false, true));
        }
    }

    processed
}

/// In-memory leaderboard.
///
/// All mutation goes through [`load`](Self::load) and
/// [`update`](Self::update).
#[derive(Debug, Clone)]
pub struct LeaderboardStore<C: Clock = SystemClock> {
    entries: Vec<LeaderboardEntry>,
    clock: C,
}

impl Default for LeaderboardStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardStore<SystemClock> {
    /// Create an empty store stamped with wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> LeaderboardStore<C> {
    /// Create an empty store with a custom time source.
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Vec::new(),
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current entries in store order.
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one (user, question) group, in store order.
    pub fn group(&self, username: &str, question_id: &str) -> Vec<&LeaderboardEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_in_group(username, question_id))
            .collect()
    }

    /// Replace the state with the ranked form of a server listing.
    pub fn load(&mut self, raw: Vec<RawEntry>) -> &[LeaderboardEntry] {
        let fetched = raw.len();
        self.entries = process_entries(raw);
        tracing::debug!(
            "Loaded leaderboard: {} submissions reduced to {} entries",
            fetched,
            self.entries.len()
        );
        &self.entries
    }

    /// Merge a new score for `username` on `question_id`, stamped now.
    pub fn update(&mut self, score: f64, username: &str, question_id: &str) {
        let now = self.clock.now();
        self.update_at(score, username, question_id, now);
    }

    /// Merge a new score for `username` on `question_id`.
    ///
    /// The group keeps its best submission and its latest one. A new best
    /// over a full group evicts the group's lowest score.
    pub fn update_at(&mut self, score: f64, username: &str, question_id: &str, now: DateTime<Utc>) {
        let timestamp = format_timestamp(now);
        let group = self.group_indices(username, question_id);

        match group.len() {
            0 => {
                self.entries.push(LeaderboardEntry::submitted(
                    username,
                    question_id,
                    score,
                    timestamp,
                    true,
                ));
            }
            1 => {
                let existing = &mut self.entries[group[0]];
                existing.is_highest = true;
                if score > existing.score {
                    existing.score = score;
                    existing.timestamp = timestamp;
                    existing.is_newest = true;
                } else {
                    existing.is_newest = false;
                    self.entries.push(LeaderboardEntry::submitted(
                        username,
                        question_id,
                        score,
                        timestamp,
                        false,
                    ));
                }
            }
            _ => {
                let ranked = self.rank(group);
                let (highest, newest) = (ranked[0], ranked[1]);

                if score > self.entries[highest].score {
                    self.entries[newest].is_newest = false;
                    self.entries[newest].is_highest = false;
                    self.entries[highest].is_newest = false;
                    self.entries[highest].is_highest = false;
                    self.entries.push(LeaderboardEntry::submitted(
                        username,
                        question_id,
                        score,
                        timestamp,
                        true,
                    ));
                } else {
                    let latest = &mut self.entries[newest];
                    latest.score = score;
                    latest.timestamp = timestamp;
                    latest.is_newest = true;
                    latest.is_highest = false;

                    let best = &mut self.entries[highest];
                    best.is_newest = false;
                    best.is_highest = true;
                }
            }
        }

        self.trim_group(username, question_id);
    }

    /// Copy of the board sorted by descending score. Ties keep store order.
    pub fn sorted_view(&self) -> Vec<LeaderboardEntry> {
        let mut view = self.entries.clone();
        sort_by_score_desc(&mut view, |e| e.score);
        view
    }

    /// Sorted board restricted to one question.
    pub fn question_view(&self, question_id: &str) -> Vec<LeaderboardEntry> {
        let mut view: Vec<LeaderboardEntry> = self
            .entries
            .iter()
            .filter(|e| e.question_id == question_id)
            .cloned()
            .collect();
        sort_by_score_desc(&mut view, |e| e.score);
        view
    }

    fn group_indices(&self, username: &str, question_id: &str) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_in_group(username, question_id))
            .map(|(i, _)| i)
            .collect()
    }

    fn rank(&self, mut indices: Vec<usize>) -> Vec<usize> {
        sort_by_score_desc(&mut indices, |&i| self.entries[i].score);
        indices
    }

    /// Evict third-ranked entries until the group is back to two.
    fn trim_group(&mut self, username: &str, question_id: &str) {
        loop {
            let group = self.group_indices(username, question_id);
            if group.len() <= MAX_ENTRIES_PER_GROUP {
                break;
            }
            let evicted = self.rank(group)[MAX_ENTRIES_PER_GROUP];
            let removed = self.entries.remove(evicted);
            tracing::debug!(
                "Evicted {} on {} with score {}",
                removed.username,
                removed.question_id,
                removed.score
            );
        }
    }
}
