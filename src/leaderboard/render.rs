//! Text rendering of a leaderboard.

use super::store::LeaderboardEntry;

fn marker(entry: &LeaderboardEntry) -> &'static str {
    match (entry.is_highest, entry.is_newest) {
        (true, true) => "best, latest",
        (true, false) => "best",
        (false, true) => "latest",
        (false, false) => "",
    }
}

/// Format already-sorted entries as a ranked table.
///
/// `limit` caps the number of rows shown.
pub fn format_board(entries: &[LeaderboardEntry], limit: Option<usize>) -> String {
    if entries.is_empty() {
        return "No leaderboard entries yet.".to_string();
    }

    let shown = limit.unwrap_or(entries.len()).min(entries.len());
    let user_width = entries
        .iter()
        .take(shown)
        .map(|e| e.username.chars().count())
        .max()
        .unwrap_or(0)
        .max("User".len());
    let question_width = entries
        .iter()
        .take(shown)
        .map(|e| e.question_id.chars().count())
        .max()
        .unwrap_or(0)
        .max("Question".len());

    let mut output = String::new();
    output.push_str(&format!(
        "{:>4}  {:<uw$}  {:<qw$}  {:>8}  {:<24}  {}\n",
        "#",
        "User",
        "Question",
        "Score",
        "Submitted",
        "",
        uw = user_width,
        qw = question_width,
    ));
    output.push_str(&"─".repeat(4 + user_width + question_width + 8 + 24 + 10 + 12));
    output.push('\n');

    for (i, entry) in entries.iter().take(shown).enumerate() {
        let line = format!(
            "{:>4}  {:<uw$}  {:<qw$}  {:>8.4}  {:<24}  {}",
            i + 1,
            entry.username,
            entry.question_id,
            entry.score,
            entry.timestamp,
            marker(entry),
            uw = user_width,
            qw = question_width,
        );
        output.push_str(line.trim_end());
        output.push('\n');
    }

    if shown < entries.len() {
        output.push_str(&format!("... {} more\n", entries.len() - shown));
    }

    output
}
