//! Answer Bench CLI
//!
//! Submit answers to the evaluation benchmark and browse the leaderboard.

use anyhow::{Context, Result};
use answer_bench::{
    client::BenchClient,
    config::Config,
    error::BenchError,
    leaderboard::format_board,
    session::BenchSession,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Answer Bench - submit answers and track the leaderboard
#[derive(Parser)]
#[command(name = "answer-bench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available questions
    Questions,

    /// Submit an answer for evaluation
    Submit {
        /// Question id to answer
        #[arg(short, long)]
        question: String,

        /// Username to submit as (defaults to the configured username)
        #[arg(short, long)]
        username: Option<String>,

        #[command(flatten)]
        answer: AnswerSource,
    },

    /// Show the leaderboard
    Leaderboard {
        /// Only show entries for this question
        #[arg(short, long)]
        question: Option<String>,

        /// Number of rows to show
        #[arg(short = 'n', long, default_value_t = 20)]
        top: usize,

        /// Output as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Test connection to the evaluation service
    Test,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct AnswerSource {
    /// The answer text
    text: Option<String>,

    /// Read the answer from a file
    #[arg(short, long)]
    file: Option<PathBuf>,
}

impl AnswerSource {
    fn read(self) -> Result<String> {
        match (self.text, self.file) {
            (Some(text), _) => Ok(text),
            (None, Some(path)) => std::fs::read_to_string(&path)
                .map_err(|e| BenchError::io(&path, e))
                .context("Failed to read answer file"),
            (None, None) => anyhow::bail!("An answer or --file is required"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("answer_bench={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(cli.api_url)?;

    match cli.command {
        Commands::Questions => cmd_questions(config).await,
        Commands::Submit {
            question,
            username,
            answer,
        } => cmd_submit(config, question, username, answer).await,
        Commands::Leaderboard {
            question,
            top,
            json,
        } => cmd_leaderboard(config, question, top, json).await,
        Commands::Test => cmd_test(config).await,
    }
}

fn load_config(api_url: Option<String>) -> Result<Config> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = api_url {
        config.api.base_url = url;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Print the user-facing message for a failed remote call and keep going.
fn report(err: &BenchError) {
    tracing::error!("{}", err);
    eprintln!("{}", err.user_message());
}

async fn cmd_questions(config: Config) -> Result<()> {
    let mut session = BenchSession::new(BenchClient::new(config.api));

    let questions = match session.fetch_questions().await {
        Ok(questions) => questions,
        Err(e) => {
            report(&e);
            return Ok(());
        }
    };

    if questions.is_empty() {
        println!("No questions available.");
        return Ok(());
    }

    println!("Questions:");
    println!("{}", "─".repeat(60));
    for question in questions {
        println!("{:>6}  {}", question.id, question.prompt);
    }
    println!("{}", "─".repeat(60));
    println!("{} questions", questions.len());

    Ok(())
}

async fn cmd_submit(
    config: Config,
    question: String,
    username: Option<String>,
    answer: AnswerSource,
) -> Result<()> {
    let username = username
        .or_else(|| config.api.username.clone())
        .context("No username given. Pass --username or set BENCH_USERNAME.")?;
    let answer = answer.read()?;

    let mut session = BenchSession::new(BenchClient::new(config.api));

    // The board is shown after submitting; a failed load only costs the
    // previous entries.
    if let Err(e) = session.refresh_leaderboard().await {
        report(&e);
    }

    println!("Submitting answer to {} as {}...", question, username);
    let start = Instant::now();

    let result = match session.submit_answer(&question, &answer, &username).await {
        Ok(result) => result,
        Err(e @ BenchError::MissingInput(_)) => return Err(e).context("Cannot submit"),
        Err(e) => {
            report(&e);
            return Ok(());
        }
    };

    println!("\nEvaluation ({:.2?}):", start.elapsed());
    println!("  Score:               {:.4}", result.score);
    for (name, value) in result.metrics() {
        println!("  {:<20} {:.4}", format!("{}:", name), value);
    }

    println!("\nLeaderboard for {}:", question);
    println!(
        "{}",
        format_board(&session.leaderboard().question_view(&question), Some(10)).trim_end()
    );

    Ok(())
}

async fn cmd_leaderboard(
    config: Config,
    question: Option<String>,
    top: usize,
    json: bool,
) -> Result<()> {
    let mut session = BenchSession::new(BenchClient::new(config.api));

    if let Err(e) = session.refresh_leaderboard().await {
        report(&e);
        return Ok(());
    }

    let board = match &question {
        Some(id) => session.leaderboard().question_view(id),
        None => session.leaderboard().sorted_view(),
    };

    if json {
        let shown: Vec<_> = board.into_iter().take(top).collect();
        let json_str =
            serde_json::to_string_pretty(&shown).context("Failed to serialize leaderboard")?;
        println!("{}", json_str);
    } else {
        println!("{}", format_board(&board, Some(top)).trim_end());
    }

    Ok(())
}

async fn cmd_test(config: Config) -> Result<()> {
    println!("Testing connection to the evaluation service...\n");
    println!("  API Base:  {}", config.api.base_url);
    println!(
        "  Username:  {}",
        config.api.username.as_deref().unwrap_or("(not set)")
    );
    println!();

    let client = BenchClient::new(config.api);

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(count) => {
            println!("Connection successful! {} questions available.", count);
        }
        Err(e) => {
            println!("Connection failed: {}", e);
        }
    }

    Ok(())
}
