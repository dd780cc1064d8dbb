use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use itertools::Itertools;
use serde::Serialize;
use sqlx::SqlitePool;

use cloudream::db::queries::categories::get_all_categories;
use cloudream::db::queries::chapters::get_chapters;
use cloudream::db::queries::contacts::get_contacts;
use cloudream::db::queries::questions::get_questions;
use cloudream::db::{self, Question, QuestionFilter};
use cloudream::import::import_file;
use cloudream::quiz::setup::select_questions;
use cloudream::quiz::{build_plan, terminal, MissedStore, QuizMode, QuizPlan, QuizSession};
use cloudream::quiz::{QuizSettings, TypeFilter};
use cloudream::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Database path
    db_path: PathBuf,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import every *.json question bank in a directory
    Import {
        path: PathBuf,
        #[clap(long)]
        category: String,
        #[clap(long)]
        chapter: String,
    },
    /// Export all data as CSV files
    Export { path: PathBuf },
    /// Take a quiz in the terminal
    Quiz {
        #[clap(long, required_unless_present = "replay")]
        category: Option<String>,
        #[clap(long)]
        chapter: Option<String>,
        #[clap(long, value_enum, default_value_t = QuizMode::Sequential)]
        mode: QuizMode,
        #[clap(long, value_enum, default_value_t = TypeFilter::All)]
        kind: TypeFilter,
        #[clap(long, default_value_t = 5)]
        count: usize,
        /// Where wrongly answered questions are kept
        #[clap(long, default_value = "missed.json")]
        missed: PathBuf,
        /// Replay the missed questions instead of the bank
        #[clap(long)]
        replay: bool,
    },
}

#[derive(Serialize)]
struct QuestionRecord<'a> {
    id: &'a str,
    category: &'a str,
    chapter: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
    options: String,
    correct_option_ids: String,
    explanation: &'a str,
    created_at: String,
}

impl<'a> From<&'a Question> for QuestionRecord<'a> {
    fn from(q: &'a Question) -> Self {
        QuestionRecord {
            id: &q.id,
            category: &q.category,
            chapter: &q.chapter,
            kind: q.kind.as_str(),
            text: &q.text,
            options: q
                .options
                .iter()
                .map(|o| format!("{}:{}", o.id, o.text))
                .join(" | "),
            correct_option_ids: q.correct_option_ids.iter().join(","),
            explanation: &q.explanation,
            created_at: q.created_at.to_rfc3339(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let pool = db::establish_connection(&cli.db_path.display().to_string())
        .await
        .context("Cannot connect to DB")?;
    db::run_migrations(&pool).await?;

    match cli.command {
        Commands::Export { path } => export_data(&pool, path)
            .await
            .map_err(|e| anyhow::anyhow!("Cannot export: {e}"))?,
        Commands::Import {
            path,
            category,
            chapter,
        } => import_data(&pool, &path, &category, &chapter).await?,
        Commands::Quiz {
            category,
            chapter,
            mode,
            kind,
            count,
            missed,
            replay,
        } => {
            let mut store = MissedStore::open(&missed)?;
            let plan = if replay {
                store.replay_plan()?
            } else {
                let category = category.context("--category is required")?;
                let all = get_questions(&pool, &QuestionFilter::default()).await?;
                let questions = select_questions(all, &category, chapter.as_deref());
                build_plan(questions, QuizSettings { mode, kind, count })?
            };
            take_quiz(plan, &mut store, replay)?;
        }
    }
    Ok(())
}

fn write_to(path: PathBuf, data: Vec<impl Serialize>) -> Result<(), Box<dyn Error>> {
    let file = std::fs::File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

async fn export_data(pool: &SqlitePool, path: PathBuf) -> Result<(), Box<dyn Error>> {
    let categories = get_all_categories(pool).await?;
    let chapters = get_chapters(pool, None).await?;
    let questions = get_questions(pool, &QuestionFilter::default()).await?;
    let contacts = get_contacts(pool, None).await?;
    if !path.exists() {
        std::fs::create_dir_all(&path)?
    }
    write_to(path.join("categories.csv"), categories)?;
    write_to(path.join("chapters.csv"), chapters)?;
    write_to(
        path.join("questions.csv"),
        questions
            .iter()
            .map(QuestionRecord::from)
            .collect::<Vec<_>>(),
    )?;
    write_to(path.join("contacts.csv"), contacts)?;
    Ok(())
}

async fn import_data(
    pool: &SqlitePool,
    dir: &Path,
    category: &str,
    chapter: &str,
) -> anyhow::Result<()> {
    let files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Cannot read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .sorted()
        .collect();
    if files.is_empty() {
        anyhow::bail!("No JSON files found in {}", dir.display());
    }
    for file in files {
        match import_file(pool, &file, category, chapter).await {
            Ok(report) => println!(
                "{}: {} imported, {} failed",
                file.display(),
                report.imported,
                report.failed
            ),
            Err(e) => eprintln!("{}: {e:#}", file.display()),
        }
    }
    Ok(())
}

fn take_quiz(plan: QuizPlan, store: &mut MissedStore, replay: bool) -> anyhow::Result<()> {
    let played: Vec<Question> = plan.questions.clone();
    let mut session = QuizSession::from_plan(plan)?;
    let stdin = io::stdin();
    let result = terminal::play(&mut session, stdin.lock(), io::stdout())?;
    if result.is_none() {
        println!("\nQuiz abandoned");
        return Ok(());
    }
    if replay {
        // questions answered right this time leave the store
        for question in &played {
            if !session.missed().iter().any(|m| m.id == question.id) {
                store.remove(&question.id);
            }
        }
    }
    store.record(session.missed());
    store.save()?;
    if !store.is_empty() {
        println!("{} questions kept for replay", store.questions().len());
    }
    Ok(())
}
