use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use services::{Clock, DeckOverview, StudySession};
use storage::repository::Storage;
use study_core::model::{Card, Grade};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod deck;

const DEFAULT_DB_URL: &str = "sqlite://study.sqlite3";
const DEFAULT_DECK_PATH: &str = "deck.json";
const QUEUE_PREVIEW: usize = 10;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSeed { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- study  [--db <sqlite_url>] [--deck <path>]... [--seed <u64>]");
    eprintln!("  cargo run -p app -- status [--db <sqlite_url>] [--deck <path>]...");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --deck {DEFAULT_DECK_PATH}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DB_URL, STUDY_DECK (path list), STUDY_SEED, RUST_LOG");
    eprintln!();
    eprintln!("Repeat --deck to join several files; the first card wins for each id.");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Study,
    Status,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "study" => Some(Self::Study),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    db_url: String,
    deck_paths: Vec<PathBuf>,
    seed: Option<u64>,
}

impl Args {
    /// Parse flags, falling back to `env` for anything not given on the
    /// command line.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("STUDY_DB_URL")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut deck_paths: Vec<PathBuf> = env("STUDY_DECK")
            .map(|v| {
                std::env::split_paths(&v)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if deck_paths.is_empty() {
            deck_paths.push(PathBuf::from(DEFAULT_DECK_PATH));
        }
        // The first --deck replaces the env/default list; later ones append.
        let mut deck_from_flags = false;
        let mut seed = env("STUDY_SEED").and_then(|v| v.trim().parse::<u64>().ok());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--deck" => {
                    let value = PathBuf::from(require_value(args, "--deck")?);
                    if !deck_from_flags {
                        deck_paths.clear();
                        deck_from_flags = true;
                    }
                    deck_paths.push(value);
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let parsed: u64 = value
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            deck_paths,
            seed,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:")
    {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

//
// ─── STUDY LOOP ────────────────────────────────────────────────────────────────
//

enum Input {
    Grade(Grade),
    Quit,
    Other,
}

fn read_input(line: Option<String>) -> Input {
    let Some(line) = line else {
        return Input::Quit;
    };
    match line.trim().to_ascii_lowercase().as_str() {
        "q" | "quit" => Input::Quit,
        "p" => Input::Grade(Grade::Pass),
        "f" => Input::Grade(Grade::Fail),
        other => other.parse().map_or(Input::Other, Input::Grade),
    }
}

fn show_front(out: &mut impl Write, header: &str, card: &Card) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{header}")?;
    writeln!(out, "  {}", card.front())?;
    write!(out, "[enter] reveal  [q] quit > ")?;
    out.flush()
}

fn show_back(out: &mut impl Write, card: &Card) -> std::io::Result<()> {
    writeln!(out, "  {}", card.back())?;
    if let Some(detail) = card.detail() {
        writeln!(out, "  {detail}")?;
    }
    write!(out, "[p] pass  [f] fail  [q] quit > ")?;
    out.flush()
}

/// Run the interactive loop until the learner quits or input ends.
async fn study_loop<R, W>(
    session: &mut StudySession,
    input: &mut Lines<R>,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        let card = session.next_card().await?.clone();
        let header = session.progress().to_string();

        show_front(out, &header, &card)?;
        if matches!(read_input(input.next_line().await?), Input::Quit) {
            break;
        }

        show_back(out, &card)?;
        let grade = loop {
            match read_input(input.next_line().await?) {
                Input::Grade(grade) => break Some(grade),
                Input::Quit => break None,
                Input::Other => {
                    write!(out, "[p] pass  [f] fail  [q] quit > ")?;
                    out.flush()?;
                }
            }
        };
        let Some(grade) = grade else {
            break;
        };

        let record = session.grade(grade).await?;
        writeln!(out, "  {grade}: next in {} day(s)", record.interval_days)?;
    }

    writeln!(out)?;
    writeln!(out, "{}", session.progress())?;
    Ok(())
}

async fn status(
    cards: &[Card],
    storage: &Storage,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = DeckOverview::default()
        .summarize(cards, storage.progress.as_ref(), Clock::default_clock())
        .await?;

    writeln!(out, "Cards:      {}", report.total)?;
    writeln!(out, "Likely due: {}", report.likely_due)?;
    writeln!(out, "Due now:    {}", report.due_now)?;
    if !report.queue.is_empty() {
        writeln!(out, "Next up:")?;
        for id in report.queue.iter().take(QUEUE_PREVIEW) {
            writeln!(out, "  {id}")?;
        }
        if report.queue.len() > QUEUE_PREVIEW {
            writeln!(out, "  ... and {} more", report.queue.len() - QUEUE_PREVIEW)?;
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: study when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Study,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Study,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let cards = deck::load_decks(&parsed.deck_paths)?;
    if cards.is_empty() {
        println!("No cards found");
        return Ok(());
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    info!(db = %parsed.db_url, cards = cards.len(), "storage ready");

    let mut stdout = std::io::stdout();
    match cmd {
        Command::Study => {
            let mut session =
                StudySession::start(cards, Arc::clone(&storage.progress), Clock::default_clock())?;
            if let Some(seed) = parsed.seed {
                session = session.with_seed(seed);
            }
            let mut input = BufReader::new(tokio::io::stdin()).lines();
            study_loop(&mut session, &mut input, &mut stdout).await
        }
        Command::Status => status(&cards, &storage, &mut stdout).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use storage::repository::ProgressRepository;
    use study_core::model::CardId;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Args, ArgsError> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut iter = args.iter().map(|s| (*s).to_string());
        Args::parse(&mut iter, |key| env.get(key).cloned())
    }

    fn cards() -> Vec<Card> {
        vec![
            Card::new(CardId::new("a").unwrap(), "front a", "back a"),
            Card::new(CardId::new("b").unwrap(), "front b", "back b").with_detail("more b"),
        ]
    }

    #[test]
    fn defaults_apply_without_flags_or_env() {
        let args = parse(&[], &[]).unwrap();
        assert_eq!(args.db_url, DEFAULT_DB_URL);
        assert_eq!(args.deck_paths, vec![PathBuf::from(DEFAULT_DECK_PATH)]);
        assert_eq!(args.seed, None);
    }

    #[test]
    fn flags_override_env() {
        let args = parse(
            &["--db", "sqlite::memory:", "--seed", "7"],
            &[
                ("STUDY_DB_URL", "sqlite://other.db"),
                ("STUDY_SEED", "3"),
                ("STUDY_DECK", "words.json"),
            ],
        )
        .unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.deck_paths, vec![PathBuf::from("words.json")]);
    }

    #[test]
    fn deck_flags_repeat_and_replace_env_list() {
        let joined = std::env::join_paths(["hsk1.json", "hsk2.json"])
            .unwrap()
            .into_string()
            .unwrap();

        let from_env = parse(&[], &[("STUDY_DECK", joined.as_str())]).unwrap();
        assert_eq!(
            from_env.deck_paths,
            vec![PathBuf::from("hsk1.json"), PathBuf::from("hsk2.json")]
        );

        let from_flags = parse(
            &["--deck", "hsk2.json", "--deck", "custom.json"],
            &[("STUDY_DECK", joined.as_str())],
        )
        .unwrap();
        assert_eq!(
            from_flags.deck_paths,
            vec![PathBuf::from("hsk2.json"), PathBuf::from("custom.json")]
        );
    }

    #[test]
    fn bad_flags_are_reported() {
        assert!(matches!(
            parse(&["--seed", "soon"], &[]),
            Err(ArgsError::InvalidSeed { .. })
        ));
        assert!(matches!(
            parse(&["--deck"], &[]),
            Err(ArgsError::MissingValue { flag: "--deck" })
        ));
        assert!(matches!(
            parse(&["--verbose"], &[]),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            parse(&["--db", "  "], &[]),
            Err(ArgsError::InvalidDbUrl { .. })
        ));
    }

    #[test]
    fn input_parsing_accepts_short_and_long_forms() {
        assert!(matches!(read_input(Some("p".into())), Input::Grade(Grade::Pass)));
        assert!(matches!(read_input(Some(" FAIL ".into())), Input::Grade(Grade::Fail)));
        assert!(matches!(read_input(Some("q".into())), Input::Quit));
        assert!(matches!(read_input(None), Input::Quit));
        assert!(matches!(read_input(Some("maybe".into())), Input::Other));
    }

    #[tokio::test]
    async fn study_loop_grades_until_quit() {
        let storage = Storage::in_memory();
        let mut session = StudySession::start(
            cards(),
            Arc::clone(&storage.progress),
            study_core::time::fixed_clock(),
        )
        .unwrap()
        .with_seed(1);

        let script: &[u8] = b"\np\n\nhuh\nf\nq\n";
        let mut input = BufReader::new(script).lines();
        let mut out = Vec::new();

        study_loop(&mut session, &mut input, &mut out).await.unwrap();

        assert_eq!(session.progress().total_reviewed, 2);
        let stored = storage.progress.get_all().await.unwrap();
        let grades: usize = stored.values().map(|r| (r.pass_count + r.fails) as usize).sum();
        assert_eq!(grades, 2);

        let text = String::from_utf8(out).unwrap();
        // The header is printed after the pick, so the shown card is counted.
        let first_header = text.lines().find(|l| l.starts_with("Cycle")).unwrap();
        assert_eq!(first_header, "Cycle 1 | Seen 1/2 | Reviewed 0");
        assert!(text.contains("Reviewed 2"));
    }

    #[tokio::test]
    async fn status_lists_fresh_cards() {
        let storage = Storage::in_memory();
        let mut out = Vec::new();
        status(&cards(), &storage, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Cards:      2"));
        assert!(text.contains("Due now:    2"));
        assert!(text.contains("  a\n"));
    }
}
