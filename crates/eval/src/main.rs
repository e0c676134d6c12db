//! Evaluation CLI for internship matching quality.
//!
//! Usage:
//!     eval match --catalog data/catalog.json --profile data/profile.json
//!     eval stats --catalog data/catalog.json
//!     eval benchmark --catalog data/catalog.json --test-file data/benchmark.json

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use internmatch_explain::summarize_match;
use internmatch_features::CorpusStats;
use internmatch_filter::FilterState;
use internmatch_model::{Match, Posting, Profile};
use internmatch_rank::{match_postings, MatchConfig, MatchSession, SortOption};
use internmatch_reference::ReferenceTables;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "eval")]
#[command(about = "Evaluate internship matching quality")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log pipeline decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Match a profile against a catalog
    Match {
        /// Path to the postings JSON array
        #[arg(long)]
        catalog: PathBuf,

        /// Path to the profile JSON object
        #[arg(long)]
        profile: PathBuf,

        /// Reference tables JSON (built-in tables when omitted)
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Partial MatchConfig JSON override
        #[arg(long)]
        config: Option<PathBuf>,

        /// Keep postings tagged with this sector (repeatable)
        #[arg(long = "sector")]
        sectors: Vec<String>,

        /// Keep postings requiring this skill (repeatable)
        #[arg(long = "skill")]
        skills: Vec<String>,

        /// remote, onsite or hybrid
        #[arg(long)]
        work_mode: Option<String>,

        /// Education level the posting must accept
        #[arg(long)]
        education: Option<String>,

        #[arg(long)]
        min_stipend: Option<u64>,

        #[arg(long)]
        min_score: Option<u8>,

        #[arg(long, value_enum, default_value = "best")]
        sort: SortArg,

        /// Maximum results
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print corpus statistics for a catalog
    Stats {
        #[arg(long)]
        catalog: PathBuf,

        /// Reference tables JSON (built-in tables when omitted)
        #[arg(long)]
        reference: Option<PathBuf>,
    },

    /// Run benchmark cases against a catalog
    Benchmark {
        #[arg(long)]
        catalog: PathBuf,

        /// Path to test JSON file
        #[arg(short, long)]
        test_file: PathBuf,

        /// Reference tables JSON (built-in tables when omitted)
        #[arg(long)]
        reference: Option<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Best,
    Score,
    StipendDesc,
    StipendAsc,
}

impl From<SortArg> for SortOption {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Best => SortOption::BestMatch,
            SortArg::Score => SortOption::Score,
            SortArg::StipendDesc => SortOption::StipendHighToLow,
            SortArg::StipendAsc => SortOption::StipendLowToHigh,
        }
    }
}

/// One benchmark expectation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BenchmarkCase {
    name: String,
    profile: Profile,
    /// Posting ids that must appear, in this order, at the head of the list
    #[serde(default)]
    expected_top: Vec<String>,
    /// Posting ids that must be rejected
    #[serde(default)]
    expected_absent: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(format!("internmatch={level}"))
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Match {
            catalog,
            profile,
            reference,
            config,
            sectors,
            skills,
            work_mode,
            education,
            min_stipend,
            min_score,
            sort,
            limit,
            format,
        } => {
            let filters = FilterState::from_selections(
                &sectors,
                &skills,
                work_mode.as_deref(),
                education.as_deref(),
                min_stipend,
                min_score,
            )?;
            let reference = load_reference(reference.as_deref())?;
            let config = load_config(config.as_deref())?;
            let catalog: Vec<Posting> = read_json(&catalog)?;
            let profile: Profile = read_json(&profile)?;

            let mut session = MatchSession::new(reference, config);
            session.catalog_refreshed(catalog);
            session.profile_submitted(profile);
            session.sort_changed(sort.into());
            session.filters_changed(filters);

            let visible: Vec<&Match> = session.visible().into_iter().take(limit).collect();
            print_matches(&visible, session.matches().len(), &format)?;
        }
        Commands::Stats { catalog, reference } => {
            let reference = load_reference(reference.as_deref())?;
            let catalog: Vec<Posting> = read_json(&catalog)?;
            let stats = CorpusStats::build(&catalog, &reference);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Benchmark {
            catalog,
            test_file,
            reference,
            config,
        } => {
            let reference = load_reference(reference.as_deref())?;
            run_benchmark(&catalog, &test_file, &reference, config.as_deref())?;
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    tracing::debug!(path = %path.display(), "reading json");
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_reference(path: Option<&Path>) -> Result<ReferenceTables> {
    match path {
        Some(path) => ReferenceTables::load(path)
            .with_context(|| format!("loading reference tables {}", path.display())),
        None => Ok(ReferenceTables::builtin()),
    }
}

fn load_config(path: Option<&Path>) -> Result<MatchConfig> {
    match path {
        Some(path) => read_json(path),
        None => Ok(MatchConfig::default()),
    }
}

fn print_matches(matches: &[&Match], scored: usize, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(matches)?);
        return Ok(());
    }

    for (i, m) in matches.iter().enumerate() {
        let posting = &m.posting;
        println!("\n{}. {} at {} (ID: {})", i + 1, posting.title, posting.company, posting.id);
        println!(
            "   Stipend: {} | Location: {} | Mode: {:?}",
            if posting.stipend.is_empty() { "-" } else { posting.stipend.as_str() },
            posting.location.as_ref().map(|l| l.city()).unwrap_or("-"),
            posting.work_mode
        );
        println!("   {}", summarize_match(m));
        println!("   {}", m.explanation);
    }

    println!("\n---");
    println!("Showing {} of {} matches", matches.len(), scored);

    Ok(())
}

fn run_benchmark(
    catalog: &Path,
    test_file: &Path,
    reference: &ReferenceTables,
    config: Option<&Path>,
) -> Result<()> {
    let catalog: Vec<Posting> = read_json(catalog)?;
    let cases: Vec<BenchmarkCase> = read_json(test_file)?;
    let config = load_config(config)?;
    let stats = CorpusStats::build(&catalog, reference);

    let mut failures = 0;
    for case in &cases {
        let matches = match_postings(&case.profile, &catalog, &stats, reference, &config);
        let ids: Vec<&str> = matches.iter().map(|m| m.posting.id.as_str()).collect();

        let mut problems = Vec::new();
        let head: Vec<&str> = ids.iter().take(case.expected_top.len()).copied().collect();
        if head != case.expected_top {
            problems.push(format!("expected top {:?}, got {:?}", case.expected_top, head));
        }
        for absent in &case.expected_absent {
            if ids.contains(&absent.as_str()) {
                problems.push(format!("{} should have been rejected", absent));
            }
        }

        if problems.is_empty() {
            println!("PASS {}", case.name);
        } else {
            failures += 1;
            println!("FAIL {}", case.name);
            for problem in problems {
                println!("     {}", problem);
            }
        }
    }

    println!("\n---");
    println!("{}/{} cases passed", cases.len() - failures, cases.len());

    if failures > 0 {
        bail!("{} benchmark case(s) failed", failures);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_accepts_reference_tables() {
        let cli = Cli::try_parse_from([
            "eval",
            "benchmark",
            "--catalog",
            "data/catalog.json",
            "--test-file",
            "data/benchmark.json",
            "--reference",
            "tables.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Benchmark { reference, .. } => {
                assert_eq!(reference, Some(PathBuf::from("tables.json")));
            }
            _ => panic!("expected the benchmark command"),
        }
    }

    #[test]
    fn test_missing_reference_file_is_an_error() {
        let err = load_reference(Some(Path::new("does/not/exist.json"))).unwrap_err();
        assert!(err.to_string().contains("loading reference tables"));
        assert!(load_reference(None).is_ok());
    }
}
