//! CLI command implementations

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{Args, Subcommand};
use plexstuff_core::credentials::JACKETT_SERVICE;
use plexstuff_core::format::format_duration;
use plexstuff_core::{IndexerCredential, PlexstuffConfig, ServiceStore};
use plexstuff_search::{
    Candidate, SearchCategory, SearchError, SearchQuery, TorrentSearchService,
};
use serde::Serialize;

/// Exit status for a search that found nothing usable or was malformed.
pub const EXIT_USER_ERROR: u8 = 1;
/// Exit status for indexer, network and settings failures.
pub const EXIT_ENVIRONMENT_ERROR: u8 = 2;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Search for ebooks
    Books(SearchArgs),
    /// Search for TV shows; a trailing sNNeNN keeps only that episode
    Tv(SearchArgs),
    /// Search for movies
    Movies(SearchArgs),
    /// Manage the Jackett server credentials
    Credentials {
        #[command(subcommand)]
        action: CredentialAction,
    },
}

/// Options shared by the search commands
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Name to search for
    #[arg(required = true)]
    pub name: Vec<String>,

    /// Maximum number of results (at least 5)
    #[arg(short = 'n', long = "max", default_value_t = SearchQuery::DEFAULT_MAX_RESULTS, value_parser = parse_max_results)]
    pub max_results: usize,

    /// Keep titles containing at least one of these
    #[arg(short = 'k', long = "keyword")]
    pub keywords: Vec<String>,

    /// Drop titles containing any of these (needs --keyword)
    #[arg(short = 'x', long = "exclude")]
    pub excluded: Vec<String>,

    /// Keep only titles containing all of these (needs --keyword)
    #[arg(short = 'r', long = "require")]
    pub required: Vec<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub no_verify: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Credential management actions
#[derive(Subcommand)]
pub enum CredentialAction {
    /// Store the Jackett base URL and API key
    Set {
        /// Jackett base URL, e.g. http://localhost:9117
        #[arg(long)]
        url: String,
        /// Jackett API key
        #[arg(long)]
        apikey: String,
    },
    /// Show the stored credentials with the API key masked
    Show,
    /// Remove the stored credentials
    Clear,
}

/// Handle the CLI command
///
/// # Errors
/// Returns the search or store error of the command that fails
pub async fn handle_command(
    command: Commands,
    config: &PlexstuffConfig,
    store: Arc<dyn ServiceStore>,
) -> anyhow::Result<()> {
    match command {
        Commands::Books(args) => run_search(SearchCategory::Books, args, config, store).await,
        Commands::Tv(args) => run_search(SearchCategory::TvShows, args, config, store).await,
        Commands::Movies(args) => run_search(SearchCategory::Movies, args, config, store).await,
        Commands::Credentials { action } => manage_credentials(action, config, store.as_ref()),
    }
}

/// Print a failed command and pick its exit status.
///
/// Search failures print their message alone; anything else prints the
/// whole context chain.
pub fn report_failure(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<SearchError>() {
        Some(search_error) => {
            eprintln!("{search_error}");
            exit_status(search_error)
        }
        None => {
            eprintln!("error: {error:#}");
            EXIT_ENVIRONMENT_ERROR
        }
    }
}

fn exit_status(error: &SearchError) -> u8 {
    if error.is_user_error() {
        EXIT_USER_ERROR
    } else {
        tracing::error!(error = %error, "Search failed");
        EXIT_ENVIRONMENT_ERROR
    }
}

fn parse_max_results(value: &str) -> Result<usize, String> {
    let count: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if count < SearchQuery::MIN_MAX_RESULTS {
        return Err(format!(
            "must be at least {}",
            SearchQuery::MIN_MAX_RESULTS
        ));
    }
    Ok(count)
}

/// Run one search and print the ranked candidates
///
/// # Errors
/// - Any `SearchError`, with its user-facing message
/// - JSON serialization failure with `--json`
async fn run_search(
    category: SearchCategory,
    args: SearchArgs,
    config: &PlexstuffConfig,
    store: Arc<dyn ServiceStore>,
) -> anyhow::Result<()> {
    let mut config = config.clone();
    if args.no_verify {
        config.search.verify_tls = false;
    }

    let query = SearchQuery::new(args.name.join(" "), category)
        .with_max_results(args.max_results)
        .with_keywords(args.keywords)
        .with_excluded(args.excluded)
        .with_required(args.required);

    let service = TorrentSearchService::new(&config, store)?;
    let started = Instant::now();
    let candidates = service.search(&query).await?;

    if args.json {
        let report = SearchReport {
            category,
            query: &query.name,
            results: &candidates,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_candidates(&candidates);
        println!(
            "{} results in {}",
            candidates.len(),
            format_duration(started.elapsed().as_secs_f64())
        );
    }
    Ok(())
}

/// `--json` output
#[derive(Serialize)]
struct SearchReport<'a> {
    category: SearchCategory,
    query: &'a str,
    results: &'a [Candidate],
}

fn print_candidates(candidates: &[Candidate]) {
    for (index, candidate) in candidates.iter().enumerate() {
        for line in candidate_lines(index + 1, candidate) {
            println!("{line}");
        }
    }
}

fn candidate_lines(rank: usize, candidate: &Candidate) -> Vec<String> {
    let mut lines = vec![format!(
        "{rank:>3}. {}  [S:{} L:{}]",
        candidate.title,
        format_peer_count(candidate.seeders),
        format_peer_count(candidate.leechers)
    )];
    if let Some(name) = candidate.display_name() {
        if name != candidate.raw_title {
            lines.push(format!("     as {name}"));
        }
    }
    if let Some(date) = candidate.pub_date {
        lines.push(format!("     published {date}"));
    }
    lines.push(format!("     {}", candidate.link));
    lines
}

fn format_peer_count(count: i64) -> String {
    if count < 0 {
        "?".to_string()
    } else {
        count.to_string()
    }
}

/// Set, show or clear the stored Jackett credentials
///
/// # Errors
/// - Store read or write failure
/// - Blank URL or API key on `set`
fn manage_credentials(
    action: CredentialAction,
    config: &PlexstuffConfig,
    store: &dyn ServiceStore,
) -> anyhow::Result<()> {
    match action {
        CredentialAction::Set { url, apikey } => {
            let Some(credential) = IndexerCredential::new(&url, &apikey) else {
                bail!("URL and API key must both be non-empty");
            };
            credential
                .save(store)
                .context("could not save Jackett credentials")?;
            println!("Saved Jackett credentials for {}", credential.url);
        }
        CredentialAction::Show => {
            if let Some(credential) = config.indexer.credential() {
                println!("{} (from environment)", credential.url);
                println!("apikey: {}", credential.masked_apikey());
            } else if let Some(credential) = IndexerCredential::load(store)? {
                println!("{}", credential.url);
                println!("apikey: {}", credential.masked_apikey());
            } else {
                println!("No Jackett credentials stored.");
                println!("Use 'plexstuff credentials set --url <URL> --apikey <KEY>'.");
            }
        }
        CredentialAction::Clear => {
            if store.remove(JACKETT_SERVICE)? {
                println!("Removed Jackett credentials.");
            } else {
                println!("No Jackett credentials stored.");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use plexstuff_core::MemoryStore;

    use super::*;

    #[test]
    fn test_parse_max_results() {
        assert_eq!(parse_max_results("5"), Ok(5));
        assert_eq!(parse_max_results("25"), Ok(25));
        assert!(parse_max_results("4").is_err());
        assert!(parse_max_results("ten").is_err());
    }

    #[test]
    fn test_candidate_lines() {
        let candidate = Candidate::new(
            "Dune.1965.epub".to_string(),
            12,
            -1,
            "magnet:?xt=urn:btih:c12fe1c06bba254a9dc9f519b335aa7c1367a88a&dn=Dune".to_string(),
            Some(2.0),
            None,
        );

        let lines = candidate_lines(1, &candidate);
        assert_eq!(lines[0], "  1. Dune.1965.epub (2.0 MiB)  [S:12 L:?]");
        assert_eq!(lines[1], "     as Dune");
        assert_eq!(lines[2], format!("     {}", candidate.link));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_json_report_names_category() {
        let candidates = vec![Candidate::new(
            "Heat".to_string(),
            1,
            1,
            "magnet:?xt=urn:btih:h".to_string(),
            None,
            None,
        )];
        let report = SearchReport {
            category: SearchCategory::TvShows,
            query: "heat",
            results: &candidates,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["category"], "TvShows");
        assert_eq!(value["query"], "heat");
        assert_eq!(value["results"][0]["raw_title"], "Heat");
    }

    #[test]
    fn test_exit_status_separates_user_errors() {
        let no_results = anyhow::Error::from(SearchError::NoResults {
            noun: "BOOKS",
            name: "dune".to_string(),
        });
        assert_eq!(report_failure(&no_results), EXIT_USER_ERROR);

        let invalid = anyhow::Error::from(SearchError::InvalidQuery {
            reason: "search name is empty".to_string(),
        });
        assert_eq!(report_failure(&invalid), EXIT_USER_ERROR);

        let unavailable = anyhow::Error::from(SearchError::ServerUnavailable {
            url: "http://localhost:9117/".to_string(),
            status: 503,
        });
        assert_eq!(report_failure(&unavailable), EXIT_ENVIRONMENT_ERROR);

        let other = anyhow::anyhow!("could not save Jackett credentials");
        assert_eq!(report_failure(&other), EXIT_ENVIRONMENT_ERROR);
    }

    #[test]
    fn test_format_peer_count() {
        assert_eq!(format_peer_count(-1), "?");
        assert_eq!(format_peer_count(12), "12");
    }

    #[test]
    fn test_credentials_set_and_clear() {
        let store = MemoryStore::new();
        let config = PlexstuffConfig::default();

        manage_credentials(
            CredentialAction::Set {
                url: "http://localhost:9117".to_string(),
                apikey: "key".to_string(),
            },
            &config,
            &store,
        )
        .unwrap();
        assert!(IndexerCredential::load(&store).unwrap().is_some());

        manage_credentials(CredentialAction::Clear, &config, &store).unwrap();
        assert!(IndexerCredential::load(&store).unwrap().is_none());

        let blank = manage_credentials(
            CredentialAction::Set {
                url: " ".to_string(),
                apikey: "key".to_string(),
            },
            &config,
            &store,
        );
        assert!(blank.is_err());
    }
}
