use anyhow::{bail, Context, Result};
use citation_finder::config::{find_config_file, load_config, Config};
use citation_finder::models::{CitationRequest, Paper, SortBy};
use citation_finder::text::analyze;
use citation_finder::ui::{self, Status};
use citation_finder::utils::{format_citation, CitationStyle};
use citation_finder::{CitationFinder, StreamEvent};
use clap::{Parser, Subcommand, ValueEnum};
use futures_util::StreamExt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Citation Finder - Flag uncited claims in prose and suggest papers to cite
#[derive(Parser, Debug)]
#[command(name = "citation-finder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Flag uncited claims in prose and suggest papers to cite", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error log output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (plain if TTY, JSON otherwise)
    Auto,
    /// JSON format (machine-readable)
    Json,
    /// Colored plain text (human-readable)
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if ui::is_terminal() => OutputFormat::Plain,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

/// Sort field for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SortField {
    /// Most-cited first
    Citations,
    /// Provider relevance order
    Relevance,
}

impl From<SortField> for SortBy {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Citations => SortBy::Citations,
            SortField::Relevance => SortBy::Relevance,
        }
    }
}

fn parse_style(value: &str) -> Result<CitationStyle, String> {
    Ok(CitationStyle::parse(value))
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find citations for the claims in a text
    #[command(alias = "f")]
    Find {
        /// Text to analyze (reads --input or stdin when omitted)
        text: Option<String>,

        /// Read the text from a file
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        /// Citation style (apa, mla, chicago, ieee, harvard, vancouver, bibtex, ris)
        #[arg(long, short = 'f', default_value = "apa", value_parser = parse_style)]
        format: CitationStyle,

        /// Earliest publication year (requires --year-end)
        #[arg(long)]
        year_start: Option<i32>,

        /// Latest publication year (requires --year-start)
        #[arg(long)]
        year_end: Option<i32>,

        /// Preferred venues, comma-separated (soft filter)
        #[arg(long, value_delimiter = ',')]
        sources: Vec<String>,

        /// Citations per sentence (1-10)
        #[arg(long, short = 'n', default_value_t = 3)]
        results: i64,

        /// Only suggest papers with an open-access PDF
        #[arg(long)]
        open_access: bool,

        /// Fields of study, comma-separated (e.g. Medicine,Biology)
        #[arg(long, value_delimiter = ',')]
        fields_of_study: Vec<String>,

        /// Prefer papers with at least this many citations (soft filter)
        #[arg(long, default_value_t = 0)]
        min_citations: i64,

        /// Result ordering
        #[arg(long, value_enum, default_value_t = SortField::Citations)]
        sort: SortField,

        /// Print each sentence as soon as its search completes
        #[arg(long)]
        stream: bool,
    },

    /// List the sentences that need a citation, without searching
    #[command(alias = "d")]
    Detect {
        /// Text to analyze (reads --input or stdin when omitted)
        text: Option<String>,

        /// Read the text from a file
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
    },

    /// Format paper records (provider JSON, one object or an array) as citations
    Format {
        /// JSON file with the paper record(s) (reads stdin when omitted)
        paper: Option<PathBuf>,

        /// Citation style
        #[arg(long, short = 'f', default_value = "apa", value_parser = parse_style)]
        format: CitationStyle,

        /// Print every supported style
        #[arg(long)]
        all: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn print_env_vars() {
    println!("Citation Finder - Environment Variables");
    println!();
    println!("API Keys:");
    println!("  SEMANTIC_SCHOLAR_API_KEY    API key for Semantic Scholar (higher rate limits)");
    println!();
    println!("Search Settings:");
    println!("  CITATION_FINDER_SEARCH__BASE_URL            Provider API root");
    println!("  CITATION_FINDER_SEARCH__TIMEOUT_SECS        Per-request timeout (default: 10)");
    println!("  CITATION_FINDER_SEARCH__MAX_ATTEMPTS        Attempts per search (default: 3)");
    println!("  CITATION_FINDER_SEARCH__INITIAL_BACKOFF_MS  First retry delay (default: 1000)");
    println!("  CITATION_FINDER_SEARCH__CACHE_CAPACITY      Cached searches (default: 256)");
    println!("  CITATION_FINDER_SEARCH__MAX_CONCURRENT      Concurrent searches (default: 8)");
    println!();
    println!("DOI Settings:");
    println!("  CITATION_FINDER_DOI__ENABLED                Check DOIs (default: true)");
    println!("  CITATION_FINDER_DOI__RESOLVER_URL           Resolver root (default: https://doi.org)");
    println!("  CITATION_FINDER_DOI__TIMEOUT_SECS           Per-request timeout (default: 4)");
    println!("  CITATION_FINDER_DOI__CACHE_CAPACITY         Cached DOI answers (default: 1024)");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    std::process::exit(0);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
    }

    // Initialize tracing based on verbosity; logs go to stderr so JSON on stdout stays clean
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("citation_finder={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = resolve_config(cli.config.as_deref())?;
    let output = cli.output.resolve();

    match cli.command {
        Some(Commands::Find {
            text,
            input,
            format,
            year_start,
            year_end,
            sources,
            results,
            open_access,
            fields_of_study,
            min_citations,
            sort,
            stream,
        }) => {
            let text = read_text(text, input.as_deref())?;

            let mut request = CitationRequest::new()
                .format(format)
                .sources(sources)
                .results_per_sentence(results)
                .open_access_only(open_access)
                .fields_of_study(fields_of_study)
                .min_citation_count(min_citations)
                .sort_by(sort.into());
            match (year_start, year_end) {
                (Some(start), Some(end)) => request = request.year_range(start, end),
                (None, None) => {}
                _ => tracing::warn!("Ignoring year range: both --year-start and --year-end are needed"),
            }

            let finder = CitationFinder::from_config(&config)?;
            if stream {
                let mut events = finder.stream_citations(&text, &request)?;
                while let Some(event) = events.next().await {
                    match output {
                        OutputFormat::Json => println!("{}", serde_json::to_string(&event)?),
                        _ => match event {
                            StreamEvent::Result { index, result } => {
                                println!("{}\n", ui::render_result(index, &result));
                            }
                            StreamEvent::Done => {
                                println!("{}", ui::render_header(Status::Success, "Done"));
                            }
                        },
                    }
                }
            } else {
                let results = finder.find_citations(&text, &request).await?;
                match output {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
                    _ => {
                        if results.is_empty() {
                            println!(
                                "{}",
                                ui::render_header(Status::Info, "No citations found")
                            );
                        }
                        for (index, result) in results.iter().enumerate() {
                            println!("{}\n", ui::render_result(index, result));
                        }
                    }
                }
            }
        }

        Some(Commands::Detect { text, input }) => {
            let text = read_text(text, input.as_deref())?;
            if text.trim().is_empty() {
                bail!("No text provided");
            }

            let candidates = analyze(&text);
            match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&candidates)?),
                _ => {
                    let summary = format!("{} sentence(s) need a citation", candidates.len());
                    println!("{}", ui::render_header(Status::Search, &summary));
                    for (index, candidate) in candidates.iter().enumerate() {
                        println!("{}", ui::render_candidate(index, candidate));
                    }
                }
            }
        }

        Some(Commands::Format { paper, format, all }) => {
            let raw = match paper {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => read_stdin()?,
            };
            let papers = parse_papers(&raw)?;
            let styles: Vec<CitationStyle> = if all {
                CitationStyle::ALL.to_vec()
            } else {
                vec![format]
            };

            match output {
                OutputFormat::Json => {
                    let rendered: Vec<serde_json::Value> = papers
                        .iter()
                        .flat_map(|paper| {
                            styles.iter().map(move |style| {
                                serde_json::json!({
                                    "style": style.id(),
                                    "citation": format_citation(paper, *style),
                                })
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&rendered)?);
                }
                _ => {
                    for paper in &papers {
                        for style in &styles {
                            if all {
                                println!("{}", ui::render_header(Status::Info, style.id()));
                            }
                            println!("{}\n", format_citation(paper, *style));
                        }
                    }
                }
            }
        }

        Some(Commands::Config) => {
            print!("{}", config.to_toml()?);
        }

        None => {
            println!("citation-finder {}", citation_finder::VERSION);
            println!("Run 'citation-finder --help' for usage.");
        }
    }

    Ok(())
}

fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_config(Some(path))
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }
    if let Some(path) = find_config_file() {
        tracing::info!("Using config file: {}", path.display());
        return load_config(Some(path.as_path()))
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }
    Ok(load_config(None)?)
}

fn read_text(text: Option<String>, input: Option<&Path>) -> Result<String> {
    match (text, input) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        (None, None) => read_stdin(),
    }
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}

fn parse_papers(raw: &str) -> Result<Vec<Paper>> {
    let value: serde_json::Value = serde_json::from_str(raw).context("Invalid paper JSON")?;
    let papers = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        // Accept a raw provider search response too
        serde_json::Value::Object(ref map) if map.contains_key("data") => {
            serde_json::from_value(map["data"].clone())?
        }
        _ => vec![serde_json::from_value(value)?],
    };
    Ok(papers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["citation-finder"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert_eq!(cli.output, OutputFormat::Auto);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["citation-finder", "-v"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["citation-finder", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_output_format() {
        let cli = Cli::parse_from(["citation-finder", "-o", "json"]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.output.resolve(), OutputFormat::Json);

        let cli = Cli::parse_from(["citation-finder", "--output", "plain"]);
        assert_eq!(cli.output, OutputFormat::Plain);
    }

    #[test]
    fn test_cli_find_command() {
        let cli = Cli::parse_from([
            "citation-finder",
            "find",
            "Studies show that exercise helps.",
            "--format",
            "ieee",
            "--year-start",
            "2010",
            "--year-end",
            "2020",
            "--sources",
            "Nature,Science",
            "-n",
            "5",
            "--open-access",
            "--sort",
            "relevance",
            "--stream",
        ]);

        match cli.command {
            Some(Commands::Find {
                text,
                format,
                year_start,
                year_end,
                sources,
                results,
                open_access,
                sort,
                stream,
                ..
            }) => {
                assert_eq!(text.as_deref(), Some("Studies show that exercise helps."));
                assert_eq!(format, CitationStyle::Ieee);
                assert_eq!(year_start, Some(2010));
                assert_eq!(year_end, Some(2020));
                assert_eq!(sources, vec!["Nature", "Science"]);
                assert_eq!(results, 5);
                assert!(open_access);
                assert_eq!(sort, SortField::Relevance);
                assert!(stream);
            }
            _ => panic!("Expected Find command"),
        }
    }

    #[test]
    fn test_cli_unknown_style_falls_back_to_apa() {
        let cli = Cli::parse_from(["citation-finder", "find", "text", "-f", "turabian"]);
        match cli.command {
            Some(Commands::Find { format, .. }) => assert_eq!(format, CitationStyle::Apa),
            _ => panic!("Expected Find command"),
        }
    }

    #[test]
    fn test_cli_detect_and_config_commands() {
        let cli = Cli::parse_from(["citation-finder", "detect", "--input", "essay.txt"]);
        match cli.command {
            Some(Commands::Detect { text, input }) => {
                assert!(text.is_none());
                assert_eq!(input, Some(PathBuf::from("essay.txt")));
            }
            _ => panic!("Expected Detect command"),
        }

        let cli = Cli::parse_from(["citation-finder", "config"]);
        assert!(matches!(cli.command, Some(Commands::Config)));
    }

    #[test]
    fn test_parse_papers_shapes() {
        let single = r#"{"title": "One", "authors": [{"name": "Ada Lovelace"}]}"#;
        assert_eq!(parse_papers(single).unwrap().len(), 1);

        let list = r#"[{"title": "One"}, {"title": "Two"}]"#;
        assert_eq!(parse_papers(list).unwrap().len(), 2);

        let response = r#"{"total": 1, "data": [{"title": "One"}]}"#;
        assert_eq!(parse_papers(response).unwrap()[0].title(), Some("One"));

        assert!(parse_papers("not json").is_err());
    }

    #[test]
    fn test_sort_field_conversion() {
        assert_eq!(SortBy::from(SortField::Citations), SortBy::Citations);
        assert_eq!(SortBy::from(SortField::Relevance), SortBy::Relevance);
    }
}
