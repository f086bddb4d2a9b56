//! Command-line entry point for the PL ranking tool
//!
//! Loads game records, applies the record filters, checks the comparison
//! graph, estimates Plackett-Luce strengths and prints or exports the
//! resulting ranking.

use anyhow::Result;
use clap::Parser;
use pl_ranking::config::AppConfig;
use pl_ranking::corpus::{self, CorpusFilter};
use pl_ranking::rating::{
    self, conservative_ranking, BayesianRating, EstimationBackend, ExtendedWengLinConfig,
    TracingObserver, WengLinRater,
};
use pl_ranking::{CompetitorId, RankedRating, RankingCorpus};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// PL Ranking - Plackett-Luce ratings from multi-competitor game results
#[derive(Parser)]
#[command(
    name = "pl-ranking",
    version,
    about = "Create Plackett-Luce ratings from game data",
    long_about = "PL Ranking estimates competitor strengths from ranked game results using \
                 minorization-maximization or iterative Luce spectral ranking, with an optional \
                 anchor competitor for poorly connected corpora and a Weng-Lin (OpenSkill) \
                 alternative."
)]
struct Args {
    /// JSON files containing game data
    #[arg(required = true, value_name = "GAME_FILE")]
    game_files: Vec<PathBuf>,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Add a player with a win and loss against every other player
    #[arg(short, long)]
    anchor_player: bool,

    /// Exclude the bottom, always crash, bots
    #[arg(short, long)]
    remove_bottom: bool,

    /// Exclude player (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "USERNAME")]
    exclude: Vec<String>,

    /// Rating convergence tolerance
    #[arg(short, long)]
    tolerance: Option<f64>,

    /// Limit display of ratings to top N (0 for all)
    #[arg(short, long, value_name = "N")]
    display: Option<usize>,

    /// Limit the number of games used (positive for first, negative for last)
    #[arg(short, long, value_name = "N", allow_negative_numbers = true)]
    num_games: Option<i64>,

    /// Filter out suspect games based on workerID
    #[arg(long)]
    remove_suspect: bool,

    /// Filter out games that had bot errors
    #[arg(long)]
    no_error: bool,

    /// Write the full ratings to the given file
    #[arg(short, long, value_name = "FILE")]
    out_file: Option<PathBuf>,

    /// Read initial ratings from the given file
    #[arg(short, long, value_name = "FILE")]
    previous_ratings: Option<PathBuf>,

    /// Estimation backend
    #[arg(long, value_enum)]
    backend: Option<EstimationBackend>,

    /// Stop after this many iterations
    #[arg(long, value_name = "N")]
    max_iterations: Option<u64>,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECONDS")]
    max_seconds: Option<u64>,

    /// Score the ratings in the given file against the games instead of rating
    #[arg(
        short,
        long,
        value_name = "FILE",
        conflicts_with_all = ["anchor_player", "previous_ratings", "out_file"]
    )]
    evaluate: Option<PathBuf>,

    /// Rate with Weng-Lin (OpenSkill) instead of Plackett-Luce
    #[arg(long, conflicts_with_all = ["anchor_player", "previous_ratings", "backend", "evaluate"])]
    weng_lin: bool,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(long, help = "Enable debug mode with verbose logging")]
    debug: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(tolerance) = args.tolerance {
        config.rating.tolerance = tolerance;
    }

    if let Some(backend) = args.backend {
        config.rating.backend = backend;
    }

    if let Some(max_iterations) = args.max_iterations {
        config.rating.max_iterations = Some(max_iterations);
    }

    if let Some(max_seconds) = args.max_seconds {
        config.rating.max_duration_seconds = Some(max_seconds);
    }

    if args.anchor_player {
        config.rating.anchor_competitor = true;
    }

    if let Some(display) = args.display {
        config.output.display_limit = display;
    }

    if let Some(out_file) = &args.out_file {
        config.output.out_file = Some(out_file.clone());
    }

    pl_ranking::config::validate_config(&config)?;
    Ok(config)
}

/// Read, filter and convert the game files
fn load_corpus(args: &Args) -> Result<RankingCorpus> {
    let mut records = corpus::load_game_records(&args.game_files)?;

    if args.no_error {
        records = corpus::filter_error_games(records);
    }

    if args.remove_suspect {
        records = corpus::filter_suspect_games(records);
    }

    let mut filter = CorpusFilter::new().exclude(args.exclude.iter().cloned());
    if args.remove_bottom {
        filter = filter.exclude_crash_bots();
    }
    if let Some(limit) = args.num_games.filter(|n| *n != 0) {
        filter = filter.with_game_limit(limit);
    }

    corpus::build_corpus(&records, &filter)
}

fn number_width(count: usize) -> usize {
    count.max(1).to_string().len()
}

fn name_width<'a>(names: impl Iterator<Item = &'a CompetitorId>) -> usize {
    names.map(|c| c.to_string().len()).max().unwrap_or(0)
}

fn display_ratings(ranking: &[RankedRating], limit: usize) -> Result<()> {
    let shown = rating::top_ratings(ranking, limit)?;

    let rwidth = number_width(shown.len());
    let pwidth = name_width(shown.iter().map(|r| &r.competitor));
    for entry in &shown {
        println!(
            "{:>rwidth$}: {:>pwidth$} {:.4}",
            entry.rank, entry.competitor, entry.rating
        );
    }
    Ok(())
}

fn display_bayesian_ratings(ranking: &[(CompetitorId, BayesianRating)], limit: usize) {
    let shown = if limit > 0 && limit < ranking.len() {
        &ranking[..limit]
    } else {
        ranking
    };

    let rwidth = number_width(shown.len());
    let pwidth = name_width(shown.iter().map(|(c, _)| c));
    for (i, (competitor, rating)) in shown.iter().enumerate() {
        println!(
            "{:>rwidth$}: {:>pwidth$} {:.2} ({:.2}, {:.2})",
            i + 1,
            competitor,
            rating.conservative(),
            rating.mu,
            rating.sigma
        );
    }
}

fn run_weng_lin(corpus: &RankingCorpus, config: &AppConfig) -> Result<()> {
    info!("Using Weng-Lin (OpenSkill) rating.");
    let rater = WengLinRater::new(ExtendedWengLinConfig::default())?;
    let ratings = rater.rate_corpus(corpus, None);
    let ranking = conservative_ranking(&ratings);

    if let Some(path) = &config.output.out_file {
        rating::save_bayesian_ratings(path, &ranking)?;
    }

    display_bayesian_ratings(&ranking, config.output.display_limit);
    Ok(())
}

fn run_plackett_luce(corpus: RankingCorpus, args: &Args, config: &AppConfig) -> Result<()> {
    let report = rating::diagnose(&corpus)?;
    if !report.never_lost.is_empty() {
        warn!("{} were undefeated", report.never_lost.len());
    }
    if !report.never_won.is_empty() {
        warn!("{} never won", report.never_won.len());
    }
    if !config.rating.anchor_competitor && !report.is_clean() {
        warn!("WARNING: Ratings will almost certainly not converge. (Maybe run with --anchor-player)");
    }

    let competitors = corpus.competitors();
    info!("{} players", competitors.len());

    let corpus = if config.rating.anchor_competitor {
        info!("Adding anchor player.");
        rating::augment(&corpus, &competitors)?
    } else {
        corpus
    };

    let initial = match &args.previous_ratings {
        Some(path) => Some(rating::load_ratings(path)?),
        None => None,
    };

    let estimate = rating::estimate(
        &corpus,
        &config.rating.estimate_options(),
        config.rating.backend,
        initial.as_ref(),
        &mut TracingObserver,
    )?;

    let ratings = rating::strip_anchor(estimate.into_converged()?);
    let ranking = rating::rank_ratings(&ratings)?;

    if let Some(path) = &config.output.out_file {
        rating::save_ratings(path, &ranking)?;
    }

    display_ratings(&ranking, config.output.display_limit)
}

fn run_evaluation(corpus: &RankingCorpus, path: &Path) -> Result<()> {
    let ratings = rating::load_ratings(path)?;
    let report = rating::evaluate(corpus, &ratings)?;

    println!("PL rating RMSE {:.6}", report.rmse());
    println!(
        "PL rating incorrectly ordered {:.4}% results",
        report.order_error() * 100.0
    );
    Ok(())
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let corpus = load_corpus(args)?;
    info!("{} games after filtering", corpus.len());

    if let Some(path) = &args.evaluate {
        run_evaluation(&corpus, path)
    } else if args.weng_lin {
        run_weng_lin(&corpus, config)
    } else {
        run_plackett_luce(corpus, args, config)
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("{} {}", config.service.name, pl_ranking::VERSION);

    if let Err(e) = run(&args, &config) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
