// Megaverse CLI - reconcile a candidate's megaverse against its goal map

mod exit_codes;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use megaverse_client::MegaverseClient;
use megaverse_config::{ConfigError, Settings};
use megaverse_core::{parse_cell, CellCode, GoalGrid};
use megaverse_recon::{ReconError, ReconOptions, ReconReport, Reconciler};
use serde::Serialize;

use exit_codes::{
    config_exit_code, recon_exit_code, EXIT_ERROR, EXIT_PARTIAL, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser, Debug)]
#[command(name = "megaverse")]
#[command(about = "Reconcile a megaverse map against its goal")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// Config file (default: <config dir>/megaverse/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Candidate identifier sent with every request
    #[arg(long, global = true, env = "CANDIDATE_ID", hide_env_values = true)]
    candidate_id: Option<String>,

    /// API base URL
    #[arg(long, global = true, env = "MEGAVERSE_API_BASE", value_name = "URL")]
    api_base: Option<String>,

    /// Attempts per request while rate limited (0 = no cap, same as the config file)
    #[arg(long, global = true, value_name = "N", conflicts_with = "uncapped")]
    max_attempts: Option<u32>,

    /// Retry rate-limited requests without a cap
    #[arg(long, global = true)]
    uncapped: bool,

    /// Pause after every clear request
    #[arg(long, global = true, value_name = "MS")]
    clear_delay_ms: Option<u64>,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clear the grid, then create every object in the goal map
    #[command(after_help = "\
Examples:
  megaverse run --candidate-id 1234abcd
  CANDIDATE_ID=1234abcd megaverse run --json > report.json
  megaverse run --skip-clear --uncapped")]
    Run {
        /// Go straight to creation
        #[arg(long)]
        skip_clear: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch and print the goal map without changing anything
    Goal {
        /// Print the grid and decoded intents as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete polyanets across an N x N region
    Clear {
        /// Side length of the region
        #[arg(long, value_name = "N")]
        size: usize,
    },
}

fn main() -> ExitCode {
    // A .env in the working directory fills unset variables only.
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS });
        }
    };
    logging::init(cli.global.quiet);

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = resolve_settings(&cli.global)?;
    match cli.command {
        Commands::Run { skip_clear, json } => cmd_run(&settings, skip_clear, json),
        Commands::Goal { json } => cmd_goal(&settings, json),
        Commands::Clear { size } => cmd_clear(&settings, size),
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::MissingCandidate => {
                Some("pass --candidate-id or set CANDIDATE_ID".to_string())
            }
            _ => None,
        };
        Self { code: config_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn recon(err: ReconError) -> Self {
        let hint = if err.is_goal_failure() {
            Some("nothing was cleared or created".to_string())
        } else {
            None
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Defaults < config file < .env < environment < flags. Clap already folds
/// the environment, including anything loaded from .env, into the flag values.
fn resolve_settings(global: &GlobalArgs) -> Result<Settings, CliError> {
    let mut settings = Settings::load(global.config.as_deref()).map_err(CliError::config)?;

    if let Some(id) = &global.candidate_id {
        settings.candidate_id = Some(id.clone());
    }
    if let Some(base) = &global.api_base {
        settings.api.base_url = base.clone();
    }
    if let Some(n) = global.max_attempts {
        settings.retry.max_attempts = n;
    }
    if global.uncapped {
        settings.retry.max_attempts = 0;
    }
    if let Some(ms) = global.clear_delay_ms {
        settings.clear.delay_ms = ms;
    }

    Ok(settings)
}

fn connect(settings: &Settings) -> Result<MegaverseClient, CliError> {
    let candidate = settings.candidate_id().map_err(CliError::config)?;
    MegaverseClient::with_base_url(candidate, &settings.api.base_url, settings.timeout())
        .map_err(|e| CliError::general(e.to_string()))
}

fn reconciler(settings: &Settings, skip_clear: bool) -> Result<Reconciler<MegaverseClient>, CliError> {
    let client = connect(settings)?;
    let options = ReconOptions {
        clear_delay: settings.clear_delay(),
        skip_clear,
        retry_goal: settings.goal.retry,
        granularity: settings.dedup.granularity,
    };
    Ok(Reconciler::blocking(client, settings.retry_policy(), options))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_run(settings: &Settings, skip_clear: bool, json: bool) -> Result<(), CliError> {
    let mut recon = reconciler(settings, skip_clear)?;
    let report = recon.run().map_err(CliError::recon)?;

    if json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    if report.has_failures() {
        return Err(CliError {
            code: EXIT_PARTIAL,
            message: format!("{} object(s) were not created", report.summary.failed),
            hint: Some("run again; the grid is cleared before creating".to_string()),
        });
    }
    Ok(())
}

#[derive(Serialize)]
struct GoalOutput<'a> {
    grid_size: usize,
    goal: &'a GoalGrid,
    intents: Vec<megaverse_core::ObjectIntent>,
}

fn cmd_goal(settings: &Settings, json: bool) -> Result<(), CliError> {
    let mut recon = reconciler(settings, true)?;
    let goal = recon.fetch_goal().map_err(CliError::recon)?;
    let intents = goal.intents();

    if json {
        return print_json(&GoalOutput {
            grid_size: goal.grid_size(),
            goal: &goal,
            intents,
        });
    }

    for row in goal.rows() {
        let line: String = row.iter().map(|code| glyph(&parse_cell(code))).collect();
        println!("{}", line);
    }
    println!();
    println!("{} object(s) in a {}x{} grid", intents.len(), goal.grid_size(), goal.grid_size());
    for intent in &intents {
        println!("  {}", intent.label());
    }
    Ok(())
}

fn cmd_clear(settings: &Settings, size: usize) -> Result<(), CliError> {
    let mut recon = reconciler(settings, false)?;
    let report = recon.clear(size);
    println!(
        "cleared {} of {} cell(s), {} warning(s)",
        report.cleared,
        size * size,
        report.warnings
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("cannot serialize output: {}", e)))?;
    println!("{}", out);
    Ok(())
}

fn print_report(report: &ReconReport) {
    let size = report.meta.grid_size;
    println!("candidate:  {}", report.meta.candidate_id);
    println!("grid:       {}x{}", size, size);
    match &report.clear {
        Some(clear) => println!("cleared:    {} ({} warning(s))", clear.cleared, clear.warnings),
        None => println!("cleared:    skipped"),
    }
    println!("created:    {}", report.summary.created);
    println!("skipped:    {}", report.summary.skipped);
    println!("failed:     {}", report.summary.failed);
    for failure in &report.failures {
        let error = failure.error.as_deref().unwrap_or("unknown error");
        println!("  {}: {}", failure.intent.label(), error);
    }
}

fn glyph(cell: &CellCode) -> char {
    match cell {
        CellCode::Space => '.',
        CellCode::Polyanet => 'P',
        CellCode::Soloon(_) => 'S',
        CellCode::Cometh(_) => 'C',
        CellCode::Unknown(_) => '?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exit_codes::EXIT_CONFIG;
    use std::io::Write;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_flags_override_file() {
        let file = config_file(
            r#"
candidate_id = "from-file"

[api]
base_url = "http://file.example/api"

[retry]
max_attempts = 7

[clear]
delay_ms = 900
"#,
        );
        let global = GlobalArgs {
            config: Some(file.path().to_path_buf()),
            candidate_id: Some("from-flag".into()),
            clear_delay_ms: Some(0),
            ..GlobalArgs::default()
        };

        let settings = resolve_settings(&global).unwrap();
        assert_eq!(settings.candidate_id().unwrap(), "from-flag");
        assert_eq!(settings.api.base_url, "http://file.example/api");
        assert_eq!(settings.retry_policy().max_attempts, Some(7));
        assert_eq!(settings.clear.delay_ms, 0);
    }

    #[test]
    fn test_uncapped_flag() {
        let file = config_file("");
        let global = GlobalArgs {
            config: Some(file.path().to_path_buf()),
            uncapped: true,
            ..GlobalArgs::default()
        };
        let settings = resolve_settings(&global).unwrap();
        assert_eq!(settings.retry_policy().max_attempts, None);
    }

    #[test]
    fn test_zero_max_attempts_flag_means_uncapped() {
        let file = config_file("[retry]\nmax_attempts = 4\n");
        let global = GlobalArgs {
            config: Some(file.path().to_path_buf()),
            max_attempts: Some(0),
            ..GlobalArgs::default()
        };
        let settings = resolve_settings(&global).unwrap();
        assert_eq!(settings.retry_policy().max_attempts, None);

        // Same reading as the file.
        let file = config_file("[retry]\nmax_attempts = 0\n");
        let global = GlobalArgs {
            config: Some(file.path().to_path_buf()),
            ..GlobalArgs::default()
        };
        let settings = resolve_settings(&global).unwrap();
        assert_eq!(settings.retry_policy().max_attempts, None);
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let global = GlobalArgs {
            config: Some(PathBuf::from("/nonexistent/megaverse.toml")),
            ..GlobalArgs::default()
        };
        let err = resolve_settings(&global).unwrap_err();
        assert_eq!(err.code, EXIT_CONFIG);
    }

    #[test]
    fn test_missing_candidate_has_hint() {
        let err = CliError::config(ConfigError::MissingCandidate);
        assert_eq!(err.code, EXIT_CONFIG);
        assert!(err.hint.as_deref().is_some_and(|h| h.contains("CANDIDATE_ID")));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "megaverse",
            "run",
            "--skip-clear",
            "--candidate-id",
            "abc",
            "--max-attempts",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.global.candidate_id.as_deref(), Some("abc"));
        assert_eq!(cli.global.max_attempts, Some(3));
        assert!(matches!(cli.command, Commands::Run { skip_clear: true, json: false }));
    }

    #[test]
    fn test_max_attempts_conflicts_with_uncapped() {
        let err = Cli::try_parse_from(["megaverse", "run", "--max-attempts", "3", "--uncapped"]);
        assert!(err.is_err());
    }

    #[test]
    fn test_glyphs() {
        let row: String = ["SPACE", "POLYANET", "RED_SOLOON", "COMETH_UP", "NOPE"]
            .iter()
            .map(|c| glyph(&parse_cell(c)))
            .collect();
        assert_eq!(row, ".PSC?");
    }
}
