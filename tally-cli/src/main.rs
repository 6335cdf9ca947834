//! Tally command line
//!
//! ```bash
//! # One calculation: <num1> <num2> <operation>
//! tally 10 5 add
//!
//! # Interactive session
//! tally
//!
//! # Commands from plugin descriptors instead of the built-in list
//! tally --plugin-dir plugins
//! ```

mod repl;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;
use tally::{Calculator, Config};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use repl::Repl;

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(version)]
#[command(about = "Calculator with pluggable operations and a CSV history")]
struct Cli {
    /// `<num1> <num2> <operation>` for a single calculation; none starts a session
    #[arg(value_name = "ARGS", allow_hyphen_values = true, allow_negative_numbers = true, num_args = 0..)]
    args: Vec<String>,

    /// Directory of plugin descriptors
    #[arg(long, env = "TALLY_PLUGIN_DIR")]
    plugin_dir: Option<PathBuf>,

    /// Default file for save_history / load_history
    #[arg(long, env = "TALLY_HISTORY_PATH")]
    history: Option<PathBuf>,

    /// Time box per calculation in milliseconds, 0 for none
    #[arg(long, env = "TALLY_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
}

impl Cli {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.plugin_dir {
            config.plugin_dir = Some(dir.clone());
        }
        if let Some(path) = &self.history {
            config.history_path = path.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout = Duration::from_millis(ms);
        }
        config
    }
}

fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match &config.log_file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = cli.apply(Config::from_env()?);

    init_logging(&config)?;
    info!(environment = %config.environment, "application started");

    let mut calculator = Calculator::from_config(&config).context("loading commands")?;

    match cli.args.as_slice() {
        [] => {
            let mut repl = Repl::new(calculator, config.history_path.clone());
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            repl.run(stdin, &mut stdout).await?;
            Ok(ExitCode::SUCCESS)
        }
        [num1, num2, operation] => {
            info!(%num1, %num2, %operation, "command-line calculation");
            match calculator.calculate(operation, &[num1, num2]).await {
                Ok(record) => {
                    println!("The result of {} {} {} is {}", num1, operation, num2, record.result);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!(error = %e, "calculation failed");
                    eprintln!("Error: {}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        other => bail!(
            "expected `<num1> <num2> <operation>` or no arguments, got {} argument(s)",
            other.len()
        ),
    }
}
