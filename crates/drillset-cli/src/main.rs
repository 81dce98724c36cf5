//! drillset CLI — drill a question bank until it is mastered.

use std::process;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use drillset_core::config::load_config;
use drillset_core::session::{open_state, DrillSession};
use drillset_core::store::SessionStore;

mod console;

use console::StdConsole;

#[derive(Parser)]
#[command(
    name = "drillset",
    version,
    about = "Adaptive timed drill trainer",
    override_usage = "drillset <session-name>"
)]
struct Cli {
    /// Session name; progress is kept in <state_dir>/<session-name>.json
    #[arg(value_parser = parse_session_name)]
    session: String,
}

fn parse_session_name(name: &str) -> Result<String, String> {
    if name.is_empty() {
        return Err("session name must not be empty".into());
    }
    if name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(format!(
            "'{name}' is not a valid session name: it must not start with '.' or contain path separators"
        ));
    }
    Ok(name.to_string())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("drillset=warn,drillset_core=warn")),
        )
        .init();

    if let Err(e) = run(&cli.session) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(session: &str) -> Result<()> {
    let config = load_config()?;
    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let store = SessionStore::new(config.session_path(session));
    let state = open_state(&config, &store, &mut rng)?;
    tracing::info!(
        "drilling {} questions, working set {:?}",
        state.questions.len(),
        state.working_set
    );

    let console = StdConsole::new(std::io::stdin().lock(), std::io::stdout());
    let mut drill = DrillSession::new(state, store, console, rng).with_echo_log(config.echo_log);
    drill.run()?;
    Ok(())
}
