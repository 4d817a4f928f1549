mod cli;
mod commands;
mod output;

use tracing_subscriber::EnvFilter;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    init_tracing();

    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::User(args) => commands::user(args).await,
        cli::Command::Properties(args) => commands::properties(args).await,
        cli::Command::Reservations(args) => commands::reservations(args).await,
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
