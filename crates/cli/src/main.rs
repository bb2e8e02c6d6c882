use anyhow::Context;
use clap::{Parser, Subcommand};

use bookshelf_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Book catalogue service")]
struct Cli {
    /// Configuration environment (local, staging, production); overrides BOOKSHELF_ENV
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations, then serve HTTP (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_for(cli.env.as_deref())
        .with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => bookshelf_app::app::serve(&settings).await,
        Command::Migrate => {
            let applied = bookshelf_app::app::migrate(&settings).await?;
            tracing::info!(migrations_applied = applied, "bookshelf migrate finished");
            Ok(())
        }
    }
}
