use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_app::modules::books::seed::SeedOutcome;
use folio_app::App;
use folio_kernel::settings::Settings;

/// Folio book catalog.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Database file, overriding `database.path` from configuration.
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Port to listen on, overriding `server.port`.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending migrations and exit.
    Migrate,
    /// Apply migrations and insert the default catalog into an empty database.
    Seed,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Serve { .. } => "serve",
            Command::Migrate => "migrate",
            Command::Seed => "seed",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load Folio settings")?;
    if let Some(path) = cli.database {
        settings.database.path = path;
    }
    folio_telemetry::init(&settings.telemetry)?;

    let command = cli.command.unwrap_or(Command::Serve { port: None });
    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.path,
        command = command.name(),
        "folio cli starting"
    );

    match command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            App::bootstrap(settings).await?.serve().await
        }
        Command::Migrate => {
            let app = App::prepare(settings).await?;
            tracing::info!("migrate complete");
            println!("migrations up to date ({})", app.settings().database.path);
            app.shutdown().await
        }
        Command::Seed => {
            let app = App::prepare(settings).await?;
            match app.seed().await? {
                SeedOutcome::Seeded { inserted } => {
                    tracing::info!(inserted, "seed complete");
                    println!("seeded {inserted} books");
                }
                SeedOutcome::AlreadySeeded { existing } => {
                    tracing::info!(existing, "seed skipped; catalog not empty");
                    println!("catalog already has {existing} books; nothing to seed");
                }
            }
            app.shutdown().await
        }
    }
}
