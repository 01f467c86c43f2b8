//! Process lifecycle: open storage, wire modules, serve, tear down.

use anyhow::Context;
use axum::Router;
use folio_db::Database;
use folio_kernel::settings::{DatabaseSettings, Settings};
use folio_kernel::{InitCtx, ModuleRegistry};

use crate::modules;
use crate::modules::books::repository::BookRepository;
use crate::modules::books::seed::{seed_books, SeedOutcome};

/// A wired application: settings, the shared database handle, and the
/// registered modules.
pub struct App {
    settings: Settings,
    db: Database,
    registry: ModuleRegistry,
}

impl App {
    /// Open storage, register modules, initialize them and apply migrations.
    ///
    /// Modules are not started; see [`App::start`].
    pub async fn prepare(settings: Settings) -> anyhow::Result<Self> {
        let db = open_database(&settings.database)?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db);

        let app = Self {
            settings,
            db,
            registry,
        };

        app.registry
            .init_modules(&app.ctx())
            .await
            .context("module initialization failed")?;
        app.registry.run_migrations(&app.db).await?;

        Ok(app)
    }

    /// Run module start hooks (seeding included).
    pub async fn start(&self) -> anyhow::Result<()> {
        self.registry
            .start_modules(&self.ctx())
            .await
            .context("module start failed")
    }

    /// [`App::prepare`] followed by [`App::start`].
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let app = Self::prepare(settings).await?;
        app.start().await?;
        Ok(app)
    }

    /// Seed the catalog regardless of `database.seed_on_start`.
    pub async fn seed(&self) -> anyhow::Result<SeedOutcome> {
        let repo = BookRepository::new(self.db.clone());
        seed_books(&repo).await.context("failed to seed books")
    }

    /// Router serving every module, with middleware applied.
    pub fn router(&self) -> Router {
        folio_http::build_router(&self.registry, &self.settings)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Serve HTTP until Ctrl-C, then shut down.
    pub async fn serve(self) -> anyhow::Result<()> {
        let served =
            folio_http::start_server(&self.registry, &self.settings, folio_http::shutdown_signal())
                .await;
        let stopped = self.shutdown().await;
        served.and(stopped)
    }

    /// Stop modules in reverse order and release the database handle.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.registry.stop_modules().await?;
        drop(self.db);
        tracing::info!("folio shutdown complete");
        Ok(())
    }

    fn ctx(&self) -> InitCtx<'_> {
        InitCtx {
            settings: &self.settings,
            db: &self.db,
        }
    }
}

/// Open the configured database file, or a private in-memory database for
/// `:memory:`.
pub fn open_database(settings: &DatabaseSettings) -> anyhow::Result<Database> {
    let db = if settings.is_in_memory() {
        Database::open_in_memory()
    } else {
        Database::open(&settings.path, settings.busy_timeout())
    };
    db.with_context(|| format!("failed to open database '{}'", settings.path))
}
