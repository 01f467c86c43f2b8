use anyhow::Context;
use folio_app::App;
use folio_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Folio settings")?;
    folio_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.path,
        "folio-app bootstrap starting"
    );

    let app = App::bootstrap(settings).await?;
    tracing::info!("folio-app bootstrap complete");

    app.serve().await
}
