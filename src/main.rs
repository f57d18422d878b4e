use axum::extract::Request;
use axum::ServiceExt;
use rewind_backoffice::db::migrate;
use rewind_backoffice::service::{ForeignIdPolicy, SmtpMailer};
use rewind_backoffice::{api, create_pool, AppConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging with local timestamps
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    info!(
        "Starting server on {} (strict item ids: {})",
        config.listen_addr(),
        config.items.reject_foreign_ids
    );

    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    if config.database.run_migrations {
        migrate(&pool).await?;
        info!("Migrations applied");
    }

    let mailer = Arc::new(SmtpMailer::new(&config.mail)?);
    let policy = ForeignIdPolicy::from_config(config.items.reject_foreign_ids);
    let state = api::AppState::new(pool, policy, mailer);
    let app = api::app(state);

    let addr = config.listen_addr();
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  /api/customer, /api/suppliers, /api/incoming-goods");
    info!("  /api/quotations, /api/invoices  - line items reconciled on PUT/PATCH");
    info!("  /api/motors");
    info!("  POST /api/send-email");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
