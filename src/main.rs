use questionnaire_backend::{
    config::{get_config, init_config, LogFormat, StoreBackend},
    database::pool::create_pool,
    routes,
    store::{InMemoryQuestionnaireStore, PgQuestionnaireStore, QuestionnaireStore},
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn open_store() -> anyhow::Result<Arc<dyn QuestionnaireStore>> {
    match get_config().store_backend {
        StoreBackend::Postgres => {
            let pool = create_pool().await?;
            let store = PgQuestionnaireStore::new(pool);
            store.migrate().await?;
            info!("Using Postgres questionnaire store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory questionnaire store; data is lost on restart");
            Ok(Arc::new(InMemoryQuestionnaireStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config.log_format);

    let store = open_store().await?;
    let app_state = AppState::new(store);

    let app = routes::router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
