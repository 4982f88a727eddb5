use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use parlance::config::Settings;
use parlance::llm::create_provider;
use parlance::routes::configure_routes;
use parlance::search::SearchClient;
use parlance::state::AppState;
use parlance::store::{Store, StoreConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Arc::new(Settings::from_env()?);

    let store_config = StoreConfig::from_connection_string(&settings.database_url)?;
    let store = Store::connect(store_config).await?;
    info!("conversation store ready");

    let provider = create_provider(&settings)?;
    info!(
        provider = provider.name(),
        model = settings.model_for_provider(),
        "LLM provider ready"
    );

    let search = match &settings.tavily_api_key {
        Some(key) => Some(SearchClient::new(key.clone())?),
        None => {
            warn!("TAVILY_API_KEY not set; web search is disabled");
            None
        }
    };

    let bind_addr = settings.bind_addr;
    let state = AppState::new(store, provider, search, settings);
    let routes = configure_routes(state);

    info!("Starting server on http://{}", bind_addr);
    warp::serve(routes).run(bind_addr).await;

    Ok(())
}
