//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        catalog::FileCatalogAdapter, db::DbAdapter, qa_llm::OfflineQaAdapter,
        qa_llm::OpenAiQaAdapter, tts::NullTtsAdapter, tts::OpenAiTtsAdapter,
    },
    config::Config,
    error::ApiError,
    web::{
        create_session_handler, finalize_booking_handler, get_cart_handler, put_hotel_handler,
        put_outbound_handler, put_return_handler, rest::ApiDoc, search_flights_handler,
        search_hotels_handler, state::AppState, ws_handler,
    },
};
use async_openai::{
    config::OpenAIConfig,
    types::{SpeechModel, Voice},
    Client,
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use concierge_core::ports::{QuestionAnsweringService, TextToSpeechService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    // Without an API key the tour still runs: speech is silently skipped and
    // Q&A falls back to a canned pointer at the contact form.
    let (tts_adapter, qa_adapter): (
        Arc<dyn TextToSpeechService>,
        Arc<dyn QuestionAnsweringService>,
    ) = match &config.openai_api_key {
        Some(api_key) => {
            let openai_config = OpenAIConfig::new().with_api_key(api_key);
            let openai_client = Client::with_config(openai_config);

            let tts_voice = match config.tts_voice.to_lowercase().as_str() {
                "alloy" => Voice::Alloy,
                "echo" => Voice::Echo,
                "fable" => Voice::Fable,
                "onyx" => Voice::Onyx,
                "nova" => Voice::Nova,
                "shimmer" => Voice::Shimmer,
                _ => {
                    return Err(ApiError::Internal(format!(
                        "Invalid TTS voice specified in config: '{}'",
                        config.tts_voice
                    )))
                }
            };
            (
                Arc::new(OpenAiTtsAdapter::new(
                    openai_client.clone(),
                    SpeechModel::Tts1Hd,
                    tts_voice,
                )),
                Arc::new(OpenAiQaAdapter::new(openai_client, config.qa_model.clone())),
            )
        }
        None => {
            warn!("OPENAI_API_KEY is not set; speech and live Q&A are disabled.");
            (Arc::new(NullTtsAdapter), Arc::new(OfflineQaAdapter))
        }
    };

    let catalog_adapter = Arc::new(FileCatalogAdapter::new(
        config.flights_catalog_path.clone(),
        config.hotels_catalog_path.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        tts_adapter,
        qa_adapter,
        catalog: catalog_adapter,
    });

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/sessions", post(create_session_handler))
        .route("/flights/search", post(search_flights_handler))
        .route("/hotels/search", post(search_hotels_handler))
        .route("/sessions/{session_id}/cart", get(get_cart_handler))
        .route(
            "/sessions/{session_id}/cart/outbound",
            put(put_outbound_handler),
        )
        .route(
            "/sessions/{session_id}/cart/return",
            put(put_return_handler),
        )
        .route("/sessions/{session_id}/cart/hotel", put(put_hotel_handler))
        .route(
            "/sessions/{session_id}/bookings",
            post(finalize_booking_handler),
        )
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
