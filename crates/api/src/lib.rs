//! # Salon API
//!
//! HTTP boundary of the salon booking service: client registration and
//! sign-in, the public service catalogue, date availability, booking and
//! justification, and the admin panel endpoints.
//!
//! ## Architecture
//!
//! - **Routes**: endpoint paths per area
//! - **Handlers**: request processing against the [`BookingStore`]
//! - **Middleware**: identity extraction and error-to-response mapping
//! - **Config**: environment configuration
//!
//! Handlers never touch a database pool directly; everything goes through the
//! store held in [`ApiState`], which lets tests swap in an in-memory or mock
//! implementation.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Identity extraction and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use eyre::Result;
use salon_core::{
    availability::SalonCalendar,
    clock::{Clock, SystemClock},
};
use salon_db::BookingStore;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub store: Arc<dyn BookingStore>,
    pub clock: Arc<dyn Clock>,
    pub config: config::ApiConfig,
}

impl ApiState {
    pub fn new(store: Arc<dyn BookingStore>, clock: Arc<dyn Clock>, config: config::ApiConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn calendar(&self) -> SalonCalendar {
        self.config.calendar()
    }
}

/// Assembles every route, the request trace and the timeout layer.
pub fn build_router(state: Arc<ApiState>) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout);
    let cors = state.config.cors_origins.as_deref().map(cors_layer);

    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Registration, sign-in and password reset
        .merge(routes::auth::routes())
        // Public catalogue and date availability
        .merge(routes::services::routes())
        .merge(routes::slots::routes())
        // Client bookings
        .merge(routes::appointments::routes())
        // Admin panel
        .merge(routes::admin::routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(timeout)),
        );

    match cors {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(allowed)
        .allow_credentials(true)
}

/// Starts the API server with the provided configuration and store
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// use std::sync::Arc;
/// use salon_api::{config::ApiConfig, start_server};
/// use salon_db::{PgBookingStore, create_pool};
///
/// let config = ApiConfig::from_env()?;
/// let pool = create_pool(&config.database_url).await?;
/// start_server(config, Arc::new(PgBookingStore::new(pool))).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn BookingStore>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let addr = config.server_addr();
    info!(
        "Salon calendar: timezone {}, closed weekday {:?}",
        config.timezone, config.closed_weekday
    );

    let state = Arc::new(ApiState::new(store, Arc::new(SystemClock), config));
    let app = build_router(state);

    // Start the HTTP server
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
