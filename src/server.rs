use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{hash_password, TokenService};
use crate::config::{AppConfig, SeedUser, StoreBackend};
use crate::database::{manager::DatabaseManager, models::NewUser, Store};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full application router: `/health` plus everything under `/api`
pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .merge(protected_routes(state.clone()))
        .merge(public_routes());

    Router::new()
        .route("/health", get(public::health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins)),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new().route("/auth", post(public::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, folders, notes, tags};

    Router::new()
        .route("/auth/refresh", post(auth::refresh))
        .route("/folders", get(folders::list).post(folders::create))
        .route(
            "/folders/:id",
            get(folders::get).put(folders::update).delete(folders::delete),
        )
        .route("/notes", get(notes::list).post(notes::create))
        .route(
            "/notes/:id",
            get(notes::get).put(notes::update).delete(notes::delete),
        )
        .route("/tags", get(tags::list).post(tags::create))
        .route(
            "/tags/:id",
            get(tags::get).put(tags::update).delete(tags::delete),
        )
        // route_layer so unknown paths stay 404 instead of 401
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::LOCATION])
}

/// Open the configured store backend
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Store> {
    match config.database.backend {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            Ok(Store::postgres(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            let store = Store::memory();
            match &config.seed {
                Some(seed) => seed_user(&store, seed).await?,
                None => tracing::warn!("No SEED_USERNAME/SEED_PASSWORD set; nobody can log in"),
            }
            Ok(store)
        }
    }
}

/// Provision the configured account so the in-memory store is usable
async fn seed_user(store: &Store, seed: &SeedUser) -> anyhow::Result<()> {
    let password = seed.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task failed")??;

    let user = store
        .users
        .create(NewUser {
            username: seed.username.clone(),
            fullname: seed.fullname.clone(),
            password_hash,
        })
        .await
        .context("failed to seed user")?;
    tracing::info!("Seeded user '{}'", user.username);
    Ok(())
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let state = AppState::new(store, TokenService::from_config(&config.security));
    let app = app(state, &config.security.cors_origins);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        "Noteful API listening on http://{} ({:?})",
        listener.local_addr()?,
        config.environment
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
