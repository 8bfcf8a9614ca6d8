//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::infrastructure::jobs::JobRunner;
use crate::infrastructure::repositories::{PgSessionRepository, PgSwipeRepository};
use crate::infrastructure::{cache, database};
use crate::presentation::http::routes;
use crate::presentation::hub::ChatHub;
use crate::presentation::middleware::{cors, logging};
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: ConnectionManager,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub hub: Arc<ChatHub>,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    jobs: JobRunner,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Create database pool and apply migrations
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        database::run_migrations(&db).await?;
        tracing::info!("Database migrations applied");

        // Create Redis client
        let redis = cache::create_redis_client(&settings.redis).await?;
        tracing::info!("Redis connection established");

        // Create snowflake generator
        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id as u64,
            0u64, // default node id
        ));

        // Create the realtime hub
        let hub = Arc::new(ChatHub::new());

        // Start background jobs
        let jobs = JobRunner::start(
            &settings.jobs,
            Arc::new(PgSessionRepository::new(db.clone())),
            Arc::new(PgSwipeRepository::new(db.clone())),
        );
        tracing::info!("Background jobs started");

        // Create app state
        let state = AppState {
            db,
            redis,
            snowflake,
            hub,
            settings: Arc::new(settings.clone()),
        };

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&settings.cors));

        // Bind to address
        let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self {
            listener,
            router,
            jobs,
        })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        // ConnectInfo feeds the rate limiter's per-IP fallback
        let result = axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await;
        self.jobs.shutdown();
        result?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
