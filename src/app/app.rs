use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get};
use mongodb::Database;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{AdminAuthConfig, AppConfig, MongoConfig, StoreBackend};
use crate::middlewares::admin_middleware::AdminAuthState;
use crate::model::{
    ContactMessage, Lead, NewsletterSubscriber, Order, ProductDemoRequest, RepairRequest,
    ShopQuoteRequest, TrainingEnquiry,
};
use crate::repository::lead_repo::LeadRepository;
use crate::repository::memory_lead_repo::InMemoryLeadRepository;
use crate::repository::mongo_lead_repo::{connect_database, MongoLeadRepository};
use crate::repository::repository_error::RepositoryResult;
use crate::router::lead_router::lead_router;
use crate::service::lead_service::LeadServiceImpl;

/// One Entity Store per lead kind, all sharing the same backend.
pub struct LeadRepositories {
    pub contacts: Arc<dyn LeadRepository<ContactMessage>>,
    pub newsletter: Arc<dyn LeadRepository<NewsletterSubscriber>>,
    pub product_demos: Arc<dyn LeadRepository<ProductDemoRequest>>,
    pub shop_quotes: Arc<dyn LeadRepository<ShopQuoteRequest>>,
    pub training: Arc<dyn LeadRepository<TrainingEnquiry>>,
    pub repairs: Arc<dyn LeadRepository<RepairRequest>>,
    pub orders: Arc<dyn LeadRepository<Order>>,
}

async fn mongo_repo<E: Lead>(database: &Database) -> RepositoryResult<Arc<dyn LeadRepository<E>>> {
    let repo = MongoLeadRepository::<E>::new(database);
    repo.ensure_indexes().await?;
    Ok(Arc::new(repo))
}

impl LeadRepositories {
    pub fn in_memory() -> Self {
        LeadRepositories {
            contacts: Arc::new(InMemoryLeadRepository::new()),
            newsletter: Arc::new(InMemoryLeadRepository::new()),
            product_demos: Arc::new(InMemoryLeadRepository::new()),
            shop_quotes: Arc::new(InMemoryLeadRepository::new()),
            training: Arc::new(InMemoryLeadRepository::new()),
            repairs: Arc::new(InMemoryLeadRepository::new()),
            orders: Arc::new(InMemoryLeadRepository::new()),
        }
    }

    /// Collections on one shared database handle, with their indexes ensured.
    pub async fn mongo(database: &Database) -> RepositoryResult<Self> {
        Ok(LeadRepositories {
            contacts: mongo_repo(database).await?,
            newsletter: mongo_repo(database).await?,
            product_demos: mongo_repo(database).await?,
            shop_quotes: mongo_repo(database).await?,
            training: mongo_repo(database).await?,
            repairs: mongo_repo(database).await?,
            orders: mongo_repo(database).await?,
        })
    }
}

fn lead_routes<E: Lead>(
    repo: Arc<dyn LeadRepository<E>>,
    config: &AppConfig,
    store_timeout: Duration,
    admin_auth_state: &Arc<AdminAuthState>,
) -> Router {
    let service = LeadServiceImpl::new(
        repo,
        store_timeout,
        config.list_default_limit,
        config.list_max_limit,
    );
    lead_router(Arc::new(service), admin_auth_state.clone())
}

/// Builds the full HTTP surface: seven lead routers, `/health`, and request tracing.
pub fn build_router(
    repos: LeadRepositories,
    config: &AppConfig,
    store_timeout: Duration,
    admin_config: &AdminAuthConfig,
) -> Router {
    let admin = Arc::new(AdminAuthState::new(admin_config));

    Router::new()
        .merge(lead_routes(repos.contacts, config, store_timeout, &admin))
        .merge(lead_routes(repos.newsletter, config, store_timeout, &admin))
        .merge(lead_routes(repos.product_demos, config, store_timeout, &admin))
        .merge(lead_routes(repos.shop_quotes, config, store_timeout, &admin))
        .merge(lead_routes(repos.training, config, store_timeout, &admin))
        .merge(lead_routes(repos.repairs, config, store_timeout, &admin))
        .merge(lead_routes(repos.orders, config, store_timeout, &admin))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
}

pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = AppConfig::from_env()?;
        let admin_config = AdminAuthConfig::from_env()?;

        let (repos, store_timeout) = match config.store_backend {
            StoreBackend::Mongo => {
                let mongo_config = MongoConfig::from_env()?;
                let database = connect_database(&mongo_config).await?;
                let repos = LeadRepositories::mongo(&database).await?;
                (repos, mongo_config.operation_timeout())
            }
            StoreBackend::Memory => {
                warn!("Using the in-memory store: submissions are lost on restart");
                (LeadRepositories::in_memory(), MongoConfig::default().operation_timeout())
            }
        };

        let router = build_router(repos, &config, store_timeout, &admin_config);
        Ok(App { config, router })
    }

    pub async fn start(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("🚀 Server running at http://{}", addr);
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
