pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod repositories;
pub mod services;

use crate::config::ArchiveConfig;
use crate::repositories::{ResourceRepository, UpdateRepository};
use crate::services::account::AccountService;
use crate::services::resource::ResourceService;
use crate::services::storage::ArtifactStore;
use crate::services::update::ResourceUpdateService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::resources::search_mods,
        api::handlers::resources::search_plugins,
        api::handlers::resources::search_software,
        api::handlers::resources::create_resource,
        api::handlers::resources::edit_resource,
        api::handlers::resources::edit_resource_by_slug,
        api::handlers::resources::get_resource,
        api::handlers::resources::get_resource_by_slug,
        api::handlers::resources::delete_resource,
        api::handlers::resources::get_versions,
        api::handlers::resources::get_categories,
        api::handlers::updates::upload,
        api::handlers::updates::download,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::ECategory,
            models::SimpleResourceDto,
            models::PageDto,
            models::ResourceDto,
            models::VersionsDto,
            models::ErrorDto,
            models::CreateResourceRequest,
            models::EditResourceRequest,
            models::CreateUpdateRequest,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "archive", description = "Resource catalog endpoints"),
        (name = "file", description = "Update upload and download endpoints"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn ArtifactStore>,
    pub accounts: Arc<AccountService>,
    pub resources: Arc<ResourceService>,
    pub updates: Arc<ResourceUpdateService>,
    pub config: ArchiveConfig,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn ArtifactStore>,
        config: ArchiveConfig,
    ) -> Self {
        let accounts = AccountService::new(db.clone());
        let resource_repo = ResourceRepository::new(db.clone());
        let update_repo = UpdateRepository::new(db.clone());

        let resources = Arc::new(ResourceService::new(
            resource_repo.clone(),
            update_repo.clone(),
        ));
        let updates = Arc::new(ResourceUpdateService::new(
            accounts.clone(),
            resource_repo,
            update_repo,
            storage.clone(),
        ));

        Self {
            db,
            storage,
            accounts: Arc::new(accounts),
            resources,
            updates,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    // Public read surface: any origin, no credentials. Also serves as the
    // catch-all policy for everything that is not the credentialed upload.
    let public_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE]);

    // The upload path authenticates via cookie, so its CORS policy is pinned
    // to the web client origin with credentials allowed. Applied on the
    // route itself so the more specific rule wins over the public one.
    let upload_cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("http://localhost:3000"))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST]);

    let archive = Router::new()
        .route("/mods", get(api::handlers::resources::search_mods))
        .route("/plugins", get(api::handlers::resources::search_plugins))
        .route("/software", get(api::handlers::resources::search_software))
        .route("/create", post(api::handlers::resources::create_resource))
        .route("/versions", get(api::handlers::resources::get_versions))
        .route("/categories", get(api::handlers::resources::get_categories))
        .route(
            "/:resource_id",
            get(api::handlers::resources::get_resource),
        )
        .route(
            "/:resource_id/edit",
            post(api::handlers::resources::edit_resource),
        )
        .route(
            "/:resource_id/delete",
            delete(api::handlers::resources::delete_resource),
        )
        .route(
            "/slug/:slug",
            get(api::handlers::resources::get_resource_by_slug),
        )
        .route(
            "/slug/:slug/edit",
            post(api::handlers::resources::edit_resource_by_slug),
        )
        .layer(public_cors.clone());

    let upload = Router::new()
        .route("/upload", post(api::handlers::updates::upload))
        .layer(DefaultBodyLimit::max(
            // Slack for the multipart framing around the artifact.
            state.config.max_upload_size + 1024 * 1024,
        ))
        .layer(upload_cors);

    let file = Router::new().merge(upload).route(
        "/download",
        get(api::handlers::updates::download).layer(public_cors.clone()),
    );

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route(
            "/health",
            get(api::handlers::health::health_check).layer(public_cors),
        )
        .nest("/api/archive", archive)
        .nest("/file", file)
        .with_state(state)
}
