//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me));

    let property_routes = Router::new()
        .route("/"
               ,post(handlers::properties::create_property)
               .get(handlers::properties::list_properties)
        )
        .route("/{id}"
               ,get(handlers::properties::get_property)
               .put(handlers::properties::update_property)
               .delete(handlers::properties::delete_property)
        );

    let tenant_routes = Router::new()
        .route("/"
               ,post(handlers::tenants::create_tenant)
               .get(handlers::tenants::list_tenants)
        )
        .route("/{id}"
               ,get(handlers::tenants::get_tenant)
               .put(handlers::tenants::update_tenant)
               .delete(handlers::tenants::delete_tenant)
        );

    let case_routes = Router::new()
        .route("/"
               ,post(handlers::cases::create_case)
               .get(handlers::cases::list_cases)
        )
        .route("/quote", post(handlers::cases::quote))
        .route("/{id}"
               ,get(handlers::cases::get_case)
               .delete(handlers::cases::delete_case)
        )
        .route("/{id}/documents/{slot}"
               ,put(handlers::cases::put_document)
               .delete(handlers::cases::clear_document)
        )
        .route("/{id}/claim", post(handlers::cases::claim_case))
        .route("/{id}/unclaim", post(handlers::cases::unclaim_case))
        .route("/{id}/start", post(handlers::cases::start_case))
        .route("/{id}/complete", post(handlers::cases::complete_case))
        .route("/{id}/payments"
               ,post(handlers::cases::record_payment)
               .get(handlers::cases::list_payments)
        )
        .route("/{id}/notice.pdf", get(handlers::documents::download_notice));

    let checkout_routes = Router::new()
        .route("/", post(handlers::checkout::create_checkout))
        .route("/{id}", get(handlers::checkout::get_checkout))
        .route("/{id}/outcome", post(handlers::checkout::deliver_outcome));

    let admin_routes = Router::new()
        .route("/users", get(handlers::admin::list_users))
        .route("/users/{id}/prices", put(handlers::admin::set_price))
        .route("/users/{id}/prices/{jurisdiction}", axum::routing::delete(handlers::admin::remove_price))
        .route("/users/{id}/referral", put(handlers::admin::set_referral))
        .route("/cases"
               ,get(handlers::admin::list_all_cases)
               .patch(handlers::admin::bulk_patch_cases)
        )
        .route("/cases/{id}", axum::routing::patch(handlers::admin::patch_case))
        .route("/law-firms", post(handlers::admin::create_law_firm));

    // Tudo abaixo exige Bearer token
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/properties", property_routes)
        .nest("/api/tenants", tenant_routes)
        .nest("/api/cases", case_routes)
        .nest("/api/checkout", checkout_routes)
        .nest("/api/admin", admin_routes)
        .route("/api/law-firms", get(handlers::admin::list_law_firms))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
