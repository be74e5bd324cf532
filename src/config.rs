// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{
        CaseRepository, LawFirmRepository, MemoryStore, PgCaseRepository, PgLawFirmRepository,
        PgPropertyRepository, PgSessionRepository, PgTenantRepository, PgUserRepository,
        PropertyRepository, SessionRepository, TenantRepository, UserRepository,
    },
    services::{
        admin_service::AdminService, auth::AuthService, case_service::CaseService,
        document_service::DocumentService, payment_gateway::MockPaymentGateway,
        property_service::PropertyService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    /// Sem `DATABASE_URL` a aplicação roda com a loja em memória.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub fonts_dir: PathBuf,
    pub auto_resolve_after: Option<Duration>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = optional_var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let auto_resolve_after = optional_var("MOCK_CHECKOUT_AUTO_RESOLVE_SECS")
            .map(|secs| {
                secs.parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("MOCK_CHECKOUT_AUTO_RESOLVE_SECS is not a number: {}", secs))
            })
            .transpose()?;

        Ok(Self {
            database_url: optional_var("DATABASE_URL"),
            jwt_secret,
            bind_addr: optional_var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            fonts_dir: optional_var("FONTS_DIR").unwrap_or_else(|| "./fonts".to_string()).into(),
            auto_resolve_after,
            admin_email: optional_var("ADMIN_EMAIL"),
            admin_password: optional_var("ADMIN_PASSWORD"),
        })
    }
}

struct Repositories {
    users: Arc<dyn UserRepository>,
    properties: Arc<dyn PropertyRepository>,
    tenants: Arc<dyn TenantRepository>,
    cases: Arc<dyn CaseRepository>,
    sessions: Arc<dyn SessionRepository>,
    law_firms: Arc<dyn LawFirmRepository>,
}

impl Repositories {
    async fn connect(database_url: Option<&str>) -> anyhow::Result<Self> {
        let Some(database_url) = database_url else {
            tracing::warn!("DATABASE_URL not set; using the in-memory store (data is lost on restart)");
            let store = Arc::new(MemoryStore::new());
            return Ok(Self {
                users: store.clone(),
                properties: store.clone(),
                tenants: store.clone(),
                cases: store.clone(),
                sessions: store.clone(),
                law_firms: store,
            });
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .context("failed to connect to the database")?;
        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!()
            .run(&pool)
            .await
            .context("failed to run database migrations")?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        Ok(Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            properties: Arc::new(PgPropertyRepository::new(pool.clone())),
            tenants: Arc::new(PgTenantRepository::new(pool.clone())),
            cases: Arc::new(PgCaseRepository::new(pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(pool.clone())),
            law_firms: Arc::new(PgLawFirmRepository::new(pool)),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub case_service: CaseService,
    pub property_service: PropertyService,
    pub admin_service: AdminService,
    pub document_service: DocumentService,
    pub gateway: MockPaymentGateway,
    pub auto_resolve_after: Option<Duration>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let repos = Repositories::connect(config.database_url.as_deref()).await?;

        // --- Monta o gráfico de dependências ---
        let gateway = MockPaymentGateway::new(repos.sessions.clone());
        let auth_service = AuthService::new(repos.users.clone(), config.jwt_secret.clone());
        let case_service = CaseService::new(
            repos.users.clone(),
            repos.properties.clone(),
            repos.tenants.clone(),
            repos.cases.clone(),
            repos.law_firms.clone(),
            gateway.clone(),
        );
        let property_service =
            PropertyService::new(repos.properties.clone(), repos.tenants.clone(), repos.cases.clone());
        let admin_service = AdminService::new(repos.users.clone(), repos.law_firms.clone());
        let document_service = DocumentService::new(config.fonts_dir.clone());

        if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
            auth_service
                .ensure_admin(email, password)
                .await
                .context("failed to bootstrap the admin account")?;
        }

        Ok(Self {
            auth_service,
            case_service,
            property_service,
            admin_service,
            document_service,
            gateway,
            auto_resolve_after: config.auto_resolve_after,
        })
    }
}
