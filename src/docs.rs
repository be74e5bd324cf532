// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Properties & Tenants ---
        handlers::properties::create_property,
        handlers::properties::list_properties,
        handlers::properties::get_property,
        handlers::properties::update_property,
        handlers::properties::delete_property,
        handlers::tenants::create_tenant,
        handlers::tenants::list_tenants,
        handlers::tenants::get_tenant,
        handlers::tenants::update_tenant,
        handlers::tenants::delete_tenant,

        // --- Cases ---
        handlers::cases::quote,
        handlers::cases::create_case,
        handlers::cases::list_cases,
        handlers::cases::get_case,
        handlers::cases::delete_case,
        handlers::cases::put_document,
        handlers::cases::clear_document,
        handlers::cases::claim_case,
        handlers::cases::unclaim_case,
        handlers::cases::start_case,
        handlers::cases::complete_case,
        handlers::cases::record_payment,
        handlers::cases::list_payments,
        handlers::documents::download_notice,

        // --- Checkout ---
        handlers::checkout::create_checkout,
        handlers::checkout::get_checkout,
        handlers::checkout::deliver_outcome,

        // --- Admin ---
        handlers::admin::list_users,
        handlers::admin::set_price,
        handlers::admin::remove_price,
        handlers::admin::set_referral,
        handlers::admin::list_all_cases,
        handlers::admin::patch_case,
        handlers::admin::bulk_patch_cases,
        handlers::admin::create_law_firm,
        handlers::admin::list_law_firms,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::PriceOverride,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Properties ---
            models::property::PropertyType,
            models::property::Property,
            models::property::Tenant,
            models::property::PropertyPayload,
            models::property::TenantPayload,

            // --- Cases ---
            models::legal_case::CaseStatus,
            models::legal_case::PaymentStatus,
            models::legal_case::DocumentSlot,
            models::legal_case::DocumentSlots,
            models::legal_case::LegalCase,
            models::legal_case::TenantPayment,
            models::legal_case::QuotePayload,
            models::legal_case::QuoteResponse,
            models::legal_case::CreateCasePayload,
            models::legal_case::DocumentPayload,
            models::legal_case::TenantPaymentPayload,
            models::legal_case::AdminCasePatch,

            // --- Checkout ---
            models::payment::SessionStatus,
            models::payment::PaymentOutcome,
            models::payment::PaymentSession,
            models::payment::CheckoutPayload,
            models::payment::CheckoutResponse,
            models::payment::OutcomePayload,
            models::payment::ResolveOutcome,

            // --- Admin ---
            models::admin::LawFirm,
            models::admin::LawFirmPayload,
            models::admin::PriceOverridePayload,
            models::admin::ReferralCodePayload,
            handlers::admin::BulkCasePatchPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Properties", description = "Imóveis do proprietário"),
        (name = "Tenants", description = "Inquilinos do proprietário"),
        (name = "Cases", description = "Pedidos de notificação e trabalho de campo"),
        (name = "Checkout", description = "Pagamento simulado dos rascunhos"),
        (name = "Documents", description = "Notificação em PDF"),
        (name = "Admin", description = "Preços, casos e escritórios")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
