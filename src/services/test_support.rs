// src/services/test_support.rs
//
// Fixtures compartilhadas pelos testes dos serviços.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    db::{MemoryStore, TenantRepository, UserRepository, PropertyRepository},
    models::{
        auth::{NewUser, PriceOverride, Role, User},
        legal_case::LegalCase,
        property::{Property, PropertyType, Tenant},
    },
    services::{
        case_service::CaseService,
        lifecycle::{self, DraftRequest},
        payment_gateway::MockPaymentGateway,
    },
};

pub fn landlord_with_prices(prices: &[(&str, &str, bool)], referral: Option<&str>) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: "landlord@example.com".into(),
        password_hash: String::new(),
        full_name: "Test Landlord".into(),
        role: Role::Landlord,
        price_overrides: prices
            .iter()
            .map(|(jurisdiction, price, unlocked)| {
                (
                    jurisdiction.to_string(),
                    PriceOverride { price: price.parse().unwrap(), unlocked: *unlocked },
                )
            })
            .collect::<HashMap<_, _>>(),
        referral_code: referral.map(str::to_string),
        created_at: now,
        updated_at: now,
    }
}

pub fn property_in(owner: &User, jurisdiction: &str) -> Property {
    let now = Utc::now();
    Property {
        id: Uuid::new_v4(),
        landlord_id: owner.id,
        address: "1200 N Charles St".into(),
        city: "Baltimore".into(),
        jurisdiction: jurisdiction.into(),
        property_type: PropertyType::Residential,
        created_at: now,
        updated_at: now,
    }
}

pub fn tenant_at(property: &Property) -> Tenant {
    let now = Utc::now();
    Tenant {
        id: Uuid::new_v4(),
        landlord_id: property.landlord_id,
        property_id: property.id,
        occupants: vec!["John Doe".into()],
        email: None,
        phone: None,
        is_subsidized: false,
        subsidy_type: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn draft_case_for(landlord_id: Uuid, price: Decimal) -> LegalCase {
    lifecycle::new_draft(
        DraftRequest {
            landlord_id,
            property_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            law_firm_id: None,
            price,
            rent_owed_at_filing: "1200".parse().unwrap(),
            notes: None,
        },
        Utc::now(),
    )
}

pub fn draft_case(price: Decimal) -> LegalCase {
    draft_case_for(Uuid::new_v4(), price)
}

/// Loja em memória com um proprietário (Baltimore City a 150), um imóvel,
/// um inquilino, um contratado e um admin já cadastrados.
pub struct Fixture {
    pub store: MemoryStore,
    pub cases: CaseService,
    pub gateway: MockPaymentGateway,
    pub landlord: User,
    pub contractor: User,
    pub admin: User,
    pub property: Property,
    pub tenant: Tenant,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = MemoryStore::new();

        let landlord = create_user(&store, "landlord@example.com", Role::Landlord).await;
        UserRepository::set_price_override(
            &store,
            landlord.id,
            "Baltimore City",
            PriceOverride { price: "150".parse().unwrap(), unlocked: true },
        )
        .await
        .unwrap();
        let landlord = UserRepository::find_by_id(&store, landlord.id).await.unwrap().unwrap();

        let contractor = create_user(&store, "contractor@example.com", Role::Contractor).await;
        let admin = create_user(&store, "admin@example.com", Role::Admin).await;

        let property = property_in(&landlord, "Baltimore City");
        PropertyRepository::insert(&store, &property).await.unwrap();
        let tenant = tenant_at(&property);
        TenantRepository::insert(&store, &tenant).await.unwrap();

        let shared = Arc::new(store.clone());
        let gateway = MockPaymentGateway::new(shared.clone());
        let cases = CaseService::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            gateway.clone(),
        );

        Self { store, cases, gateway, landlord, contractor, admin, property, tenant }
    }

    /// Outro inquilino no mesmo imóvel.
    pub async fn another_tenant(&self) -> Tenant {
        let tenant = tenant_at(&self.property);
        TenantRepository::insert(&self.store, &tenant).await.unwrap();
        tenant
    }

    pub async fn another_contractor(&self) -> User {
        create_user(&self.store, "second-contractor@example.com", Role::Contractor).await
    }
}

async fn create_user(store: &MemoryStore, email: &str, role: Role) -> User {
    UserRepository::create_user(
        store,
        NewUser {
            email: email.into(),
            password_hash: String::new(),
            full_name: email.into(),
            role,
            referral_code: None,
        },
    )
    .await
    .unwrap()
}
