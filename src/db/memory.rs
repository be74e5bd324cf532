// src/db/memory.rs
//
// Armazenamento em memória (HashMap atrás de um `tokio::sync::RwLock`).
// Usado quando DATABASE_URL não está definida e nos testes. Cada operação
// multi-registro roda sob um único write lock, então é atômica.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        CaseRepository, CaseTransition, LawFirmRepository, PropertyRepository,
        SessionRepository, TenantRepository, UserRepository,
    },
    models::{
        admin::LawFirm,
        auth::{NewUser, PriceOverride, User},
        legal_case::{LegalCase, TenantPayment},
        payment::{PaymentSession, SessionStatus},
        property::{Property, Tenant},
    },
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    properties: HashMap<Uuid, Property>,
    tenants: HashMap<Uuid, Tenant>,
    cases: HashMap<Uuid, LegalCase>,
    payments: Vec<TenantPayment>,
    sessions: HashMap<Uuid, PaymentSession>,
    law_firms: HashMap<Uuid, LawFirm>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.sort_by_key(|r| key(r));
    rows
}

// =========================================================================
//  USERS
// =========================================================================

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::EmailAlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            full_name: new_user.full_name,
            role: new_user.role,
            price_overrides: HashMap::new(),
            referral_code: new_user.referral_code,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(sorted_by(tables.users.values().cloned().collect(), |u| u.created_at))
    }

    async fn set_price_override(
        &self,
        user_id: Uuid,
        jurisdiction: &str,
        entry: PriceOverride,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&user_id).ok_or(AppError::UserNotFound)?;
        user.price_overrides.insert(jurisdiction.to_string(), entry);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn remove_price_override(&self, user_id: Uuid, jurisdiction: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&user_id).ok_or(AppError::UserNotFound)?;
        Ok(user.price_overrides.remove(jurisdiction).is_some())
    }

    async fn set_referral_code(&self, user_id: Uuid, code: Option<&str>) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&user_id).ok_or(AppError::UserNotFound)?;
        user.referral_code = code.map(str::to_string);
        user.updated_at = Utc::now();
        Ok(())
    }
}

// =========================================================================
//  PROPERTIES & TENANTS
// =========================================================================

#[async_trait]
impl PropertyRepository for MemoryStore {
    async fn list_by_landlord(&self, landlord_id: Uuid) -> Result<Vec<Property>, AppError> {
        let tables = self.tables.read().await;
        let rows = tables
            .properties
            .values()
            .filter(|p| p.landlord_id == landlord_id)
            .cloned()
            .collect();
        Ok(sorted_by(rows, |p| p.created_at))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        Ok(self.tables.read().await.properties.get(&id).cloned())
    }

    async fn insert(&self, property: &Property) -> Result<Property, AppError> {
        let mut tables = self.tables.write().await;
        tables.properties.insert(property.id, property.clone());
        Ok(property.clone())
    }

    async fn update(&self, property: &Property) -> Result<Property, AppError> {
        let mut tables = self.tables.write().await;
        match tables.properties.get_mut(&property.id) {
            Some(slot) => {
                *slot = property.clone();
                Ok(property.clone())
            }
            None => Err(AppError::ResourceNotFound(format!("Property {}", property.id))),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.tables.write().await.properties.remove(&id).is_some())
    }
}

#[async_trait]
impl TenantRepository for MemoryStore {
    async fn list_by_landlord(&self, landlord_id: Uuid) -> Result<Vec<Tenant>, AppError> {
        let tables = self.tables.read().await;
        let rows = tables
            .tenants
            .values()
            .filter(|t| t.landlord_id == landlord_id)
            .cloned()
            .collect();
        Ok(sorted_by(rows, |t| t.created_at))
    }

    async fn list_by_property(&self, property_id: Uuid) -> Result<Vec<Tenant>, AppError> {
        let tables = self.tables.read().await;
        let rows = tables
            .tenants
            .values()
            .filter(|t| t.property_id == property_id)
            .cloned()
            .collect();
        Ok(sorted_by(rows, |t| t.created_at))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        Ok(self.tables.read().await.tenants.get(&id).cloned())
    }

    async fn insert(&self, tenant: &Tenant) -> Result<Tenant, AppError> {
        let mut tables = self.tables.write().await;
        tables.tenants.insert(tenant.id, tenant.clone());
        Ok(tenant.clone())
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, AppError> {
        let mut tables = self.tables.write().await;
        match tables.tenants.get_mut(&tenant.id) {
            Some(slot) => {
                *slot = tenant.clone();
                Ok(tenant.clone())
            }
            None => Err(AppError::ResourceNotFound(format!("Tenant {}", tenant.id))),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.tables.write().await.tenants.remove(&id).is_some())
    }
}

// =========================================================================
//  CASES
// =========================================================================

impl MemoryStore {
    async fn cases_where(&self, pred: impl Fn(&LegalCase) -> bool) -> Vec<LegalCase> {
        let tables = self.tables.read().await;
        let rows = tables.cases.values().filter(|c| pred(c)).cloned().collect();
        sorted_by(rows, |c| c.created_at)
    }
}

#[async_trait]
impl CaseRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<LegalCase>, AppError> {
        Ok(self.tables.read().await.cases.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<LegalCase>, AppError> {
        Ok(self.cases_where(|_| true).await)
    }

    async fn list_by_landlord(&self, landlord_id: Uuid) -> Result<Vec<LegalCase>, AppError> {
        Ok(self.cases_where(|c| c.landlord_id == landlord_id).await)
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<LegalCase>, AppError> {
        Ok(self.cases_where(|c| c.tenant_id == tenant_id).await)
    }

    async fn list_by_property(&self, property_id: Uuid) -> Result<Vec<LegalCase>, AppError> {
        Ok(self.cases_where(|c| c.property_id == property_id).await)
    }

    async fn list_for_contractor(&self, contractor_id: Uuid) -> Result<Vec<LegalCase>, AppError> {
        Ok(self
            .cases_where(|c| {
                c.contractor_id == Some(contractor_id) || (c.contractor_id.is_none() && c.is_paid_active())
            })
            .await)
    }

    async fn insert(&self, case: &LegalCase) -> Result<LegalCase, AppError> {
        let mut tables = self.tables.write().await;
        tables.cases.insert(case.id, case.clone());
        Ok(case.clone())
    }

    async fn update(&self, case: &LegalCase) -> Result<LegalCase, AppError> {
        let mut tables = self.tables.write().await;
        match tables.cases.get_mut(&case.id) {
            Some(slot) => {
                *slot = case.clone();
                Ok(case.clone())
            }
            None => Err(AppError::ResourceNotFound(format!("Case {}", case.id))),
        }
    }

    async fn update_many(&self, cases: &[LegalCase]) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        // Valida tudo antes de gravar qualquer coisa
        if let Some(missing) = cases.iter().find(|c| !tables.cases.contains_key(&c.id)) {
            return Err(AppError::ResourceNotFound(format!("Case {}", missing.id)));
        }
        for case in cases {
            tables.cases.insert(case.id, case.clone());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        tables.payments.retain(|p| p.case_id != id);
        Ok(tables.cases.remove(&id).is_some())
    }

    async fn record_payment(&self, case: &LegalCase, payment: &TenantPayment) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        match tables.cases.get_mut(&case.id) {
            Some(slot) => *slot = case.clone(),
            None => return Err(AppError::ResourceNotFound(format!("Case {}", case.id))),
        }
        tables.payments.push(payment.clone());
        Ok(())
    }

    async fn list_payments(&self, case_id: Uuid) -> Result<Vec<TenantPayment>, AppError> {
        let tables = self.tables.read().await;
        let rows = tables
            .payments
            .iter()
            .filter(|p| p.case_id == case_id)
            .cloned()
            .collect();
        Ok(sorted_by(rows, |p| (p.paid_on, p.created_at)))
    }
}

// =========================================================================
//  PAYMENT SESSIONS
// =========================================================================

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentSession>, AppError> {
        Ok(self.tables.read().await.sessions.get(&id).cloned())
    }

    async fn open_session(&self, session: &PaymentSession, cases: &[LegalCase]) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;

        for case in cases {
            let still_draft = tables.cases.get(&case.id).is_some_and(|c| c.is_draft_unpaid());
            if !still_draft {
                return Err(AppError::InvalidStateForTransition(format!(
                    "case {} is no longer an unpaid draft",
                    case.id
                )));
            }
        }

        tables.sessions.insert(session.id, session.clone());
        for case in cases {
            tables.cases.insert(case.id, case.clone());
        }
        Ok(())
    }

    async fn resolve_session(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        resolved_at: DateTime<Utc>,
        transition: CaseTransition<'_>,
    ) -> Result<Option<Vec<LegalCase>>, AppError> {
        let mut tables = self.tables.write().await;

        let session = tables
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| AppError::ResourceNotFound(format!("Session {}", session_id)))?;

        if session.status != SessionStatus::Open {
            return Ok(None);
        }
        session.status = status;
        session.resolved_at = Some(resolved_at);
        let case_ids = session.case_ids.clone();

        // Lidos sob a mesma trava de escrita
        let current = case_ids
            .iter()
            .filter_map(|id| tables.cases.get(id).cloned())
            .collect();

        let updated = transition(current);
        for case in &updated {
            tables.cases.insert(case.id, case.clone());
        }
        Ok(Some(updated))
    }
}

// =========================================================================
//  LAW FIRMS
// =========================================================================

#[async_trait]
impl LawFirmRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<LawFirm>, AppError> {
        let tables = self.tables.read().await;
        Ok(sorted_by(tables.law_firms.values().cloned().collect(), |f| f.name.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<LawFirm>, AppError> {
        Ok(self.tables.read().await.law_firms.get(&id).cloned())
    }

    async fn insert(&self, firm: &LawFirm) -> Result<LawFirm, AppError> {
        let mut tables = self.tables.write().await;
        tables.law_firms.insert(firm.id, firm.clone());
        Ok(firm.clone())
    }
}
