// src/services/admin_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LawFirmRepository, UserRepository},
    models::{
        admin::{LawFirm, LawFirmPayload, PriceOverridePayload},
        auth::{PriceOverride, Role, User},
    },
};

#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserRepository>,
    law_firms: Arc<dyn LawFirmRepository>,
}

impl AdminService {
    pub fn new(users: Arc<dyn UserRepository>, law_firms: Arc<dyn LawFirmRepository>) -> Self {
        Self { users, law_firms }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.users.list_users().await
    }

    async fn landlord(&self, user_id: Uuid) -> Result<User, AppError> {
        let user = self.users.find_by_id(user_id).await?.ok_or(AppError::UserNotFound)?;
        if user.role != Role::Landlord {
            return Err(AppError::InvalidStateForTransition(format!(
                "user {} is not a landlord",
                user_id
            )));
        }
        Ok(user)
    }

    // =========================================================================
    //  PREÇOS & INDICAÇÃO
    // =========================================================================

    /// Vale só para casos novos; os existentes mantêm o preço gravado.
    pub async fn set_price_override(
        &self,
        user_id: Uuid,
        payload: PriceOverridePayload,
    ) -> Result<User, AppError> {
        self.landlord(user_id).await?;
        let jurisdiction = payload.jurisdiction.trim();

        self.users
            .set_price_override(
                user_id,
                jurisdiction,
                PriceOverride { price: payload.price, unlocked: payload.unlocked },
            )
            .await?;

        tracing::info!(
            "Price for {} set to {} (unlocked: {}) on landlord {}",
            jurisdiction,
            payload.price,
            payload.unlocked,
            user_id
        );
        self.users.find_by_id(user_id).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn remove_price_override(&self, user_id: Uuid, jurisdiction: &str) -> Result<User, AppError> {
        self.landlord(user_id).await?;

        if !self.users.remove_price_override(user_id, jurisdiction).await? {
            return Err(AppError::ResourceNotFound(format!("Price entry for {}", jurisdiction)));
        }
        tracing::info!("Price for {} removed from landlord {}", jurisdiction, user_id);
        self.users.find_by_id(user_id).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn set_referral_code(&self, user_id: Uuid, code: Option<String>) -> Result<User, AppError> {
        let code = code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        self.users.set_referral_code(user_id, code.as_deref()).await?;
        self.users.find_by_id(user_id).await?.ok_or(AppError::UserNotFound)
    }

    // =========================================================================
    //  ESCRITÓRIOS
    // =========================================================================

    pub async fn list_law_firms(&self) -> Result<Vec<LawFirm>, AppError> {
        self.law_firms.list().await
    }

    pub async fn create_law_firm(&self, payload: LawFirmPayload) -> Result<LawFirm, AppError> {
        let firm = LawFirm {
            id: Uuid::new_v4(),
            name: payload.name.trim().to_string(),
            address: payload.address,
            phone: payload.phone,
            email: payload.email,
            created_at: Utc::now(),
        };
        let firm = self.law_firms.insert(&firm).await?;
        tracing::info!("Law firm {} registered", firm.id);
        Ok(firm)
    }
}
