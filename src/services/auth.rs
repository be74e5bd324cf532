// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, NewUser, RegisterUserPayload, Role, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_secret: String,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret, hash_cost: bcrypt::DEFAULT_COST }
    }

    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let cost = self.hash_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;
        Ok(hashed)
    }

    pub async fn register_user(&self, payload: RegisterUserPayload) -> Result<String, AppError> {
        // Admins só via bootstrap
        if payload.role == Role::Admin {
            return Err(AppError::Forbidden("admin accounts cannot self-register".into()));
        }

        let password_hash = self.hash_password(&payload.password).await?;
        let user = self
            .user_repo
            .create_user(NewUser {
                email: payload.email.trim().to_lowercase(),
                password_hash,
                full_name: payload.full_name,
                role: payload.role,
                referral_code: payload.referral_code.filter(|c| !c.trim().is_empty()),
            })
            .await?;

        tracing::info!("New {:?} account registered: {}", user.role, user.id);
        self.create_token(&user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&user)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        // Papel mudou desde a emissão: token não vale mais
        if user.role != token_data.claims.role {
            return Err(AppError::InvalidToken);
        }
        Ok(user)
    }

    /// Cria o admin configurado no ambiente, se ainda não existir.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        let email = email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Ok(());
        }

        let password_hash = self.hash_password(password).await?;
        let admin = self
            .user_repo
            .create_user(NewUser {
                email,
                password_hash,
                full_name: "Administrator".into(),
                role: Role::Admin,
                referral_code: None,
            })
            .await?;

        tracing::info!("Bootstrap admin account created: {}", admin.id);
        Ok(())
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
