// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::{Role, User},
};

/// Conjunto de papéis aceitos por uma rota.
pub trait RoleDef: Send + Sync + 'static {
    fn allows(role: Role) -> bool;
    fn label() -> &'static str;
}

/// Extrator que exige o usuário autenticado com um dos papéis de `T`.
pub struct RequireRole<T>(pub User, pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !T::allows(user.role) {
            return Err(AppError::Forbidden(format!("this action requires the {} role", T::label())));
        }
        Ok(RequireRole(user, PhantomData))
    }
}

// ---
// PAPÉIS
// ---

pub struct LandlordRole;
impl RoleDef for LandlordRole {
    fn allows(role: Role) -> bool { role == Role::Landlord }
    fn label() -> &'static str { "landlord" }
}

pub struct AdminRole;
impl RoleDef for AdminRole {
    fn allows(role: Role) -> bool { role == Role::Admin }
    fn label() -> &'static str { "admin" }
}

pub struct ContractorRole;
impl RoleDef for ContractorRole {
    fn allows(role: Role) -> bool { role == Role::Contractor }
    fn label() -> &'static str { "contractor" }
}

/// Contratado ou admin.
pub struct StaffRole;
impl RoleDef for StaffRole {
    fn allows(role: Role) -> bool { matches!(role, Role::Contractor | Role::Admin) }
    fn label() -> &'static str { "contractor or admin" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_covers_contractors_and_admins() {
        assert!(StaffRole::allows(Role::Contractor));
        assert!(StaffRole::allows(Role::Admin));
        assert!(!StaffRole::allows(Role::Landlord));
        assert!(!LandlordRole::allows(Role::Admin));
    }
}
