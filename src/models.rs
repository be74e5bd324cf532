pub mod admin;
pub mod auth;
pub mod legal_case;
pub mod payment;
pub mod property;
