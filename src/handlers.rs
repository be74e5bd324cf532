// src/handlers.rs

pub mod admin;
pub mod auth;
pub mod cases;
pub mod checkout;
pub mod documents;
pub mod properties;
pub mod tenants;
