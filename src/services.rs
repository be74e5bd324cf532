// src/services.rs

pub mod admin_service;
pub mod auth;
pub mod case_service;
pub mod document_service;
pub mod lifecycle;
pub mod payment_gateway;
pub mod pricing;
pub mod property_service;

#[cfg(test)]
pub mod test_support;
