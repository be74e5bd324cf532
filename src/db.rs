pub mod user_repo;
pub use user_repo::{PgUserRepository, UserRepository};
pub mod property_repo;
pub use property_repo::{PgPropertyRepository, PgTenantRepository, PropertyRepository, TenantRepository};
pub mod case_repo;
pub use case_repo::{CaseRepository, PgCaseRepository};
pub mod session_repo;
pub use session_repo::{CaseTransition, PgSessionRepository, SessionRepository};
pub mod law_firm_repo;
pub use law_firm_repo::{LawFirmRepository, PgLawFirmRepository};

pub mod memory;
pub use memory::MemoryStore;
