pub mod store;
pub use store::FinanceStore;
pub mod finance_repo;
pub use finance_repo::PgFinanceRepository;
pub mod fixture_repo;
pub use fixture_repo::{FixtureFault, FixtureFinanceRepository};
