//! Database Infrastructure - Ledger store adapters
//!
//! Two implementations of the `domain_ledger` store contract:
//!
//! - [`PostgresLedger`]: the production adapter over SQLx/PostgreSQL.
//!   Transactions map to database transactions; bill and operation row
//!   locks use `SELECT ... FOR UPDATE`, which is what makes concurrent
//!   settlement recomputes safe.
//! - [`MemoryLedger`]: a serializable in-memory adapter for tests and
//!   local development. One transaction runs at a time; staged writes
//!   become visible only on commit.

pub mod pool;
pub mod error;
pub mod memory;
pub mod postgres;

pub use pool::{DatabaseConfig, DatabasePool, create_pool, create_pool_from_url};
pub use error::map_sqlx_error;
pub use memory::MemoryLedger;
pub use postgres::{PostgresLedger, run_migrations};
