//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel.
//! - **memory**: in-process repositories for development and tests.
//! - **argon2_hasher**: credential hashing.
//! - **model_store**: the trained regression loaded from disk.
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod argon2_hasher;
pub mod memory;
pub mod model_store;
pub mod persistence;
