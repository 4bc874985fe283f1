//! Core functionality for the tollgate project
//!
//! This crate contains the user entity, the error taxonomy, and the pluggable storage contract
//! that every tollgate backend implements.
//!
//! The pieces fit together as follows:
//!
//! - [`User`] is the in-memory entity, keyed by [`UserId`] and carrying its storage binding
//!   (partition key, row key and [`ETag`]).
//! - [`UserRepository`] is the users-table adapter contract. Storage crates such as
//!   `tollgate-storage-sqlite` implement it; [`MemoryUserRepository`] is the in-process variant
//!   used for tests and demos.
//! - [`UserStore`] is the stateless facade the identity layer talks to. It validates input and
//!   forwards to the configured adapter.
//!
//! Every storage operation takes a [`CancellationToken`]. See [`cancellation`] for the helpers
//! adapters use to honour it.
pub mod cancellation;
pub mod error;
pub mod id;
pub mod normalizer;
pub mod repositories;
pub mod services;
pub mod user;
pub mod validation;

pub use error::Error;
pub use normalizer::{LookupNormalizer, UpperInvariantNormalizer};
pub use repositories::{DeletePolicy, MemoryUserRepository, UserRepository};
pub use services::UserStore;
pub use tokio_util::sync::CancellationToken;
pub use user::{ETag, User, UserBuilder, UserId};
