//! Service layer
//!
//! This module contains the user store facade that the identity layer talks to.

pub mod user_store;

pub use user_store::UserStore;
