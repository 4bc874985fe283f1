//! Repository traits for the data access layer
//!
//! [`UserRepository`] is the users-table adapter contract: storage backends implement it and the
//! [`UserStore`](crate::UserStore) consumes it. Backends receive their client handle at
//! construction; nothing here is global.
//!
//! # Implementing a Custom Storage Backend
//!
//! A backend needs insert-by-key, delete-by-key, get-by-key and a filtered lookup on the
//! normalized user name. It must:
//!
//! 1. Check the [`CancellationToken`](crate::CancellationToken) before any I/O
//!    (see [`crate::cancellation`]).
//! 2. Report duplicate keys and duplicate normalized names as `StorageError::DuplicateKey`.
//! 3. Compare the entity's [`ETag`](crate::ETag) on update and delete.
//! 4. Apply its [`DeletePolicy`] when deleting a missing record.
//!
//! ```rust,ignore
//! use tollgate_core::{UserRepository, UserStore};
//!
//! struct MyUsersTable { /* client handle */ }
//!
//! #[async_trait]
//! impl UserRepository for MyUsersTable { /* ... */ }
//!
//! let store = UserStore::new(Arc::new(MyUsersTable::new(client)));
//! ```

pub mod memory;
pub mod user;

pub use memory::MemoryUserRepository;
pub use user::{DeletePolicy, UserRepository};
