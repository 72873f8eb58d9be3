//! # Reconciliation Operations
//!
//! The mutation surface of a [`Session`](crate::session::Session),
//! split by domain:
//!
//! - [`inventory`] - catalog CRUD, selling, sale edits
//! - [`credit`] - credit book customers, grants, payments, deletion
//!
//! Every operation follows the same discipline: validate the input,
//! check the business rule against the cache, commit ONE atomic write
//! batch to the store, and only then update the cache to match. A
//! failed commit leaves both the store and the cache untouched.

pub mod credit;
pub mod inventory;
