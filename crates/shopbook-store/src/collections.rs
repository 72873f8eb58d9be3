//! # Collection Names
//!
//! Every record lives in one of five named collections. The store is
//! generic over collection names; these constants keep callers from
//! typo-ing them.

/// Product catalog.
pub const PRODUCTS: &str = "products";

/// Sale transaction history.
pub const TRANSACTIONS: &str = "transactions";

/// Credit customers ("credit book" pages).
pub const CREDITS: &str = "credits";

/// Per-customer credit ledger entries. Parented to `credits` rows via
/// their `creditId` field.
pub const CREDIT_TRANSACTIONS: &str = "creditTransactions";

/// Shop owner profiles (display name only, no business logic).
pub const USERS: &str = "users";

/// The field that parents a ledger entry to its customer.
pub const FIELD_CREDIT_ID: &str = "creditId";
