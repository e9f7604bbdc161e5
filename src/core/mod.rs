//! Core business logic - framework-agnostic ledger, lifecycle, and catalogue operations.
//!
//! Every function takes an explicitly constructed database handle; nothing in here
//! reads global state or performs authorization. Callers run [`access`] checks first.

/// Role checks run before any ledger-affecting operation
pub mod access;
/// Amount owed to date from enrollment start and monthly price
pub mod billing;
/// Course creation, lookup, and updates
pub mod course;
/// Enrollment lookups
pub mod enrollment;
/// Balance computation and payment recording under per-enrollment serialization
pub mod ledger;
/// Ordered course levels
pub mod level;
/// Enrollment creation, status transitions, and cascading deletes
pub mod lifecycle;
/// Decimal/cents conversions
pub mod money;
/// Payment lookups
pub mod payment;
/// User creation, lookup, updates, and deactivation
pub mod user;

/// Page size used by list queries when the caller gives no limit. SQLite only
/// accepts an OFFSET after a LIMIT, so every paged query carries one.
pub const DEFAULT_PAGE_SIZE: u64 = 100;
