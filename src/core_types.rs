//! Core types used throughout the system
//!
//! Type aliases shared by storage, the transfer engine and the gateway.

/// Customer ID - assigned by storage, ascending, immutable.
pub type CustomerId = i64;

/// Account ID - assigned by storage, ascending, immutable.
///
/// # Ordering:
/// Transfer scopes lock accounts in ascending `AccountId` order so two
/// transfers crossing the same pair never wait on each other in a cycle.
pub type AccountId = i64;

/// Money amount in currency minor units (e.g. cents).
///
/// Signed so that a negative request amount is representable and can be
/// rejected explicitly instead of silently wrapping.
pub type MinorUnits = i64;
