//! Persistence collaborator contract
//!
//! The engine never talks to a backing store directly; it hands a target
//! model and a predicate to a `RecordStore` and receives matching records
//! in store order. Store failures propagate to the caller unchanged, with
//! no retry policy added at this layer.

use crate::error::AssociationResult;
use crate::query::Query;
use crate::record::Record;

/// Blocking persistence collaborator queried on association cache misses
///
/// Implementations must return results in a stable order for identical
/// queries and are assumed idempotent within a cache-miss window. An
/// empty result is not an error.
pub trait RecordStore: Send + Sync {
    /// Fetch all records of `model` matching `query`
    fn select(&self, model: &str, query: &Query) -> AssociationResult<Vec<Record>>;
}
