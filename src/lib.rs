//! # kinship: Association Resolution Engine
//!
//! Models relationships between record types (one-to-one, one-to-many,
//! many-to-many, and "through" compositions) and resolves them into
//! lazily-loaded, per-instance-cached collections or single records.
//!
//! The engine orchestrates *which* records are associated and *when* an
//! association is materialized; the actual reads against a backing store
//! happen through the [`RecordStore`] collaborator, and relationship
//! definitions are looked up per model through an explicit
//! [`RelationshipRegistry`].

pub mod error;
pub mod key;
pub mod query;
pub mod record;
pub mod relationships;
pub mod store;

// Re-export core types
pub use error::{AssociationError, AssociationResult};
pub use key::Key;
pub use query::{Condition, Query, QueryOperator};
pub use record::{InstanceId, Record};
pub use relationships::*;
pub use store::RecordStore;
