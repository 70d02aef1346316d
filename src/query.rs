//! Query predicates - target-side constraints for association resolution
//!
//! Relationships build a key-equality query against the target model and
//! merge in any caller-supplied constraints before handing the predicate
//! to the persistence collaborator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operators available in query conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryOperator {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    In,
    Like,
    IsNull,
    IsNotNull,
}

impl QueryOperator {
    /// Symbolic representation of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOperator::Equal => "=",
            QueryOperator::NotEqual => "!=",
            QueryOperator::GreaterThan => ">",
            QueryOperator::LessThan => "<",
            QueryOperator::In => "IN",
            QueryOperator::Like => "LIKE",
            QueryOperator::IsNull => "IS NULL",
            QueryOperator::IsNotNull => "IS NOT NULL",
        }
    }
}

/// A single condition on a target attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub attribute: String,
    pub operator: QueryOperator,
    pub value: Value,
}

impl Condition {
    /// Create an equality condition
    pub fn eq(attribute: impl Into<String>, value: Value) -> Self {
        Self {
            attribute: attribute.into(),
            operator: QueryOperator::Equal,
            value,
        }
    }
}

/// An ordered list of conditions with an optional result limit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    conditions: Vec<Condition>,
    limit: Option<usize>,
}

impl Query {
    /// Create an empty query matching everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition, consuming and returning the query
    pub fn where_eq(mut self, attribute: impl Into<String>, value: Value) -> Self {
        self.conditions.push(Condition::eq(attribute, value));
        self
    }

    /// Add an arbitrary condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Cap the number of results
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The conditions of this query, in insertion order
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The result limit, if any
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Merge another query into this one
    ///
    /// Conditions are appended after this query's own; the tighter of the
    /// two limits wins.
    pub fn merged(&self, other: &Query) -> Query {
        let mut conditions = self.conditions.clone();
        conditions.extend(other.conditions.iter().cloned());

        let limit = match (self.limit, other.limit) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        Query { conditions, limit }
    }
}
