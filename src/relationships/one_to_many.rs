//! OneToMany relationship - key-matched collections with per-instance caching
//!
//! The workhorse of the engine: owns the collection-loading algorithm and
//! the association cache every other relationship kind builds on.

use serde_json::Value;

use crate::error::{AssociationError, AssociationResult};
use crate::key::Key;
use crate::query::Query;
use crate::record::Record;
use crate::store::RecordStore;

use super::cache::AssociationCache;
use super::options::RelationshipOptions;
use super::traits::{Relationship, RelationshipKind};

/// One source instance maps to a collection of target instances matched
/// by key equality
#[derive(Debug)]
pub struct OneToMany {
    name: String,
    source_model: String,
    target_model: String,
    source_key: Key,
    target_key: Key,
    min: Option<usize>,
    max: Option<usize>,
    cache: AssociationCache,
}

impl OneToMany {
    /// Define a one-to-many relationship between two models
    ///
    /// Source and target keys must have matching arity; a `through`
    /// option is rejected here (compose a [`super::ManyToMany`] instead).
    pub fn new(
        name: impl Into<String>,
        source_model: impl Into<String>,
        target_model: impl Into<String>,
        options: RelationshipOptions,
    ) -> AssociationResult<Self> {
        let name = name.into();
        let source_model = source_model.into();
        let target_model = target_model.into();

        if options.has_through() {
            return Err(AssociationError::Configuration(format!(
                "relationship '{}': one-to-many does not accept a through option",
                name
            )));
        }

        let source_key = options.resolved_source_key();
        let target_key = options.resolved_target_key(&source_model);

        if source_key.arity() == 0 {
            return Err(AssociationError::Configuration(format!(
                "relationship '{}': key must have at least one attribute",
                name
            )));
        }
        if source_key.arity() != target_key.arity() {
            return Err(AssociationError::Configuration(format!(
                "relationship '{}': source key {:?} and target key {:?} have mismatched arity",
                name,
                source_key.attributes(),
                target_key.attributes()
            )));
        }

        Ok(Self {
            name,
            source_model,
            target_model,
            source_key,
            target_key,
            min: options.min(),
            max: options.max(),
            cache: AssociationCache::new(),
        })
    }

    /// Declared minimum cardinality, if any
    pub fn min(&self) -> Option<usize> {
        self.min
    }

    /// Declared maximum cardinality, if any
    pub fn max(&self) -> Option<usize> {
        self.max
    }

    fn assert_source(&self, source: &Record) -> AssociationResult<()> {
        if source.is_instance_of(&self.source_model) {
            Ok(())
        } else {
            Err(AssociationError::type_mismatch(
                "source",
                self.source_model.clone(),
                source.model(),
            ))
        }
    }

    fn assert_target(&self, target: &Record) -> AssociationResult<()> {
        if target.is_instance_of(&self.target_model) {
            Ok(())
        } else {
            Err(AssociationError::type_mismatch(
                "target",
                self.target_model.clone(),
                target.model(),
            ))
        }
    }

    // Target-side predicate: target key attributes equal to the source's
    // extracted key values, capped by the declared maximum.
    fn key_query(&self, values: Vec<Value>) -> Query {
        let mut query = Query::new();
        for (attribute, value) in self.target_key.attributes().iter().zip(values) {
            query = query.where_eq(attribute.clone(), value);
        }
        if let Some(max) = self.max {
            query = query.with_limit(max);
        }
        query
    }
}

impl Relationship for OneToMany {
    fn name(&self) -> &str {
        &self.name
    }

    fn source_model(&self) -> &str {
        &self.source_model
    }

    fn target_model(&self) -> &str {
        &self.target_model
    }

    fn source_key(&self) -> &Key {
        &self.source_key
    }

    fn target_key(&self) -> &Key {
        &self.target_key
    }

    fn kind(&self) -> RelationshipKind {
        RelationshipKind::OneToMany
    }

    fn get(
        &self,
        store: &dyn RecordStore,
        source: &Record,
        other_query: Option<&Query>,
    ) -> AssociationResult<Vec<Record>> {
        self.assert_source(source)?;

        if other_query.is_none() {
            if let Some(cached) = self.cache.fetch(source.instance_id()) {
                tracing::debug!(
                    "Association '{}' cache hit for instance {}",
                    self.name,
                    source.instance_id()
                );
                return Ok(cached);
            }
        }

        let values = self.source_key.get(source);
        if !self.source_key.valid(&values) {
            tracing::trace!(
                "Association '{}': source key unset on instance {}, skipping fetch",
                self.name,
                source.instance_id()
            );
            return Ok(Vec::new());
        }

        let mut query = self.key_query(values);
        if let Some(other) = other_query {
            query = query.merged(other);
        }

        let records = store.select(&self.target_model, &query)?;
        tracing::debug!(
            "Association '{}' loaded {} '{}' record(s) from store",
            self.name,
            records.len(),
            self.target_model
        );

        if other_query.is_some() {
            // Targeted fetch: return fresh, leave the cache untouched
            return Ok(records);
        }

        self.cache.store(source.instance_id(), records.clone());
        Ok(records)
    }

    fn set(&self, source: &Record, targets: Vec<Record>) -> AssociationResult<Vec<Record>> {
        self.assert_source(source)?;
        for target in &targets {
            self.assert_target(target)?;
        }

        tracing::debug!(
            "Association '{}' set to {} record(s) for instance {}",
            self.name,
            targets.len(),
            source.instance_id()
        );
        self.cache.store(source.instance_id(), targets.clone());
        Ok(targets)
    }

    fn is_loaded(&self, source: &Record) -> bool {
        self.cache.contains(source.instance_id())
    }

    fn unload(&self, source: &Record) {
        self.cache.remove(source.instance_id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryOperator;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // Store double that records every select it receives
    #[derive(Default)]
    struct RecordingStore {
        rows: Vec<Record>,
        selects: AtomicUsize,
        queries: Mutex<Vec<Query>>,
    }

    impl RecordingStore {
        fn with_rows(rows: Vec<Record>) -> Self {
            Self {
                rows,
                ..Self::default()
            }
        }

        fn select_count(&self) -> usize {
            self.selects.load(Ordering::SeqCst)
        }
    }

    impl RecordStore for RecordingStore {
        fn select(&self, model: &str, query: &Query) -> AssociationResult<Vec<Record>> {
            self.selects.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.clone());

            let mut matches: Vec<Record> = self
                .rows
                .iter()
                .filter(|row| {
                    row.is_instance_of(model)
                        && query.conditions().iter().all(|cond| {
                            cond.operator == QueryOperator::Equal
                                && row.get(&cond.attribute) == Some(&cond.value)
                        })
                })
                .cloned()
                .collect();
            if let Some(limit) = query.limit() {
                matches.truncate(limit);
            }
            Ok(matches)
        }
    }

    fn addresses_relationship() -> OneToMany {
        OneToMany::new("addresses", "Person", "Address", RelationshipOptions::new()).unwrap()
    }

    fn person(id: i64) -> Record {
        Record::new("Person").with_attr("id", json!(id))
    }

    fn address(person_id: i64, city: &str) -> Record {
        Record::new("Address")
            .with_attr("person_id", json!(person_id))
            .with_attr("city", json!(city))
    }

    #[test]
    fn test_construction_defaults() {
        let rel = addresses_relationship();
        assert_eq!(rel.name(), "addresses");
        assert_eq!(rel.source_key(), &Key::single("id"));
        assert_eq!(rel.target_key(), &Key::single("person_id"));
        assert_eq!(rel.kind(), RelationshipKind::OneToMany);
        assert!(rel.through().is_none());
    }

    #[test]
    fn test_key_arity_mismatch_is_rejected() {
        let result = OneToMany::new(
            "addresses",
            "Person",
            "Address",
            RelationshipOptions::new()
                .with_source_key(Key::new(vec!["tenant_id".into(), "id".into()]))
                .with_target_key(Key::single("person_id")),
        );
        assert!(matches!(
            result,
            Err(AssociationError::Configuration(_))
        ));
    }

    #[test]
    fn test_get_rejects_wrong_source_model() {
        let rel = addresses_relationship();
        let store = RecordingStore::default();
        let not_a_person = Record::new("Team").with_attr("id", json!(1));

        let err = rel.get(&store, &not_a_person, None).unwrap_err();
        assert!(matches!(err, AssociationError::TypeMismatch { .. }));
        assert_eq!(store.select_count(), 0);
    }

    #[test]
    fn test_get_on_unset_key_skips_store() {
        let rel = addresses_relationship();
        let store = RecordingStore::with_rows(vec![address(1, "Lisbon")]);
        let unsaved = Record::new("Person");

        assert_eq!(rel.get(&store, &unsaved, None).unwrap(), Vec::new());
        assert_eq!(store.select_count(), 0);
        assert!(!rel.is_loaded(&unsaved));
    }

    #[test]
    fn test_get_fetches_and_caches() {
        let rel = addresses_relationship();
        let store =
            RecordingStore::with_rows(vec![address(1, "Lisbon"), address(2, "Porto")]);
        let source = person(1);

        let first = rel.get(&store, &source, None).unwrap();
        assert_eq!(first, vec![address(1, "Lisbon")]);
        assert_eq!(store.select_count(), 1);
        assert!(rel.is_loaded(&source));

        // Second access resolves from the cache
        let second = rel.get(&store, &source, None).unwrap();
        assert_eq!(second, first);
        assert_eq!(store.select_count(), 1);
    }

    #[test]
    fn test_query_override_forces_fresh_fetch() {
        let rel = addresses_relationship();
        let store = RecordingStore::with_rows(vec![
            address(1, "Lisbon"),
            address(1, "Porto"),
        ]);
        let source = person(1);

        rel.get(&store, &source, None).unwrap();
        assert_eq!(store.select_count(), 1);

        let narrowed = Query::new().where_eq("city", json!("Porto"));
        let result = rel.get(&store, &source, Some(&narrowed)).unwrap();
        assert_eq!(result, vec![address(1, "Porto")]);
        assert_eq!(store.select_count(), 2);

        // The targeted fetch did not overwrite the cached collection
        assert_eq!(rel.get(&store, &source, None).unwrap().len(), 2);
        assert_eq!(store.select_count(), 2);
    }

    #[test]
    fn test_set_replaces_cache_without_store_access() {
        let rel = addresses_relationship();
        let store = RecordingStore::with_rows(vec![address(1, "Lisbon")]);
        let source = person(1);
        let replacement = vec![address(1, "Porto")];

        let stored = rel.set(&source, replacement.clone()).unwrap();
        assert_eq!(stored, replacement);
        assert!(rel.is_loaded(&source));

        assert_eq!(rel.get(&store, &source, None).unwrap(), replacement);
        assert_eq!(store.select_count(), 0);
    }

    #[test]
    fn test_set_rejects_wrong_target_model() {
        let rel = addresses_relationship();
        let source = person(1);
        let wrong = Record::new("Team").with_attr("person_id", json!(1));

        let err = rel.set(&source, vec![wrong]).unwrap_err();
        assert!(matches!(
            err,
            AssociationError::TypeMismatch { param: "target", .. }
        ));
        assert!(!rel.is_loaded(&source));
    }

    #[test]
    fn test_unload_drops_instance_entry() {
        let rel = addresses_relationship();
        let store = RecordingStore::with_rows(vec![address(1, "Lisbon")]);
        let source = person(1);

        rel.get(&store, &source, None).unwrap();
        rel.unload(&source);
        assert!(!rel.is_loaded(&source));

        rel.get(&store, &source, None).unwrap();
        assert_eq!(store.select_count(), 2);
    }

    #[test]
    fn test_max_cardinality_caps_fetch() {
        let rel = OneToMany::new(
            "addresses",
            "Person",
            "Address",
            RelationshipOptions::new().with_max(1),
        )
        .unwrap();
        let store = RecordingStore::with_rows(vec![
            address(1, "Lisbon"),
            address(1, "Porto"),
        ]);
        let source = person(1);

        assert_eq!(rel.get(&store, &source, None).unwrap().len(), 1);
        let queries = store.queries.lock().unwrap();
        assert_eq!(queries[0].limit(), Some(1));
    }

    #[test]
    fn test_validity_checks_use_own_keys() {
        use crate::relationships::traits::{valid_source, valid_target};

        let rel = addresses_relationship();
        assert!(valid_source(&rel, &person(1)));
        assert!(!valid_source(&rel, &Record::new("Person")));
        assert!(!valid_source(&rel, &address(1, "Lisbon")));

        assert!(valid_target(&rel, &address(1, "Lisbon")));
        assert!(!valid_target(&rel, &Record::new("Address")));
        assert!(!valid_target(&rel, &person(1)));
    }

    #[test]
    fn test_caches_are_per_instance() {
        let rel = addresses_relationship();
        let store = RecordingStore::with_rows(vec![address(1, "Lisbon")]);
        let first = person(1);
        let second = person(1);

        rel.get(&store, &first, None).unwrap();
        assert!(rel.is_loaded(&first));
        assert!(!rel.is_loaded(&second));

        rel.get(&store, &second, None).unwrap();
        assert_eq!(store.select_count(), 2);
    }
}
