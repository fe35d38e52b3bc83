// ── Keyed collection and normalizer ──
//
// A collection maps a stable key to a typed record. `normalize` merges a
// fetched sequence of raw records into it through a `MapSpec`; the caller
// states per call whether keys missing from the fetch are retained,
// pruned, or whether the collection is rebuilt from scratch.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tiksync_api::RawRecord;
use tracing::{trace, warn};

use crate::error::CoreError;
use crate::mapper::MapSpec;

/// What happens to keys absent from a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Keep them as they are.
    Retain,
    /// Upsert the fetch, then drop keys it did not mention.
    Prune,
    /// Discard the whole collection before merging.
    Rebuild,
}

/// Counts from one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub upserted: usize,
    /// Admitted by the filter but lacking a key.
    pub skipped: usize,
    /// Malformed; the previous value (if any) was kept.
    pub held_back: usize,
    pub removed: usize,
}

/// A keyed collection of typed records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Collection<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> Collection<T> {
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn get_key_value(&self, key: &str) -> Option<(&String, &T)> {
        self.entries.get_key_value(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace a record. Returns the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: T) -> Option<T> {
        self.entries.insert(key.into(), value)
    }

    /// The record under `key`, created with `make` if missing.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> T) -> &mut T {
        self.entries.entry(key.to_owned()).or_insert_with(make)
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut T)> {
        self.entries.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut()
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Merge raw records through `spec` under `policy`.
    pub fn normalize(
        &mut self,
        spec: &MapSpec,
        raw: &[RawRecord],
        policy: MergePolicy,
    ) -> MergeReport {
        self.normalize_with(spec, raw, policy, |_| Ok(()))
    }

    /// Like [`normalize`](Self::normalize), with a `finish` hook that
    /// computes derived fields on each mapped record. A record whose
    /// mapping or hook fails is held back: it is not promoted, and any
    /// previous value under its key stays untouched.
    pub fn normalize_with<F>(
        &mut self,
        spec: &MapSpec,
        raw: &[RawRecord],
        policy: MergePolicy,
        mut finish: F,
    ) -> MergeReport
    where
        F: FnMut(&mut T) -> Result<(), CoreError>,
    {
        let mut report = MergeReport::default();
        if policy == MergePolicy::Rebuild {
            self.entries.clear();
        }

        let mut seen = HashSet::new();
        for record in raw.iter().filter(|r| spec.accepts(r)) {
            let Some(key) = spec.key_of(record) else {
                trace!(entity = spec.entity, "skipping record without key");
                report.skipped += 1;
                continue;
            };
            seen.insert(key.clone());

            let mapped = spec
                .apply::<T>(self.entries.get(&key), record)
                .and_then(|mut item| finish(&mut item).map(|()| item));

            match mapped {
                Ok(item) => {
                    self.entries.insert(key, item);
                    report.upserted += 1;
                }
                Err(e) => {
                    warn!(entity = spec.entity, key = %key, error = %e, "holding back malformed record");
                    report.held_back += 1;
                }
            }
        }

        if policy == MergePolicy::Prune {
            let before = self.entries.len();
            self.entries.retain(|key, _| seen.contains(key));
            report.removed = before - self.entries.len();
        }

        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::{Value, json};

    use super::*;
    use crate::mapper::{Literal, ensure, field};

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case", default)]
    struct Item {
        name: String,
        size: i64,
        note: String,
    }

    const ITEM: MapSpec = MapSpec {
        entity: "item",
        key: "name",
        key_fallback: None,
        filter: None,
        fields: &[field("name"), field("size").int()],
        ensure: &[ensure("note", Literal::Str("fresh"))],
        joins: &[],
    };

    fn raws(values: &[Value]) -> Vec<RawRecord> {
        values
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn seeded() -> Collection<Item> {
        let mut c = Collection::default();
        c.normalize(
            &ITEM,
            &raws(&[json!({ "name": "a", "size": "1" }), json!({ "name": "b", "size": "2" })]),
            MergePolicy::Retain,
        );
        c
    }

    #[test]
    fn retain_keeps_absent_keys() {
        let mut c = seeded();
        let report = c.normalize(&ITEM, &raws(&[json!({ "name": "a", "size": "5" })]), MergePolicy::Retain);

        assert_eq!(report.upserted, 1);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get("a").unwrap().size, 5);
        assert_eq!(c.get("b").unwrap().size, 2);
    }

    #[test]
    fn prune_drops_absent_keys() {
        let mut c = seeded();
        let report = c.normalize(&ITEM, &raws(&[json!({ "name": "a" })]), MergePolicy::Prune);

        assert_eq!(report.removed, 1);
        assert!(c.get("b").is_none());
    }

    #[test]
    fn rebuild_starts_from_scratch() {
        let mut c = seeded();
        c.get_mut("a").unwrap().note = "computed".into();

        c.normalize(&ITEM, &raws(&[json!({ "name": "a" })]), MergePolicy::Rebuild);

        assert_eq!(c.len(), 1);
        assert_eq!(c.get("a").unwrap().note, "fresh");
    }

    #[test]
    fn overlay_preserves_computed_fields() {
        let mut c = seeded();
        c.get_mut("a").unwrap().note = "computed".into();

        c.normalize(&ITEM, &raws(&[json!({ "name": "a", "size": "9" })]), MergePolicy::Retain);

        let a = c.get("a").unwrap();
        assert_eq!(a.note, "computed");
        assert_eq!(a.size, 9);
    }

    #[test]
    fn failed_hook_holds_record_back() {
        let mut c = seeded();
        let report = c.normalize_with(
            &ITEM,
            &raws(&[json!({ "name": "a", "size": "7" }), json!({ "name": "c" })]),
            MergePolicy::Prune,
            |item| {
                if item.size == 7 {
                    Err(CoreError::MalformedRateSpec { spec: "7".into() })
                } else {
                    Ok(())
                }
            },
        );

        assert_eq!(report.held_back, 1);
        assert_eq!(report.upserted, 1);
        // Held back, not pruned, previous value untouched.
        assert_eq!(c.get("a").unwrap().size, 1);
        assert!(c.contains_key("c"));
        assert!(!c.contains_key("b"));
    }

    #[test]
    fn records_without_key_are_skipped() {
        let mut c: Collection<Item> = Collection::default();
        let report = c.normalize(&ITEM, &raws(&[json!({ "size": "3" })]), MergePolicy::Retain);

        assert_eq!(report.skipped, 1);
        assert!(c.is_empty());
    }
}
