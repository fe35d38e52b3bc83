// NAT rule deduplication
//
// Rules are identified to consumers by their `protocol:port` name. When
// several rules share a name there is no stable way to tell them apart,
// so every rule holding that name is excluded.

use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use crate::model::NatRule;
use crate::store::Collection;

/// Outcome of one deduplication pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DedupReport {
    /// Router ids removed from the collection.
    pub removed: Vec<String>,
    /// Names warned about for the first time in this pass.
    pub newly_warned: Vec<String>,
}

/// Remove every rule whose name is shared with another rule.
///
/// `warned` persists across cycles: a name is logged the first time it
/// collides and never again.
pub fn dedupe(nat: &mut Collection<NatRule>, warned: &mut HashSet<String>) -> DedupReport {
    let mut by_name: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (id, rule) in nat.iter() {
        by_name.entry(rule.name.as_str()).or_default().push(id.as_str());
    }

    let mut report = DedupReport::default();
    let mut colliding: Vec<(String, Vec<String>)> = Vec::new();
    for (name, ids) in by_name {
        if ids.len() > 1 {
            colliding.push((
                name.to_owned(),
                ids.into_iter().map(str::to_owned).collect(),
            ));
        }
    }

    for (name, ids) in colliding {
        if warned.insert(name.clone()) {
            warn!(
                name = %name,
                rules = ids.len(),
                "duplicate NAT rule name, excluding all rules that share it"
            );
            report.newly_warned.push(name);
        }
        for id in ids {
            nat.remove(&id);
            report.removed.push(id);
        }
    }

    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rule(name: &str) -> NatRule {
        NatRule {
            name: name.into(),
            ..NatRule::default()
        }
    }

    fn collection() -> Collection<NatRule> {
        let mut nat = Collection::default();
        nat.insert("*1", rule("tcp:80"));
        nat.insert("*2", rule("tcp:80"));
        nat.insert("*3", rule("udp:53"));
        nat
    }

    #[test]
    fn all_colliding_rules_are_removed() {
        let mut nat = collection();
        let mut warned = HashSet::new();

        let report = dedupe(&mut nat, &mut warned);

        assert_eq!(report.removed, vec!["*1".to_owned(), "*2".to_owned()]);
        assert_eq!(report.newly_warned, vec!["tcp:80".to_owned()]);
        assert_eq!(nat.len(), 1);
        assert!(nat.contains_key("*3"));
    }

    #[test]
    fn warning_is_emitted_once_per_name() {
        let mut warned = HashSet::new();

        let first = dedupe(&mut collection(), &mut warned);
        let second = dedupe(&mut collection(), &mut warned);
        let third = dedupe(&mut collection(), &mut warned);

        assert_eq!(first.newly_warned.len(), 1);
        assert!(second.newly_warned.is_empty());
        assert!(third.newly_warned.is_empty());
        assert_eq!(third.removed.len(), 2);
    }

    #[test]
    fn unique_names_survive() {
        let mut nat = Collection::default();
        nat.insert("*1", rule("tcp:22"));
        nat.insert("*2", rule("tcp:443"));

        let report = dedupe(&mut nat, &mut HashSet::new());

        assert!(report.removed.is_empty());
        assert_eq!(nat.len(), 2);
    }
}
