//! Unit-local link validation, the second predicate pass.
//!
//! The filter consulted link predicates only to decide null eligibility.
//! Here every real unit of a surviving sequence gets its own links checked
//! against the final context, inserted nulls included. One failing predicate
//! vetoes the whole sequence.

use super::debug_enabled;
use super::filter::resolve_units;
use crate::error::EngineError;
use crate::store::ElementStore;
use crate::{PositionGroup, SequenceEntry, Unit};

/// Re-check every real unit's links against the resolved sequence. Entries
/// with only virtual groups are inserted nulls; their links were already
/// vetted during eligibility.
pub(crate) fn validate_links(
    store: &ElementStore,
    token: &Unit,
    sequence: &[SequenceEntry],
) -> Result<bool, EngineError> {
    let resolved = resolve_units(store, sequence)?;
    for (entry, unit) in sequence.iter().zip(&resolved) {
        if entry.groups.iter().all(PositionGroup::is_virtual) {
            continue;
        }
        for link in &unit.links {
            if !(link.check)(token, &resolved) {
                if debug_enabled() {
                    eprintln!("[links] unit=\"{}\" link=\"{}\" failed", unit.name, link.name);
                }
                return Ok(false);
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Unit, UnitId};

    fn entry(unit: UnitId, group: PositionGroup) -> SequenceEntry {
        SequenceEntry { unit, groups: vec![group] }
    }

    #[test]
    fn any_failing_link_vetoes_the_sequence() {
        let mut store = ElementStore::new();
        let a = store.insert(Unit::morpheme("a", "a").with_link(link! {
            name: "never",
            check: |_token: &Unit, _seq: &[&Unit]| -> bool { false },
        }));
        let token = Unit::token("t", "a");

        let seq = vec![entry(a, PositionGroup::Real(vec![0]))];
        assert!(!validate_links(&store, &token, &seq).unwrap());
    }

    #[test]
    fn links_see_inserted_nulls_in_the_resolved_context() {
        let mut store = ElementStore::new();
        let a = store.insert(Unit::morpheme("a", "a").with_link(link! {
            name: "wants a tense marker",
            check: |_token: &Unit, seq: &[&Unit]| -> bool {
                seq.iter().any(|u| u.has_class("TENSE"))
            },
        }));
        let null = store.insert(Unit::null("tense.null").with_class("TENSE"));
        let token = Unit::token("t", "a");

        let bare = vec![entry(a, PositionGroup::Real(vec![0]))];
        assert!(!validate_links(&store, &token, &bare).unwrap());

        let with_null = vec![
            entry(a, PositionGroup::Real(vec![0])),
            entry(null, PositionGroup::Virtual(vec![0])),
        ];
        assert!(validate_links(&store, &token, &with_null).unwrap());
    }

    #[test]
    fn inserted_nulls_own_links_are_not_rechecked() {
        let mut store = ElementStore::new();
        let a = store.insert(Unit::morpheme("a", "a"));
        let null = store.insert(Unit::null("x.null").with_link(link! {
            name: "never",
            check: |_token: &Unit, _seq: &[&Unit]| -> bool { false },
        }));
        let token = Unit::token("t", "a");

        let seq = vec![
            entry(a, PositionGroup::Real(vec![0])),
            entry(null, PositionGroup::Virtual(vec![0])),
        ];
        assert!(validate_links(&store, &token, &seq).unwrap());
    }
}
