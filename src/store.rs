//! The element store: owner of all units, ordering rules, and registered
//! segmentations, plus the stem log fed by the extraction stage upstream.
//!
//! The store is deliberately passive. It answers lookups and enforces its
//! write contracts (dense ids, no overwriting of registered outlines); all
//! segmentation logic lives in `engine/`.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::StoreError;
use crate::grammar::OrderingRule;
use crate::{OutlineEntry, StemSpan, Unit, UnitId, UnitType};

#[derive(Debug, Default)]
pub struct ElementStore {
    units: Vec<Unit>,
    by_name: HashMap<String, UnitId>,
    rules: Vec<OrderingRule>,
    /// token -> group index -> outline. BTreeMap keeps alternatives in
    /// group order for retrieval.
    segmentations: HashMap<UnitId, BTreeMap<usize, Vec<OutlineEntry>>>,
}

impl ElementStore {
    pub fn new() -> Self {
        ElementStore::default()
    }

    /// Insert a unit and assign its id. Name lookups resolve to the most
    /// recently inserted unit of that name.
    pub fn insert(&mut self, mut unit: Unit) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        unit.id = id;
        self.by_name.insert(unit.name.clone(), id);
        self.units.push(unit);
        id
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.0 as usize)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(id.0 as usize)
    }

    pub fn id_of(&self, name: &str) -> Option<UnitId> {
        self.by_name.get(name).copied()
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// All units of a type whose content satisfies the predicate, ordered by
    /// descending content (longer and later-alphabet entries first) with
    /// insertion order breaking ties. The search relies on this order to
    /// try greedier morphemes before their prefixes.
    pub fn units_by_content<F>(&self, unit_type: UnitType, pred: F) -> Vec<&Unit>
    where
        F: Fn(&str) -> bool,
    {
        let mut hits: Vec<&Unit> = self
            .units
            .iter()
            .filter(|u| u.unit_type == unit_type && pred(&u.content))
            .collect();
        hits.sort_by(|a, b| b.content.cmp(&a.content).then(a.id.cmp(&b.id)));
        hits
    }

    pub fn class_members(&self, class: &str) -> Vec<&Unit> {
        self.units.iter().filter(|u| u.has_class(class)).collect()
    }

    /// All insertable null variants, in insertion order.
    pub fn null_variants(&self) -> Vec<&Unit> {
        self.units
            .iter()
            .filter(|u| u.null_variant && u.unit_type == UnitType::Morpheme)
            .collect()
    }

    /// The designated null variant of a class: the first one inserted.
    pub fn null_variant_of(&self, class: &str) -> Option<&Unit> {
        self.units
            .iter()
            .find(|u| u.null_variant && u.unit_type == UnitType::Morpheme && u.has_class(class))
    }

    pub fn add_ordering_rule(&mut self, rule: OrderingRule) {
        self.rules.push(rule);
    }

    /// Rules whose scope intersects the classes present among `units`, in
    /// registration order. Rules with an empty scope never fire.
    pub fn ordering_rules_affecting(&self, units: &[&Unit]) -> Vec<&OrderingRule> {
        let present: HashSet<&str> =
            units.iter().flat_map(|u| u.classes.iter().map(String::as_str)).collect();
        self.rules
            .iter()
            .filter(|rule| rule.scope.iter().any(|class| present.contains(class.as_str())))
            .collect()
    }

    /// Register a segmentation alternative under `group`. Occupied groups
    /// are never overwritten.
    pub fn register_segmentation(
        &mut self,
        token: UnitId,
        group: usize,
        outline: Vec<OutlineEntry>,
    ) -> Result<(), StoreError> {
        let groups = self.segmentations.entry(token).or_default();
        if groups.contains_key(&group) {
            return Err(StoreError::GroupOccupied { token, group });
        }
        groups.insert(group, outline);
        Ok(())
    }

    /// Registered alternatives for a token, ordered by group index.
    pub fn segmentation_alternatives(&self, token: UnitId) -> Vec<&[OutlineEntry]> {
        self.segmentations
            .get(&token)
            .map(|groups| groups.values().map(Vec::as_slice).collect())
            .unwrap_or_default()
    }
}

// --- Stem log -------------------------------------------------------------------

/// Spans recorded by stem extraction. Segmentation refuses to run for a
/// token that has no recorded span.
#[derive(Debug, Default)]
pub struct StemLog {
    spans: HashMap<UnitId, Vec<StemSpan>>,
}

impl StemLog {
    pub fn new() -> Self {
        StemLog::default()
    }

    pub fn record(&mut self, token: UnitId, span: StemSpan) {
        self.spans.entry(token).or_default().push(span);
    }

    pub fn spans_for(&self, token: UnitId) -> &[StemSpan] {
        self.spans.get(&token).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RuleVerdict, Unit};

    #[test]
    fn insert_assigns_dense_ids_and_resolves_names() {
        let mut store = ElementStore::new();
        let a = store.insert(Unit::morpheme("cat", "cat"));
        let b = store.insert(Unit::morpheme("dog", "dog"));

        assert_eq!((a, b), (UnitId(0), UnitId(1)));
        assert_eq!(store.id_of("dog"), Some(b));
        assert_eq!(store.unit(a).unwrap().content, "cat");
        assert_eq!(store.id_of("mouse"), None);
    }

    #[test]
    fn name_collisions_resolve_to_latest_insert() {
        let mut store = ElementStore::new();
        store.insert(Unit::morpheme("s", "s"));
        let second = store.insert(Unit::morpheme("s", "es"));
        assert_eq!(store.id_of("s"), Some(second));
    }

    #[test]
    fn units_by_content_orders_descending_with_id_tiebreak() {
        let mut store = ElementStore::new();
        store.insert(Unit::morpheme("cat", "cat"));
        store.insert(Unit::morpheme("co", "co"));
        store.insert(Unit::morpheme("cats", "cats"));
        store.insert(Unit::morpheme("cat.alt", "cat"));
        store.insert(Unit::token("carrier", "co"));

        let hits = store.units_by_content(UnitType::Morpheme, |c| c.starts_with('c'));
        let names: Vec<&str> = hits.iter().map(|u| u.name.as_str()).collect();
        // "co" > "cats" > "cat" lexicographically; equal contents keep
        // insertion order.
        assert_eq!(names, ["co", "cats", "cat", "cat.alt"]);
    }

    #[test]
    fn null_queries_skip_ordinary_morphemes() {
        let mut store = ElementStore::new();
        store.insert(Unit::morpheme("ed", "ed").with_class("TENSE"));
        let first = store.insert(Unit::null("tense.null").with_class("TENSE"));
        store.insert(Unit::null("tense.alt").with_class("TENSE"));

        let nulls: Vec<UnitId> = store.null_variants().iter().map(|u| u.id()).collect();
        assert_eq!(nulls.len(), 2);
        assert_eq!(store.null_variant_of("TENSE").unwrap().id(), first);
        assert!(store.null_variant_of("CASE").is_none());
    }

    #[test]
    fn rules_affecting_respects_scope_and_registration_order() {
        let mut store = ElementStore::new();
        let verb = store.insert(Unit::morpheme("walk", "walk").with_class("VERB"));
        store.add_ordering_rule(order! {
            name: "verb order",
            scope: ["VERB"],
            check: |_seq: &[&Unit], _nulls: &[&Unit]| -> RuleVerdict { RuleVerdict::pass() },
        });
        store.add_ordering_rule(order! {
            name: "noun order",
            scope: ["NOUN"],
            check: |_seq: &[&Unit], _nulls: &[&Unit]| -> RuleVerdict { RuleVerdict::pass() },
        });
        store.add_ordering_rule(order! {
            name: "dormant",
            check: |_seq: &[&Unit], _nulls: &[&Unit]| -> RuleVerdict { RuleVerdict::pass() },
        });
        store.add_ordering_rule(order! {
            name: "verb order again",
            scope: ["VERB", "NOUN"],
            check: |_seq: &[&Unit], _nulls: &[&Unit]| -> RuleVerdict { RuleVerdict::pass() },
        });

        let unit = store.unit(verb).unwrap();
        let names: Vec<&str> =
            store.ordering_rules_affecting(&[unit]).iter().map(|r| r.name).collect();
        assert_eq!(names, ["verb order", "verb order again"]);
        assert!(store.ordering_rules_affecting(&[]).is_empty());
    }

    #[test]
    fn registered_groups_are_never_overwritten() {
        let mut store = ElementStore::new();
        let token = store.insert(Unit::token("cats", "cats"));

        store.register_segmentation(token, 0, Vec::new()).unwrap();
        let err = store.register_segmentation(token, 0, Vec::new()).unwrap_err();
        assert!(matches!(err, StoreError::GroupOccupied { group: 0, .. }));
    }

    #[test]
    fn alternatives_come_back_in_group_order() {
        let mut store = ElementStore::new();
        let token = store.insert(Unit::token("cats", "cats"));
        let cat = store.insert(Unit::morpheme("cat", "cat"));
        let s = store.insert(Unit::morpheme("s", "s"));

        let entry = |unit: UnitId, text: &str, at: Vec<usize>| OutlineEntry {
            unit,
            attachment: text.to_string(),
            groups: vec![crate::PositionGroup::Real(at)],
        };
        store
            .register_segmentation(token, 1, vec![entry(s, "s", vec![3])])
            .unwrap();
        store
            .register_segmentation(token, 0, vec![entry(cat, "cat", vec![0, 1, 2])])
            .unwrap();

        let alts = store.segmentation_alternatives(token);
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0][0].unit, cat);
        assert_eq!(alts[1][0].unit, s);
        assert!(store.segmentation_alternatives(UnitId(99)).is_empty());
    }

    #[test]
    fn stem_log_keeps_spans_per_token() {
        let mut log = StemLog::new();
        let token = UnitId(0);
        assert!(log.spans_for(token).is_empty());

        log.record(token, StemSpan { unit: UnitId(5), positions: vec![0, 1, 2] });
        log.record(token, StemSpan { unit: UnitId(6), positions: vec![3] });
        assert_eq!(log.spans_for(token).len(), 2);
        assert_eq!(log.spans_for(token)[0].positions, [0, 1, 2]);
    }
}
