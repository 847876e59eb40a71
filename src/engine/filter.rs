//! Grammar constraint filtering.
//!
//! Each candidate passes through three steps:
//!
//! 1. Null eligibility: a null variant is insertable only when every one of
//!    its link predicates passes against the token and the pre-insertion
//!    sequence.
//! 2. Rule fetch: ordering rules whose scope intersects the classes present
//!    in the sequence, in registration order, fetched once per candidate.
//! 3. Rule application with a strict-violation flag:
//!
//! ```text
//! strict rule fails      -> flag set, its insertions skipped
//! non-strict rule seen   -> flag cleared (it absorbs the failure)
//! flag currently set     -> skip insertions, keep evaluating
//! flag set after last    -> whole candidate rejected
//! ```
//!
//! Insertions are batched per directive: match positions are collected
//! against the sequence as it stood when the directive arrived, then
//! applied left to right. An inserted null carries a single virtual group
//! holding the anchor hints; it claims no characters.

use super::debug_enabled;
use crate::error::EngineError;
use crate::grammar::NullDirective;
use crate::store::ElementStore;
use crate::{PositionGroup, SequenceEntry, Unit};

/// What the filter decided about one candidate.
#[derive(Debug)]
pub(crate) enum FilterOutcome {
    /// Candidate survives; `sequence` includes any inserted nulls.
    Resolved { sequence: Vec<SequenceEntry>, inserted: usize },
    /// An unabsorbed strict failure poisoned the candidate.
    Rejected { sequence: Vec<SequenceEntry> },
}

/// Run the ordering rules over one candidate sequence.
pub(crate) fn apply_grammar(
    store: &ElementStore,
    token: &Unit,
    mut sequence: Vec<SequenceEntry>,
) -> Result<FilterOutcome, EngineError> {
    let debug = debug_enabled();

    let resolved = resolve_units(store, &sequence)?;
    let eligible: Vec<&Unit> = store
        .null_variants()
        .into_iter()
        .filter(|null| null.links.iter().all(|link| (link.check)(token, &resolved)))
        .collect();
    let rules = store.ordering_rules_affecting(&resolved);
    if debug {
        eprintln!(
            "[filter] token=\"{}\" eligible_nulls={} rules={}",
            token.name,
            eligible.len(),
            rules.len()
        );
    }

    let mut inserted = 0;
    let mut strict_failed = false;
    for rule in rules {
        // Re-resolve so the rule sees nulls inserted by earlier rules.
        let resolved = resolve_units(store, &sequence)?;
        let verdict = (rule.check)(&resolved, &eligible);
        if debug {
            eprintln!(
                "[rule] name=\"{}\" strict={} passed={} insertions={}",
                rule.name,
                rule.strict,
                verdict.passed,
                verdict.insertions.len()
            );
        }

        if rule.strict {
            if !verdict.passed {
                strict_failed = true;
            }
        } else if strict_failed {
            strict_failed = false;
        }
        if strict_failed || !verdict.passed {
            continue;
        }
        for directive in &verdict.insertions {
            inserted += apply_directive(store, &mut sequence, directive)?;
        }
    }

    if strict_failed {
        if debug {
            eprintln!("[filter] token=\"{}\" rejected: unabsorbed strict failure", token.name);
        }
        return Ok(FilterOutcome::Rejected { sequence });
    }
    Ok(FilterOutcome::Resolved { sequence, inserted })
}

/// Look up every entry's unit. All entries come from the store, so a miss
/// here is a real fault.
pub(crate) fn resolve_units<'a>(
    store: &'a ElementStore,
    sequence: &[SequenceEntry],
) -> Result<Vec<&'a Unit>, EngineError> {
    sequence
        .iter()
        .map(|entry| store.unit(entry.unit).ok_or(EngineError::UnknownUnit(entry.unit)))
        .collect()
}

/// Apply one insertion directive; returns how many nulls went in.
///
/// A `before` anchor at sequence position `j` puts the null at `j + 1`,
/// hinting at the anchor and its successor. An `after` anchor at `j > 0`
/// puts the null at `j - 1`, hinting at the anchor and its predecessor.
/// `before` anchors win when a directive carries both.
fn apply_directive(
    store: &ElementStore,
    sequence: &mut Vec<SequenceEntry>,
    directive: &NullDirective,
) -> Result<usize, EngineError> {
    let debug = debug_enabled();
    let Some(null) = directive.null.resolve_null(store) else {
        if debug {
            eprintln!("[insert] pattern={} does not resolve to a null, skipped", directive.null);
        }
        return Ok(0);
    };

    let resolved = resolve_units(store, sequence)?;
    let mut pending: Vec<(usize, Vec<usize>)> = Vec::new();
    if !directive.before.is_empty() {
        for (j, unit) in resolved.iter().enumerate() {
            if directive.before.iter().any(|pattern| pattern.matches(unit)) {
                let hints = [anchor_of(&sequence[j]), sequence.get(j + 1).and_then(anchor_of)]
                    .into_iter()
                    .flatten()
                    .collect();
                pending.push((j + 1, hints));
            }
        }
    } else if !directive.after.is_empty() {
        for (j, unit) in resolved.iter().enumerate() {
            if j == 0 {
                continue;
            }
            if directive.after.iter().any(|pattern| pattern.matches(unit)) {
                let hints = [anchor_of(&sequence[j]), anchor_of(&sequence[j - 1])]
                    .into_iter()
                    .flatten()
                    .collect();
                pending.push((j - 1, hints));
            }
        }
    }

    pending.sort_by_key(|(pos, _)| *pos);
    let count = pending.len();
    for (offset, (pos, hints)) in pending.into_iter().enumerate() {
        if debug {
            eprintln!("[insert] null=\"{}\" at={} hints={:?}", null.name, pos + offset, hints);
        }
        sequence.insert(
            pos + offset,
            SequenceEntry { unit: null.id(), groups: vec![PositionGroup::Virtual(hints)] },
        );
    }
    Ok(count)
}

/// Reference index for a sequence entry: the first index of its first
/// group, hint or real.
fn anchor_of(entry: &SequenceEntry) -> Option<usize> {
    entry.groups.first().and_then(PositionGroup::first_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::PatternRef;
    use crate::{RuleVerdict, Unit, UnitId};

    fn real(unit: UnitId, at: Vec<usize>) -> SequenceEntry {
        SequenceEntry { unit, groups: vec![PositionGroup::Real(at)] }
    }

    fn by_id(name: &str) -> PatternRef {
        PatternRef::ById(name.into())
    }

    #[test]
    fn before_insertion_lands_after_the_anchor_with_both_hints() {
        let mut store = ElementStore::new();
        let a = store.insert(Unit::morpheme("a", "a").with_class("X"));
        let b = store.insert(Unit::morpheme("b", "bc"));
        let null = store.insert(Unit::null("x.null").with_class("X"));
        let mut sequence = vec![real(a, vec![0]), real(b, vec![1, 2])];

        let directive = NullDirective::before(by_id("x.null"), vec![by_id("a")]);
        let count = apply_directive(&store, &mut sequence, &directive).unwrap();

        assert_eq!(count, 1);
        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence[1].unit, null);
        assert_eq!(sequence[1].groups, vec![PositionGroup::Virtual(vec![0, 1])]);
    }

    #[test]
    fn after_insertion_lands_before_the_predecessor() {
        let mut store = ElementStore::new();
        let a = store.insert(Unit::morpheme("a", "a"));
        let b = store.insert(Unit::morpheme("b", "bc"));
        let null = store.insert(Unit::null("x.null"));
        let mut sequence = vec![real(a, vec![0]), real(b, vec![1, 2])];

        let directive = NullDirective::after(by_id("x.null"), vec![by_id("b")]);
        apply_directive(&store, &mut sequence, &directive).unwrap();

        assert_eq!(sequence[0].unit, null);
        assert_eq!(sequence[0].groups, vec![PositionGroup::Virtual(vec![1, 0])]);
    }

    #[test]
    fn after_insertion_skips_a_match_at_the_head() {
        let mut store = ElementStore::new();
        let a = store.insert(Unit::morpheme("a", "a"));
        store.insert(Unit::null("x.null"));
        let mut sequence = vec![real(a, vec![0])];

        let directive = NullDirective::after(by_id("x.null"), vec![by_id("a")]);
        let count = apply_directive(&store, &mut sequence, &directive).unwrap();
        assert_eq!(count, 0);
        assert_eq!(sequence.len(), 1);
    }

    #[test]
    fn multiple_anchor_hits_insert_left_to_right() {
        let mut store = ElementStore::new();
        let a = store.insert(Unit::morpheme("a", "a"));
        let b = store.insert(Unit::morpheme("b", "b"));
        let null = store.insert(Unit::null("x.null"));
        let mut sequence = vec![real(a, vec![0]), real(a, vec![1]), real(b, vec![2])];

        let directive = NullDirective::before(by_id("x.null"), vec![by_id("a")]);
        let count = apply_directive(&store, &mut sequence, &directive).unwrap();

        assert_eq!(count, 2);
        let units: Vec<UnitId> = sequence.iter().map(|e| e.unit).collect();
        assert_eq!(units, [a, null, a, null, b]);
    }

    #[test]
    fn unresolvable_null_patterns_are_skipped() {
        let mut store = ElementStore::new();
        let a = store.insert(Unit::morpheme("a", "a"));
        let mut sequence = vec![real(a, vec![0])];

        // "a" exists but is not a null variant.
        let directive = NullDirective::before(by_id("a"), vec![by_id("a")]);
        let count = apply_directive(&store, &mut sequence, &directive).unwrap();
        assert_eq!(count, 0);
        assert_eq!(sequence.len(), 1);
    }

    #[test]
    fn eligible_nulls_require_every_link_to_pass() {
        let mut store = ElementStore::new();
        let a = store.insert(Unit::morpheme("a", "a").with_class("X"));
        store.insert(Unit::null("good.null").with_class("X").with_link(link! {
            name: "always",
            check: |_token: &Unit, _seq: &[&Unit]| -> bool { true },
        }));
        store.insert(Unit::null("bad.null").with_class("X").with_link(link! {
            name: "never",
            check: |_token: &Unit, _seq: &[&Unit]| -> bool { false },
        }));
        store.add_ordering_rule(order! {
            name: "sees only the good null",
            scope: ["X"],
            check: |_seq: &[&Unit], nulls: &[&Unit]| -> RuleVerdict {
                if nulls.len() == 1 && nulls[0].name == "good.null" {
                    RuleVerdict::pass()
                } else {
                    RuleVerdict::fail()
                }
            },
        });

        let token = Unit::token("t", "a");
        let outcome = apply_grammar(&store, &token, vec![real(a, vec![0])]).unwrap();
        assert!(matches!(outcome, FilterOutcome::Resolved { inserted: 0, .. }));
    }

    #[test]
    fn non_strict_rules_absorb_prior_strict_failures() {
        let mut store = ElementStore::new();
        let a = store.insert(Unit::morpheme("a", "a").with_class("X"));
        store.add_ordering_rule(order! {
            name: "strict gate",
            scope: ["X"],
            strict: true,
            check: |_seq: &[&Unit], _nulls: &[&Unit]| -> RuleVerdict { RuleVerdict::fail() },
        });
        store.add_ordering_rule(order! {
            name: "lenient followup",
            scope: ["X"],
            check: |_seq: &[&Unit], _nulls: &[&Unit]| -> RuleVerdict { RuleVerdict::pass() },
        });

        let token = Unit::token("t", "a");
        let outcome = apply_grammar(&store, &token, vec![real(a, vec![0])]).unwrap();
        assert!(matches!(outcome, FilterOutcome::Resolved { .. }));
    }

    #[test]
    fn strict_failures_after_the_last_non_strict_rule_reject() {
        let mut store = ElementStore::new();
        let a = store.insert(Unit::morpheme("a", "a").with_class("X"));
        store.add_ordering_rule(order! {
            name: "lenient first",
            scope: ["X"],
            check: |_seq: &[&Unit], _nulls: &[&Unit]| -> RuleVerdict { RuleVerdict::pass() },
        });
        store.add_ordering_rule(order! {
            name: "strict gate",
            scope: ["X"],
            strict: true,
            check: |_seq: &[&Unit], _nulls: &[&Unit]| -> RuleVerdict { RuleVerdict::fail() },
        });

        let token = Unit::token("t", "a");
        let outcome = apply_grammar(&store, &token, vec![real(a, vec![0])]).unwrap();
        assert!(matches!(outcome, FilterOutcome::Rejected { .. }));
    }

    #[test]
    fn a_passing_strict_rule_does_not_absorb_the_flag() {
        let mut store = ElementStore::new();
        let a = store.insert(Unit::morpheme("a", "a").with_class("X"));
        store.add_ordering_rule(order! {
            name: "strict gate",
            scope: ["X"],
            strict: true,
            check: |_seq: &[&Unit], _nulls: &[&Unit]| -> RuleVerdict { RuleVerdict::fail() },
        });
        store.add_ordering_rule(order! {
            name: "strict but happy",
            scope: ["X"],
            strict: true,
            check: |_seq: &[&Unit], _nulls: &[&Unit]| -> RuleVerdict { RuleVerdict::pass() },
        });

        let token = Unit::token("t", "a");
        let outcome = apply_grammar(&store, &token, vec![real(a, vec![0])]).unwrap();
        assert!(matches!(outcome, FilterOutcome::Rejected { .. }));
    }
}
