//! Grammar constraint vocabulary.
//!
//! Two kinds of constraints participate in filtering:
//!
//! - [`AppliedLink`]: a boolean predicate attached to a unit, evaluated
//!   against the fully resolved candidate sequence. The engine never looks
//!   inside; it only calls the check and branches on the answer.
//! - [`OrderingRule`]: a class-scoped rule evaluated per candidate. Its
//!   verdict can demand the insertion of null morphemes at positions
//!   described by [`NullDirective`]s.
//!
//! Both refer to units through the textual [`PatternRef`] notation:
//! `<#name>` picks a unit by id, `<.CLASS>` picks by class membership.
//! Backslash escapes are tolerated and stripped, so rule tables can keep
//! patterns in string form regardless of the quoting context they came from.

use crate::error::EngineError;
use crate::store::ElementStore;
use crate::Unit;

// --- Links --------------------------------------------------------------------

pub type LinkCheck = Box<dyn Fn(&Unit, &[&Unit]) -> bool + Send + Sync>;

/// A named predicate bound to a unit. Checked once per candidate, after null
/// insertion, with the unit itself and the whole sequence in scope.
pub struct AppliedLink {
    pub name: &'static str,
    pub check: LinkCheck,
}

impl std::fmt::Debug for AppliedLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppliedLink")
            .field("name", &self.name)
            .field("check", &"<function>")
            .finish()
    }
}

// --- Ordering rules -----------------------------------------------------------

pub type OrderCheck = Box<dyn Fn(&[&Unit], &[&Unit]) -> RuleVerdict + Send + Sync>;

/// A grammar rule consulted while filtering candidate sequences.
///
/// Rules are fetched once per candidate (those whose scope intersects the
/// classes present in the sequence) and evaluated in registration order.
/// The check receives the current sequence and the null variants eligible
/// for insertion into it.
pub struct OrderingRule {
    pub name: &'static str,
    /// Classes this rule cares about. An empty scope matches nothing, which
    /// keeps the rule dormant.
    pub scope: Vec<String>,
    /// A strict failure poisons the candidate unless a later non-strict
    /// rule passes and absorbs it.
    pub strict: bool,
    pub check: OrderCheck,
}

impl std::fmt::Debug for OrderingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderingRule")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("strict", &self.strict)
            .field("check", &"<function>")
            .finish()
    }
}

/// Outcome of one ordering-rule check.
#[derive(Debug, Default)]
pub struct RuleVerdict {
    pub passed: bool,
    /// Insertions to apply when the rule passes. Ignored on failure.
    pub insertions: Vec<NullDirective>,
}

impl RuleVerdict {
    pub fn pass() -> Self {
        RuleVerdict { passed: true, insertions: Vec::new() }
    }

    pub fn fail() -> Self {
        RuleVerdict { passed: false, insertions: Vec::new() }
    }

    pub fn pass_with(insertions: Vec<NullDirective>) -> Self {
        RuleVerdict { passed: true, insertions }
    }
}

/// Instruction to insert one null morpheme relative to anchor patterns.
///
/// `before` anchors place the null immediately after a matching entry;
/// `after` anchors place it immediately before one. When both lists are
/// given, `before` wins. A directive whose null pattern resolves to nothing
/// is skipped.
#[derive(Debug, Clone)]
pub struct NullDirective {
    pub null: PatternRef,
    pub before: Vec<PatternRef>,
    pub after: Vec<PatternRef>,
}

impl NullDirective {
    /// Insert `null` right after any entry matching one of `anchors`.
    pub fn before(null: PatternRef, anchors: Vec<PatternRef>) -> Self {
        NullDirective { null, before: anchors, after: Vec::new() }
    }

    /// Insert `null` right before any entry matching one of `anchors`.
    pub fn after(null: PatternRef, anchors: Vec<PatternRef>) -> Self {
        NullDirective { null, before: Vec::new(), after: anchors }
    }
}

// --- Pattern notation ---------------------------------------------------------

/// A textual reference to a unit: `<#name>` by id, `<.CLASS>` by class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternRef {
    ById(String),
    ByClass(String),
}

impl PatternRef {
    /// Parse the bracket notation. Backslashes are stripped before parsing,
    /// so `\<.VERB\>` and `<.VERB>` are the same reference.
    pub fn parse(raw: &str) -> Result<PatternRef, EngineError> {
        let cleaned: String = raw.chars().filter(|c| *c != '\\').collect();
        let caps = regex!(r"^<([.#])([^<>]+)>$")
            .captures(&cleaned)
            .ok_or_else(|| EngineError::PatternSyntax(raw.to_string()))?;
        let name = caps[2].to_string();
        match &caps[1] {
            "." => Ok(PatternRef::ByClass(name)),
            _ => Ok(PatternRef::ById(name)),
        }
    }

    /// Does this reference pick out the given unit?
    pub fn matches(&self, unit: &Unit) -> bool {
        match self {
            PatternRef::ById(name) => unit.name == *name,
            PatternRef::ByClass(class) => unit.has_class(class),
        }
    }

    /// Resolve to an insertable null morpheme. By-id references must point
    /// at a null variant; by-class references pick the designated null of
    /// the class.
    pub fn resolve_null<'a>(&self, store: &'a ElementStore) -> Option<&'a Unit> {
        match self {
            PatternRef::ById(name) => {
                store.id_of(name).and_then(|id| store.unit(id)).filter(|u| u.null_variant)
            }
            PatternRef::ByClass(class) => store.null_variant_of(class),
        }
    }
}

impl std::fmt::Display for PatternRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternRef::ById(name) => write!(f, "<#{name}>"),
            PatternRef::ByClass(class) => write!(f, "<.{class}>"),
        }
    }
}
