extern crate self as morphion;

use std::collections::BTreeMap;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod grammar;
mod registry;
mod store;

pub use api::{Options, SegmentationRun, segment, segment_with};
pub use engine::{
    CandidateFlags, CandidateReport, RunMetrics, RunReport, SearchMetrics, StageMetrics,
};
pub use error::{EngineError, StoreError};
pub use grammar::{
    AppliedLink, LinkCheck, NullDirective, OrderCheck, OrderingRule, PatternRef, RuleVerdict,
};
pub use registry::{FunctionRegistry, GrammarFn, Registry, SegmentStrategy};
pub use store::{ElementStore, StemLog};

// --- Core units --------------------------------------------------------------

/// Identifier of a [`Unit`] inside an [`ElementStore`]. Ids are dense indices
/// assigned by the store at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitType {
    /// A surface form to be segmented (a word as it appears in text).
    Token,
    /// A lexicon entry that may occur inside tokens.
    Morpheme,
}

/// A lexical unit: either a token under analysis or a morpheme of the
/// lexicon. Morphemes carry the grammar payload the engine consults during
/// filtering: class labels, link predicates, and the null-variant flag.
///
/// The id is a placeholder until the unit is inserted into an
/// [`ElementStore`]; the store assigns the real id and is the only place
/// units live afterwards.
#[derive(Debug)]
pub struct Unit {
    pub(crate) id: UnitId,
    pub name: String,
    pub content: String,
    pub unit_type: UnitType,
    pub classes: Vec<String>,
    pub links: Vec<AppliedLink>,
    /// Zero-width morpheme that only enters sequences through grammar-rule
    /// insertion, never through the character search.
    pub null_variant: bool,
    params: BTreeMap<String, String>,
}

impl Unit {
    fn new(name: String, content: String, unit_type: UnitType) -> Self {
        Unit {
            id: UnitId(u32::MAX),
            name,
            content,
            unit_type,
            classes: Vec::new(),
            links: Vec::new(),
            null_variant: false,
            params: BTreeMap::new(),
        }
    }

    /// A token to be segmented.
    pub fn token(name: impl Into<String>, content: impl Into<String>) -> Self {
        Unit::new(name.into(), content.into(), UnitType::Token)
    }

    /// A lexicon morpheme.
    pub fn morpheme(name: impl Into<String>, content: impl Into<String>) -> Self {
        Unit::new(name.into(), content.into(), UnitType::Morpheme)
    }

    /// A null morpheme: empty content, insertable by ordering rules only.
    pub fn null(name: impl Into<String>) -> Self {
        let mut unit = Unit::new(name.into(), String::new(), UnitType::Morpheme);
        unit.null_variant = true;
        unit
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_link(mut self, link: AppliedLink) -> Self {
        self.links.push(link);
        self
    }

    /// Store-assigned id. Meaningless before insertion.
    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Set a grammar parameter, e.g. `"gram:tense" = "past"`. Parameters are
    /// written by grammar functions and read back by link predicates.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// A stem occurrence inside a token, recorded by the stem extraction stage
/// that runs before segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemSpan {
    pub unit: UnitId,
    /// Character indices the stem covers, ascending.
    pub positions: Vec<usize>,
}

// --- Position bookkeeping -----------------------------------------------------

/// Where a sequence entry sits inside the token.
///
/// Real groups claim concrete character indices. Virtual groups belong to
/// inserted null morphemes: they claim nothing and only carry the indices of
/// the neighbours the null was anchored to, so reports can show where the
/// insertion happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionGroup {
    Real(Vec<usize>),
    Virtual(Vec<usize>),
}

impl PositionGroup {
    pub fn is_virtual(&self) -> bool {
        matches!(self, PositionGroup::Virtual(_))
    }

    pub fn indices(&self) -> &[usize] {
        match self {
            PositionGroup::Real(v) | PositionGroup::Virtual(v) => v,
        }
    }

    pub(crate) fn first_index(&self) -> Option<usize> {
        self.indices().first().copied()
    }

    pub(crate) fn last_index(&self) -> Option<usize> {
        self.indices().last().copied()
    }
}

/// One morpheme of a candidate sequence while it moves through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SequenceEntry {
    pub unit: UnitId,
    pub groups: Vec<PositionGroup>,
}

impl SequenceEntry {
    /// Leftmost index this entry touches; drives the left-to-right sequence
    /// order. Entries with no indices at all sort last.
    pub fn coverage_start(&self) -> usize {
        self.groups.iter().filter_map(PositionGroup::first_index).min().unwrap_or(usize::MAX)
    }
}

/// One morpheme of a registered segmentation: the unit, the exact text it
/// accounts for, and the position groups it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub unit: UnitId,
    /// Text attachment: the morpheme content as stored in the lexicon.
    /// Empty for inserted nulls.
    pub attachment: String,
    pub groups: Vec<PositionGroup>,
}
