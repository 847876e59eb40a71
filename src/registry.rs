//! Capability dispatch.
//!
//! Segmentation strategies are selected by a `(parent, child)` pair of unit
//! types: "decompose a parent of this type into children of that type". The
//! [`Registry`] maps pairs to strategies; it is an explicit value handed to
//! the API, never ambient state, so tests and embedders can swap in their
//! own wiring.
//!
//! [`FunctionRegistry`] is the grammar-side counterpart: named functions
//! that write grammar parameters onto units, declared together with the
//! parameter keys they maintain. It feeds lexicon construction; the engine
//! itself never calls through it.

use std::collections::{BTreeMap, HashMap};

use crate::engine::{MorphemeInToken, RunReport, debug_enabled};
use crate::error::EngineError;
use crate::store::{ElementStore, StemLog};
use crate::{Options, Unit, UnitId, UnitType};

/// One segmentation capability.
///
/// A strategy owns the full pipeline for its pair: it reads the store and
/// the stem log, and registers whatever outlines it accepts before
/// reporting back.
pub trait SegmentStrategy: Send + Sync {
    fn segment(
        &self,
        store: &mut ElementStore,
        stems: &StemLog,
        token: UnitId,
        options: &Options,
    ) -> Result<RunReport, EngineError>;
}

impl std::fmt::Debug for dyn SegmentStrategy + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SegmentStrategy")
    }
}

/// Strategy lookup by `(parent, child)` unit-type pair.
pub struct Registry {
    strategies: HashMap<(UnitType, UnitType), Box<dyn SegmentStrategy>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut pairs: Vec<&(UnitType, UnitType)> = self.strategies.keys().collect();
        pairs.sort_by_key(|(p, c)| (format!("{p:?}"), format!("{c:?}")));
        f.debug_struct("Registry").field("pairs", &pairs).finish()
    }
}

impl Registry {
    /// An empty registry; callers wire in every strategy themselves.
    pub fn new() -> Self {
        Registry { strategies: HashMap::new() }
    }

    /// The stock wiring: morpheme-in-token segmentation under
    /// `(Token, Morpheme)`.
    pub fn with_defaults() -> Self {
        let mut registry = Registry::new();
        registry.register(UnitType::Token, UnitType::Morpheme, Box::new(MorphemeInToken));
        registry
    }

    /// Register a strategy for a pair. Registering the same pair again
    /// replaces the previous strategy.
    pub fn register(
        &mut self,
        parent: UnitType,
        child: UnitType,
        strategy: Box<dyn SegmentStrategy>,
    ) {
        if debug_enabled() && self.strategies.contains_key(&(parent, child)) {
            eprintln!("[registry] replacing strategy for ({parent:?}, {child:?})");
        }
        self.strategies.insert((parent, child), strategy);
    }

    pub fn strategy(
        &self,
        parent: UnitType,
        child: UnitType,
    ) -> Result<&dyn SegmentStrategy, EngineError> {
        self.strategies
            .get(&(parent, child))
            .map(Box::as_ref)
            .ok_or(EngineError::StrategyNotFound { parent, child })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::with_defaults()
    }
}

// --- Grammar functions ----------------------------------------------------------

/// A named function that writes grammar parameters onto a unit.
pub type GrammarFn = fn(&mut Unit);

#[derive(Debug, Clone)]
struct FunctionEntry {
    params: Vec<String>,
    func: GrammarFn,
}

/// Name-keyed registry of grammar functions and the parameter keys each one
/// declares. Iteration order follows the names, so dumps are stable.
#[derive(Debug, Default, Clone)]
pub struct FunctionRegistry {
    entries: BTreeMap<String, FunctionEntry>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        FunctionRegistry::default()
    }

    /// Register `func` under `name`, declaring the parameter keys it
    /// maintains. Re-registering a name replaces the entry.
    pub fn register(&mut self, name: impl Into<String>, params: &[&str], func: GrammarFn) {
        self.entries.insert(
            name.into(),
            FunctionEntry { params: params.iter().map(|p| p.to_string()).collect(), func },
        );
    }

    pub fn get(&self, name: &str) -> Result<GrammarFn, EngineError> {
        self.entries
            .get(name)
            .map(|entry| entry.func)
            .ok_or_else(|| EngineError::FunctionNotFound(name.to_string()))
    }

    pub fn params_of(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(|entry| entry.params.as_slice())
    }

    /// Names of every function declaring `param`.
    pub fn declaring(&self, param: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.params.iter().any(|p| p == param))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}
