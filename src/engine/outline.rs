//! Outline construction for accepted sequences.

use super::filter::resolve_units;
use crate::error::EngineError;
use crate::store::ElementStore;
use crate::{OutlineEntry, SequenceEntry};

/// Turn a surviving sequence into the outline the store registers: one
/// entry per morpheme with its text attachment and position groups.
pub(crate) fn build_outline(
    store: &ElementStore,
    sequence: &[SequenceEntry],
) -> Result<Vec<OutlineEntry>, EngineError> {
    let resolved = resolve_units(store, sequence)?;
    Ok(sequence
        .iter()
        .zip(&resolved)
        .map(|(entry, unit)| OutlineEntry {
            unit: entry.unit,
            attachment: unit.content.clone(),
            groups: entry.groups.clone(),
        })
        .collect())
}
