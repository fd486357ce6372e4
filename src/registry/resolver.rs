use tracing::debug;

use crate::dom::document::{Document, NodeId};
use crate::dom::selector::{SelectorError, SelectorList};
use crate::field::field_types::FieldType;
use crate::registry::registry_model::{EntryStatus, RegistryEntry};
use crate::signal::signal_model::{Signal, SignalKind};

/// A registry hit: the entry that matched and the signal it votes with.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryMatch {
    pub entry_id: String,
    pub signal: Signal,
}

struct CompiledEntry<'r> {
    entry: &'r RegistryEntry,
    selectors: Vec<Result<SelectorList, SelectorError>>,
}

/// Registry entries that participate in one pass, in trial order.
///
/// Deprecated entries, entries for other boards and entries that would vote
/// for `unknown` are filtered out up front; the rest are stable-sorted by ascending priority, so equal priorities keep
/// their declaration order.
pub struct ActiveRegistry<'r> {
    entries: Vec<CompiledEntry<'r>>,
}

impl<'r> ActiveRegistry<'r> {
    pub fn new(entries: &'r [RegistryEntry], board: Option<&str>) -> Self {
        let mut active: Vec<&RegistryEntry> = entries
            .iter()
            .filter(|e| e.status != EntryStatus::Deprecated)
            .filter(|e| e.is_generic() || board == Some(e.board.as_str()))
            .filter(|e| {
                let usable = e.field_type != FieldType::Unknown;
                if !usable {
                    debug!(entry = %e.id, "registry entry maps to unknown; skipped");
                }
                usable
            })
            .collect();
        active.sort_by_key(|e| e.priority);

        let entries = active
            .into_iter()
            .map(|entry| CompiledEntry {
                entry,
                selectors: entry
                    .selectors
                    .iter()
                    .map(|s| SelectorList::parse(s))
                    .collect(),
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of the participating entries, in trial order.
    pub fn entry_ids(&self) -> impl Iterator<Item = &'r str> + '_ {
        self.entries.iter().map(|c| c.entry.id.as_str())
    }

    /// First entry with a selector matching `node`.
    pub fn resolve(&self, doc: &Document, node: NodeId) -> Option<RegistryMatch> {
        for compiled in &self.entries {
            for (source, selector) in compiled.entry.selectors.iter().zip(&compiled.selectors) {
                let selector = match selector {
                    Ok(selector) => selector,
                    Err(err) => {
                        debug!(
                            entry = %compiled.entry.id,
                            selector = %source,
                            error = %err,
                            "unusable registry selector treated as non-match"
                        );
                        continue;
                    }
                };
                if selector.matches(doc, node) {
                    return Some(hit(compiled.entry));
                }
            }
        }
        None
    }
}

fn hit(entry: &RegistryEntry) -> RegistryMatch {
    RegistryMatch {
        entry_id: entry.id.clone(),
        signal: Signal::matched(
            SignalKind::BoardSelector,
            format!("registry:{}", entry.id),
            entry.field_type,
            format!("Matched registry entry \"{}\" (board={})", entry.id, entry.board),
        ),
    }
}
