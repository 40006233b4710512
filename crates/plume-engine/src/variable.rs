use crate::ast::VarId;
use serde::{Deserialize, Serialize};

/// A named numeric slot discovered during parsing and populated by the host
/// before evaluation.
///
/// Identity is case-insensitive; the case of the first reference is preserved
/// for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: f64,
}

/// Insertion-ordered, name-deduplicated registry of [`Variable`] slots.
///
/// Order is first-reference order and is stable across re-parses of the same
/// text. Lookup is a linear scan: tables hold at most a few dozen entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableTable {
    slots: Vec<Variable>,
}

impl VariableTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive lookup of an existing slot.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<VarId> {
        self.slots
            .iter()
            .position(|v| v.name.eq_ignore_ascii_case(name))
            .map(VarId)
    }

    /// Return the existing slot for `name`, or append a new one with value
    /// `0.0`. The table grows by at most one entry.
    pub fn intern(&mut self, name: &str) -> VarId {
        if let Some(id) = self.find(name) {
            return id;
        }
        self.slots.push(Variable {
            name: name.to_string(),
            value: 0.0,
        });
        VarId(self.slots.len() - 1)
    }

    /// Overwrite the value of the slot named `name`. Setting a name the
    /// formula never referenced is silently ignored.
    pub fn set(&mut self, name: &str, value: f64) {
        if let Some(VarId(index)) = self.find(name) {
            self.slots[index].value = value;
        }
    }

    /// Current value of a slot. Slots referenced before the host populated
    /// them evaluate as `0.0` (the interning default).
    #[must_use]
    pub fn value(&self, id: VarId) -> f64 {
        self.slots.get(id.0).map(|v| v.value).unwrap_or(0.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot at `index`, in insertion (first-reference) order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Variable> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.slots.iter()
    }
}
