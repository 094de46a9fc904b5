//! Synced variables and the table that owns them.

use std::fmt;

use crate::error::{ParamForgeError, Result};

/// Value type of a synced variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ValueType {
    /// Single synced bit.
    Bool,
    /// Unsigned byte, 0..=255.
    Int,
    /// Signed unit float, quantized to one byte on the wire.
    Float,
}

impl ValueType {
    /// Number of synced bits a variable of this type costs.
    #[inline]
    pub const fn bit_cost(self) -> u32 {
        match self {
            ValueType::Bool => 1,
            ValueType::Int | ValueType::Float => 8,
        }
    }

    #[inline]
    pub const fn is_bool(self) -> bool {
        matches!(self, ValueType::Bool)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
        }
    }
}

/// A named piece of avatar state.
///
/// Only `is_network_synced` is ever changed by the compressor: compressed
/// variables stop syncing directly and travel through the shared slots.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedVariable {
    /// Unique name within the table.
    pub name: String,
    /// Value type, which determines the bit cost.
    pub value_type: ValueType,
    /// Whether the platform replicates this variable directly.
    pub is_network_synced: bool,
    /// Whether the platform persists this variable between sessions.
    pub is_saved: bool,
    /// Initial value, also used to seed generated shadow parameters.
    pub default_value: f32,
    /// Identity of the upstream feature that declared this variable.
    pub source: Option<String>,
}

impl SyncedVariable {
    /// Creates a synced, unsaved variable with a zero default.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            is_network_synced: true,
            is_saved: false,
            default_value: 0.0,
            source: None,
        }
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Bool)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Float)
    }

    pub fn with_saved(mut self, saved: bool) -> Self {
        self.is_saved = saved;
        self
    }

    pub fn with_default(mut self, value: f32) -> Self {
        self.default_value = value;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Marks the variable as local-only.
    pub fn unsynced(mut self) -> Self {
        self.is_network_synced = false;
        self
    }

    /// Bit cost of this variable when synced directly.
    #[inline]
    pub fn bit_cost(&self) -> u32 {
        self.value_type.bit_cost()
    }
}

/// Ordered, name-unique collection of variables for one avatar.
///
/// Source order is significant: batches are laid out in table order so that
/// two builds of the same avatar produce the same wire layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableTable {
    variables: Vec<SyncedVariable>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table, rejecting duplicate names.
    pub fn from_variables(variables: impl IntoIterator<Item = SyncedVariable>) -> Result<Self> {
        let mut table = Self::new();
        for variable in variables {
            table.push(variable)?;
        }
        Ok(table)
    }

    /// Appends a variable.
    ///
    /// # Errors
    ///
    /// Returns [`ParamForgeError::DuplicateVariable`] if the name is taken.
    pub fn push(&mut self, variable: SyncedVariable) -> Result<()> {
        if self.contains(&variable.name) {
            return Err(ParamForgeError::DuplicateVariable(variable.name));
        }
        self.variables.push(variable);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SyncedVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SyncedVariable> {
        self.variables.iter()
    }

    /// Variables the platform currently replicates directly.
    pub fn synced(&self) -> impl Iterator<Item = &SyncedVariable> {
        self.variables.iter().filter(|v| v.is_network_synced)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Total synced bit cost of the table.
    pub fn total_cost(&self) -> u32 {
        self.synced().map(SyncedVariable::bit_cost).sum()
    }

    /// Sets the synced flag of a variable, returning false if it is unknown.
    pub fn set_network_synced(&mut self, name: &str, synced: bool) -> bool {
        match self.variables.iter_mut().find(|v| v.name == name) {
            Some(variable) => {
                variable.is_network_synced = synced;
                true
            }
            None => false,
        }
    }
}

impl<'a> IntoIterator for &'a VariableTable {
    type Item = &'a SyncedVariable;
    type IntoIter = std::slice::Iter<'a, SyncedVariable>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.iter()
    }
}
