//! Cross-platform alignment records.
//!
//! An avatar built for two platforms must multiplex identically on both, or
//! peers on different platforms decode each other's slots into the wrong
//! variables. The primary build writes an [`AlignmentRecord`]; the secondary
//! build replays it instead of solving. Any disagreement between the record
//! and the secondary table is a hard error.
//!
//! # Example
//!
//! ```
//! use paramforge::{AlignmentRecord, TOOL_VERSION};
//! use paramforge_core::{Decision, Method, SyncedVariable, VariableTable};
//!
//! let table = VariableTable::from_variables([
//!     SyncedVariable::bool("Hat"),
//!     SyncedVariable::bool("Glasses"),
//! ])
//! .unwrap();
//! let decision = Decision::new(table.iter().cloned().collect(), Method::Modern)
//!     .with_slots(0, 1);
//!
//! let record = AlignmentRecord::from_decision("avtr_1", &table, &decision);
//! let toml = record.to_toml_string().unwrap();
//! let restored = AlignmentRecord::from_toml_str(&toml).unwrap();
//!
//! assert_eq!(restored.to_decision("avtr_1", &table, TOOL_VERSION).unwrap(), decision);
//! ```

use std::fs;
use std::path::Path;

use paramforge_core::error::Result;
use paramforge_core::{Decision, Method, ParamForgeError, ValueType, VariableTable};
use serde::{Deserialize, Serialize};

/// Version string written into every record.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One synced parameter as the primary build saw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AlignedParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub value_type: ValueType,
    /// Whether the primary build multiplexed this parameter.
    #[serde(default)]
    pub compressed: bool,
}

/// The compression layout of one avatar, shared between platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AlignmentRecord {
    pub tool_version: String,
    pub avatar_id: String,
    pub number_slots: usize,
    pub bool_slots: usize,
    pub use_legacy_method: bool,
    /// Every synced parameter of the uncompressed table, in table order.
    pub parameters: Vec<AlignedParameter>,
}

impl AlignmentRecord {
    /// Captures `decision` for `table` as it was before compression.
    pub fn from_decision(
        avatar_id: impl Into<String>,
        table: &VariableTable,
        decision: &Decision,
    ) -> Self {
        let parameters = table
            .synced()
            .map(|v| AlignedParameter {
                name: v.name.clone(),
                source: v.source.clone(),
                value_type: v.value_type,
                compressed: decision.is_compressed(&v.name),
            })
            .collect();

        Self {
            tool_version: TOOL_VERSION.to_string(),
            avatar_id: avatar_id.into(),
            number_slots: decision.number_slots,
            bool_slots: decision.bool_slots,
            use_legacy_method: decision.uses_legacy_method(),
            parameters,
        }
    }

    pub fn method(&self) -> Method {
        if self.use_legacy_method {
            Method::Legacy
        } else {
            Method::Modern
        }
    }

    /// Rebuilds the decision against the secondary platform's table.
    ///
    /// # Errors
    ///
    /// - [`ParamForgeError::AlignmentVersion`] if the record came from
    ///   another tool version.
    /// - [`ParamForgeError::AlignmentMismatch`] if the avatar id differs,
    ///   the synced parameters differ in count, order, name, type or source,
    ///   or the slot counts cannot carry the compressed parameters.
    pub fn to_decision(
        &self,
        avatar_id: &str,
        table: &VariableTable,
        tool_version: &str,
    ) -> Result<Decision> {
        if self.tool_version != tool_version {
            return Err(ParamForgeError::AlignmentVersion {
                expected: tool_version.to_string(),
                found: self.tool_version.clone(),
            });
        }
        if self.avatar_id != avatar_id {
            return Err(ParamForgeError::AlignmentMismatch(format!(
                "record is for avatar '{}', building '{}'",
                self.avatar_id, avatar_id
            )));
        }

        let synced: Vec<_> = table.synced().collect();
        if synced.len() != self.parameters.len() {
            return Err(ParamForgeError::AlignmentMismatch(format!(
                "record lists {} synced parameters, table has {}",
                self.parameters.len(),
                synced.len()
            )));
        }

        let mut compressed = Vec::new();
        for (position, (expected, actual)) in self.parameters.iter().zip(&synced).enumerate() {
            if expected.name != actual.name {
                return Err(ParamForgeError::AlignmentMismatch(format!(
                    "parameter {} is '{}' in the record but '{}' in the table",
                    position, expected.name, actual.name
                )));
            }
            if expected.value_type != actual.value_type {
                return Err(ParamForgeError::AlignmentMismatch(format!(
                    "'{}' is {} in the record but {} in the table",
                    actual.name, expected.value_type, actual.value_type
                )));
            }
            let sources_known = expected.source.is_some() && actual.source.is_some();
            if sources_known && expected.source != actual.source {
                return Err(ParamForgeError::AlignmentMismatch(format!(
                    "'{}' comes from {:?} in the record but {:?} in the table",
                    actual.name, expected.source, actual.source
                )));
            }
            if expected.compressed {
                compressed.push((*actual).clone());
            }
        }

        let numbers = compressed.iter().filter(|v| !v.value_type.is_bool()).count();
        let bools = compressed.len() - numbers;
        check_slots("numeric", self.number_slots, numbers)?;
        check_slots("bool", self.bool_slots, bools)?;

        Ok(Decision::new(compressed, self.method())
            .with_slots(self.number_slots, self.bool_slots))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ParamForgeError::AlignmentFormat(e.to_string()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ParamForgeError::AlignmentFormat(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

// Every compressed parameter needs a slot of its kind, and no slot may stay empty.
fn check_slots(kind: &str, slots: usize, compressed: usize) -> Result<()> {
    if compressed > 0 && slots == 0 {
        return Err(ParamForgeError::AlignmentMismatch(format!(
            "record compresses {} {} parameters but has no {} slots",
            compressed, kind, kind
        )));
    }
    if slots > compressed {
        return Err(ParamForgeError::AlignmentMismatch(format!(
            "record has {} {} slots for {} compressed {} parameters",
            slots, kind, compressed, kind
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "alignment_tests.rs"]
mod tests;
