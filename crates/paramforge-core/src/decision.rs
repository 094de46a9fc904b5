//! The compression decision and its cost model.
//!
//! A [`Decision`] names the variables to multiplex and how many shared slots
//! of each kind carry them. The cost model prices a decision in synced bits:
//!
//! ```text
//! final = original + index_bits + number_slots * 8 + bool_slots * 1
//!         - sum(bit_cost(v) for v in compressed)
//! ```
//!
//! # Examples
//!
//! ```
//! use paramforge_core::{Decision, Method, SyncedVariable};
//!
//! let compressed: Vec<_> = (0..6).map(|i| SyncedVariable::bool(format!("b{i}"))).collect();
//! let decision = Decision::new(compressed, Method::Modern).with_slots(0, 2);
//!
//! assert_eq!(decision.batch_count(), 3);
//! assert_eq!(decision.index_bit_count(), 2);
//! // 6 bools leave, 2 bool slots and 2 index bits arrive
//! assert_eq!(decision.final_cost(40), 38);
//! ```

use std::fmt;

use crate::domain::SyncedVariable;
use crate::score::CostScore;

/// Protocol dwell time per batch, in seconds.
pub const BATCH_TIME_SECS: f32 = 0.1;

/// Index width of the legacy method, regardless of batch count.
pub const LEGACY_INDEX_BITS: u32 = 8;

/// Highest batch count the legacy pointer can address.
pub const LEGACY_MAX_BATCHES: usize = 255;

/// Which protocol compiler realizes a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Method {
    /// Round-robin, binary-indexed, latched.
    #[default]
    Modern,
    /// Priority/shortcut with a fixed one-byte pointer.
    Legacy,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Modern => f.write_str("modern"),
            Method::Legacy => f.write_str("legacy"),
        }
    }
}

/// Smallest `b` such that `2^b >= batch_count + 1`.
///
/// Index value 0 is reserved for "no compressed batch in flight".
#[inline]
pub fn index_bits_for(batch_count: usize) -> u32 {
    (batch_count + 1).next_power_of_two().trailing_zeros()
}

/// A candidate compression configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decision {
    /// Shared numeric (int/float) slots per batch.
    pub number_slots: usize,
    /// Shared bool slots per batch.
    pub bool_slots: usize,
    /// Protocol used to realize the decision.
    pub method: Method,
    /// Variables to multiplex, in table order.
    pub compressed: Vec<SyncedVariable>,
}

impl Decision {
    /// A decision that compresses nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a decision with no slots yet assigned.
    pub fn new(compressed: Vec<SyncedVariable>, method: Method) -> Self {
        Self {
            number_slots: 0,
            bool_slots: 0,
            method,
            compressed,
        }
    }

    pub fn with_slots(mut self, number_slots: usize, bool_slots: usize) -> Self {
        self.number_slots = number_slots;
        self.bool_slots = bool_slots;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.compressed.is_empty()
    }

    pub fn uses_legacy_method(&self) -> bool {
        self.method == Method::Legacy
    }

    pub fn is_compressed(&self, name: &str) -> bool {
        self.compressed.iter().any(|v| v.name == name)
    }

    /// Compressed int and float variables, in order.
    pub fn number_variables(&self) -> impl Iterator<Item = &SyncedVariable> {
        self.compressed.iter().filter(|v| !v.value_type.is_bool())
    }

    /// Compressed bool variables, in order.
    pub fn bool_variables(&self) -> impl Iterator<Item = &SyncedVariable> {
        self.compressed.iter().filter(|v| v.value_type.is_bool())
    }

    /// Whether the slot counts fit the compressed set: every compressed
    /// variable lands in a batch and no slot is permanently empty.
    pub fn slots_match_compressed(&self) -> bool {
        let numbers = self.number_variables().count();
        let bools = self.bool_variables().count();
        slots_fit(self.number_slots, numbers) && slots_fit(self.bool_slots, bools)
    }

    /// Partitions the compressed set into fixed-size batches per type.
    pub fn batches(&self) -> BatchLayout<'_> {
        BatchLayout {
            number: chunk(self.number_variables(), self.number_slots),
            bool: chunk(self.bool_variables(), self.bool_slots),
        }
    }

    pub fn batch_count(&self) -> usize {
        self.batches().batch_count()
    }

    /// Synced bits spent broadcasting the batch index.
    ///
    /// The legacy method always spends a full byte once anything is
    /// compressed; an empty decision spends nothing under either method.
    pub fn index_bit_count(&self) -> u32 {
        let batch_count = self.batch_count();
        match self.method {
            Method::Legacy if batch_count > 0 => LEGACY_INDEX_BITS,
            Method::Legacy => 0,
            Method::Modern => index_bits_for(batch_count),
        }
    }

    /// Synced bits removed from direct sync.
    pub fn compressed_cost(&self) -> u32 {
        self.compressed.iter().map(SyncedVariable::bit_cost).sum()
    }

    /// Synced bits added by slots and index.
    pub fn overhead_cost(&self) -> u32 {
        self.index_bit_count() + self.number_slots as u32 * 8 + self.bool_slots as u32
    }

    /// Total synced cost once this decision is applied to a table costing
    /// `original_cost` bits.
    pub fn final_cost(&self, original_cost: u32) -> u32 {
        (original_cost + self.overhead_cost()).saturating_sub(self.compressed_cost())
    }

    pub fn score(&self, original_cost: u32, max_cost: u32) -> CostScore {
        CostScore::evaluate(self.final_cost(original_cost), max_cost, self.batch_count())
    }
}

fn slots_fit(slots: usize, variables: usize) -> bool {
    (slots == 0) == (variables == 0) && slots <= variables
}

fn chunk<'a>(
    variables: impl Iterator<Item = &'a SyncedVariable>,
    size: usize,
) -> Vec<Vec<&'a SyncedVariable>> {
    if size == 0 {
        return Vec::new();
    }
    let mut batches: Vec<Vec<&'a SyncedVariable>> = Vec::new();
    for variable in variables {
        match batches.last_mut() {
            Some(batch) if batch.len() < size => batch.push(variable),
            _ => batches.push(vec![variable]),
        }
    }
    batches
}

/// Batches of a decision, split by slot kind.
///
/// Batch `i` of the protocol carries `number[i]` (if any) through the
/// numeric slots and `bool[i]` (if any) through the bool slots.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchLayout<'a> {
    pub number: Vec<Vec<&'a SyncedVariable>>,
    pub bool: Vec<Vec<&'a SyncedVariable>>,
}

impl<'a> BatchLayout<'a> {
    pub fn batch_count(&self) -> usize {
        self.number.len().max(self.bool.len())
    }

    /// Numeric members of batch `index` (zero-based).
    pub fn numbers_in(&self, index: usize) -> &[&'a SyncedVariable] {
        self.number.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bool members of batch `index` (zero-based).
    pub fn bools_in(&self, index: usize) -> &[&'a SyncedVariable] {
        self.bool.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All members of batch `index`, numbers first.
    pub fn members(&self, index: usize) -> impl Iterator<Item = &'a SyncedVariable> + '_ {
        self.numbers_in(index)
            .iter()
            .chain(self.bools_in(index).iter())
            .copied()
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
