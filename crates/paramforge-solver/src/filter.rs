//! Eligibility filters.
//!
//! The solver never searches the powerset of usage classes. It walks a fixed,
//! ascending sequence: radial puppets alone, then progressively adds toggles,
//! multi-axis puppets, buttons and finally submenu parameters.

use std::fmt;

use paramforge_core::{SyncedVariable, UsageClass, UsageMap, VariableTable};
use smallvec::SmallVec;

/// An ordered set of usage classes allowed to be compressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityFilter {
    classes: SmallVec<[UsageClass; 5]>,
    allow_add_driven: bool,
}

impl EligibilityFilter {
    pub fn new(classes: impl IntoIterator<Item = UsageClass>) -> Self {
        Self {
            classes: classes.into_iter().collect(),
            allow_add_driven: false,
        }
    }

    /// Also admits variables written by delta-accumulating drivers.
    pub fn with_add_driven(mut self) -> Self {
        self.allow_add_driven = true;
        self
    }

    /// The fixed filter sequence, narrowest first.
    ///
    /// Variables written by "add" drivers accumulate deltas that a
    /// multiplexed copy can overwrite between batches, so only the final,
    /// everything-eligible filter admits them.
    pub fn standard_sequence() -> Vec<EligibilityFilter> {
        let all = UsageClass::MENU_CLASSES;
        (1..=all.len())
            .map(|n| {
                let filter = EligibilityFilter::new(all[..n].iter().copied());
                if n == all.len() {
                    filter.with_add_driven()
                } else {
                    filter
                }
            })
            .collect()
    }

    pub fn classes(&self) -> &[UsageClass] {
        &self.classes
    }

    pub fn allows_add_driven(&self) -> bool {
        self.allow_add_driven
    }

    pub fn allows(&self, class: UsageClass) -> bool {
        class.is_menu_exposed() && self.classes.contains(&class)
    }

    /// Synced variables this filter admits, in table order.
    pub fn select(&self, table: &VariableTable, usage: &UsageMap) -> Vec<SyncedVariable> {
        table
            .synced()
            .filter(|v| self.allows(usage.usage_class(&v.name)))
            .filter(|v| self.allow_add_driven || !usage.is_written_by_add_driver(&v.name))
            .cloned()
            .collect()
    }
}

impl fmt::Display for EligibilityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, class) in self.classes.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{class}")?;
        }
        Ok(())
    }
}
