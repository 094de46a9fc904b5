//! Non-fatal findings about the variable table.
//!
//! Diagnostics never change a decision; they are surfaced in the report and
//! attached to the infeasible error as suggestions.

use std::fmt;

/// Variables that look removable or compressible for reasons other than cost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Synced, but nothing in the menu or graph uses them.
    pub unused: Vec<String>,
    /// Written only by contacts or physbones; these rarely need syncing.
    pub contact_driven: Vec<String>,
    /// Exposed only through momentary buttons.
    pub button_only: Vec<String>,
    /// Read by the graph but driven only from outside the menu (e.g. OSC).
    pub external_only: Vec<String>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.unused.is_empty()
            && self.contact_driven.is_empty()
            && self.button_only.is_empty()
            && self.external_only.is_empty()
    }

    /// Human-readable warnings, one per non-empty category.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.unused.is_empty() {
            warnings.push(format!(
                "These parameters are synced but not used by any menu or animation, \
                 and can probably be removed: {}",
                self.unused.join(", ")
            ));
        }
        if !self.contact_driven.is_empty() {
            warnings.push(format!(
                "These parameters are driven by contacts or physbones, which every \
                 peer computes locally; they usually do not need to be synced: {}",
                self.contact_driven.join(", ")
            ));
        }
        if !self.button_only.is_empty() {
            warnings.push(format!(
                "These parameters are only used by momentary buttons and may be \
                 delayed noticeably if compressed: {}",
                self.button_only.join(", ")
            ));
        }
        if !self.external_only.is_empty() {
            warnings.push(format!(
                "These parameters are not in any menu and can only be changed \
                 externally (e.g. OSC): {}",
                self.external_only.join(", ")
            ));
        }
        warnings
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in self.warnings() {
            writeln!(f, "- {warning}")?;
        }
        Ok(())
    }
}
