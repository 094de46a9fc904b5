//! Diagnostics about the variable table.

use paramforge_core::{Diagnostics, UsageClass, UsageMap, VariableTable};

/// Collects non-fatal findings about synced variables.
///
/// Variables without any usage metadata count as unused.
pub fn diagnose(table: &VariableTable, usage: &UsageMap) -> Diagnostics {
    let mut diagnostics = Diagnostics::default();

    for variable in table.synced() {
        let name = variable.name.clone();
        let Some(entry) = usage.get(&variable.name) else {
            diagnostics.unused.push(name);
            continue;
        };

        if entry.is_unused() && !entry.written_by_contacts {
            diagnostics.unused.push(name);
        } else if entry.written_by_contacts && entry.controls.is_empty() {
            diagnostics.contact_driven.push(name);
        } else if entry.usage_class() == UsageClass::Button {
            diagnostics.button_only.push(name);
        } else if entry.controls.is_empty() {
            diagnostics.external_only.push(name);
        }
    }

    diagnostics
}
