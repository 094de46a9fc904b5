//! Deterministic names for generated graph artifacts.
//!
//! Every generated parameter and layer lives under a single prefix so that
//! it cannot collide with names produced upstream. The scope is threaded
//! through the compilers explicitly; there are no global counters.

/// Prefixed namespace for one compression pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameScope {
    prefix: String,
}

impl NameScope {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// True if `name` falls inside this scope.
    pub fn owns(&self, name: &str) -> bool {
        name.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn layer(&self) -> String {
        format!("{}/Protocol", self.prefix)
    }

    /// Modern index bit `bit`, where bit 0 is the most significant.
    pub fn index_bit(&self, bit: u32) -> String {
        format!("{}/Index/Bit{}", self.prefix, bit)
    }

    /// Legacy one-byte batch pointer.
    pub fn pointer(&self) -> String {
        format!("{}/Pointer", self.prefix)
    }

    pub fn number_slot(&self, slot: usize) -> String {
        format!("{}/Slot/Number{}", self.prefix, slot)
    }

    pub fn bool_slot(&self, slot: usize) -> String {
        format!("{}/Slot/Bool{}", self.prefix, slot)
    }

    /// Cycle-start snapshot of `variable`.
    pub fn latch(&self, variable: &str) -> String {
        format!("{}/Latch/{}", self.prefix, variable)
    }

    /// Last value of `variable` put on the wire by the legacy sender.
    pub fn last_synced(&self, variable: &str) -> String {
        format!("{}/LastSynced/{}", self.prefix, variable)
    }
}

impl Default for NameScope {
    fn default() -> Self {
        Self::new(paramforge_config::DEFAULT_NAME_PREFIX)
    }
}
