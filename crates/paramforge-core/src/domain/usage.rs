//! Usage metadata: which kinds of control expose a variable.

use std::collections::BTreeMap;
use std::fmt;

/// A menu control that reads or writes a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Toggle,
    Button,
    RadialPuppet,
    TwoAxisPuppet,
    FourAxisPuppet,
    SubMenu,
}

impl ControlKind {
    /// The usage class this control contributes.
    pub const fn usage_class(self) -> UsageClass {
        match self {
            ControlKind::RadialPuppet => UsageClass::Radial,
            ControlKind::Toggle => UsageClass::Toggle,
            ControlKind::TwoAxisPuppet | ControlKind::FourAxisPuppet => UsageClass::MultiAxis,
            ControlKind::Button => UsageClass::Button,
            ControlKind::SubMenu => UsageClass::Submenu,
        }
    }
}

/// Classification of a variable by the kind of control exposing it.
///
/// Variants are declared in priority order: when several controls use the
/// same variable, the earliest class wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UsageClass {
    /// Continuous radial puppet.
    Radial,
    /// Simple on/off toggle.
    Toggle,
    /// Two- or four-axis puppet.
    MultiAxis,
    /// Momentary button.
    Button,
    /// Referenced only as a submenu parameter.
    Submenu,
    /// Not exposed by any menu control (unused, or external/OSC only).
    Unexposed,
}

impl UsageClass {
    /// Menu-exposed classes in priority order.
    pub const MENU_CLASSES: [UsageClass; 5] = [
        UsageClass::Radial,
        UsageClass::Toggle,
        UsageClass::MultiAxis,
        UsageClass::Button,
        UsageClass::Submenu,
    ];

    #[inline]
    pub const fn is_menu_exposed(self) -> bool {
        !matches!(self, UsageClass::Unexposed)
    }
}

impl fmt::Display for UsageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UsageClass::Radial => "radial",
            UsageClass::Toggle => "toggle",
            UsageClass::MultiAxis => "multi-axis",
            UsageClass::Button => "button",
            UsageClass::Submenu => "submenu",
            UsageClass::Unexposed => "unexposed",
        };
        f.write_str(label)
    }
}

/// Everything the upstream compiler knows about how one variable is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableUsage {
    /// Menu controls referencing the variable.
    pub controls: Vec<ControlKind>,
    /// Whether any condition or blend in the graph reads the variable.
    pub read_by_graph: bool,
    /// Whether a contact receiver or physbone writes the variable.
    pub written_by_contacts: bool,
    /// Whether a delta-accumulating ("add") driver writes the variable.
    pub written_by_add_driver: bool,
}

impl VariableUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_control(mut self, kind: ControlKind) -> Self {
        self.controls.push(kind);
        self
    }

    pub fn read_by_graph(mut self) -> Self {
        self.read_by_graph = true;
        self
    }

    pub fn written_by_contacts(mut self) -> Self {
        self.written_by_contacts = true;
        self
    }

    pub fn written_by_add_driver(mut self) -> Self {
        self.written_by_add_driver = true;
        self
    }

    /// Highest-priority class among the controls, or `Unexposed`.
    pub fn usage_class(&self) -> UsageClass {
        self.controls
            .iter()
            .map(|c| c.usage_class())
            .min()
            .unwrap_or(UsageClass::Unexposed)
    }

    /// True when nothing in the menu or graph touches the variable.
    pub fn is_unused(&self) -> bool {
        self.controls.is_empty() && !self.read_by_graph
    }
}

/// Usage metadata keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageMap {
    entries: BTreeMap<String, VariableUsage>,
}

impl UsageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, usage: VariableUsage) {
        self.entries.insert(name.into(), usage);
    }

    pub fn with(mut self, name: impl Into<String>, usage: VariableUsage) -> Self {
        self.insert(name, usage);
        self
    }

    /// Returns the entry for `name`, creating an empty one.
    pub fn entry(&mut self, name: impl Into<String>) -> &mut VariableUsage {
        self.entries.entry(name.into()).or_default()
    }

    pub fn get(&self, name: &str) -> Option<&VariableUsage> {
        self.entries.get(name)
    }

    /// Usage class of `name`; variables without metadata are `Unexposed`.
    pub fn usage_class(&self, name: &str) -> UsageClass {
        self.get(name)
            .map(VariableUsage::usage_class)
            .unwrap_or(UsageClass::Unexposed)
    }

    pub fn is_written_by_add_driver(&self, name: &str) -> bool {
        self.get(name).is_some_and(|u| u.written_by_add_driver)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableUsage)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
