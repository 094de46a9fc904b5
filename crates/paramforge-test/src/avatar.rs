//! Avatar fixtures.

use paramforge_core::{ControlKind, SyncedVariable, UsageMap, VariableTable, VariableUsage};

/// A variable table and its usage metadata.
#[derive(Debug, Clone, Default)]
pub struct AvatarFixture {
    pub table: VariableTable,
    pub usage: UsageMap,
}

impl AvatarFixture {
    pub fn total_cost(&self) -> u32 {
        self.table.total_cost()
    }
}

/// Builds avatar fixtures with predictable names.
///
/// Each helper appends variables named `<prefix><n>` in call order, e.g.
/// `toggles(3)` adds `Toggle0`, `Toggle1`, `Toggle2`.
#[derive(Debug, Default)]
pub struct AvatarBuilder {
    fixture: AvatarFixture,
}

impl AvatarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one variable with explicit usage.
    ///
    /// # Panics
    ///
    /// Panics if the name is already taken.
    pub fn variable(mut self, variable: SyncedVariable, usage: VariableUsage) -> Self {
        let name = variable.name.clone();
        if let Err(e) = self.fixture.table.push(variable) {
            panic!("fixture variable rejected: {e}");
        }
        self.fixture.usage.insert(name, usage);
        self
    }

    /// Adds a variable with no usage metadata at all.
    pub fn bare(mut self, variable: SyncedVariable) -> Self {
        if let Err(e) = self.fixture.table.push(variable) {
            panic!("fixture variable rejected: {e}");
        }
        self
    }

    pub fn toggles(self, count: usize) -> Self {
        self.many(count, "Toggle", |n| SyncedVariable::bool(n), ControlKind::Toggle)
    }

    pub fn buttons(self, count: usize) -> Self {
        self.many(count, "Button", |n| SyncedVariable::bool(n), ControlKind::Button)
    }

    pub fn radials(self, count: usize) -> Self {
        self.many(count, "Radial", |n| SyncedVariable::float(n), ControlKind::RadialPuppet)
    }

    pub fn axes(self, count: usize) -> Self {
        self.many(count, "Axis", |n| SyncedVariable::float(n), ControlKind::TwoAxisPuppet)
    }

    /// Int variables selected through a submenu.
    pub fn submenu_ints(self, count: usize) -> Self {
        self.many(count, "Menu", |n| SyncedVariable::int(n), ControlKind::SubMenu)
    }

    /// Bools read by the graph but not exposed in any menu.
    pub fn external_bools(mut self, count: usize) -> Self {
        let start = self.fixture.table.len();
        for i in 0..count {
            self = self.variable(
                SyncedVariable::bool(format!("External{}", start + i)),
                VariableUsage::new().read_by_graph(),
            );
        }
        self
    }

    fn many(
        mut self,
        count: usize,
        prefix: &str,
        make: fn(String) -> SyncedVariable,
        control: ControlKind,
    ) -> Self {
        let start = self.fixture.table.len();
        for i in 0..count {
            self = self.variable(
                make(format!("{prefix}{}", start + i)),
                VariableUsage::new().with_control(control).read_by_graph(),
            );
        }
        self
    }

    pub fn build(self) -> AvatarFixture {
        self.fixture
    }
}
