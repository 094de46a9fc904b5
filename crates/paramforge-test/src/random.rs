//! Seeded random avatars.

use paramforge_core::{ControlKind, SyncedVariable, VariableUsage};
use rand::Rng;

use crate::avatar::{AvatarBuilder, AvatarFixture};

const CONTROLS: [ControlKind; 6] = [
    ControlKind::Toggle,
    ControlKind::Button,
    ControlKind::RadialPuppet,
    ControlKind::TwoAxisPuppet,
    ControlKind::FourAxisPuppet,
    ControlKind::SubMenu,
];

/// Generates an avatar with `count` variables of random type and usage.
///
/// Roughly one in eight variables has no menu control.
pub fn random_avatar<R: Rng>(rng: &mut R, count: usize) -> AvatarFixture {
    let mut builder = AvatarBuilder::new();
    for i in 0..count {
        let name = format!("Var{i}");
        let variable = match rng.random_range(0..3) {
            0 => SyncedVariable::bool(name),
            1 => SyncedVariable::int(name),
            _ => SyncedVariable::float(name),
        };
        let mut usage = VariableUsage::new().read_by_graph();
        if rng.random_range(0..8) != 0 {
            usage = usage.with_control(CONTROLS[rng.random_range(0..CONTROLS.len())]);
        }
        if rng.random_range(0..16) == 0 {
            usage = usage.written_by_add_driver();
        }
        builder = builder.variable(variable, usage);
    }
    builder.build()
}
