//! Shared wire slots and the imported variables they carry.

use std::collections::HashMap;

use paramforge_core::{BatchLayout, Decision, SyncedVariable, ValueType};

use crate::error::GraphError;
use crate::graph::{Driver, GraphBuilder, GraphParameter, ParameterId, Remap};
use crate::naming::NameScope;

/// Slot parameters plus the graph ids of every compressed variable.
pub(crate) struct SlotBank {
    numbers: Vec<ParameterId>,
    bools: Vec<ParameterId>,
    variables: HashMap<String, ParameterId>,
}

impl SlotBank {
    /// Declares `number_slots` byte slots, `bool_slots` bit slots and
    /// imports the compressed variables.
    pub(crate) fn declare(
        builder: &mut GraphBuilder,
        names: &NameScope,
        decision: &Decision,
    ) -> Result<Self, GraphError> {
        let numbers = (0..decision.number_slots)
            .map(|j| {
                builder.add_parameter(GraphParameter::new(names.number_slot(j), ValueType::Int).synced())
            })
            .collect::<Result<Vec<_>, _>>()?;
        let bools = (0..decision.bool_slots)
            .map(|j| {
                builder.add_parameter(GraphParameter::new(names.bool_slot(j), ValueType::Bool).synced())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut variables = HashMap::with_capacity(decision.compressed.len());
        for variable in &decision.compressed {
            let id = builder.import(&variable.name, variable.value_type, variable.default_value)?;
            variables.insert(variable.name.clone(), id);
        }

        Ok(Self {
            numbers,
            bools,
            variables,
        })
    }

    /// Graph id of a compressed variable.
    pub(crate) fn variable(&self, variable: &SyncedVariable) -> ParameterId {
        self.variables[&variable.name]
    }

    /// Copies batch `batch` from `source` into the slots.
    pub(crate) fn encode(
        &self,
        layout: &BatchLayout<'_>,
        batch: usize,
        mut source: impl FnMut(&SyncedVariable) -> ParameterId,
    ) -> Vec<Driver> {
        let numbers = layout
            .numbers_in(batch)
            .iter()
            .zip(&self.numbers)
            .map(|(variable, &slot)| Driver::Copy {
                source: source(variable),
                destination: slot,
                remap: float_remap(variable, Remap::ENCODE_FLOAT),
            })
            .collect::<Vec<_>>();
        let bools = layout
            .bools_in(batch)
            .iter()
            .zip(&self.bools)
            .map(|(variable, &slot)| Driver::copy(source(variable), slot));
        numbers.into_iter().chain(bools).collect()
    }

    /// Copies the slots of batch `batch` into `destination`.
    pub(crate) fn decode(
        &self,
        layout: &BatchLayout<'_>,
        batch: usize,
        mut destination: impl FnMut(&SyncedVariable) -> ParameterId,
    ) -> Vec<Driver> {
        let numbers = layout
            .numbers_in(batch)
            .iter()
            .zip(&self.numbers)
            .map(|(variable, &slot)| Driver::Copy {
                source: slot,
                destination: destination(variable),
                remap: float_remap(variable, Remap::DECODE_FLOAT),
            })
            .collect::<Vec<_>>();
        let bools = layout
            .bools_in(batch)
            .iter()
            .zip(&self.bools)
            .map(|(variable, &slot)| Driver::copy(slot, destination(variable)));
        numbers.into_iter().chain(bools).collect()
    }
}

fn float_remap(variable: &SyncedVariable, remap: Remap) -> Option<Remap> {
    (variable.value_type == ValueType::Float).then_some(remap)
}
