//! Incremental construction of a [`ProtocolGraph`].

use std::collections::HashMap;

use paramforge_core::ValueType;

use super::{GraphParameter, Layer, ParameterId, ParameterOrigin, ProtocolGraph};
use crate::error::GraphError;

/// Builds a graph while keeping every parameter and layer name unique.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: ProtocolGraph,
    names: HashMap<String, ParameterId>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a generated parameter.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateParameter`] if the name is already
    /// present, whether generated or imported.
    pub fn add_parameter(&mut self, parameter: GraphParameter) -> Result<ParameterId, GraphError> {
        if self.names.contains_key(&parameter.name) {
            return Err(GraphError::DuplicateParameter(parameter.name));
        }
        let id = ParameterId(self.graph.parameters.len());
        self.names.insert(parameter.name.clone(), id);
        self.graph.parameters.push(parameter);
        Ok(id)
    }

    /// References a parameter owned elsewhere.
    ///
    /// Importing the same name twice with the same type yields the same id.
    pub fn import(
        &mut self,
        name: &str,
        value_type: ValueType,
        default_value: f32,
    ) -> Result<ParameterId, GraphError> {
        if let Some(&id) = self.names.get(name) {
            let existing = &self.graph.parameters[id.0];
            if existing.origin != ParameterOrigin::Imported {
                return Err(GraphError::DuplicateParameter(name.to_string()));
            }
            if existing.value_type != value_type {
                return Err(GraphError::TypeMismatch {
                    name: name.to_string(),
                    expected: existing.value_type,
                    found: value_type,
                });
            }
            return Ok(id);
        }
        let mut parameter = GraphParameter::new(name, value_type).with_default(default_value);
        parameter.origin = ParameterOrigin::Imported;
        self.add_parameter(parameter)
    }

    pub fn parameter_id(&self, name: &str) -> Result<ParameterId, GraphError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownParameter(name.to_string()))
    }

    /// Appends a finished layer after checking its parameter references.
    pub fn add_layer(&mut self, layer: Layer) -> Result<(), GraphError> {
        if self.graph.layer(layer.name()).is_some() {
            return Err(GraphError::DuplicateLayer(layer.name().to_string()));
        }
        let count = self.graph.parameters.len();
        if let Some(bad) = layer.referenced_parameters().find(|p| p.0 >= count) {
            return Err(GraphError::UnknownParameter(format!("#{}", bad.0)));
        }
        self.graph.layers.push(layer);
        Ok(())
    }

    pub fn build(self) -> ProtocolGraph {
        self.graph
    }
}
