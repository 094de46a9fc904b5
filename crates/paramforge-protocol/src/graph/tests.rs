use paramforge_core::ValueType;

use super::*;

#[test]
fn test_add_parameter_rejects_duplicates() {
    let mut builder = GraphBuilder::new();
    builder
        .add_parameter(GraphParameter::new("a", ValueType::Int))
        .unwrap();

    let err = builder
        .add_parameter(GraphParameter::new("a", ValueType::Bool))
        .unwrap_err();
    assert_eq!(err, GraphError::DuplicateParameter("a".into()));
}

#[test]
fn test_import_is_idempotent() {
    let mut builder = GraphBuilder::new();
    let first = builder.import("Gesture", ValueType::Int, 0.0).unwrap();
    let second = builder.import("Gesture", ValueType::Int, 0.0).unwrap();

    assert_eq!(first, second);
    assert_eq!(builder.build().parameters().len(), 1);
}

#[test]
fn test_import_type_mismatch() {
    let mut builder = GraphBuilder::new();
    builder.import("Gesture", ValueType::Int, 0.0).unwrap();

    let err = builder.import("Gesture", ValueType::Float, 0.0).unwrap_err();
    assert!(matches!(err, GraphError::TypeMismatch { .. }));
}

#[test]
fn test_import_over_generated_name_collides() {
    let mut builder = GraphBuilder::new();
    builder
        .add_parameter(GraphParameter::new("PF/Slot", ValueType::Int))
        .unwrap();

    let err = builder.import("PF/Slot", ValueType::Int, 0.0).unwrap_err();
    assert_eq!(err, GraphError::DuplicateParameter("PF/Slot".into()));
}

#[test]
fn test_layer_states_and_entry() {
    let mut layer = Layer::new("main");
    assert_eq!(layer.entry(), None);

    let a = layer.add_state("A").unwrap();
    let b = layer.add_state("B").unwrap();
    layer.add_transition(a, b).after(0.5);

    assert_eq!(layer.entry(), Some(a));
    assert_eq!(layer.find_state("B"), Some(b));
    assert_eq!(layer.transitions_from(a).count(), 1);
    assert_eq!(layer.transitions_from(b).count(), 0);
    assert_eq!(layer.transitions()[0].exit_time, Some(0.5));

    let err = layer.add_state("A").unwrap_err();
    assert!(matches!(err, GraphError::DuplicateState { .. }));
}

#[test]
fn test_add_layer_rejects_dangling_parameter() {
    let mut donor = GraphBuilder::new();
    donor
        .add_parameter(GraphParameter::new("x", ValueType::Bool))
        .unwrap();
    let y = donor
        .add_parameter(GraphParameter::new("y", ValueType::Bool))
        .unwrap();

    let mut layer = Layer::new("main");
    let s = layer.add_state("S").unwrap();
    layer.add_driver(
        s,
        Driver::Set {
            destination: y,
            value: 1.0,
        },
    );

    let mut builder = GraphBuilder::new();
    builder
        .add_parameter(GraphParameter::new("only", ValueType::Bool))
        .unwrap();
    let err = builder.add_layer(layer).unwrap_err();
    assert_eq!(err, GraphError::UnknownParameter("#1".into()));
}

#[test]
fn test_duplicate_layer() {
    let mut builder = GraphBuilder::new();
    builder.add_layer(Layer::new("main")).unwrap();
    let err = builder.add_layer(Layer::new("main")).unwrap_err();
    assert_eq!(err, GraphError::DuplicateLayer("main".into()));
}

#[test]
fn test_generated_cost_counts_synced_only() {
    let mut builder = GraphBuilder::new();
    builder
        .add_parameter(GraphParameter::new("slot", ValueType::Int).synced())
        .unwrap();
    builder
        .add_parameter(GraphParameter::new("bit", ValueType::Bool).synced())
        .unwrap();
    builder
        .add_parameter(GraphParameter::new("shadow", ValueType::Float))
        .unwrap();
    builder.import("var", ValueType::Int, 0.0).unwrap();

    let graph = builder.build();
    assert_eq!(graph.generated_parameters().count(), 3);
    assert_eq!(graph.generated_cost(), 9);
}

#[test]
fn test_float_remap_endpoints() {
    assert_eq!(Remap::ENCODE_FLOAT.apply(-1.0), 0.0);
    assert_eq!(Remap::ENCODE_FLOAT.apply(1.0), 254.0);
    assert_eq!(Remap::ENCODE_FLOAT.apply(0.0), 127.0);
    assert_eq!(Remap::DECODE_FLOAT.apply(127.0), 0.0);
    assert_eq!(Remap::DECODE_FLOAT.apply(254.0), 1.0);
}
