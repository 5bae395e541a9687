// crates/ontocompiler/tests/graph_tests.rs

mod common;

use common::{demo_workflow, ss3};
use ontocompiler::{WorkflowGraph, DEFAULT_MAX_DEPTH};
use ontocore::{GraphError, WorkflowDescription, DATASET};
use petgraph::algo::has_path_connecting;
use petgraph::graph::NodeIndex;

fn demo_graph() -> WorkflowGraph {
    WorkflowGraph::build(&demo_workflow(), DEFAULT_MAX_DEPTH).unwrap()
}

/// `levels` nested producer/consumer pairs ending in a dataset.
fn nested(levels: usize) -> WorkflowDescription {
    let mut description = WorkflowDescription::leaf(ss3("Raw"));
    for level in 0..levels {
        description = WorkflowDescription::branch(ss3(&format!("Tool{}", level))).consumes(description);
        description = WorkflowDescription::branch(ss3(&format!("Artifact{}", level))).produced_by(description);
    }
    description
}

// ============================================================================
// Sequence order
// ============================================================================

#[test]
fn test_post_order_sequence() {
    let graph = demo_graph();
    let names: Vec<&str> = graph.nodes().iter().map(|n| n.suffix()).collect();

    assert_eq!(
        names,
        vec![
            "aluminium_raw_data",
            "MaterialCardGenerator",
            "AluminiumMaterialCard",
            "concrete_material_card",
            "AbaqusSimulation",
            "AbaqusDeformationHistory",
        ]
    );
    assert_eq!(graph.root().id, 5);
    for (index, node) in graph.nodes().iter().enumerate() {
        assert_eq!(node.id, index, "Sequence indexes are a permutation in order");
    }
}

#[test]
fn test_dependencies_point_forward() {
    let graph = demo_graph();
    let deps = graph.dependency_graph();

    for node in graph.nodes() {
        for input in &node.inputs {
            assert!(*input < node.id);
            assert!(has_path_connecting(&deps, NodeIndex::new(*input), NodeIndex::new(node.id), None));
        }
        for output in &node.outputs {
            assert!(node.id < *output);
        }
    }
    // raw data reaches the final artifact through both steps
    assert!(has_path_connecting(&deps, NodeIndex::new(0), NodeIndex::new(5), None));
    assert!(!has_path_connecting(&deps, NodeIndex::new(5), NodeIndex::new(0), None));
}

// ============================================================================
// Node classification
// ============================================================================

#[test]
fn test_resource_kinds() {
    let graph = demo_graph();
    let nodes = graph.nodes();

    assert!(nodes[0].is_dataset());
    assert_eq!(nodes[0].resource_kind.output, DATASET);
    assert_eq!(nodes[0].resource_kind.input, ss3("MaterialCardGenerator"));

    assert_eq!(nodes[2].resource_kind.output, ss3("MaterialCardGenerator"));
    assert_eq!(nodes[2].resource_kind.input, ss3("AbaqusSimulation"));

    assert_eq!(nodes[5].resource_kind.output, ss3("AbaqusSimulation"));
    assert!(nodes[5].resource_kind.input.is_empty());
}

#[test]
fn test_steps_and_context_nodes() {
    let graph = demo_graph();

    let steps: Vec<usize> = graph.steps().map(|n| n.id).collect();
    assert_eq!(steps, vec![1, 4]);

    let step = graph.node(4).unwrap();
    let inputs: Vec<usize> = graph.inputs_of(step).iter().map(|n| n.id).collect();
    assert_eq!(inputs, vec![2, 3]);
    let outputs: Vec<usize> = graph.outputs_of(step).iter().map(|n| n.id).collect();
    assert_eq!(outputs, vec![5]);

    let context: Vec<usize> = graph
        .nodes()
        .iter()
        .filter(|n| n.is_context_node())
        .map(|n| n.id)
        .collect();
    assert_eq!(context, vec![0, 2, 3, 5]);
}

#[test]
fn test_single_leaf_has_no_steps() {
    let graph = WorkflowGraph::build(&WorkflowDescription::leaf(ss3("Raw")), DEFAULT_MAX_DEPTH).unwrap();
    assert_eq!(graph.len(), 1);
    assert!(graph.root().is_dataset());
    assert_eq!(graph.steps().count(), 0);
}

#[test]
fn test_empty_children_is_not_a_dataset() {
    let graph = WorkflowGraph::build(&WorkflowDescription::branch(ss3("Orphan")), DEFAULT_MAX_DEPTH).unwrap();
    let root = graph.root();
    assert!(!root.is_dataset());
    assert!(root.resource_kind.output.is_empty());
    assert!(!root.is_context_node());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_identifier() {
    let mut child = WorkflowDescription::leaf("").with_depth(1);
    child.identifier = None;
    let description = WorkflowDescription::branch(ss3("Result")).consumes(child);

    let err = WorkflowGraph::build(&description, DEFAULT_MAX_DEPTH).unwrap_err();
    assert_eq!(err, GraphError::MissingIdentifier { depth: 1 });
}

#[test]
fn test_depth_ceiling() {
    // 3 levels of pairs nest 6 descriptions below the dataset
    assert!(WorkflowGraph::build(&nested(3), 6).is_ok());

    let err = WorkflowGraph::build(&nested(3), 5).unwrap_err();
    assert_eq!(err, GraphError::DepthExceeded { max_depth: 5 });
}

#[test]
fn test_deep_chain_is_ordered() {
    let graph = WorkflowGraph::build(&nested(20), DEFAULT_MAX_DEPTH).unwrap();
    assert_eq!(graph.len(), 41);
    assert_eq!(graph.steps().count(), 20);
    assert!(graph.nodes().iter().all(|n| n.inputs.iter().all(|i| *i < n.id)));
}
