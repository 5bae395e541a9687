use ontocore::{GraphError, NodeId, ResourceKind, WorkflowDescription, WorkflowNode};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

/// The workflow graph: an arena of nodes addressed by sequence index.
///
/// Built once per compilation and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    nodes: Vec<WorkflowNode>,
    root: NodeId,
}

impl WorkflowGraph {
    /// Build the graph from a nested description, refusing to recurse
    /// deeper than `max_depth` levels.
    pub fn build(description: &WorkflowDescription, max_depth: usize) -> Result<Self, GraphError> {
        let mut builder = GraphBuilder {
            nodes: Vec::new(),
            max_depth,
        };
        let root = builder.visit(description, 0)?;
        let graph = Self {
            nodes: builder.nodes,
            root,
        };
        graph.verify_order()?;

        tracing::debug!("Built workflow graph with {} nodes", graph.nodes.len());
        Ok(graph)
    }

    pub fn root(&self) -> &WorkflowNode {
        &self.nodes[self.root]
    }

    pub fn node(&self, id: NodeId) -> Option<&WorkflowNode> {
        self.nodes.get(id)
    }

    /// All nodes in sequence order (producers before their consumers).
    pub fn nodes(&self) -> &[WorkflowNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn steps(&self) -> impl Iterator<Item = &WorkflowNode> {
        self.nodes.iter().filter(|n| n.is_step())
    }

    pub fn inputs_of(&self, node: &WorkflowNode) -> Vec<&WorkflowNode> {
        node.inputs.iter().map(|id| &self.nodes[*id]).collect()
    }

    pub fn outputs_of(&self, node: &WorkflowNode) -> Vec<&WorkflowNode> {
        node.outputs.iter().map(|id| &self.nodes[*id]).collect()
    }

    /// Dependency graph with one edge per producer/consumer relation,
    /// pointing from the node that must come first. Node weights are
    /// sequence indexes and coincide with petgraph indexes.
    pub fn dependency_graph(&self) -> DiGraph<NodeId, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.nodes.len());
        for node in &self.nodes {
            graph.add_node(node.id);
        }
        for node in &self.nodes {
            for input in &node.inputs {
                graph.add_edge(NodeIndex::new(*input), NodeIndex::new(node.id), ());
            }
            for output in &node.outputs {
                graph.add_edge(NodeIndex::new(node.id), NodeIndex::new(*output), ());
            }
        }
        graph
    }

    /// Every dependency must point forward in sequence order.
    fn verify_order(&self) -> Result<(), GraphError> {
        let graph = self.dependency_graph();
        if toposort(&graph, None).is_err() {
            return Err(GraphError::CyclicDependency);
        }
        for edge in graph.raw_edges() {
            if edge.source().index() >= edge.target().index() {
                return Err(GraphError::CyclicDependency);
            }
        }
        Ok(())
    }
}

/// Accumulates nodes in post-order while walking a description.
struct GraphBuilder {
    nodes: Vec<WorkflowNode>,
    max_depth: usize,
}

impl GraphBuilder {
    fn visit(&mut self, description: &WorkflowDescription, level: usize) -> Result<NodeId, GraphError> {
        if level > self.max_depth {
            return Err(GraphError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }
        let identifier = description
            .identifier
            .clone()
            .filter(|iri| !iri.is_empty())
            .ok_or(GraphError::MissingIdentifier {
                depth: description.depth,
            })?;

        let mut resource_kind = ResourceKind::default();
        let mut inputs = Vec::new();
        let mut produced_by = Vec::new();

        match &description.children {
            None => resource_kind = ResourceKind::dataset(),
            Some(children) => {
                for child in children {
                    let child_id = self.visit(child, level + 1)?;
                    let produces = child
                        .relation
                        .as_ref()
                        .map(|r| r.is_production())
                        .unwrap_or(false);

                    if produces {
                        produced_by.push(child_id);
                        resource_kind.output = self.nodes[child_id].identifier.clone();
                    } else {
                        inputs.push(child_id);
                        let consumer = &mut self.nodes[child_id].resource_kind.input;
                        if consumer.is_empty() {
                            *consumer = identifier.clone();
                        } else {
                            tracing::debug!(
                                "Node {} already consumed by {}, ignoring consumer {}",
                                child_id,
                                consumer,
                                identifier
                            );
                        }
                    }
                }
            }
        }

        let id = self.nodes.len();
        for producer in produced_by {
            self.nodes[producer].outputs.push(id);
        }
        self.nodes.push(WorkflowNode {
            id,
            identifier,
            depth: description.depth,
            resource_kind,
            inputs,
            outputs: Vec::new(),
        });
        Ok(id)
    }
}
