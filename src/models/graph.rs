//! Dataflow graph model.
//!
//! The graph is the read-only input of a scheduling call: a set of actors
//! and a set of precedence edges between them. The scheduler never mutates
//! it, so the same graph may be solved concurrently with different
//! parameters.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{Actor, Edge};

/// A dataflow graph of actors linked by precedence edges.
///
/// # Example
/// ```
/// use dataflow_mapsched::models::{Actor, DataflowGraph};
///
/// let graph = DataflowGraph::new()
///     .with_actor(Actor::new("A", 2))
///     .with_actor(Actor::new("B", 3))
///     .with_edge("A", "B");
///
/// assert_eq!(graph.actor_count(), 2);
/// assert_eq!(graph.total_duration(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataflowGraph {
    /// Actors, in insertion order.
    pub actors: Vec<Actor>,
    /// Precedence edges.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl DataflowGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an actor.
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actors.push(actor);
        self
    }

    /// Adds a precedence edge `source → target`.
    pub fn with_edge(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.edges.push(Edge::new(source, target));
        self
    }

    /// Adds an actor in place.
    pub fn add_actor(&mut self, actor: Actor) {
        self.actors.push(actor);
    }

    /// Adds an edge in place.
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Finds an actor by ID.
    pub fn actor(&self, id: &str) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    /// Duration of the actor with the given ID.
    pub fn duration_of(&self, id: &str) -> Option<u32> {
        self.actor(id).map(|a| a.duration)
    }

    /// Number of actors.
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no actors.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Sum of all actor durations.
    ///
    /// A horizon at least this long always admits a fully serialized
    /// schedule when the precedence graph is acyclic.
    pub fn total_duration(&self) -> u64 {
        self.actors.iter().map(|a| u64::from(a.duration)).sum()
    }

    /// Longest actor duration, or 0 for an empty graph.
    pub fn max_duration(&self) -> u32 {
        self.actors.iter().map(|a| a.duration).max().unwrap_or(0)
    }

    /// Whether the precedence relation is acyclic.
    ///
    /// Edges that reference unknown actors are still followed; a
    /// self-loop counts as a cycle.
    ///
    /// # Algorithm
    /// Iterative DFS; a back-edge to a node on the current path means a cycle.
    ///
    /// # Reference
    /// Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4
    pub fn is_acyclic(&self) -> bool {
        let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            adj.entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut on_path: HashSet<&str> = HashSet::new();

        for &root in adj.keys() {
            if visited.contains(root) {
                continue;
            }
            // (node, index of next successor to visit)
            let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
            visited.insert(root);
            on_path.insert(root);

            while let Some((node, next)) = stack.pop() {
                let succs = adj.get(node).map(Vec::as_slice).unwrap_or(&[]);
                if next < succs.len() {
                    stack.push((node, next + 1));
                    let succ = succs[next];
                    if on_path.contains(succ) {
                        return false;
                    }
                    if visited.insert(succ) {
                        on_path.insert(succ);
                        stack.push((succ, 0));
                    }
                } else {
                    on_path.remove(node);
                }
            }
        }

        true
    }
}
