// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Network graph for route and reachability queries.
//!
//! Builds an undirected graph from an [`Inventory`] where:
//! - **Nodes** = network elements
//! - **Edges** = connections, weighted by span length in kilometers
//!
//! Span length is the geodesic distance between the endpoint positions. When
//! either endpoint is unpositioned, the surveyed length of the attached fiber
//! specification is used, and failing that the span weighs nothing.
//! Connections with an endpoint that does not resolve to an element are left
//! out, as in the projector.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use rustc_hash::FxHashMap;
use serde::Serialize;

use fibermap_core::{distance_km, ElementKind, Inventory, NetworkConnection};

/// A node in the network graph.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub element_id: String,
    pub kind: ElementKind,
}

/// An edge in the network graph.
#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub connection_id: String,
    /// Source node index.
    pub source: usize,
    /// Target node index.
    pub target: usize,
    /// Span length in kilometers.
    pub weight_km: f64,
    /// Surveyed total loss of the attached fiber specification.
    pub loss_db: Option<f64>,
}

/// A path between two elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Elements from start to end, inclusive.
    pub element_ids: Vec<String>,
    /// Connections traversed, one per hop.
    pub connection_ids: Vec<String>,
    pub distance_km: f64,
    /// Sum of the surveyed losses of hops that have a fiber specification.
    pub total_loss_db: f64,
    /// Hops whose loss is unknown.
    pub hops_without_spec: usize,
}

impl Route {
    pub fn hops(&self) -> usize {
        self.connection_ids.len()
    }
}

/// An undirected, weighted view of an inventory.
#[derive(Debug, Default)]
pub struct NetworkGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Adjacency list: node index → list of (neighbor index, edge index).
    adjacency: Vec<Vec<(usize, usize)>>,
    /// Element id → node index.
    id_to_node: FxHashMap<String, usize>,
}

impl NetworkGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph of an inventory snapshot.
    pub fn from_inventory(inventory: &Inventory) -> Self {
        let mut graph = Self::new();

        for element in &inventory.elements {
            if graph.node_index(&element.id).is_some() {
                tracing::warn!(element = %element.id, "duplicate element id, keeping the first");
                continue;
            }
            graph.add_node(&element.id, element.kind);
        }

        let mut skipped = 0usize;
        for connection in &inventory.connections {
            let endpoints = (
                graph.node_index(&connection.source_element_id),
                graph.node_index(&connection.target_element_id),
            );
            let (Some(source), Some(target)) = endpoints else {
                skipped += 1;
                continue;
            };
            let weight = span_km(inventory, connection);
            let loss = inventory
                .spec_for(connection)
                .map(|spec| spec.network_metrics.total_loss);
            graph.add_edge(&connection.id, source, target, weight, loss);
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            skipped,
            "built network graph"
        );
        graph
    }

    // =========================================================================
    // Graph mutation
    // =========================================================================

    /// Adds a node to the graph. Returns its index. An id already in the
    /// graph keeps resolving to its first node.
    pub fn add_node(&mut self, element_id: &str, kind: ElementKind) -> usize {
        let idx = self.nodes.len();
        self.id_to_node.entry(element_id.to_string()).or_insert(idx);
        self.nodes.push(GraphNode {
            element_id: element_id.to_string(),
            kind,
        });
        self.adjacency.push(Vec::new());
        idx
    }

    /// Adds an undirected edge between two nodes. Returns its index, or
    /// `None` if either node index is out of range.
    pub fn add_edge(
        &mut self,
        connection_id: &str,
        source: usize,
        target: usize,
        weight_km: f64,
        loss_db: Option<f64>,
    ) -> Option<usize> {
        if source >= self.nodes.len() || target >= self.nodes.len() {
            return None;
        }
        let idx = self.edges.len();
        self.edges.push(GraphEdge {
            connection_id: connection_id.to_string(),
            source,
            target,
            weight_km,
            loss_db,
        });
        self.adjacency[source].push((target, idx));
        if source != target {
            self.adjacency[target].push((source, idx));
        }
        Some(idx)
    }

    // =========================================================================
    // Graph accessors
    // =========================================================================

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the node index for an element id.
    pub fn node_index(&self, element_id: &str) -> Option<usize> {
        self.id_to_node.get(element_id).copied()
    }

    /// Returns the number of connections attached to an element.
    pub fn degree(&self, element_id: &str) -> Option<usize> {
        self.node_index(element_id).map(|n| self.adjacency[n].len())
    }

    /// Returns the ids of directly connected elements.
    pub fn neighbors(&self, element_id: &str) -> Vec<&str> {
        let Some(node) = self.node_index(element_id) else {
            return Vec::new();
        };
        self.adjacency[node]
            .iter()
            .map(|&(neighbor, _)| self.nodes[neighbor].element_id.as_str())
            .collect()
    }

    /// Returns elements with no connections.
    pub fn isolated_elements(&self) -> Vec<&str> {
        (0..self.node_count())
            .filter(|&n| self.adjacency[n].is_empty())
            .map(|n| self.nodes[n].element_id.as_str())
            .collect()
    }

    // =========================================================================
    // Path finding
    // =========================================================================

    /// Dijkstra's shortest route between two elements, by span length.
    ///
    /// Returns `None` if either element is unknown or no path exists.
    pub fn shortest_route(&self, from: &str, to: &str) -> Option<Route> {
        let source = self.node_index(from)?;
        let target = self.node_index(to)?;

        let n = self.node_count();
        let mut dist = vec![f64::INFINITY; n];
        // node → (previous node, edge used to get here)
        let mut prev: Vec<Option<(usize, usize)>> = vec![None; n];
        let mut heap = BinaryHeap::new();

        dist[source] = 0.0;
        heap.push(DijkstraState {
            cost: 0.0,
            node: source,
        });

        while let Some(DijkstraState { cost, node }) = heap.pop() {
            if node == target {
                break;
            }
            if cost > dist[node] {
                continue;
            }

            for &(neighbor, edge_idx) in &self.adjacency[node] {
                let next_cost = cost + self.edges[edge_idx].weight_km;
                if next_cost < dist[neighbor] {
                    dist[neighbor] = next_cost;
                    prev[neighbor] = Some((node, edge_idx));
                    heap.push(DijkstraState {
                        cost: next_cost,
                        node: neighbor,
                    });
                }
            }
        }

        if dist[target].is_infinite() {
            return None;
        }

        // Reconstruct path
        let mut nodes = vec![target];
        let mut edges = Vec::new();
        let mut current = target;
        while let Some((p, edge_idx)) = prev[current] {
            nodes.push(p);
            edges.push(edge_idx);
            current = p;
        }
        nodes.reverse();
        edges.reverse();

        let total_loss_db = edges.iter().filter_map(|&e| self.edges[e].loss_db).sum();
        let hops_without_spec = edges
            .iter()
            .filter(|&&e| self.edges[e].loss_db.is_none())
            .count();

        Some(Route {
            element_ids: nodes
                .iter()
                .map(|&n| self.nodes[n].element_id.clone())
                .collect(),
            connection_ids: edges
                .iter()
                .map(|&e| self.edges[e].connection_id.clone())
                .collect(),
            distance_km: dist[target],
            total_loss_db,
            hops_without_spec,
        })
    }

    // =========================================================================
    // Connected components
    // =========================================================================

    /// Returns network islands as lists of element ids.
    pub fn connected_components(&self) -> Vec<Vec<&str>> {
        let n = self.node_count();
        let mut visited = vec![false; n];
        let mut components = Vec::new();

        for start in 0..n {
            if visited[start] {
                continue;
            }

            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            visited[start] = true;
            queue.push_back(start);

            while let Some(node) = queue.pop_front() {
                component.push(self.nodes[node].element_id.as_str());
                for &(neighbor, _) in &self.adjacency[node] {
                    if !visited[neighbor] {
                        visited[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }

            components.push(component);
        }

        components
    }

    /// Checks if the graph is connected (at most one component).
    pub fn is_connected(&self) -> bool {
        self.connected_components().len() <= 1
    }
}

fn span_km(inventory: &Inventory, connection: &NetworkConnection) -> f64 {
    let positions = inventory
        .element(&connection.source_element_id)
        .and_then(|e| e.valid_position())
        .zip(
            inventory
                .element(&connection.target_element_id)
                .and_then(|e| e.valid_position()),
        );
    match positions {
        Some((a, b)) => distance_km(a, b),
        None => inventory
            .spec_for(connection)
            .and_then(|spec| spec.length_km())
            .unwrap_or(0.0),
    }
}

/// Internal state for Dijkstra's priority queue (min-heap by cost).
#[derive(Debug, Clone, PartialEq)]
struct DijkstraState {
    cost: f64,
    node: usize,
}

impl Eq for DijkstraState {}

impl PartialOrd for DijkstraState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DijkstraState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
    }
}
