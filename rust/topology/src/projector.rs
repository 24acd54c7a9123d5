// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Render-ready topology projection.
//!
//! Maps geographic elements onto a square canvas of side `scale`, with north
//! up. Every element becomes exactly one node; elements without a usable
//! position get a deterministic pseudo-random spot so the preview is still
//! drawable. This is a placeholder layout, not a force-directed one.
//!
//! Edges are emitted only for connections whose endpoints both resolve to
//! positioned elements. Anything else is dropped without error; run
//! [`crate::audit::audit`] when that needs to be surfaced.

use std::hash::{Hash, Hasher};

use nalgebra::{Point2, Vector2};
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use serde::Serialize;

use fibermap_core::{
    distance_km, ConnectionKind, ElementKind, EngineConfig, GeoPoint, NetworkConnection,
    NetworkElement, ProjectionFrame, ServiceArea,
};

use crate::status::StatusHint;

/// Smallest frame extent in degrees; keeps single-point inputs centered.
const MIN_SPAN_DEG: f64 = 1e-9;

/// A projected element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyNode {
    pub id: String,
    pub kind: ElementKind,
    pub label: String,
    pub normalized_x: f64,
    pub normalized_y: f64,
    pub color_hint: &'static str,
    pub status_hint: StatusHint,
    /// True when the coordinate is a fallback, not a projected position.
    pub synthetic: bool,
}

impl TopologyNode {
    pub fn point(&self) -> Point2<f64> {
        Point2::new(self.normalized_x, self.normalized_y)
    }
}

/// A projected connection, anchored at its source node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyEdge {
    pub connection_id: String,
    pub source_id: String,
    pub target_id: String,
    pub kind: ConnectionKind,
    pub normalized_x: f64,
    pub normalized_y: f64,
    /// Planar canvas distance times the configured length factor.
    pub length_hint: f64,
    /// `atan2(Δy, Δx)` in degrees, canvas axes.
    pub rotation_degrees: f64,
    /// Geodesic length of the span.
    pub distance_km: f64,
    pub color_hint: &'static str,
    pub status_hint: StatusHint,
}

/// Output of [`project`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Topology {
    pub nodes: Vec<TopologyNode>,
    pub edges: Vec<TopologyEdge>,
    /// Most severe hint across nodes and edges.
    pub status: StatusHint,
}

impl Topology {
    pub fn node(&self, id: &str) -> Option<&TopologyNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, connection_id: &str) -> Option<&TopologyEdge> {
        self.edges.iter().find(|e| e.connection_id == connection_id)
    }
}

/// Geographic rectangle mapped onto the canvas.
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// `(min_lon, min_lat)`
    origin: Vector2<f64>,
    /// `(lon span, lat span)`, both positive.
    span: Vector2<f64>,
}

impl Frame {
    fn from_area(area: &ServiceArea) -> Self {
        let (lon_span, lat_span) = area.span();
        Self::padded(
            Vector2::new(area.min_lon, area.min_lat),
            Vector2::new(lon_span, lat_span),
            0.0,
        )
    }

    /// Bounding box of the positions, grown by `padding` times its extent on
    /// every side. `None` when there are no positions.
    fn fit(points: impl Iterator<Item = GeoPoint>, padding: f64) -> Option<Self> {
        let mut min = Vector2::repeat(f64::INFINITY);
        let mut max = Vector2::repeat(f64::NEG_INFINITY);
        let mut any = false;
        for p in points {
            let v = Vector2::new(p.lon, p.lat);
            min = min.inf(&v);
            max = max.sup(&v);
            any = true;
        }
        any.then(|| Self::padded(min, max - min, padding))
    }

    fn padded(origin: Vector2<f64>, span: Vector2<f64>, padding: f64) -> Self {
        let padding = if padding.is_finite() { padding.max(0.0) } else { 0.0 };
        let mut origin = origin - span * padding;
        let mut span = span * (1.0 + 2.0 * padding);
        for axis in 0..2 {
            if span[axis] < MIN_SPAN_DEG {
                origin[axis] -= 0.5;
                span[axis] += 1.0;
            }
        }
        Self { origin, span }
    }

    /// Canvas point for a position, clamped to `[0, scale]`.
    fn project(&self, p: GeoPoint, scale: f64) -> Point2<f64> {
        let u = (p.lon - self.origin.x) / self.span.x;
        let v = (p.lat - self.origin.y) / self.span.y;
        Point2::new(
            (u * scale).clamp(0.0, scale),
            ((1.0 - v) * scale).clamp(0.0, scale),
        )
    }
}

/// Deterministic fallback coordinate for an element without a position.
fn fallback_point(id: &str, seed: u64, scale: f64) -> Point2<f64> {
    let mut hasher = FxHasher::default();
    seed.hash(&mut hasher);
    id.hash(&mut hasher);
    let h = hasher.finish();
    let unit = |bits: u64| (bits & 0xffff_ffff) as f64 / f64::from(u32::MAX);
    Point2::new(unit(h) * scale, unit(h >> 32) * scale)
}

/// Projects elements and connections into a render-ready topology.
///
/// Pure: inputs are only read, and the same inputs and configuration always
/// produce the same output.
pub fn project(
    elements: &[NetworkElement],
    connections: &[NetworkConnection],
    config: &EngineConfig,
) -> Topology {
    let area = &config.service_area;
    let config = &config.projection;
    let scale = if config.scale.is_finite() && config.scale > 0.0 {
        config.scale
    } else {
        tracing::warn!(scale = config.scale, "invalid projection scale, using 1.0");
        1.0
    };
    let length_factor = if config.length_factor.is_finite() && config.length_factor > 0.0 {
        config.length_factor
    } else {
        tracing::warn!(
            length_factor = config.length_factor,
            "invalid length factor, using 1.0"
        );
        1.0
    };

    let frame = match config.frame {
        ProjectionFrame::ServiceArea => Some(Frame::from_area(area)),
        ProjectionFrame::FitToData => Frame::fit(
            elements.iter().filter_map(NetworkElement::valid_position),
            config.padding,
        ),
    };

    let mut nodes = Vec::with_capacity(elements.len());
    // id → (canvas point, position) for positioned elements only; the first
    // element with a given id anchors its edges
    let mut placed: FxHashMap<&str, (Point2<f64>, GeoPoint)> = FxHashMap::default();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    for element in elements {
        let first = seen.insert(element.id.as_str());
        let status_hint = StatusHint::for_element(element.status);
        let projected = element
            .valid_position()
            .zip(frame)
            .map(|(position, frame)| (frame.project(position, scale), position));

        let (point, synthetic) = match projected {
            Some((point, position)) => {
                if first {
                    placed.insert(element.id.as_str(), (point, position));
                }
                (point, false)
            }
            None => (fallback_point(&element.id, config.fallback_seed, scale), true),
        };

        nodes.push(TopologyNode {
            id: element.id.clone(),
            kind: element.kind,
            label: if element.name.is_empty() {
                element.id.clone()
            } else {
                element.name.clone()
            },
            normalized_x: point.x,
            normalized_y: point.y,
            color_hint: status_hint.color(),
            status_hint,
            synthetic,
        });
    }

    let mut edges = Vec::with_capacity(connections.len());
    for connection in connections {
        let source = placed.get(connection.source_element_id.as_str());
        let target = placed.get(connection.target_element_id.as_str());
        let (Some(&(a, geo_a)), Some(&(b, geo_b))) = (source, target) else {
            tracing::debug!(
                connection = %connection.id,
                source = %connection.source_element_id,
                target = %connection.target_element_id,
                "dropping edge without two positioned endpoints"
            );
            continue;
        };

        let delta = b - a;
        let status_hint = StatusHint::for_connection(connection.status);
        edges.push(TopologyEdge {
            connection_id: connection.id.clone(),
            source_id: connection.source_element_id.clone(),
            target_id: connection.target_element_id.clone(),
            kind: connection.kind,
            normalized_x: a.x,
            normalized_y: a.y,
            length_hint: delta.norm() * length_factor,
            rotation_degrees: delta.y.atan2(delta.x).to_degrees(),
            distance_km: distance_km(geo_a, geo_b),
            color_hint: status_hint.color(),
            status_hint,
        });
    }

    let status = StatusHint::worst(
        nodes
            .iter()
            .map(|n| n.status_hint)
            .chain(edges.iter().map(|e| e.status_hint)),
    );

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        dropped = connections.len() - edges.len(),
        synthetic = nodes.iter().filter(|n| n.synthetic).count(),
        "projected topology"
    );

    Topology {
        nodes,
        edges,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fibermap_core::{ConnectionStatus, ElementStatus, ProjectionConfig};

    fn config(scale: f64) -> EngineConfig {
        EngineConfig {
            projection: ProjectionConfig {
                scale,
                padding: 0.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn fiber(id: &str, source: &str, target: &str) -> NetworkConnection {
        NetworkConnection::new(id, source, target, ConnectionKind::Fiber)
    }

    #[test]
    fn corners_map_to_canvas_corners_north_up() {
        let elements = [
            NetworkElement::new("sw", ElementKind::Olt).with_position(-70.0, 18.0),
            NetworkElement::new("ne", ElementKind::Ont).with_position(-69.0, 19.0),
        ];
        let topo = project(&elements, &[], &config(100.0));

        let sw = topo.node("sw").unwrap();
        assert_relative_eq!(sw.normalized_x, 0.0);
        assert_relative_eq!(sw.normalized_y, 100.0);
        let ne = topo.node("ne").unwrap();
        assert_relative_eq!(ne.normalized_x, 100.0);
        assert_relative_eq!(ne.normalized_y, 0.0);
    }

    #[test]
    fn single_point_is_centered() {
        let elements = [NetworkElement::new("a", ElementKind::Olt).with_position(-69.9, 18.5)];
        let topo = project(&elements, &[], &config(1.0));
        assert_relative_eq!(topo.nodes[0].normalized_x, 0.5, epsilon = 1e-9);
        assert_relative_eq!(topo.nodes[0].normalized_y, 0.5, epsilon = 1e-9);
        assert!(!topo.nodes[0].synthetic);
    }

    #[test]
    fn service_area_frame_clamps() {
        let mut cfg = config(100.0);
        cfg.projection.frame = ProjectionFrame::ServiceArea;
        cfg.service_area = ServiceArea::new(18.0, 19.0, -70.0, -69.0).unwrap();
        let elements = [
            NetworkElement::new("in", ElementKind::Olt).with_position(-69.5, 18.5),
            NetworkElement::new("out", ElementKind::Olt).with_position(-60.0, 10.0),
        ];
        let topo = project(&elements, &[], &cfg);
        assert_relative_eq!(topo.nodes[0].normalized_x, 50.0, epsilon = 1e-9);
        assert_relative_eq!(topo.nodes[0].normalized_y, 50.0, epsilon = 1e-9);
        assert_eq!(topo.nodes[1].normalized_x, 100.0);
        assert_eq!(topo.nodes[1].normalized_y, 100.0);
    }

    #[test]
    fn fallback_layout_is_deterministic_and_in_bounds() {
        let elements = [
            NetworkElement::new("ghost-1", ElementKind::Splitter),
            NetworkElement::new("ghost-2", ElementKind::Splitter),
        ];
        let first = project(&elements, &[], &config(100.0));
        let second = project(&elements, &[], &config(100.0));
        assert_eq!(first, second);

        for node in &first.nodes {
            assert!(node.synthetic);
            assert!((0.0..=100.0).contains(&node.normalized_x));
            assert!((0.0..=100.0).contains(&node.normalized_y));
        }
        assert_ne!(first.nodes[0].point(), first.nodes[1].point());

        let mut reseeded = config(100.0);
        reseeded.projection.fallback_seed = 7;
        let third = project(&elements, &[], &reseeded);
        assert_ne!(first.nodes[0].point(), third.nodes[0].point());
    }

    #[test]
    fn edge_geometry() {
        let elements = [
            NetworkElement::new("a", ElementKind::Olt).with_position(-70.0, 18.0),
            NetworkElement::new("b", ElementKind::Splitter).with_position(-69.0, 19.0),
        ];
        let mut cfg = config(1.0);
        cfg.projection.length_factor = 2.0;
        let topo = project(&elements, &[fiber("c", "a", "b")], &cfg);
        let edge = &topo.edges[0];

        assert_relative_eq!(edge.normalized_x, 0.0);
        assert_relative_eq!(edge.normalized_y, 1.0);
        assert_relative_eq!(edge.length_hint, 2.0 * 2f64.sqrt(), epsilon = 1e-9);
        // North-east on the map is up-right on the canvas
        assert_relative_eq!(edge.rotation_degrees, -45.0, epsilon = 1e-9);
        assert!(edge.distance_km > 100.0);
    }

    #[test]
    fn invalid_length_factor_falls_back_to_one() {
        let elements = [
            NetworkElement::new("a", ElementKind::Olt).with_position(-70.0, 18.0),
            NetworkElement::new("b", ElementKind::Splitter).with_position(-69.0, 19.0),
        ];
        for factor in [f64::NAN, -3.0, 0.0, f64::INFINITY] {
            let mut cfg = config(1.0);
            cfg.projection.length_factor = factor;
            let topo = project(&elements, &[fiber("c", "a", "b")], &cfg);
            assert_relative_eq!(topo.edges[0].length_hint, 2f64.sqrt(), epsilon = 1e-9);
        }
    }

    #[test]
    fn first_duplicate_anchors_edges() {
        let elements = [
            NetworkElement::new("a", ElementKind::Olt).with_position(-70.0, 18.0),
            NetworkElement::new("b", ElementKind::Splitter).with_position(-69.0, 19.0),
            NetworkElement::new("b", ElementKind::Splitter).with_position(-69.5, 18.5),
        ];
        let topo = project(&elements, &[fiber("c", "a", "b")], &config(1.0));

        assert_eq!(topo.nodes.len(), 3);
        let edge = &topo.edges[0];
        assert_relative_eq!(edge.length_hint, 2f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(
            edge.distance_km,
            distance_km(GeoPoint::new(-70.0, 18.0), GeoPoint::new(-69.0, 19.0))
        );
    }

    #[test]
    fn unresolved_and_unpositioned_edges_are_dropped() {
        let elements = [
            NetworkElement::new("a", ElementKind::Olt).with_position(-70.0, 18.0),
            NetworkElement::new("b", ElementKind::Splitter).with_position(-69.0, 19.0),
            NetworkElement::new("floating", ElementKind::Splitter),
        ];
        let connections = [
            fiber("ok", "a", "b"),
            fiber("missing", "a", "nowhere"),
            fiber("floating", "a", "floating"),
            fiber("sentinel", "UNKNOWN_SOURCE", "b"),
        ];
        let topo = project(&elements, &connections, &config(100.0));
        assert_eq!(topo.nodes.len(), elements.len());
        assert_eq!(topo.edges.len(), 1);
        assert_eq!(topo.edges[0].connection_id, "ok");
    }

    #[test]
    fn hints_and_aggregate_status() {
        let elements = [
            NetworkElement::new("a", ElementKind::Olt)
                .with_status(ElementStatus::Active)
                .with_position(-70.0, 18.0),
            NetworkElement::new("b", ElementKind::Splitter)
                .with_status(ElementStatus::Maintenance)
                .with_position(-69.0, 19.0),
        ];
        let topo = project(&elements, &[], &config(1.0));
        assert_eq!(topo.nodes[0].status_hint, StatusHint::Active);
        assert_eq!(topo.nodes[1].color_hint, StatusHint::Warning.color());
        assert_eq!(topo.status, StatusHint::Warning);

        let connections = [fiber("c", "a", "b").with_status(ConnectionStatus::Failed)];
        let topo = project(&elements, &connections, &config(1.0));
        assert_eq!(topo.edges[0].status_hint, StatusHint::Error);
        assert_eq!(topo.status, StatusHint::Error);

        let empty = project(&[], &[], &config(1.0));
        assert!(empty.nodes.is_empty());
        assert_eq!(empty.status, StatusHint::Neutral);
    }

    #[test]
    fn labels_fall_back_to_ids() {
        let elements = [
            NetworkElement::new("olt-1", ElementKind::Olt).with_name("Central Office"),
            NetworkElement::new("ont-9", ElementKind::Ont),
        ];
        let topo = project(&elements, &[], &config(1.0));
        assert_eq!(topo.nodes[0].label, "Central Office");
        assert_eq!(topo.nodes[1].label, "ont-9");
    }
}
