// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end flow over a small feeder: compatibility gate, distance, route,
//! projection and audit on the same snapshot.

use approx::assert_relative_eq;
use fibermap_core::{
    distance_km, is_compatible_str, to_connection, ConnectionKind, ElementKind, EngineConfig,
    FiberSpecification, GeoPoint, Inventory, LinkMetadata, NetworkConnection, NetworkElement,
    NetworkMetrics,
};
use fibermap_topology::{audit, project, NetworkGraph, StatusHint};

fn feeder() -> Inventory {
    Inventory::from_json(
        r#"{
            "elements": [
                { "id": "olt-1", "name": "Central Office", "kind": "OLT",
                  "status": "active", "position": [-69.90, 18.48] },
                { "id": "spl-1", "kind": "SPLITTER", "position": [-69.91, 18.49] }
            ],
            "connections": [
                { "id": "c1", "sourceElementId": "olt-1", "targetElementId": "spl-1",
                  "kind": "fiber" }
            ]
        }"#,
    )
    .unwrap()
}

#[test]
fn olt_to_splitter_scenario() {
    let inventory = feeder();

    assert!(is_compatible_str("OLT", "SPLITTER"));

    let km = distance_km(GeoPoint::new(-69.90, 18.48), GeoPoint::new(-69.91, 18.49));
    assert!(km > 1.0 && km < 2.0, "{km}");

    let topology = project(
        &inventory.elements,
        &inventory.connections,
        &EngineConfig::default(),
    );
    assert_eq!(topology.nodes.len(), 2);
    assert_eq!(topology.edges.len(), 1);
    assert_relative_eq!(topology.edges[0].distance_km, km);
    assert_eq!(topology.status, StatusHint::Active);

    assert!(audit(&inventory, &EngineConfig::default().service_area).is_empty());
}

#[test]
fn projector_completeness() {
    let mut inventory = feeder();
    inventory
        .elements
        .push(NetworkElement::new("ont-1", ElementKind::Ont));
    inventory.connections.push(NetworkConnection::new(
        "c2",
        "spl-1",
        "ont-1",
        ConnectionKind::Fiber,
    ));
    inventory.connections.push(NetworkConnection::new(
        "c3",
        "spl-1",
        "ont-404",
        ConnectionKind::Fiber,
    ));

    let topology = project(
        &inventory.elements,
        &inventory.connections,
        &EngineConfig::default(),
    );
    assert_eq!(topology.nodes.len(), inventory.elements.len());
    assert!(topology.edges.len() <= inventory.connections.len());
    assert_eq!(topology.edges.len(), 1);

    // the audit surfaces what the projector dropped
    let issues = audit(&inventory, &EngineConfig::default().service_area);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].record_id, "c3");
}

#[test]
fn normalized_connection_feeds_the_route_graph() {
    let mut inventory = feeder();
    let spec = FiberSpecification {
        id: "fs-1".into(),
        network_metrics: NetworkMetrics {
            total_length: 1800.0,
            splice_points: 2,
            max_splice_loss: 0.05,
            total_loss: 0.6,
        },
        ..Default::default()
    };
    let link = LinkMetadata::new("olt-1", "spl-1").with_connection_id("c1");
    inventory.connections = vec![to_connection(&spec, &link)];
    inventory.fiber_specs.push(spec);

    let graph = NetworkGraph::from_inventory(&inventory);
    let route = graph.shortest_route("spl-1", "olt-1").unwrap();
    assert_eq!(route.element_ids, vec!["spl-1", "olt-1"]);
    assert_relative_eq!(route.total_loss_db, 0.6);
    assert_eq!(route.hops_without_spec, 0);
    assert!(graph.is_connected());
}
