// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON export for the map/preview renderers.
//!
//! Field names are camelCase so that TypeScript consumers can use the
//! payloads as-is. Export is one-way: projections are recomputed from the
//! inventory, never read back.

use serde::Serialize;
use serde_json::Value;

use fibermap_core::{EngineConfig, Inventory};

use crate::audit::Issue;
use crate::error::{Error, Result};
use crate::graph::Route;
use crate::projector::{project, Topology};

fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Serialization(e.to_string()))
}

impl Topology {
    /// Serializes the projection to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        to_string(self)
    }

    /// Converts the projection to a JSON value tree.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}

impl Route {
    pub fn to_json(&self) -> Result<String> {
        to_string(self)
    }
}

/// Parses an inventory snapshot and returns its projection as JSON.
pub fn project_json(inventory_json: &str, config: &EngineConfig) -> Result<String> {
    let inventory = Inventory::from_json(inventory_json)?;
    project(&inventory.elements, &inventory.connections, config).to_json()
}

/// Serializes audit findings as a JSON array.
pub fn issues_to_json(issues: &[Issue]) -> Result<String> {
    to_string(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::IssueKind;
    use fibermap_core::{ConnectionKind, ElementKind, NetworkConnection, NetworkElement};

    #[test]
    fn topology_json_is_camel_case() {
        let elements = [
            NetworkElement::new("olt-1", ElementKind::Olt).with_position(-69.90, 18.48),
            NetworkElement::new("spl-1", ElementKind::Splitter).with_position(-69.91, 18.49),
        ];
        let connections = [NetworkConnection::new(
            "c1",
            "olt-1",
            "spl-1",
            ConnectionKind::Fiber,
        )];
        let topology = project(&elements, &connections, &EngineConfig::default());

        let value = topology.to_value().unwrap();
        assert_eq!(value["nodes"][0]["kind"], "OLT");
        assert!(value["nodes"][0]["normalizedX"].is_number());
        assert_eq!(value["nodes"][1]["statusHint"], "neutral");
        assert_eq!(value["edges"][0]["sourceId"], "olt-1");
        assert!(value["edges"][0]["rotationDegrees"].is_number());
        assert_eq!(value["status"], "neutral");

        let json = topology.to_json().unwrap();
        let reparsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed, value);
    }

    #[test]
    fn issues_export_as_array() {
        let json = issues_to_json(&[]).unwrap();
        assert_eq!(json, "[]");

        let issue = crate::audit::audit(
            &Inventory {
                connections: vec![NetworkConnection::new("c1", "a", "a", ConnectionKind::Fiber)],
                ..Default::default()
            },
            &Default::default(),
        );
        let value: Value = serde_json::from_str(&issues_to_json(&issue).unwrap()).unwrap();
        assert_eq!(value[0]["type"], "selfLoop");
        assert!(issue.iter().any(|i| i.kind == IssueKind::SelfLoop));
    }

    #[test]
    fn project_json_reports_bad_snapshots() {
        let snapshot = r#"{ "elements": [{ "id": "a", "kind": "OLT" }] }"#;
        let json = project_json(snapshot, &EngineConfig::default()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"][0]["synthetic"], true);

        let err = project_json("{ nope", &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Core(fibermap_core::Error::Json(_))));
    }
}
