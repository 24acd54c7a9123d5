// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Network elements, connections and inventory snapshots.
//!
//! These are the records the inventory collaborator fetches and persists. The
//! engine only ever reads them; every derived structure is a new value.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::fiber::FiberSpecification;
use crate::geo::GeoPoint;
use crate::kinds::{ConnectionKind, ElementKind};
use crate::properties::Properties;

/// Placeholder source id for connections whose source could not be resolved.
pub const UNKNOWN_SOURCE: &str = "UNKNOWN_SOURCE";
/// Placeholder target id for connections whose target could not be resolved.
pub const UNKNOWN_TARGET: &str = "UNKNOWN_TARGET";

/// Operational status of a network element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementStatus {
    Active,
    Inactive,
    Maintenance,
    #[serde(alias = "critical", alias = "error")]
    Fault,
    Planned,
    Building,
    Reserved,
    Decommissioned,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Operational status of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Active,
    Inactive,
    Degraded,
    Failed,
    Planned,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A physical or logical network node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkElement {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: ElementKind,
    #[serde(default)]
    pub status: ElementStatus,
    /// `[lon, lat]`. Malformed input deserializes as `None`.
    #[serde(
        default,
        deserialize_with = "lenient_position",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl NetworkElement {
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            kind,
            status: ElementStatus::default(),
            position: None,
            properties: Properties::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_status(mut self, status: ElementStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_position(mut self, lon: f64, lat: f64) -> Self {
        self.position = Some(GeoPoint::new(lon, lat));
        self
    }

    /// Returns the position only if both coordinates are finite.
    pub fn valid_position(&self) -> Option<GeoPoint> {
        self.position.filter(GeoPoint::is_finite)
    }
}

fn lenient_position<'de, D>(deserializer: D) -> std::result::Result<Option<GeoPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        let point = GeoPoint::from_json(&value);
        if point.is_none() && !value.is_null() {
            tracing::debug!(%value, "discarding malformed element position");
        }
        point
    }))
}

/// An edge between two network elements (the generic "wire-level" record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConnection {
    pub id: String,
    #[serde(default)]
    pub source_element_id: String,
    #[serde(default)]
    pub target_element_id: String,
    #[serde(default)]
    pub kind: ConnectionKind,
    #[serde(default)]
    pub status: ConnectionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilization: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<f64>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_spec_id: Option<String>,
}

impl NetworkConnection {
    pub fn new(
        id: impl Into<String>,
        source_element_id: impl Into<String>,
        target_element_id: impl Into<String>,
        kind: ConnectionKind,
    ) -> Self {
        Self {
            id: id.into(),
            source_element_id: source_element_id.into(),
            target_element_id: target_element_id.into(),
            kind,
            status: ConnectionStatus::default(),
            capacity: None,
            utilization: None,
            latency: None,
            properties: Properties::new(),
            detailed_spec_id: None,
        }
    }

    pub fn with_status(mut self, status: ConnectionStatus) -> Self {
        self.status = status;
        self
    }

    /// A connection must join two distinct elements.
    pub fn is_self_loop(&self) -> bool {
        !self.source_element_id.is_empty() && self.source_element_id == self.target_element_id
    }

    /// True if either endpoint is blank or a sentinel placeholder.
    pub fn has_unresolved_endpoint(&self) -> bool {
        is_unresolved(&self.source_element_id) || is_unresolved(&self.target_element_id)
    }

    /// True if the connection joins `a` and `b` in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source_element_id == a && self.target_element_id == b)
            || (self.source_element_id == b && self.target_element_id == a)
    }
}

fn is_unresolved(id: &str) -> bool {
    let id = id.trim();
    id.is_empty() || id == UNKNOWN_SOURCE || id == UNKNOWN_TARGET
}

/// A snapshot of elements, connections and fiber specifications as handed
/// over by the inventory collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    #[serde(default)]
    pub elements: Vec<NetworkElement>,
    #[serde(default)]
    pub connections: Vec<NetworkConnection>,
    #[serde(default)]
    pub fiber_specs: Vec<FiberSpecification>,
}

impl Inventory {
    /// Parses a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the snapshot to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn element(&self, id: &str) -> Option<&NetworkElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn connection(&self, id: &str) -> Option<&NetworkConnection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn fiber_spec(&self, id: &str) -> Option<&FiberSpecification> {
        self.fiber_specs.iter().find(|s| s.id == id)
    }

    /// Returns the fiber specification attached to a connection, if any.
    pub fn spec_for(&self, connection: &NetworkConnection) -> Option<&FiberSpecification> {
        connection
            .detailed_spec_id
            .as_deref()
            .and_then(|id| self.fiber_spec(id))
    }

    /// Builds an id → element index for bulk lookups.
    pub fn element_index(&self) -> FxHashMap<&str, &NetworkElement> {
        index_elements(&self.elements)
    }
}

/// Builds an id → element index. The first element with a given id wins,
/// as in [`Inventory::element`].
pub fn index_elements(elements: &[NetworkElement]) -> FxHashMap<&str, &NetworkElement> {
    let mut index = FxHashMap::default();
    for element in elements {
        index.entry(element.id.as_str()).or_insert(element);
    }
    index
}
