// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping between generic connections and detailed fiber specifications.
//!
//! The generic [`NetworkConnection`] carries a fiber specification flattened
//! into its `properties` bag under the camelCase wire names. The two
//! directions are:
//!
//! - [`to_connection`]: specification + link metadata → generic record.
//! - [`to_fiber_spec_payload`]: generic record (+ existing specification when
//!   editing) → [`FiberSpecPatch`] with defaults applied.
//!
//! Neither direction fails. Missing endpoints become sentinel ids and values
//! of the wrong shape are parked under `invalidFields`; both are logged.

use serde_json::Value;

use crate::fiber::{FiberSpecPatch, FiberSpecification, StrandCountsPatch, INVALID_FIELDS};
use crate::kinds::ConnectionKind;
use crate::model::{ConnectionStatus, NetworkConnection, UNKNOWN_SOURCE, UNKNOWN_TARGET};
use crate::properties::{Properties, PropertiesExt};

const CAPACITY: &str = "capacity";
const UTILIZATION: &str = "utilization";
const LATENCY: &str = "latency";

/// Link facts a fiber specification does not carry itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkMetadata {
    /// Falls back to the specification id when absent.
    pub connection_id: Option<String>,
    pub source_element_id: Option<String>,
    pub target_element_id: Option<String>,
    pub kind: ConnectionKind,
    pub status: ConnectionStatus,
}

impl LinkMetadata {
    pub fn new(source_element_id: impl Into<String>, target_element_id: impl Into<String>) -> Self {
        Self {
            source_element_id: Some(source_element_id.into()),
            target_element_id: Some(target_element_id.into()),
            ..Default::default()
        }
    }

    pub fn with_connection_id(mut self, id: impl Into<String>) -> Self {
        self.connection_id = Some(id.into());
        self
    }

    pub fn with_status(mut self, status: ConnectionStatus) -> Self {
        self.status = status;
        self
    }

    /// Copies the link facts of an existing connection.
    pub fn from_connection(connection: &NetworkConnection) -> Self {
        Self {
            connection_id: Some(connection.id.clone()),
            source_element_id: Some(connection.source_element_id.clone()),
            target_element_id: Some(connection.target_element_id.clone()),
            kind: connection.kind,
            status: connection.status,
        }
    }
}

fn non_blank(id: &Option<String>) -> Option<&str> {
    id.as_deref().map(str::trim).filter(|id| !id.is_empty())
}

fn resolve_endpoint(id: &Option<String>, sentinel: &'static str, connection_id: &str) -> String {
    match non_blank(id) {
        Some(id) => id.to_string(),
        None => {
            tracing::warn!(
                connection = connection_id,
                placeholder = sentinel,
                "connection endpoint is missing, substituting placeholder"
            );
            sentinel.to_string()
        }
    }
}

/// Projects a fiber specification into a generic connection record.
///
/// Every specification field lands in `properties` under its wire name, and
/// fields the specification does not model are copied verbatim. `capacity`,
/// `utilization` and `latency` found among those extra fields are lifted back
/// into the numeric fields; otherwise capacity is the strand total.
pub fn to_connection(spec: &FiberSpecification, link: &LinkMetadata) -> NetworkConnection {
    let id = non_blank(&link.connection_id)
        .unwrap_or(spec.id.as_str())
        .to_string();
    let source = resolve_endpoint(&link.source_element_id, UNKNOWN_SOURCE, &id);
    let target = resolve_endpoint(&link.target_element_id, UNKNOWN_TARGET, &id);

    let mut properties = match serde_json::to_value(spec) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            tracing::warn!(spec = %spec.id, "fiber specification did not serialize to an object");
            Properties::new()
        }
    };
    properties.remove("id");

    let capacity = properties
        .take_typed::<f64>(CAPACITY)
        .or_else(|| (spec.strands.total > 0).then(|| f64::from(spec.strands.total)));
    let utilization = properties.take_typed::<f64>(UTILIZATION);
    let latency = properties.take_typed::<f64>(LATENCY);

    NetworkConnection {
        id,
        source_element_id: source,
        target_element_id: target,
        kind: link.kind,
        status: link.status,
        capacity,
        utilization,
        latency,
        properties,
        detailed_spec_id: (!spec.id.is_empty()).then(|| spec.id.clone()),
    }
}

impl FiberSpecPatch {
    /// Extracts typed specification fields from a property bag.
    ///
    /// Keys are read one by one; a value of the wrong shape is kept in
    /// `extra` under [`INVALID_FIELDS`] instead of failing the whole payload.
    pub fn from_properties(properties: &Properties) -> Self {
        let mut bag = properties.clone();
        let mut patch = Self {
            id: bag.take_typed("id"),
            usage_type: bag.take_typed("usageType"),
            fiber_type: bag.take_typed("fiberType"),
            connector_type: bag.take_typed("connectorType"),
            polishing_type: bag.take_typed("polishingType"),
            standard: bag.take_typed("standard"),
            insertion_loss: bag.take_typed("insertionLoss"),
            return_loss: bag.take_typed("returnLoss"),
            wavelength: bag.take_typed("wavelength"),
            bandwidth: bag.take_typed("bandwidth"),
            physical_dimensions: bag.take_typed("physicalDimensions"),
            environmental_specs: bag.take_typed("environmentalSpecs"),
            manufacturing_info: bag.take_typed("manufacturingInfo"),
            strands: bag.take_typed("strands"),
            strand_configuration: bag.take_typed("strandConfiguration"),
            network_metrics: bag.take_typed("networkMetrics"),
            extra: Properties::new(),
        };
        patch.extra = bag;
        patch.settle_extra();
        patch
    }
}

/// Builds the create/update payload for the specification behind
/// `connection`.
///
/// Defaulted fields resolve as connection properties, then `existing`, then
/// the specification defaults. Other fields are only present when the
/// properties carry them, so merging the payload into `existing` keeps them.
pub fn to_fiber_spec_payload(
    connection: &NetworkConnection,
    existing: Option<&FiberSpecification>,
) -> FiberSpecPatch {
    let mut patch = FiberSpecPatch::from_properties(&connection.properties);

    let existing_id = existing.map(|spec| spec.id.clone()).filter(|id| !id.is_empty());
    patch.id = non_blank(&connection.detailed_spec_id)
        .map(str::to_string)
        .or(patch.id.take())
        .or(existing_id);

    let defaults = FiberSpecification::default();
    let base = existing.unwrap_or(&defaults);
    patch.usage_type.get_or_insert(base.usage_type);
    patch.fiber_type.get_or_insert(base.fiber_type);
    patch.connector_type.get_or_insert(base.connector_type);
    patch.polishing_type.get_or_insert(base.polishing_type);
    patch
        .standard
        .get_or_insert_with(|| base.standard.clone());
    patch.insertion_loss.get_or_insert(base.insertion_loss);
    patch.return_loss.get_or_insert(base.return_loss);
    patch.wavelength.get_or_insert(base.wavelength);
    patch.bandwidth.get_or_insert(base.bandwidth);

    if let Some(capacity) = connection.capacity.filter(|c| c.is_finite()) {
        let strand_total = patch.strands.and_then(|s| s.total);
        match (strand_total, as_strand_count(capacity)) {
            (None, Some(total)) => {
                let strands = patch.strands.get_or_insert_with(StrandCountsPatch::default);
                strands.total = Some(total);
            }
            (Some(total), _) if f64::from(total) == capacity => {}
            _ => keep_metric(&mut patch.extra, CAPACITY, capacity),
        }
    }
    if let Some(utilization) = connection.utilization {
        keep_metric(&mut patch.extra, UTILIZATION, utilization);
    }
    if let Some(latency) = connection.latency {
        keep_metric(&mut patch.extra, LATENCY, latency);
    }

    patch
}

fn as_strand_count(capacity: f64) -> Option<u32> {
    (capacity >= 0.0 && capacity.fract() == 0.0 && capacity <= f64::from(u32::MAX))
        .then(|| capacity as u32)
}

fn keep_metric(extra: &mut Properties, key: &str, value: f64) {
    if !value.is_finite() {
        tracing::debug!(key, value, "dropping non-finite link metric");
        return;
    }
    if let Some(number) = serde_json::Number::from_f64(value) {
        extra.insert(key.to_string(), Value::Number(number));
    }
}

/// Returns `existing` with `patch` merged in; see
/// [`FiberSpecification::apply_patch`].
pub fn merge_spec(existing: &FiberSpecification, patch: FiberSpecPatch) -> FiberSpecification {
    let mut merged = existing.clone();
    merged.apply_patch(patch);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiber::{ConnectorType, FiberType, PolishingType, StrandCounts, UsageType};
    use serde_json::json;

    fn fiber_connection(properties: Value) -> NetworkConnection {
        let mut c = NetworkConnection::new("c1", "olt-1", "spl-1", ConnectionKind::Fiber);
        c.properties = match properties {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        };
        c
    }

    #[test]
    fn empty_connection_gets_all_defaults() {
        let patch = to_fiber_spec_payload(&fiber_connection(json!({})), None);
        assert_eq!(patch.usage_type, Some(UsageType::Distribution));
        assert_eq!(patch.fiber_type, Some(FiberType::SingleMode));
        assert_eq!(patch.connector_type, Some(ConnectorType::Sc));
        assert_eq!(patch.polishing_type, Some(PolishingType::Apc));
        assert_eq!(patch.standard.as_deref(), Some("ITU-T G.652"));
        assert_eq!(patch.insertion_loss, Some(0.0));
        assert_eq!(patch.return_loss, Some(0.0));
        assert_eq!(patch.wavelength, Some(1310.0));
        assert_eq!(patch.bandwidth, Some(0.0));
        assert!(patch.id.is_none());
        assert!(patch.strands.is_none());
        assert!(patch.extra.is_empty());
    }

    #[test]
    fn properties_win_over_existing_which_wins_over_defaults() {
        let existing = FiberSpecification {
            id: "fs-9".into(),
            connector_type: ConnectorType::Lc,
            wavelength: 1550.0,
            ..Default::default()
        };
        let c = fiber_connection(json!({ "wavelength": 1625.0 }));
        let patch = to_fiber_spec_payload(&c, Some(&existing));

        assert_eq!(patch.id.as_deref(), Some("fs-9"));
        assert_eq!(patch.wavelength, Some(1625.0));
        assert_eq!(patch.connector_type, Some(ConnectorType::Lc));
        assert_eq!(patch.polishing_type, Some(PolishingType::Apc));
    }

    #[test]
    fn mistyped_values_are_parked_under_invalid_fields() {
        let c = fiber_connection(json!({ "insertionLoss": "high", "vendor": "acme" }));
        let patch = to_fiber_spec_payload(&c, None);
        assert_eq!(patch.insertion_loss, Some(0.0));
        assert!(!patch.extra.contains_key("insertionLoss"));
        assert_eq!(patch.extra[INVALID_FIELDS]["insertionLoss"], "high");
        assert_eq!(patch.extra["vendor"], "acme");
    }

    #[test]
    fn corrected_values_clear_parked_entries() {
        let c = fiber_connection(json!({
            "insertionLoss": 0.4,
            "invalidFields": { "insertionLoss": "high", "returnLoss": "n/a" }
        }));
        let patch = FiberSpecPatch::from_properties(&c.properties);
        assert_eq!(patch.insertion_loss, Some(0.4));
        assert_eq!(patch.extra[INVALID_FIELDS], json!({ "returnLoss": "n/a" }));
    }

    #[test]
    fn capacity_seeds_strand_total() {
        let mut c = fiber_connection(json!({}));
        c.capacity = Some(48.0);
        let patch = to_fiber_spec_payload(&c, None);
        assert_eq!(patch.strands.and_then(|s| s.total), Some(48));
        assert!(!patch.extra.contains_key("capacity"));

        c.capacity = Some(2.5);
        c.utilization = Some(0.4);
        let patch = to_fiber_spec_payload(&c, None);
        assert!(patch.strands.is_none());
        assert_eq!(patch.extra["capacity"], json!(2.5));
        assert_eq!(patch.extra["utilization"], json!(0.4));
    }

    #[test]
    fn missing_endpoints_become_placeholders() {
        let spec = FiberSpecification {
            id: "fs-1".into(),
            ..Default::default()
        };
        let link = LinkMetadata {
            source_element_id: Some("  ".into()),
            ..Default::default()
        };
        let c = to_connection(&spec, &link);
        assert_eq!(c.id, "fs-1");
        assert_eq!(c.source_element_id, UNKNOWN_SOURCE);
        assert_eq!(c.target_element_id, UNKNOWN_TARGET);
        assert!(c.has_unresolved_endpoint());
        assert_eq!(c.detailed_spec_id.as_deref(), Some("fs-1"));
    }

    #[test]
    fn spec_fields_land_in_properties() {
        let spec = FiberSpecification {
            id: "fs-2".into(),
            insertion_loss: 0.3,
            strands: StrandCounts {
                total: 24,
                in_use: 6,
                ..Default::default()
            },
            ..Default::default()
        };
        let link = LinkMetadata::new("olt-1", "spl-1").with_connection_id("c7");
        let c = to_connection(&spec, &link);

        assert_eq!(c.id, "c7");
        assert_eq!(c.capacity, Some(24.0));
        assert!(c.properties.get("id").is_none());
        assert_eq!(c.properties["insertionLoss"], json!(0.3));
        assert_eq!(c.properties["strands"]["inUse"], 6);
        assert_eq!(c.properties["connectorType"], "SC");
    }

    #[test]
    fn blank_spec_id_leaves_no_reference() {
        let c = to_connection(&FiberSpecification::default(), &LinkMetadata::new("a", "b"));
        assert!(c.detailed_spec_id.is_none());
        assert!(c.capacity.is_none());
    }

    #[test]
    fn merge_keeps_unpatched_fields() {
        let existing = FiberSpecification {
            id: "fs-3".into(),
            return_loss: 55.0,
            bandwidth: 500.0,
            ..Default::default()
        };
        let merged = merge_spec(
            &existing,
            FiberSpecPatch {
                insertion_loss: Some(2.5),
                ..Default::default()
            },
        );
        assert_eq!(merged.insertion_loss, 2.5);
        assert_eq!(merged.return_loss, 55.0);
        assert_eq!(merged.bandwidth, 500.0);
        assert_eq!(merged.id, "fs-3");
    }
}
