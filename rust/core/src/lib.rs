// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # FiberMap Core
//!
//! Domain model and pure rules for fiber-optic network inventories.
//!
//! ## Overview
//!
//! - **Data model**: [`NetworkElement`], [`NetworkConnection`] and
//!   [`FiberSpecification`], with lenient JSON decoding
//! - **Kinds**: one enum per kind with a static rendering catalog
//! - **Compatibility**: which element kinds may be joined ([`is_compatible`])
//! - **Geo**: service-area validation and Haversine distance ([`distance_km`])
//! - **Normalizer**: generic connection ⇄ fiber specification mapping
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fibermap_core::{distance_km, is_compatible, ElementKind, GeoPoint};
//!
//! assert!(is_compatible(ElementKind::Olt, ElementKind::Splitter));
//!
//! let km = distance_km(GeoPoint::new(-69.90, 18.48), GeoPoint::new(-69.91, 18.49));
//! assert!(km > 1.0 && km < 2.0);
//! ```
//!
//! Every function here is a pure computation over its arguments. The only
//! shared state is the standard compatibility matrix, built once and read-only
//! afterwards.

pub mod compatibility;
pub mod config;
pub mod error;
pub mod fiber;
pub mod geo;
pub mod kinds;
pub mod model;
pub mod normalizer;
pub mod properties;

pub use compatibility::{
    compatible_kinds, is_compatible, is_compatible_str, is_connection_allowed,
    CompatibilityMatrix,
};
pub use config::{EngineConfig, ProjectionConfig, ProjectionFrame};
pub use error::{Error, Result};
pub use fiber::{
    ConnectorType, FiberSpecPatch, FiberSpecification, FiberType, LossReport, NetworkMetrics,
    NetworkMetricsPatch, PolishingType, StrandConfiguration, StrandCounts, StrandCountsPatch,
    UsageType, INVALID_FIELDS,
};
pub use geo::{distance_km, path_length_km, validate_position, GeoPoint, ServiceArea};
pub use kinds::{ConnectionKind, ElementKind, KindInfo};
pub use model::{
    ConnectionStatus, ElementStatus, Inventory, NetworkConnection, NetworkElement,
    UNKNOWN_SOURCE, UNKNOWN_TARGET,
};
pub use normalizer::{merge_spec, to_connection, to_fiber_spec_payload, LinkMetadata};
pub use properties::{Properties, PropertiesExt};
