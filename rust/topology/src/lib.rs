// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # FiberMap Topology
//!
//! Derived views over a fiber network inventory.
//!
//! - [`project`]: node/edge layout with status and color hints for preview
//!   rendering
//! - [`NetworkGraph`]: shortest routes with distance and loss totals, network
//!   islands, isolated elements
//! - [`audit`]: integrity findings the projector and graph silently skip
//!
//! All three are pure functions of the inventory records and configuration
//! they are given; nothing is cached between calls.

pub mod audit;
pub mod error;
pub mod graph;
pub mod projector;
pub mod serialization;
pub mod status;

pub use audit::{audit, Issue, IssueKind, Severity};
pub use error::{Error, Result};
pub use graph::{GraphEdge, GraphNode, NetworkGraph, Route};
pub use projector::{project, Topology, TopologyEdge, TopologyNode};
pub use serialization::{issues_to_json, project_json};
pub use status::StatusHint;
