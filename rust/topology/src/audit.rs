// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integrity audit of an inventory snapshot.
//!
//! The projector and the graph skip records they cannot use. The audit is the
//! strict counterpart: it walks the same snapshot and reports every problem it
//! finds, without changing anything.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use fibermap_core::{
    is_connection_allowed, model::index_elements, ElementKind, Inventory, NetworkConnection,
    NetworkElement, ServiceArea, UNKNOWN_SOURCE, UNKNOWN_TARGET,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// What is wrong with a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IssueKind {
    /// Two elements share an id.
    DuplicateElementId,
    /// A connection starts and ends at the same element.
    SelfLoop,
    /// An endpoint names an element that is not in the snapshot.
    #[serde(rename_all = "camelCase")]
    DanglingEndpoint { element_id: String },
    /// An endpoint is blank or a placeholder.
    UnresolvedEndpoint,
    /// The element kinds may not be joined by this kind of connection.
    IncompatibleKinds {
        source: ElementKind,
        target: ElementKind,
    },
    /// An element lies outside the service area.
    OutOfArea,
    /// Strand sub-counts exceed the strand total.
    StrandOvercommit { allocated: u64, total: u32 },
    /// A connection references a fiber specification that does not exist.
    #[serde(rename_all = "camelCase")]
    MissingSpec { spec_id: String },
    /// Reported total loss is below what the splices alone imply.
    #[serde(rename_all = "camelCase")]
    LossBelowSpliceFloor { reported_db: f64, floor_db: f64 },
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::UnresolvedEndpoint
            | IssueKind::OutOfArea
            | IssueKind::LossBelowSpliceFloor { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::DuplicateElementId => f.write_str("duplicate element id"),
            IssueKind::SelfLoop => f.write_str("connection joins an element to itself"),
            IssueKind::DanglingEndpoint { element_id } => {
                write!(f, "endpoint {element_id} does not exist")
            }
            IssueKind::UnresolvedEndpoint => f.write_str("endpoint is missing"),
            IssueKind::IncompatibleKinds { source, target } => {
                write!(f, "{source} cannot connect to {target}")
            }
            IssueKind::OutOfArea => f.write_str("position outside the service area"),
            IssueKind::StrandOvercommit { allocated, total } => {
                write!(f, "{allocated} strands allocated of {total}")
            }
            IssueKind::MissingSpec { spec_id } => {
                write!(f, "fiber specification {spec_id} does not exist")
            }
            IssueKind::LossBelowSpliceFloor {
                reported_db,
                floor_db,
            } => write!(
                f,
                "reported loss {reported_db:.2} dB is below the splice floor {floor_db:.2} dB"
            ),
        }
    }
}

/// One finding of [`audit`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub severity: Severity,
    /// Id of the element, connection or specification at fault.
    pub record_id: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl Issue {
    fn new(record_id: &str, kind: IssueKind) -> Self {
        Self {
            severity: kind.severity(),
            record_id: record_id.to_string(),
            kind,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.record_id, self.kind)
    }
}

/// Reports every integrity problem in a snapshot, in record order: elements,
/// then connections, then fiber specifications.
pub fn audit(inventory: &Inventory, area: &ServiceArea) -> Vec<Issue> {
    let mut issues = Vec::new();

    let mut seen = FxHashSet::default();
    for element in &inventory.elements {
        if !seen.insert(element.id.as_str()) {
            issues.push(Issue::new(&element.id, IssueKind::DuplicateElementId));
        }
        if let Some(position) = element.valid_position() {
            if !area.contains(position) {
                issues.push(Issue::new(&element.id, IssueKind::OutOfArea));
            }
        }
    }

    let elements = index_elements(&inventory.elements);
    for connection in &inventory.connections {
        audit_connection(inventory, &elements, connection, &mut issues);
    }

    for spec in &inventory.fiber_specs {
        if let Err(fibermap_core::Error::StrandOvercommit { total, .. }) = spec.strands.validate()
        {
            issues.push(Issue::new(
                &spec.id,
                IssueKind::StrandOvercommit {
                    allocated: spec.strands.allocated(),
                    total,
                },
            ));
        }
        let report = spec.loss_report();
        if report.below_splice_floor {
            issues.push(Issue::new(
                &spec.id,
                IssueKind::LossBelowSpliceFloor {
                    reported_db: report.reported_total_db,
                    floor_db: report.splice_floor_db,
                },
            ));
        }
    }

    tracing::debug!(
        issues = issues.len(),
        errors = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count(),
        "audited inventory"
    );
    issues
}

fn audit_connection(
    inventory: &Inventory,
    elements: &FxHashMap<&str, &NetworkElement>,
    connection: &NetworkConnection,
    issues: &mut Vec<Issue>,
) {
    let id = connection.id.as_str();

    if connection.is_self_loop() {
        issues.push(Issue::new(id, IssueKind::SelfLoop));
    }

    let mut resolve = |endpoint: &str| {
        let trimmed = endpoint.trim();
        if trimmed.is_empty() || trimmed == UNKNOWN_SOURCE || trimmed == UNKNOWN_TARGET {
            issues.push(Issue::new(id, IssueKind::UnresolvedEndpoint));
            return None;
        }
        let element = elements.get(endpoint).copied();
        if element.is_none() {
            issues.push(Issue::new(
                id,
                IssueKind::DanglingEndpoint {
                    element_id: endpoint.to_string(),
                },
            ));
        }
        element
    };
    let source = resolve(&connection.source_element_id);
    let target = resolve(&connection.target_element_id);

    if let (Some(source), Some(target)) = (source, target) {
        if !connection.is_self_loop()
            && !is_connection_allowed(source.kind, target.kind, connection.kind)
        {
            issues.push(Issue::new(
                id,
                IssueKind::IncompatibleKinds {
                    source: source.kind,
                    target: target.kind,
                },
            ));
        }
    }

    if let Some(spec_id) = connection.detailed_spec_id.as_deref() {
        if inventory.fiber_spec(spec_id).is_none() {
            issues.push(Issue::new(
                id,
                IssueKind::MissingSpec {
                    spec_id: spec_id.to_string(),
                },
            ));
        }
    }
}
