// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Which element kinds may be joined by a connection.
//!
//! The rules are authored as one adjacency list per kind, and the authoring
//! is deliberately uneven: an OLT lists splitters, but the splitter row does
//! not list OLTs. A pair is compatible if *either* row lists the other, so the
//! effective relation is symmetric no matter how the table was written.
//!
//! Kinds without a row (including [`ElementKind::Unknown`]) are compatible
//! with nothing, themselves included. A kind is only compatible with itself
//! when its own row lists it (cascaded splitters, chained enclosures).
//!
//! The engine only answers the question. Whether an incompatible pair is
//! rejected or merely warned about is the caller's policy.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::kinds::{ConnectionKind, ElementKind};

use ElementKind::*;

/// The authored adjacency table.
const ADJACENCY: &[(ElementKind, &[ElementKind])] = &[
    (
        Olt,
        &[Splitter, FiberSegment, Amplifier, SpliceEnclosure, DistributionFrame],
    ),
    (
        DistributionFrame,
        &[Splitter, Ont, FiberSegment, TerminalBox],
    ),
    (
        Splitter,
        &[Splitter, Ont, TerminalBox, FiberSegment, SpliceEnclosure, DistributionBox],
    ),
    (Amplifier, &[FiberSegment, Splitter, SpliceEnclosure]),
    (
        SpliceEnclosure,
        &[SpliceEnclosure, FiberSegment, Splitter, TerminalBox, DistributionBox],
    ),
    (DistributionBox, &[Splitter, TerminalBox, FiberSegment, Ont]),
    (TerminalBox, &[Ont]),
    (FiberSegment, &[SpliceEnclosure]),
    (Rack, &[Olt, DistributionFrame, Router, Switch]),
    (Router, &[Olt, Switch]),
    (Switch, &[Olt]),
    (Ont, &[]),
];

type Partners = SmallVec<[ElementKind; 8]>;

/// Adjacency rules between element kinds.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityMatrix {
    rows: FxHashMap<ElementKind, Partners>,
}

impl CompatibilityMatrix {
    /// Builds a matrix from authored rows. Rows for `Unknown` are ignored.
    pub fn from_table(table: &[(ElementKind, &[ElementKind])]) -> Self {
        let mut rows: FxHashMap<ElementKind, Partners> = FxHashMap::default();
        for &(kind, partners) in table {
            if !kind.is_known() {
                tracing::warn!("ignoring compatibility row for unknown kind");
                continue;
            }
            let row = rows.entry(kind).or_default();
            for &partner in partners {
                if partner.is_known() && !row.contains(&partner) {
                    row.push(partner);
                }
            }
        }
        Self { rows }
    }

    /// The shared, read-only matrix built from the standard table.
    pub fn standard() -> &'static CompatibilityMatrix {
        static MATRIX: OnceLock<CompatibilityMatrix> = OnceLock::new();
        MATRIX.get_or_init(|| Self::from_table(ADJACENCY))
    }

    /// True if `kind` has a row in the table.
    pub fn knows(&self, kind: ElementKind) -> bool {
        self.rows.contains_key(&kind)
    }

    fn lists(&self, kind: ElementKind, partner: ElementKind) -> bool {
        self.rows
            .get(&kind)
            .is_some_and(|row| row.contains(&partner))
    }

    /// True if either kind's row lists the other.
    pub fn is_compatible(&self, a: ElementKind, b: ElementKind) -> bool {
        self.lists(a, b) || self.lists(b, a)
    }

    /// The effective (symmetric) set of partners for `kind`, in catalog order.
    pub fn compatible_kinds(&self, kind: ElementKind) -> Vec<ElementKind> {
        ElementKind::ALL
            .iter()
            .copied()
            .filter(|&other| self.is_compatible(kind, other))
            .collect()
    }
}

/// Whether two element kinds may be joined, per the standard table.
pub fn is_compatible(a: ElementKind, b: ElementKind) -> bool {
    CompatibilityMatrix::standard().is_compatible(a, b)
}

/// The effective partner set of a kind, per the standard table.
pub fn compatible_kinds(kind: ElementKind) -> Vec<ElementKind> {
    CompatibilityMatrix::standard().compatible_kinds(kind)
}

/// String-keyed variant of [`is_compatible`] for raw inventory records.
/// Unparseable names are never compatible.
pub fn is_compatible_str(a: &str, b: &str) -> bool {
    match (ElementKind::from_name(a), ElementKind::from_name(b)) {
        (Some(a), Some(b)) => is_compatible(a, b),
        _ => false,
    }
}

/// Whether a connection of `kind` may join `source` and `target`.
///
/// Logical links may join any two known kinds; physical media follow the
/// compatibility table.
pub fn is_connection_allowed(
    source: ElementKind,
    target: ElementKind,
    kind: ConnectionKind,
) -> bool {
    match kind {
        ConnectionKind::Logical => source.is_known() && target.is_known(),
        ConnectionKind::Unknown => false,
        _ => is_compatible(source, target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_with_unknown() -> Vec<ElementKind> {
        let mut kinds = ElementKind::ALL.to_vec();
        kinds.push(Unknown);
        kinds
    }

    #[test]
    fn relation_is_symmetric() {
        for a in all_with_unknown() {
            for b in all_with_unknown() {
                assert_eq!(is_compatible(a, b), is_compatible(b, a), "{a} / {b}");
            }
        }
    }

    #[test]
    fn one_sided_rows_still_match_both_ways() {
        // Only the OLT row lists splitters
        assert!(is_compatible(Olt, Splitter));
        assert!(is_compatible(Splitter, Olt));
        // ONT row is empty
        assert!(is_compatible(Ont, TerminalBox));
    }

    #[test]
    fn self_compatibility_only_when_listed() {
        assert!(is_compatible(Splitter, Splitter));
        assert!(is_compatible(SpliceEnclosure, SpliceEnclosure));
        assert!(!is_compatible(Olt, Olt));
        assert!(!is_compatible(Ont, Ont));
        assert!(!is_compatible(FiberSegment, FiberSegment));
    }

    #[test]
    fn unknown_kinds_match_nothing() {
        for kind in all_with_unknown() {
            assert!(!is_compatible(Unknown, kind));
        }
        assert!(!is_compatible_str("bogus", "OLT"));
        assert!(!is_compatible_str("bogus", "bogus"));
        assert!(is_compatible_str("OLT", "splitter"));
        assert!(compatible_kinds(Unknown).is_empty());
    }

    #[test]
    fn compatible_kinds_is_the_effective_set() {
        let olt = compatible_kinds(Olt);
        assert!(olt.contains(&Splitter));
        assert!(olt.contains(&Rack));
        assert!(olt.contains(&Router));
        assert!(olt.contains(&Switch));
        assert!(!olt.contains(&Olt));
        assert!(!olt.contains(&Ont));

        let ont = compatible_kinds(Ont);
        assert_eq!(
            ont,
            vec![Splitter, DistributionFrame, DistributionBox, TerminalBox]
        );

        for kind in ElementKind::ALL {
            for partner in compatible_kinds(kind) {
                assert!(compatible_kinds(partner).contains(&kind));
            }
        }
    }

    #[test]
    fn custom_tables_ignore_unknown_rows() {
        let matrix = CompatibilityMatrix::from_table(&[
            (Unknown, &[Olt]),
            (Olt, &[Unknown, Ont]),
        ]);
        assert!(!matrix.knows(Unknown));
        assert!(!matrix.is_compatible(Unknown, Olt));
        assert!(matrix.is_compatible(Ont, Olt));
        // Ont has no row of its own, but the OLT row lists it
        assert!(!matrix.knows(Ont));
        assert_eq!(matrix.compatible_kinds(Ont), vec![Olt]);
        assert_eq!(matrix.compatible_kinds(Olt), vec![Ont]);
    }

    #[test]
    fn connection_policy_by_medium() {
        assert!(is_connection_allowed(Olt, Splitter, ConnectionKind::Fiber));
        assert!(!is_connection_allowed(Olt, Ont, ConnectionKind::Fiber));
        assert!(is_connection_allowed(Olt, Ont, ConnectionKind::Logical));
        assert!(!is_connection_allowed(Olt, Unknown, ConnectionKind::Logical));
        assert!(!is_connection_allowed(Olt, Splitter, ConnectionKind::Unknown));
    }
}
