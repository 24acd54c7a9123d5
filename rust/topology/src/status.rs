// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status hints for rendering.
//!
//! Element and connection statuses collapse into four hints ordered by
//! severity. Each mapping is an ordered rule table; the first rule that
//! matches wins and anything unmatched is neutral.

use serde::Serialize;

use fibermap_core::{ConnectionStatus, ElementStatus};

/// Render status, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusHint {
    #[default]
    Neutral,
    Active,
    Warning,
    Error,
}

const ELEMENT_RULES: &[(StatusHint, &[ElementStatus])] = &[
    (StatusHint::Error, &[ElementStatus::Fault]),
    (StatusHint::Warning, &[ElementStatus::Maintenance]),
    (StatusHint::Active, &[ElementStatus::Active]),
];

const CONNECTION_RULES: &[(StatusHint, &[ConnectionStatus])] = &[
    (StatusHint::Error, &[ConnectionStatus::Failed]),
    (StatusHint::Warning, &[ConnectionStatus::Degraded]),
    (StatusHint::Active, &[ConnectionStatus::Active]),
];

fn first_match<S: PartialEq>(rules: &[(StatusHint, &[S])], status: &S) -> StatusHint {
    rules
        .iter()
        .find(|(_, statuses)| statuses.contains(status))
        .map(|&(hint, _)| hint)
        .unwrap_or_default()
}

impl StatusHint {
    pub fn for_element(status: ElementStatus) -> Self {
        first_match(ELEMENT_RULES, &status)
    }

    pub fn for_connection(status: ConnectionStatus) -> Self {
        first_match(CONNECTION_RULES, &status)
    }

    /// Hex color for this hint.
    pub fn color(self) -> &'static str {
        match self {
            StatusHint::Error => "#d32f2f",
            StatusHint::Warning => "#ffa000",
            StatusHint::Active => "#388e3c",
            StatusHint::Neutral => "#9e9e9e",
        }
    }

    /// The most severe hint of a collection; neutral when empty.
    pub fn worst(hints: impl IntoIterator<Item = StatusHint>) -> Self {
        hints.into_iter().max().unwrap_or_default()
    }
}
