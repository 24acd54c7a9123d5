// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element and connection kinds with their rendering catalog.
//!
//! Each kind is a single enum value backed by one row of a static catalog
//! (wire name, label, icon, color). The compatibility matrix and every
//! renderer key off the same enum, so there is exactly one place where a kind
//! is described.
//!
//! Unrecognized names never fail deserialization: they become
//! [`ElementKind::Unknown`] / [`ConnectionKind::Unknown`], which the
//! compatibility matrix treats as incompatible with everything.

use serde::{Deserialize, Serialize};

/// The category of a piece of network hardware.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(from = "String", into = "&'static str")]
pub enum ElementKind {
    Olt = 0,
    Ont = 1,
    Splitter = 2,
    Amplifier = 3,
    SpliceEnclosure = 4,
    DistributionFrame = 5,
    DistributionBox = 6,
    TerminalBox = 7,
    FiberSegment = 8,
    Rack = 9,
    Router = 10,
    Switch = 11,
    #[default]
    Unknown = 12,
}

/// Static description of an element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindInfo {
    /// Wire name, as stored by the inventory.
    pub name: &'static str,
    pub label: &'static str,
    /// Icon identifier from the dashboard's icon set.
    pub icon: &'static str,
    /// Hex color used for the kind's marker.
    pub color: &'static str,
}

const fn info(
    name: &'static str,
    label: &'static str,
    icon: &'static str,
    color: &'static str,
) -> KindInfo {
    KindInfo {
        name,
        label,
        icon,
        color,
    }
}

/// Indexed by `ElementKind as usize`.
static ELEMENT_CATALOG: [KindInfo; 13] = [
    info("OLT", "Optical Line Terminal", "router", "#1565c0"),
    info("ONT", "Optical Network Terminal", "home", "#2e7d32"),
    info("SPLITTER", "Optical Splitter", "call_split", "#6a1b9a"),
    info("AMPLIFIER", "Optical Amplifier", "settings_input_antenna", "#ef6c00"),
    info("SPLICE_ENCLOSURE", "Splice Enclosure", "merge_type", "#5d4037"),
    info("DISTRIBUTION_FRAME", "Optical Distribution Frame", "view_module", "#00838f"),
    info("DISTRIBUTION_BOX", "Distribution Box", "inbox", "#0277bd"),
    info("TERMINAL_BOX", "Terminal Box", "select_all", "#558b2f"),
    info("FIBER_SEGMENT", "Fiber Segment", "timeline", "#f9a825"),
    info("RACK", "Rack", "dns", "#455a64"),
    info("ROUTER", "Router", "device_hub", "#283593"),
    info("SWITCH", "Switch", "swap_horiz", "#37474f"),
    info("UNKNOWN", "Unknown Element", "help_outline", "#9e9e9e"),
];

/// Alternative wire names accepted on input.
const ELEMENT_ALIASES: &[(&str, ElementKind)] = &[
    ("ONU", ElementKind::Ont),
    ("ODF", ElementKind::DistributionFrame),
    ("NAP", ElementKind::TerminalBox),
    ("SPLICE_BOX", ElementKind::SpliceEnclosure),
    ("CLOSURE", ElementKind::SpliceEnclosure),
    ("FIBER", ElementKind::FiberSegment),
    ("CABLE", ElementKind::FiberSegment),
];

impl ElementKind {
    /// Every known kind, in catalog order. `Unknown` is not included.
    pub const ALL: [ElementKind; 12] = [
        ElementKind::Olt,
        ElementKind::Ont,
        ElementKind::Splitter,
        ElementKind::Amplifier,
        ElementKind::SpliceEnclosure,
        ElementKind::DistributionFrame,
        ElementKind::DistributionBox,
        ElementKind::TerminalBox,
        ElementKind::FiberSegment,
        ElementKind::Rack,
        ElementKind::Router,
        ElementKind::Switch,
    ];

    /// Parses a wire name. Case, `-` versus `_` and surrounding whitespace
    /// are ignored; a handful of field aliases (`ONU`, `ODF`, `NAP`) are
    /// accepted. Returns `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        if let Some(kind) = Self::ALL
            .iter()
            .copied()
            .find(|k| k.info().name == normalized)
        {
            return Some(kind);
        }
        ELEMENT_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|&(_, kind)| kind)
    }

    /// Returns the catalog row for this kind.
    pub fn info(self) -> &'static KindInfo {
        &ELEMENT_CATALOG[self as usize]
    }

    /// Returns the wire name (e.g. `"OLT"`).
    pub fn as_str(self) -> &'static str {
        self.info().name
    }

    pub fn is_known(self) -> bool {
        self != ElementKind::Unknown
    }
}

impl From<String> for ElementKind {
    fn from(name: String) -> Self {
        Self::from_name(&name).unwrap_or(ElementKind::Unknown)
    }
}

impl From<ElementKind> for &'static str {
    fn from(kind: ElementKind) -> Self {
        kind.as_str()
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The physical or logical medium of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    #[default]
    Fiber,
    Copper,
    Wireless,
    Logical,
    #[serde(other)]
    Unknown,
}

/// Static description of a connection kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionKindInfo {
    pub label: &'static str,
    pub color: &'static str,
    /// Whether renderers should draw the line dashed.
    pub dashed: bool,
}

static CONNECTION_CATALOG: [ConnectionKindInfo; 5] = [
    ConnectionKindInfo {
        label: "Fiber Optic",
        color: "#f9a825",
        dashed: false,
    },
    ConnectionKindInfo {
        label: "Copper",
        color: "#b87333",
        dashed: false,
    },
    ConnectionKindInfo {
        label: "Wireless",
        color: "#29b6f6",
        dashed: true,
    },
    ConnectionKindInfo {
        label: "Logical",
        color: "#9e9e9e",
        dashed: true,
    },
    ConnectionKindInfo {
        label: "Unknown",
        color: "#bdbdbd",
        dashed: true,
    },
];

impl ConnectionKind {
    pub fn info(self) -> &'static ConnectionKindInfo {
        &CONNECTION_CATALOG[self as usize]
    }

    /// Physical media occupy real cable paths; logical links do not.
    pub fn is_physical(self) -> bool {
        matches!(
            self,
            ConnectionKind::Fiber | ConnectionKind::Copper | ConnectionKind::Wireless
        )
    }
}
