// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detailed fiber specifications and their partial-update patches.
//!
//! A [`FiberSpecification`] characterizes one fiber-kind connection: usage
//! role, optical figures, physical and environmental limits, provenance,
//! strand accounting and measured network metrics. Field names on the wire are
//! camelCase and are a stable contract with the editing forms.
//!
//! Updates go through [`FiberSpecPatch`]: every field is optional, present
//! fields overwrite and absent fields keep their current value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::properties::Properties;

/// Default applicable standard for new specifications.
pub const DEFAULT_STANDARD: &str = "ITU-T G.652";
/// Default operating wavelength, in nanometers.
pub const DEFAULT_WAVELENGTH_NM: f64 = 1310.0;
/// Unmodelled-field key holding values that did not fit a modelled field.
pub const INVALID_FIELDS: &str = "invalidFields";

const MODELLED_FIELDS: [&str; 16] = [
    "id",
    "usageType",
    "fiberType",
    "connectorType",
    "polishingType",
    "standard",
    "insertionLoss",
    "returnLoss",
    "wavelength",
    "bandwidth",
    "physicalDimensions",
    "environmentalSpecs",
    "manufacturingInfo",
    "strands",
    "strandConfiguration",
    "networkMetrics",
];

/// Role of a fiber link within the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageType {
    Backbone,
    #[default]
    Distribution,
    Drop,
    Jumper,
    Patch,
    Feeder,
    Access,
    Interconnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FiberType {
    #[default]
    #[serde(alias = "singlemode", alias = "SM")]
    SingleMode,
    #[serde(alias = "multimode", alias = "MM")]
    MultiMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConnectorType {
    #[default]
    Sc,
    Lc,
    Fc,
    St,
    Mpo,
    E2000,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolishingType {
    #[default]
    Apc,
    Upc,
    Pc,
}

/// Core, cladding (µm) and outer jacket (mm) diameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhysicalDimensions {
    pub core_diameter: f64,
    pub cladding_diameter: f64,
    pub outer_diameter: f64,
}

/// Operating temperature range (°C) and tensile strength (N).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentalSpecs {
    pub operating_temp_min: f64,
    pub operating_temp_max: f64,
    pub tensile_strength: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManufacturingInfo {
    pub manufacturer: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturing_date: Option<String>,
    pub certifications: Vec<String>,
}

/// Aggregate strand accounting for a cable.
///
/// `available + in_use + reserved + damaged` must not exceed `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrandCounts {
    pub total: u32,
    pub available: u32,
    pub in_use: u32,
    pub reserved: u32,
    pub damaged: u32,
}

impl StrandCounts {
    /// Sum of all sub-counts.
    pub fn allocated(&self) -> u64 {
        [self.available, self.in_use, self.reserved, self.damaged]
            .iter()
            .map(|&n| u64::from(n))
            .sum()
    }

    pub fn is_consistent(&self) -> bool {
        self.allocated() <= u64::from(self.total)
    }

    /// Strands not accounted for by any sub-count.
    pub fn unaccounted(&self) -> u64 {
        u64::from(self.total).saturating_sub(self.allocated())
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_consistent() {
            Ok(())
        } else {
            Err(Error::StrandOvercommit {
                allocated: u32::try_from(self.allocated()).unwrap_or(u32::MAX),
                total: self.total,
            })
        }
    }

    /// Fraction of strands committed to service (`in_use + reserved`), in
    /// `[0, 1]` for consistent counts. Zero when the cable has no strands.
    pub fn occupancy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (f64::from(self.in_use) + f64::from(self.reserved)) / f64::from(self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrandConfiguration {
    pub strands_per_tube: u32,
    pub tubes_per_cable: u32,
    pub buffer_tubes: u32,
    pub central_strength_member: bool,
}

impl StrandConfiguration {
    /// Strand capacity implied by the tube layout.
    pub fn nominal_strands(&self) -> u32 {
        self.strands_per_tube.saturating_mul(self.tubes_per_cable)
    }
}

/// Measured characteristics of the installed link.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkMetrics {
    /// Meters.
    pub total_length: f64,
    pub splice_points: u32,
    /// dB per splice.
    pub max_splice_loss: f64,
    /// dB, as surveyed. Never recomputed.
    pub total_loss: f64,
}

/// Physical and optical characterization of a fiber link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FiberSpecification {
    pub id: String,
    pub usage_type: UsageType,
    pub fiber_type: FiberType,
    pub connector_type: ConnectorType,
    pub polishing_type: PolishingType,
    pub standard: String,
    /// dB.
    pub insertion_loss: f64,
    /// dB.
    pub return_loss: f64,
    /// nm.
    pub wavelength: f64,
    /// MHz·km.
    pub bandwidth: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_dimensions: Option<PhysicalDimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environmental_specs: Option<EnvironmentalSpecs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturing_info: Option<ManufacturingInfo>,
    pub strands: StrandCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strand_configuration: Option<StrandConfiguration>,
    pub network_metrics: NetworkMetrics,
    /// Fields this engine does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: Properties,
}

impl Default for FiberSpecification {
    fn default() -> Self {
        Self {
            id: String::new(),
            usage_type: UsageType::default(),
            fiber_type: FiberType::default(),
            connector_type: ConnectorType::default(),
            polishing_type: PolishingType::default(),
            standard: DEFAULT_STANDARD.to_string(),
            insertion_loss: 0.0,
            return_loss: 0.0,
            wavelength: DEFAULT_WAVELENGTH_NM,
            bandwidth: 0.0,
            physical_dimensions: None,
            environmental_specs: None,
            manufacturing_info: None,
            strands: StrandCounts::default(),
            strand_configuration: None,
            network_metrics: NetworkMetrics::default(),
            extra: Properties::new(),
        }
    }
}

/// Loss figures of a specification, side by side.
///
/// `total_loss` is survey input; this report only compares it against what
/// the splices alone imply and leaves the stored value untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LossReport {
    pub reported_total_db: f64,
    /// `splice_points × max_splice_loss`.
    pub splice_floor_db: f64,
    pub insertion_loss_db: f64,
    /// `splice_floor_db + insertion_loss_db`.
    pub estimated_floor_db: f64,
    /// True when the reported total is below the splice floor.
    pub below_splice_floor: bool,
}

impl FiberSpecification {
    /// Materializes a full specification from a patch, defaulting every
    /// absent field.
    pub fn from_patch(patch: FiberSpecPatch) -> Self {
        let mut spec = Self::default();
        spec.apply_patch(patch);
        spec
    }

    /// Merges a patch into this specification.
    ///
    /// Present fields overwrite. Absent fields are kept. Strand counts and
    /// network metrics merge field by field; the other nested groups are
    /// replaced as a whole; `extra` merges key by key.
    ///
    /// Values parked under [`INVALID_FIELDS`] by earlier patches are dropped
    /// once this patch supplies a value for the same field.
    pub fn apply_patch(&mut self, patch: FiberSpecPatch) {
        let repaired = patch.present_fields();
        let FiberSpecPatch {
            id,
            usage_type,
            fiber_type,
            connector_type,
            polishing_type,
            standard,
            insertion_loss,
            return_loss,
            wavelength,
            bandwidth,
            physical_dimensions,
            environmental_specs,
            manufacturing_info,
            strands,
            strand_configuration,
            network_metrics,
            extra,
        } = patch;

        overwrite(&mut self.id, id);
        overwrite(&mut self.usage_type, usage_type);
        overwrite(&mut self.fiber_type, fiber_type);
        overwrite(&mut self.connector_type, connector_type);
        overwrite(&mut self.polishing_type, polishing_type);
        overwrite(&mut self.standard, standard);
        overwrite(&mut self.insertion_loss, insertion_loss);
        overwrite(&mut self.return_loss, return_loss);
        overwrite(&mut self.wavelength, wavelength);
        overwrite(&mut self.bandwidth, bandwidth);

        if physical_dimensions.is_some() {
            self.physical_dimensions = physical_dimensions;
        }
        if environmental_specs.is_some() {
            self.environmental_specs = environmental_specs;
        }
        if manufacturing_info.is_some() {
            self.manufacturing_info = manufacturing_info;
        }
        if strand_configuration.is_some() {
            self.strand_configuration = strand_configuration;
        }
        if let Some(strands) = strands {
            strands.apply_to(&mut self.strands);
        }
        if let Some(metrics) = network_metrics {
            metrics.apply_to(&mut self.network_metrics);
        }

        clear_invalid_fields(&mut self.extra, &repaired);

        let mut extra = extra;
        quarantine_modelled_fields(&mut extra);
        let invalid = extra.remove(INVALID_FIELDS);
        self.extra.extend(extra);
        match invalid {
            Some(Value::Object(invalid)) => merge_invalid_fields(&mut self.extra, invalid),
            Some(other) => {
                self.extra.insert(INVALID_FIELDS.to_string(), other);
            }
            None => {}
        }
    }

    pub fn loss_report(&self) -> LossReport {
        let metrics = &self.network_metrics;
        let splice_floor = f64::from(metrics.splice_points) * metrics.max_splice_loss;
        LossReport {
            reported_total_db: metrics.total_loss,
            splice_floor_db: splice_floor,
            insertion_loss_db: self.insertion_loss,
            estimated_floor_db: splice_floor + self.insertion_loss,
            below_splice_floor: metrics.total_loss + 1e-9 < splice_floor,
        }
    }

    /// Installed length in kilometers, if surveyed.
    pub fn length_km(&self) -> Option<f64> {
        let meters = self.network_metrics.total_length;
        (meters.is_finite() && meters > 0.0).then(|| meters / 1000.0)
    }
}

fn overwrite<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Moves modelled field names out of an unmodelled-field bag and under
/// [`INVALID_FIELDS`], so a serialized specification never repeats a key.
fn quarantine_modelled_fields(extra: &mut Properties) {
    let mut invalid = Properties::new();
    for name in MODELLED_FIELDS {
        if let Some(value) = extra.remove(name) {
            invalid.insert(name.to_string(), value);
        }
    }
    if !invalid.is_empty() {
        merge_invalid_fields(extra, invalid);
    }
}

fn clear_invalid_fields(extra: &mut Properties, names: &[&str]) {
    let emptied = match extra.get_mut(INVALID_FIELDS) {
        Some(Value::Object(invalid)) => {
            for name in names {
                invalid.remove(*name);
            }
            invalid.is_empty()
        }
        _ => false,
    };
    if emptied {
        extra.remove(INVALID_FIELDS);
    }
}

fn merge_invalid_fields(extra: &mut Properties, invalid: Properties) {
    match extra.get_mut(INVALID_FIELDS) {
        Some(Value::Object(existing)) => existing.extend(invalid),
        _ => {
            extra.insert(INVALID_FIELDS.to_string(), Value::Object(invalid));
        }
    }
}

/// Partial strand counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrandCountsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_use: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damaged: Option<u32>,
}

impl StrandCountsPatch {
    fn apply_to(self, counts: &mut StrandCounts) {
        overwrite(&mut counts.total, self.total);
        overwrite(&mut counts.available, self.available);
        overwrite(&mut counts.in_use, self.in_use);
        overwrite(&mut counts.reserved, self.reserved);
        overwrite(&mut counts.damaged, self.damaged);
    }
}

impl From<StrandCounts> for StrandCountsPatch {
    fn from(c: StrandCounts) -> Self {
        Self {
            total: Some(c.total),
            available: Some(c.available),
            in_use: Some(c.in_use),
            reserved: Some(c.reserved),
            damaged: Some(c.damaged),
        }
    }
}

/// Partial network metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkMetricsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splice_points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_splice_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_loss: Option<f64>,
}

impl NetworkMetricsPatch {
    fn apply_to(self, metrics: &mut NetworkMetrics) {
        overwrite(&mut metrics.total_length, self.total_length);
        overwrite(&mut metrics.splice_points, self.splice_points);
        overwrite(&mut metrics.max_splice_loss, self.max_splice_loss);
        overwrite(&mut metrics.total_loss, self.total_loss);
    }
}

/// A create/update payload for a [`FiberSpecification`]; every field is
/// optional. Serializes with absent fields omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FiberSpecPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_type: Option<UsageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber_type: Option<FiberType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_type: Option<ConnectorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polishing_type: Option<PolishingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insertion_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wavelength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_dimensions: Option<PhysicalDimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environmental_specs: Option<EnvironmentalSpecs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturing_info: Option<ManufacturingInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strands: Option<StrandCountsPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strand_configuration: Option<StrandConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_metrics: Option<NetworkMetricsPatch>,
    #[serde(flatten)]
    pub extra: Properties,
}

impl FiberSpecPatch {
    /// True if applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Parks modelled names found in `extra` under [`INVALID_FIELDS`] and
    /// forgets parked values this patch now carries in typed form.
    pub(crate) fn settle_extra(&mut self) {
        let present = self.present_fields();
        clear_invalid_fields(&mut self.extra, &present);
        quarantine_modelled_fields(&mut self.extra);
    }

    fn present_fields(&self) -> Vec<&'static str> {
        let present = [
            self.id.is_some(),
            self.usage_type.is_some(),
            self.fiber_type.is_some(),
            self.connector_type.is_some(),
            self.polishing_type.is_some(),
            self.standard.is_some(),
            self.insertion_loss.is_some(),
            self.return_loss.is_some(),
            self.wavelength.is_some(),
            self.bandwidth.is_some(),
            self.physical_dimensions.is_some(),
            self.environmental_specs.is_some(),
            self.manufacturing_info.is_some(),
            self.strands.is_some(),
            self.strand_configuration.is_some(),
            self.network_metrics.is_some(),
        ];
        MODELLED_FIELDS
            .into_iter()
            .zip(present)
            .filter_map(|(name, present)| present.then_some(name))
            .collect()
    }
}
