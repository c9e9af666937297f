//! Source-related types.
//!
//! This module contains the energy categories tracked by the metering service:
//! - [`SourceType`] - Wire key of a tracked source (open set)
//! - [`EnergyUnit`] - Unit a source is reported in

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Source Type
// ============================================================================

/// A tracked energy category, identified by its key in the usage records.
///
/// The set of sources is configured rather than fixed: any key the service
/// reports can be tracked. The canonical sources are available as constants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceType(Cow<'static, str>);

impl SourceType {
    /// Space heating.
    pub const HOT: SourceType = SourceType(Cow::Borrowed("hot"));
    /// Hot tap water.
    pub const HOT_TAP: SourceType = SourceType(Cow::Borrowed("hot_tap"));
    /// Electricity.
    pub const ELECTRICITY: SourceType = SourceType(Cow::Borrowed("electra"));
    /// Cooling.
    pub const COLD: SourceType = SourceType(Cow::Borrowed("cold"));

    /// Creates a source type from its wire key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    /// Returns the canonical source types, in display order.
    pub fn defaults() -> Vec<SourceType> {
        vec![Self::HOT, Self::HOT_TAP, Self::ELECTRICITY, Self::COLD]
    }

    /// Returns the key used for this source in usage records.
    pub fn key(&self) -> &str {
        &self.0
    }

    /// Returns true if this is one of the canonical sources.
    pub fn is_canonical(&self) -> bool {
        matches!(self.key(), "hot" | "hot_tap" | "electra" | "cold")
    }

    /// Returns the display name for this source.
    ///
    /// Unknown sources fall back to their key.
    pub fn display_name(&self) -> &str {
        match self.key() {
            "hot" => "Heating",
            "hot_tap" => "Hot water",
            "electra" => "Electricity",
            "cold" => "Cooling",
            other => other,
        }
    }

    /// Returns the unit this source is reported in, if known.
    pub fn unit(&self) -> Option<EnergyUnit> {
        match self.key() {
            "hot" | "hot_tap" | "cold" => Some(EnergyUnit::GigaJoule),
            "electra" => Some(EnergyUnit::KiloWattHour),
            _ => None,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<&str> for SourceType {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for SourceType {
    fn from(key: String) -> Self {
        Self(Cow::Owned(key))
    }
}

// ============================================================================
// Energy Unit
// ============================================================================

/// Unit of an energy measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyUnit {
    /// Gigajoule, used for heat, hot water and cooling.
    GigaJoule,
    /// Kilowatt-hour, used for electricity.
    KiloWattHour,
}

impl EnergyUnit {
    /// Returns the unit symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::GigaJoule => "GJ",
            Self::KiloWattHour => "kWh",
        }
    }
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
