//! variables.rs: Allocation parameters with safe defaults and domain checks.
//!
//! Defaults reproduce the statutory scheme: 5% of cast votes are treated as
//! invalid, and a party needs 5% of valid votes to qualify.

use core::fmt;

#[cfg(feature = "serde")]
use serde::de::{Error as DeError, Unexpected};
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::CoreError;

pub const DEFAULT_INVALID_SHARE_PCT: u8 = 5;
pub const DEFAULT_THRESHOLD_PCT: u8 = 5;

/// Integer percentage in `0..=100` (validated on construction and deserialization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Pct(u8);

impl Pct {
    pub fn new(v: u8) -> Result<Self, CoreError> {
        if v <= 100 { Ok(Self(v)) } else { Err(CoreError::PctOutOfRange(v as u16)) }
    }
    #[inline] pub fn as_u8(self) -> u8 { self.0 }
}

impl fmt::Display for Pct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Pct {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = u8::deserialize(d)?;
        if v <= 100 { Ok(Pct(v)) }
        else { Err(D::Error::invalid_value(Unexpected::Unsigned(v as u64), &"0..=100")) }
    }
}

/// How equal vote counts (bonus seat) or equal remainders (last remainder
/// seat) are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TiePolicy {
    /// Lowest `PartyId` wins the tie.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "deterministic_order"))]
    DeterministicOrder,
    /// Any tie that decides a seat is an allocation error.
    #[cfg_attr(feature = "serde", serde(rename = "reject"))]
    Reject,
}

impl TiePolicy {
    /// Wire token.
    pub fn as_str(self) -> &'static str {
        match self {
            TiePolicy::DeterministicOrder => "deterministic_order",
            TiePolicy::Reject => "reject",
        }
    }
}

impl core::str::FromStr for TiePolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deterministic_order" => Ok(TiePolicy::DeterministicOrder),
            "reject" => Ok(TiePolicy::Reject),
            other => Err(format!("unknown tie policy '{other}' (expected deterministic_order | reject)")),
        }
    }
}

/// Parameter snapshot for one allocation run. Missing fields in a params
/// document fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Params {
    /// Share of cast votes carved out as invalid before the threshold is applied.
    pub invalid_share_pct: Pct,
    /// Minimum share of valid votes a party needs (non-strict `>=`).
    pub threshold_pct: Pct,
    pub tie_policy: TiePolicy,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            invalid_share_pct: Pct(DEFAULT_INVALID_SHARE_PCT),
            threshold_pct: Pct(DEFAULT_THRESHOLD_PCT),
            tie_policy: TiePolicy::DeterministicOrder,
        }
    }
}

/// Cross-field domain checks (per-field ranges are enforced by `Pct`).
pub fn validate_domains(p: &Params) -> Result<(), CoreError> {
    if p.invalid_share_pct.as_u8() >= 100 {
        return Err(CoreError::InvalidShareTooHigh);
    }
    Ok(())
}
