//! crates/sa_core/src/ids.rs
//! Entity identifiers. Integer newtypes with strict decimal parsing; no I/O.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors returned when parsing ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdError {
    Empty,
    NotDecimal,
    Overflow,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdError::Empty => f.write_str("empty id"),
            IdError::NotDecimal => f.write_str("id must be a decimal integer"),
            IdError::Overflow => f.write_str("id out of range"),
        }
    }
}

impl std::error::Error for IdError {}

/// Decimal digits only: no sign, no whitespace, no `0x`.
fn parse_decimal(s: &str, max: u64) -> Result<u64, IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdError::NotDecimal);
    }
    let v: u64 = s.parse().map_err(|_| IdError::Overflow)?;
    if v > max {
        return Err(IdError::Overflow);
    }
    Ok(v)
}

macro_rules! int_id_newtype {
    ($(#[$m:meta])* $name:ident($inner:ty)) => {
        $(#[$m])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name($inner);

        impl $name {
            #[inline] pub const fn new(v: $inner) -> Self { Self(v) }
            #[inline] pub const fn get(self) -> $inner { self.0 }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
        }

        impl FromStr for $name {
            type Err = IdError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let v = parse_decimal(s, <$inner>::MAX as u64)?;
                Ok(Self(v as $inner))
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(v: $inner) -> Self { Self(v) }
        }
    }
}

int_id_newtype!(
    /// Province identity.
    ProvinceId(u32)
);
int_id_newtype!(
    /// District identity; results are keyed by `(ElectionYear, DistrictId)`.
    DistrictId(u32)
);
int_id_newtype!(
    /// Party identity. Ascending `PartyId` is the canonical enumeration order.
    PartyId(u32)
);
int_id_newtype!(
    /// Calendar year of an election.
    ElectionYear(u16)
);
