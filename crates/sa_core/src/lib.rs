//! sa_core: Core types, parameter domains, integer rounding, and the Repository contract.
//!
//! This crate is **I/O-free**. It defines the stable types shared across the
//! engine (`sa_algo`, `sa_pipeline`, `sa_io`, `sa_cli`).
//!
//! - Entity ids: `ProvinceId`, `DistrictId`, `PartyId`, `ElectionYear`
//! - Entities: `Province`, `District`, `Party`, `ElectionResult`, `VoteTally`
//! - Parameter domains: `Pct`, `TiePolicy`, `Params`
//! - Integer-only share helpers (no floating point anywhere in the engine)
//! - `Repository`: read access to the four entity snapshots
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        /// A percentage outside `0..=100`.
        PctOutOfRange(u16),
        /// `invalid_share_pct == 100` leaves no valid votes in any district.
        InvalidShareTooHigh,
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::PctOutOfRange(v) => write!(f, "percentage out of range: {v}"),
                CoreError::InvalidShareTooHigh => {
                    write!(f, "invalid_share_pct must be below 100")
                }
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod entities;
pub mod ids;
pub mod repository;
pub mod rounding;
pub mod variables;

pub use entities::{District, ElectionResult, Party, Province, VoteTally};
pub use ids::{DistrictId, ElectionYear, IdError, PartyId, ProvinceId};
pub use repository::Repository;
pub use variables::{Params, Pct, TiePolicy};
