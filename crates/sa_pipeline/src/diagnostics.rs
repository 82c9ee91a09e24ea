//! crates/sa_pipeline/src/diagnostics.rs
//! Data-quality and allocation findings. Nothing here stops a run; callers
//! decide what an Error-severity finding means for them.
//!
//! Every diagnostic is also logged through `tracing` when it is raised.

use core::fmt;

use serde::Serialize;

use sa_core::ids::{DistrictId, ElectionYear, PartyId};

pub const RESULT_UNKNOWN_DISTRICT: &str = "Result.UnknownDistrict";
pub const RESULT_UNKNOWN_PARTY: &str = "Result.UnknownParty";
pub const RESULT_DECLARED_TOTAL_MISMATCH: &str = "Result.DeclaredTotalMismatch";
pub const RESULT_PARTY_NOT_CONTESTING: &str = "Result.PartyNotContesting";
pub const RESULT_DUPLICATE_KEY: &str = "Result.DuplicateKey";
pub const DISTRICT_NO_PROPORTIONAL_SEATS: &str = "District.NoProportionalSeats";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// What a finding is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
    Root,
    District { district_id: DistrictId },
    Party { party_id: PartyId },
    Result { year: ElectionYear, district_id: DistrictId },
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Root => f.write_str("root"),
            Subject::District { district_id } => write!(f, "district {district_id}"),
            Subject::Party { party_id } => write!(f, "party {party_id}"),
            Subject::Result { year, district_id } => write!(f, "result {year}/{district_id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub subject: Subject,
}

impl Diagnostic {
    pub fn error(code: &'static str, subject: Subject, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, code, message: message.into(), subject }.emitted()
    }

    pub fn warning(code: &'static str, subject: Subject, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, code, message: message.into(), subject }.emitted()
    }

    /// A second result under an existing `(year, district)` key.
    pub fn duplicate_key(year: ElectionYear, district_id: DistrictId) -> Self {
        Self::error(
            RESULT_DUPLICATE_KEY,
            Subject::Result { year, district_id },
            format!("more than one result for district {district_id} in {year}; the last one is used"),
        )
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    fn emitted(self) -> Self {
        match self.severity {
            Severity::Error => tracing::error!(code = self.code, subject = %self.subject, "{}", self.message),
            Severity::Warning => tracing::warn!(code = self.code, subject = %self.subject, "{}", self.message),
        }
        self
    }
}

/// Deterministic order: code, then subject, then message.
pub fn sort_stably(diags: &mut [Diagnostic]) {
    diags.sort_by(|a, b| {
        a.code
            .cmp(b.code)
            .then_with(|| a.subject.cmp(&b.subject))
            .then_with(|| a.message.cmp(&b.message))
    });
}
