//! Types shared by the extraction stage

use cardrec_core::{BenefitRecord, ExtractionStatus};
use serde::{Deserialize, Serialize};

/// Benefit records for one batch, aligned with the submitted cards
///
/// On `Complete` there is one record per card. On `CountMismatch` the
/// records cover the first `min(expected, received)` cards. On `Malformed`
/// there is a single fallback record holding the raw output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchExtraction {
    pub records: Vec<BenefitRecord>,
    pub status: ExtractionStatus,
}
