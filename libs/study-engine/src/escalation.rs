//! Optional escalation collaborator for essay grading.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Verdict from an external essay grader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssayVerdict {
    /// Score between 0.0 and 1.0.
    pub score: f64,
    pub rationale: String,
}

/// External grading collaborator, consulted only when the local essay
/// score is ambiguous. Failures are recovered by falling back to the
/// local grade; implementations should return
/// [`EngineError::Escalation`](crate::EngineError::Escalation) rather
/// than panic.
#[async_trait]
pub trait EssayGrader: Send + Sync {
    async fn grade_essay(
        &self,
        prompt: &str,
        reference: &str,
        answer: &str,
    ) -> Result<EssayVerdict>;
}

/// Where a grading result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeOrigin {
    /// Graded locally; authoritative.
    Local,
    /// Graded by the escalation collaborator.
    Escalated,
    /// Escalation failed; the local result stands, degraded.
    LocalFallback,
}
