use std::fmt;

use crate::error::VerifierError;
use crate::normalize::Payload;

/// The verifier's classification of a claim.
///
/// Only the exact label `TRUE` counts as positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    True,
    False,
    Other(String),
}

impl Verdict {
    pub fn parse(label: &str) -> Self {
        match label {
            "TRUE" => Verdict::True,
            "FALSE" => Verdict::False,
            other => Verdict::Other(other.to_string()),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Verdict::True)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Verdict::True => "TRUE",
            Verdict::False => "FALSE",
            Verdict::Other(label) => label.as_str(),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two fields of a verifier result the cache interprets.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationSummary {
    pub verdict: Verdict,
    pub confidence: Option<f64>,
}

impl VerificationSummary {
    /// Read `verification.verdict` and `verification.confidence`.
    ///
    /// A missing or non-string verdict is a malformed response. Confidence may
    /// be absent here; callers that persist must require it.
    pub fn from_payload(result: &Payload) -> Result<Self, VerifierError> {
        let verification = result.get("verification").ok_or_else(|| {
            VerifierError::MalformedResponse("missing 'verification' object".to_string())
        })?;

        let verdict = verification
            .get("verdict")
            .and_then(Payload::as_str)
            .map(Verdict::parse)
            .ok_or_else(|| {
                VerifierError::MalformedResponse("missing 'verification.verdict'".to_string())
            })?;

        let confidence = verification.get("confidence").and_then(Payload::as_f64);

        Ok(Self {
            verdict,
            confidence,
        })
    }
}
