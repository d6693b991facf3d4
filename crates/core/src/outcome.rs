use serde::{Deserialize, Serialize};

/// Severity of the issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

/// FHIR OperationOutcome as returned by a server rejecting a request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub resource_type: String,
    #[serde(default)]
    pub issue: Vec<OperationOutcomeIssue>,
}

/// Single issue of an OperationOutcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationOutcomeIssue {
    pub severity: IssueSeverity,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<CodeableText>,
}

/// The `text` part of a CodeableConcept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeableText {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl OperationOutcome {
    /// Human readable summary of the error and fatal issues.
    ///
    /// Uses `diagnostics`, then `details.text`, then the issue code. Falls
    /// back to all issues when none are errors.
    pub fn message(&self) -> Option<String> {
        let describe = |issue: &OperationOutcomeIssue| {
            issue
                .diagnostics
                .clone()
                .or_else(|| issue.details.as_ref().and_then(|d| d.text.clone()))
                .unwrap_or_else(|| issue.code.clone())
        };

        let errors: Vec<String> = self
            .issue
            .iter()
            .filter(|i| matches!(i.severity, IssueSeverity::Fatal | IssueSeverity::Error))
            .map(describe)
            .collect();

        let messages = if errors.is_empty() {
            self.issue.iter().map(describe).collect()
        } else {
            errors
        };

        if messages.is_empty() {
            None
        } else {
            Some(messages.join("; "))
        }
    }
}
