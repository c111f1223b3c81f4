//! Result descriptor handed back to the trigger.

use serde::{Deserialize, Serialize};

use super::record::Record;

/// What an invocation returns to whatever triggered it.
///
/// Serializes as `{"statusCode": 200, "body": [...]}` or
/// `{"statusCode": 500, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InvocationResult {
    Success {
        #[serde(rename = "statusCode")]
        status_code: u16,
        body: Vec<Record>,
    },
    Failure {
        #[serde(rename = "statusCode")]
        status_code: u16,
        error: String,
    },
}

impl InvocationResult {
    pub fn success(body: Vec<Record>) -> Self {
        Self::Success {
            status_code: 200,
            body,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            status_code: 500,
            error: error.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success { status_code, .. } | Self::Failure { status_code, .. } => *status_code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Records written, if the invocation succeeded.
    pub fn records(&self) -> Option<&[Record]> {
        match self {
            Self::Success { body, .. } => Some(body),
            Self::Failure { .. } => None,
        }
    }

    /// Failure message, if the invocation failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_shape() {
        let result = InvocationResult::failure("boom");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"statusCode": 500, "error": "boom"})
        );
        assert!(!result.is_success());
        assert_eq!(result.error(), Some("boom"));
    }

    #[test]
    fn test_success_shape() {
        let mut record = Record::from_cells(&["location".to_string()], vec!["Lima".to_string()]);
        record.id = "r1".to_string();

        let result = InvocationResult::success(vec![record]);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"statusCode": 200, "body": [{"location": "Lima", "id": "r1"}]})
        );
        assert_eq!(result.status_code(), 200);
        assert_eq!(result.records().map(|r| r.len()), Some(1));
    }
}
