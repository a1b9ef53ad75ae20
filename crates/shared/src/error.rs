use serde::{Deserialize, Serialize};

/// `error` label the backend puts on bean-validation failures.
pub const VALIDATION_FAILED: &str = "Validation Failed";

/// Error body returned by the backend's exception handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Most specific human-readable text in the body, if any.
    pub fn best_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| self.error.as_deref().filter(|e| !e.is_empty()))
    }

    pub fn is_validation_failure(&self) -> bool {
        self.error.as_deref() == Some(VALIDATION_FAILED)
    }
}

/// Per-field validation messages, in the order the backend reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    /// Parses `field1: msg1; field2: msg2`. Segments without a field name
    /// before the first colon are skipped; a repeated field keeps its first
    /// position and takes the later message.
    pub fn parse(message: &str) -> Self {
        let mut errors = Self::default();
        if !message.contains(':') {
            return errors;
        }

        for pair in message.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let Some(idx) = pair.find(':') else {
                continue;
            };
            if idx == 0 {
                continue;
            }
            let field = pair[..idx].trim();
            let text = pair[idx + 1..].trim();
            errors.insert(field, text);
        }
        errors
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.0.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = message,
            None => self.0.push((field, message)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
