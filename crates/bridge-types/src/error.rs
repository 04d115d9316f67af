use thiserror::Error;

/// Errors from the platform transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Non-2xx response; `detail` is best-effort extracted from the body's
    /// `message`/`error` field, falling back to the raw text.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// Connection, DNS, or timeout failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response whose body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl TransportError {
    /// The HTTP status for non-2xx failures, None otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Identifier validation failures raised before any network call.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("{field} contains unresolved template syntax: '{value}'")]
    UnresolvedTemplate { field: &'static str, value: String },
}

/// Errors during trigger link/unlink registration.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("failed to link webhook '{webhook_id}': {detail}")]
    LinkFailed { webhook_id: String, detail: String },

    #[error("binding store error: {0}")]
    Store(#[from] StoreError),
}

/// Binding-store I/O and serialization failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("stored binding is corrupt: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Http {
            status: 422,
            detail: "conversation_id is invalid".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 422: conversation_id is invalid");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_network_error_has_no_status() {
        let err = TransportError::Network("connection refused".to_string());
        assert!(err.status().is_none());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_validation_error_display_includes_raw_value() {
        let err = ValidationError::UnresolvedTemplate {
            field: "conversation_id",
            value: "{{ $json.thread }}".to_string(),
        };
        assert!(err.to_string().contains("{{ $json.thread }}"));
    }

    #[test]
    fn test_registration_error_from_store_error() {
        let err: RegistrationError = StoreError::Io("disk full".to_string()).into();
        assert!(err.to_string().contains("disk full"));
    }
}
