//! Error taxonomy shared by every layer of the journal client.

/// Errors surfaced by the entry store, the auth gateway and the domain flows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Transport or connectivity failure
    #[error("Network error: {0}")]
    Network(String),

    /// Missing or invalid session (401), or an action the caller may not perform (403)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The entry does not exist or is not owned by the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input, rejected locally or by the backend (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unmapped status codes and undecodable bodies
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ClientError {
    /// Single human-readable message for an error banner
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => {
                "Could not reach the journal service. Check your connection and try again.".to_string()
            }
            ClientError::Auth(_) => "Your session has expired or you are not signed in.".to_string(),
            ClientError::NotFound(_) => "That journal entry could not be found.".to_string(),
            ClientError::Validation(message) => message.clone(),
            ClientError::Unexpected(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ClientError::Unexpected(format!("Failed to parse response: {}", error))
        } else {
            ClientError::Network(error.to_string())
        }
    }
}

/// A convenience type alias for `Result<T, ClientError>`.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_transport_details() {
        let error = ClientError::Network("dns error: failed to lookup address".to_string());
        assert!(!error.user_message().contains("dns"));
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let error = ClientError::Validation("Passwords do not match".to_string());
        assert_eq!(error.user_message(), "Passwords do not match");
        assert_eq!(error.to_string(), "Validation error: Passwords do not match");
    }
}
