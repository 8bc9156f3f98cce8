use thiserror::Error;

// * Unified transport error for page fetches and store calls.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTTP {0} from {1}")]
    HttpStatus(u16, String),

    #[error("Expected HTTP {expected}, got {actual}")]
    UnexpectedStatus { expected: u16, actual: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl NetworkError {
    // * Status code carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Reqwest(e) => e.status().map(|s| s.as_u16()),
            NetworkError::HttpStatus(code, _) => Some(*code),
            NetworkError::UnexpectedStatus { actual, .. } => Some(*actual),
            NetworkError::InvalidUrl(_) => None,
        }
    }
}
