#[derive(Debug, PartialEq)]
pub enum ApplicationError {
    NotFound,
    UnknownToken,
    /// The token is bound but its file is gone from storage.
    DanglingReference(String),
    TokenConflict,
    TokenSpaceExhausted(u32),
    InternalError(String),
    DatabaseError(String),
    BadRequest(String),
    PayloadTooLarge,
}

impl std::fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationError::NotFound => write!(f, "file not found"),
            ApplicationError::UnknownToken => write!(f, "unknown token"),
            ApplicationError::DanglingReference(token) => {
                write!(f, "token {} refers to a missing file", token)
            }
            ApplicationError::TokenConflict => write!(f, "token already bound"),
            ApplicationError::TokenSpaceExhausted(attempts) => {
                write!(f, "no free token after {} attempts", attempts)
            }
            ApplicationError::InternalError(msg) => write!(f, "internal error: {}", msg),
            ApplicationError::DatabaseError(msg) => write!(f, "database error: {}", msg),
            ApplicationError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            ApplicationError::PayloadTooLarge => write!(f, "payload too large"),
        }
    }
}

impl std::error::Error for ApplicationError {}
