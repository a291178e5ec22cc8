use std::fmt;
use bcrypt::BcryptError;
use mongodb::bson;
use derive_more::Display;
use config::ConfigError;
use tokio::task::JoinError;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum ErrorCode {
    HashThreadingIssue              = 0401,
    IOError                         = 0402,
    InvalidConfiguration            = 0500,
    UnableToReadCredentials         = 0501,
    UnknownStore                    = 0502,
    MongoDBError                    = 0503,
    InvalidBSON                     = 0504,
    InvalidJSON                     = 0505,
    InvalidAlgorithmConfig          = 0508,
    HashingError                    = 0509,
    InvalidPHCFormat                = 0510,
    UnknownAlgorithmVariant         = 0511,
    UserNotStored                   = 0512,
    PasswordRequired                = 2000,
    PasswordContainsPersonalInfo    = 2001,
    PasswordTooShort                = 2002,
    NotEnoughUppercase              = 2005,
    NotEnoughLowercase              = 2006,
    NotEnoughNumbers                = 2007,
    NotEnoughSymbols                = 2009,
    PasswordTooSimilar              = 2011,
    PasswordUsedBefore              = 2012,
    UserNotFound                    = 2101,
    PasswordNotMatch                = 2103,
    UsernameTaken                   = 2300,
}

///
/// The broad class of a failure. Everything except Infrastructure is an expected outcome and is
/// reported back to the caller as a rejection reason rather than as an Err.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    PolicyViolation,
    AuthenticationFailure,
    NotFound,
    ReuseViolation,
    Conflict,
    Infrastructure,
}

impl ErrorCode {
    pub fn with_msg(&self, message: &str) -> PassguardError {
        PassguardError::new(*self, message)
    }

    pub fn category(&self) -> ErrorCategory {
        use ErrorCode::*;

        match self {
            HashThreadingIssue      |
            IOError                 |
            InvalidConfiguration    |
            UnableToReadCredentials |
            UnknownStore            |
            MongoDBError            |
            InvalidBSON             |
            InvalidJSON             |
            InvalidAlgorithmConfig  |
            HashingError            |
            InvalidPHCFormat        |
            UnknownAlgorithmVariant |
            UserNotStored => ErrorCategory::Infrastructure,

            PasswordRequired             |
            PasswordContainsPersonalInfo |
            PasswordTooShort             |
            NotEnoughUppercase           |
            NotEnoughLowercase           |
            NotEnoughNumbers             |
            NotEnoughSymbols             |
            PasswordTooSimilar => ErrorCategory::PolicyViolation,

            PasswordNotMatch   => ErrorCategory::AuthenticationFailure,
            UserNotFound       => ErrorCategory::NotFound,
            PasswordUsedBefore => ErrorCategory::ReuseViolation,
            UsernameTaken      => ErrorCategory::Conflict,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PassguardError {
    error_code: ErrorCode,
    message: String,
}

impl PassguardError {
    pub fn new(error_code: ErrorCode, message: &str) -> Self {
        PassguardError { error_code, message: message.to_string() }
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn category(&self) -> ErrorCategory {
        self.error_code.category()
    }
}

impl fmt::Display for PassguardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.error_code, self.error_code as u32, self.message)
    }
}

impl std::error::Error for PassguardError {}

impl From<std::io::Error> for PassguardError {
    fn from(error: std::io::Error) -> Self {
        ErrorCode::IOError.with_msg(&format!("IO error: {}", error))
    }
}

impl From<ConfigError> for PassguardError {
    fn from(error: ConfigError) -> Self {
        ErrorCode::InvalidConfiguration.with_msg(&format!("The service configuration is not correct: {}", error))
    }
}

impl From<argon2::Error> for PassguardError {
    fn from(error: argon2::Error) -> Self {
        ErrorCode::InvalidAlgorithmConfig.with_msg(&format!("Invalid configuration for algorithm: {}", error))
    }
}

impl From<password_hash::Error> for PassguardError {
    fn from(error: password_hash::Error) -> Self {
        ErrorCode::HashingError.with_msg(&format!("Unable to hash password: {}", error))
    }
}

impl From<BcryptError> for PassguardError {
    fn from(error: BcryptError) -> Self {
        ErrorCode::HashingError.with_msg(&format!("Unable to hash or verify with bcrypt: {}", error))
    }
}

impl From<serde_json::Error> for PassguardError {
    fn from(error: serde_json::Error) -> Self {
        ErrorCode::InvalidJSON.with_msg(&format!("Unable to convert to json: {}", error))
    }
}

impl From<mongodb::error::Error> for PassguardError {
    fn from(error: mongodb::error::Error) -> Self {
        ErrorCode::MongoDBError.with_msg(&format!("MongoDB error: {}", error))
    }
}

impl From<bson::ser::Error> for PassguardError {
    fn from(error: bson::ser::Error) -> Self {
        ErrorCode::InvalidBSON.with_msg(&format!("Unable to serialise BSON: {}", error))
    }
}

impl From<bson::de::Error> for PassguardError {
    fn from(error: bson::de::Error) -> Self {
        ErrorCode::InvalidBSON.with_msg(&format!("Unable to deserialise BSON: {}", error))
    }
}

impl From<JoinError> for PassguardError {
    fn from(error: JoinError) -> Self {
        ErrorCode::HashThreadingIssue.with_msg(&format!("Unable to hash: {}", error))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_codes_are_not_infrastructure() {
        assert_eq!(ErrorCode::PasswordTooShort.category(), ErrorCategory::PolicyViolation);
        assert_eq!(ErrorCode::PasswordNotMatch.category(), ErrorCategory::AuthenticationFailure);
        assert_eq!(ErrorCode::UserNotFound.category(), ErrorCategory::NotFound);
        assert_eq!(ErrorCode::PasswordUsedBefore.category(), ErrorCategory::ReuseViolation);
        assert_eq!(ErrorCode::MongoDBError.category(), ErrorCategory::Infrastructure);
    }

    #[test]
    fn test_display_includes_numeric_code() {
        let error = ErrorCode::PasswordTooShort.with_msg("too short");
        assert_eq!(error.to_string(), "PasswordTooShort (2002): too short");
    }
}
