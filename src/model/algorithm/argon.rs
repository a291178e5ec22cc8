use rand_core::OsRng;
use std::str::FromStr;
use derive_more::Display;
use std::convert::TryFrom;
use serde::{Deserialize, Serialize};
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use crate::utils::errors::{ErrorCode, PassguardError};

#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq)]
pub enum ArgonHashType {
    ARGON2D,
    ARGON2I,
    ARGON2ID
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ArgonPolicy {
    pub parallelism: u32,
    pub tag_length: u32,
    pub memory_size_kb: u32,
    pub iterations: u32,
    pub version: u32,
    pub hash_type: ArgonHashType
}

pub fn validate(phc: &str, plain_text_password: &str) -> Result<bool, PassguardError> {
    let parsed_hash = PasswordHash::new(phc)?;

    // The parameters are read from the PHC itself, so the default instance can verify any of them.
    match argon2::Argon2::default().verify_password(plain_text_password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

impl Default for ArgonPolicy {
    fn default() -> Self {
        ArgonPolicy {
            parallelism: 1,
            tag_length: 32,
            memory_size_kb: 1024 * 16,
            iterations: 2,
            version: 19,
            hash_type: ArgonHashType::ARGON2ID
        }
    }
}

impl ArgonPolicy {
    pub fn hash_into_phc(&self, plain_text_password: &str) -> Result<String, PassguardError> {
        let salt = SaltString::generate(&mut OsRng);

        let params = argon2::Params::new(
            self.memory_size_kb,
            self.iterations,
            self.parallelism,
            Some(self.tag_length as usize))?;

        let argon2 = argon2::Argon2::new(
            self.hash_type.into(),
            argon2::Version::try_from(self.version)?,
            params);

        // Hash password to PHC string ($argon2id$v=19$...)
        Ok(argon2.hash_password(plain_text_password.as_bytes(), &salt)?.to_string())
    }
}

impl From<ArgonHashType> for argon2::Algorithm {
    fn from(hash_type: ArgonHashType) -> Self {
        match hash_type {
            ArgonHashType::ARGON2D  => argon2::Algorithm::Argon2d,
            ArgonHashType::ARGON2I  => argon2::Algorithm::Argon2i,
            ArgonHashType::ARGON2ID => argon2::Algorithm::Argon2id,
        }
    }
}

impl FromStr for ArgonHashType {
    type Err = PassguardError;

    fn from_str(input: &str) -> Result<ArgonHashType, Self::Err> {
        match input {
            "argon2i"  => Ok(ArgonHashType::ARGON2I),
            "argon2d"  => Ok(ArgonHashType::ARGON2D),
            "argon2id" => Ok(ArgonHashType::ARGON2ID),
            _          => Err(ErrorCode::UnknownAlgorithmVariant.with_msg(&format!("Unknown argon variant {}", input))),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_type_is_written_into_the_phc() -> Result<(), PassguardError> {
        let policy = ArgonPolicy {
            memory_size_kb: 1024,
            iterations: 1,
            hash_type: ArgonHashType::ARGON2I,
            ..ArgonPolicy::default()
        };

        let phc = policy.hash_into_phc("Hello123!")?;
        assert!(phc.starts_with("$argon2i$v=19$m=1024,t=1,p=1$"), "unexpected phc {}", phc);
        assert!(validate(&phc, "Hello123!")?);
        Ok(())
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let policy = ArgonPolicy { memory_size_kb: 1, ..ArgonPolicy::default() };
        let err = policy.hash_into_phc("Hello123!").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidAlgorithmConfig);
    }

    #[test]
    fn test_unknown_variant() {
        assert!(ArgonHashType::from_str("argon3").is_err());
    }
}
