pub mod argon;
pub mod bcrypt;
pub mod pbkdf2;

use std::str::FromStr;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use self::{argon::ArgonPolicy, bcrypt::BCryptPolicy, pbkdf2::Pbkdf2Policy};
use crate::utils::errors::{ErrorCode, PassguardError};

#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq)]
pub enum Algorithm {
    Argon,
    BCrypt,
    PBKDF2,
}

///
/// The algorithm, and its parameters, that new passwords are hashed with.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum HashingPolicy {
    Argon(ArgonPolicy),
    BCrypt(BCryptPolicy),
    Pbkdf2(Pbkdf2Policy),
}

impl Default for HashingPolicy {
    fn default() -> Self {
        HashingPolicy::Argon(ArgonPolicy::default())
    }
}

impl HashingPolicy {
    ///
    /// Use the hashing algorithm to hash the password with a fresh salt and build a PHC string.
    ///
    /// ref: https://github.com/P-H-C/phc-string-format/blob/master/phc-sf-spec.md
    ///
    pub fn hash_into_phc(&self, plain_text_password: &str) -> Result<String, PassguardError> {
        match self {
            HashingPolicy::Argon(argon)   => argon.hash_into_phc(plain_text_password),
            HashingPolicy::BCrypt(bcrypt) => bcrypt.hash_into_phc(plain_text_password),
            HashingPolicy::Pbkdf2(pbkdf2) => pbkdf2.hash_into_phc(plain_text_password),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            HashingPolicy::Argon(_)  => Algorithm::Argon,
            HashingPolicy::BCrypt(_) => Algorithm::BCrypt,
            HashingPolicy::Pbkdf2(_) => Algorithm::PBKDF2,
        }
    }
}

///
/// Validate if the plain_text_password matches the hashed password provided.
///
/// The algorithm is constructed and used from the PHC string provided, so hashes created under a
/// previously configured algorithm still verify.
///
pub fn validate(plain_text_password: &str, phc: &str) -> Result<bool, PassguardError> {
    match select(phc)? {
        Algorithm::Argon  => argon::validate(phc, plain_text_password),
        Algorithm::BCrypt => bcrypt::validate(phc, plain_text_password),
        Algorithm::PBKDF2 => pbkdf2::validate(phc, plain_text_password),
    }
}

///
/// Parse the first part of the phc string and return the algorithm.
///
fn select(phc: &str) -> Result<Algorithm, PassguardError> {
    let mut split = phc.split('$');
    split.next(); /* Skip first it's blank */

    match split.next() {
        Some(algorithm) => Algorithm::from_phc_id(algorithm),
        None => Err(ErrorCode::InvalidPHCFormat.with_msg("The PHC is invalid, there's no algorithm")),
    }
}

impl Algorithm {
    fn from_phc_id(input: &str) -> Result<Algorithm, PassguardError> {
        match input {
            "argon2i"  |
            "argon2d"  |
            "argon2id" => Ok(Algorithm::Argon),

            "2a" |
            "2b" |
            "2x" |
            "2y" => Ok(Algorithm::BCrypt),

            "pbkdf2-sha256" => Ok(Algorithm::PBKDF2),

            _ => Err(ErrorCode::InvalidPHCFormat.with_msg(&format!("algorithm {} is un-handled", input))),
        }
    }
}

///
/// Parse the configured algorithm name.
///
impl FromStr for Algorithm {
    type Err = PassguardError;

    fn from_str(input: &str) -> Result<Algorithm, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "argon" | "argon2" => Ok(Algorithm::Argon),
            "bcrypt"           => Ok(Algorithm::BCrypt),
            "pbkdf2"           => Ok(Algorithm::PBKDF2),
            _ => Err(ErrorCode::UnknownAlgorithmVariant.with_msg(&format!("Unknown hashing algorithm {}", input))),
        }
    }
}


#[cfg(test)]
mod tests {
    // Note this useful idiom: importing names from outer (for mod tests) scope.
    use super::*;

    #[test]
    fn test_select_argon2id() -> Result<(), PassguardError> {
        let phc = "$argon2id$v=19$m=16384,t=20,p=1$77QFGJMDLMwvR7+lYvuNtw$82Byd2enomP62Z01Wcb1g5+KApYhQygW6BEYCXnZj5A";
        assert_eq!(select(phc)?, Algorithm::Argon);
        Ok(())
    }

    #[test]
    fn test_select_bcrypt_and_pbkdf2() -> Result<(), PassguardError> {
        assert_eq!(select("$2b$04$abcdefghijklmnopqrstuu")?, Algorithm::BCrypt);
        assert_eq!(select("$pbkdf2-sha256$i=1000,l=32$c2FsdA$aGFzaA")?, Algorithm::PBKDF2);
        Ok(())
    }

    #[test]
    fn test_unknown_phc_is_an_error() {
        let err = validate("Hello123!", "$md5$abc").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidPHCFormat);

        let err = validate("Hello123!", "no-dollars").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidPHCFormat);
    }

    #[test]
    fn test_configured_algorithm_names() -> Result<(), PassguardError> {
        assert_eq!(Algorithm::from_str("Argon")?, Algorithm::Argon);
        assert_eq!(Algorithm::from_str("bcrypt")?, Algorithm::BCrypt);
        assert_eq!(Algorithm::from_str("PBKDF2")?, Algorithm::PBKDF2);
        assert!(Algorithm::from_str("sha1").is_err());
        Ok(())
    }

    #[test]
    fn test_hashes_from_any_algorithm_verify() -> Result<(), PassguardError> {
        let policies = vec!(
            HashingPolicy::Argon(ArgonPolicy { memory_size_kb: 1024, iterations: 1, ..ArgonPolicy::default() }),
            HashingPolicy::BCrypt(BCryptPolicy { cost: 4, ..BCryptPolicy::default() }),
            HashingPolicy::Pbkdf2(Pbkdf2Policy { rounds: 1000, ..Pbkdf2Policy::default() }),
        );

        for policy in policies {
            let phc = policy.hash_into_phc("Hello123!")?;
            assert_eq!(select(&phc)?, policy.algorithm());
            assert!(validate("Hello123!", &phc)?, "{} did not verify", policy.algorithm());
            assert!(!validate("Hello456!", &phc)?, "{} verified the wrong password", policy.algorithm());
        }
        Ok(())
    }

    #[test]
    fn test_the_same_password_hashes_differently() -> Result<(), PassguardError> {
        let policy = HashingPolicy::BCrypt(BCryptPolicy { cost: 4, ..BCryptPolicy::default() });
        assert_ne!(policy.hash_into_phc("Hello123!")?, policy.hash_into_phc("Hello123!")?);
        Ok(())
    }
}
