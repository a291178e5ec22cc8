use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use crate::utils::errors::PassguardError;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Pbkdf2Policy {
    pub rounds: u32,
    pub output_length: usize,
}

pub fn validate(phc: &str, plain_text_password: &str) -> Result<bool, PassguardError> {
    let parsed_hash = PasswordHash::new(phc)?;

    match pbkdf2::Pbkdf2.verify_password(plain_text_password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

impl Default for Pbkdf2Policy {
    fn default() -> Self {
        Self {
            rounds: 600_000,
            output_length: 32,
        }
    }
}

impl Pbkdf2Policy {
    pub fn hash_into_phc(&self, plain_text_password: &str) -> Result<String, PassguardError> {
        let salt = SaltString::generate(&mut OsRng);
        let params = pbkdf2::Params { rounds: self.rounds, output_length: self.output_length };

        // Hash password to PHC string ($pbkdf2-sha256$i=...)
        Ok(pbkdf2::Pbkdf2
            .hash_password_customized(plain_text_password.as_bytes(), None, None, params, &salt)?
            .to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_are_written_into_the_phc() -> Result<(), PassguardError> {
        let policy = Pbkdf2Policy { rounds: 1000, ..Pbkdf2Policy::default() };
        let phc = policy.hash_into_phc("Hello123!")?;
        assert!(phc.starts_with("$pbkdf2-sha256$i=1000"), "unexpected phc {}", phc);
        assert!(validate(&phc, "Hello123!")?);
        assert!(!validate(&phc, "hello123!")?);
        Ok(())
    }
}
