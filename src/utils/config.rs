use std::fmt::Write;
use std::str::FromStr;
use std::env::VarError;
use serde::{Deserialize, Serialize};
use super::errors::{ErrorCode, PassguardError};
use crate::model::{algorithm::{Algorithm, HashingPolicy, argon::{ArgonHashType, ArgonPolicy}, bcrypt::BCryptPolicy, pbkdf2::Pbkdf2Policy}, policy::PasswordPolicy};

///
/// The application configuration - initialised at start-up and never changed afterwards.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Configuration {
    pub store: String,                     // Either 'memory' or 'mongo'.
    pub db_name: String,                   // The MongoDB name to use.
    pub mongo_uri: String,                 // The MongoDB connection URI. May contain $USERNAME and $PASSWORD placeholders.
    pub mongo_credentials: Option<String>, // A secrets file with the MongoDB username on line 1 and password on line 2.

    pub min_length: u32,
    pub min_uppercase: u32,
    pub min_lowercase: u32,
    pub min_digits: u32,
    pub min_special: u32,
    pub min_different_characters: u32,    // How many positions a new password must differ from the current one by.
    pub max_history_length: u32,          // The reuse window - how many previous hashes a new password is checked against.

    pub hash_algorithm: String,           // argon, bcrypt or pbkdf2.
    pub argon_memory_size_kb: u32,
    pub argon_iterations: u32,
    pub argon_parallelism: u32,
    pub argon_tag_length: u32,
    pub argon_hash_type: String,
    pub bcrypt_cost: u32,
    pub pbkdf2_rounds: u32,
}

impl Configuration {
    ///
    /// Load the application's configuration.
    ///
    pub fn from_env() -> Result<Configuration, PassguardError> {
        let cfg = config::Config::builder()
            // Set defaults for settings that were not specified.
            .set_default("store", "memory")?
            .set_default("db_name", "Passguard")?
            .set_default("mongo_uri", "mongodb://localhost:27017")?
            .set_default("min_length", 14_i64)?
            .set_default("min_uppercase", 2_i64)?
            .set_default("min_lowercase", 2_i64)?
            .set_default("min_digits", 2_i64)?
            .set_default("min_special", 2_i64)?
            .set_default("min_different_characters", 4_i64)?
            .set_default("max_history_length", 24_i64)?
            .set_default("hash_algorithm", "argon")?
            .set_default("argon_memory_size_kb", 16384_i64)?
            .set_default("argon_iterations", 2_i64)?
            .set_default("argon_parallelism", 1_i64)?
            .set_default("argon_tag_length", 32_i64)?
            .set_default("argon_hash_type", "argon2id")?
            .set_default("bcrypt_cost", bcrypt::DEFAULT_COST as i64)?
            .set_default("pbkdf2_rounds", 600_000_i64)?
            // Merge any environment variables with the same name as the struct fields.
            .add_source(config::Environment::default())
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    ///
    /// The password policy described by this configuration.
    ///
    pub fn policy(&self) -> PasswordPolicy {
        PasswordPolicy {
            min_length: self.min_length,
            min_uppercase: self.min_uppercase,
            min_lowercase: self.min_lowercase,
            min_digits: self.min_digits,
            min_special: self.min_special,
            min_different_characters: self.min_different_characters,
            // The current password always counts towards the reuse window.
            max_history_length: self.max_history_length.max(1),
            ..PasswordPolicy::default()
        }
    }

    ///
    /// The algorithm and parameters new passwords are hashed with.
    ///
    pub fn hashing_policy(&self) -> Result<HashingPolicy, PassguardError> {
        Ok(match Algorithm::from_str(&self.hash_algorithm)? {
            Algorithm::Argon => HashingPolicy::Argon(ArgonPolicy {
                parallelism:    self.argon_parallelism,
                tag_length:     self.argon_tag_length,
                memory_size_kb: self.argon_memory_size_kb,
                iterations:     self.argon_iterations,
                version:        19,
                hash_type:      ArgonHashType::from_str(&self.argon_hash_type)?,
            }),
            Algorithm::BCrypt => HashingPolicy::BCrypt(BCryptPolicy {
                cost: self.bcrypt_cost,
                ..BCryptPolicy::default()
            }),
            Algorithm::PBKDF2 => HashingPolicy::Pbkdf2(Pbkdf2Policy {
                rounds: self.pbkdf2_rounds,
                ..Pbkdf2Policy::default()
            }),
        })
    }

    ///
    /// Pretty-print the config for the start-up log.
    ///
    pub fn fmt_console(&self) -> Result<String, PassguardError> {
        // Serialise to JSON so we have fields to iterate.
        let values = serde_json::to_value(&self)?;

        let values = values.as_object()
            .ok_or_else(|| ErrorCode::InvalidJSON.with_msg("The configuration did not serialise to an object"))?;

        // Sort by keys.
        let mut sorted: Vec<_> = values.iter().collect();
        sorted.sort_by_key(|a| a.0);

        let mut output = String::new();
        for (k, v) in sorted {
            let _ = writeln!(&mut output, "{:>25}: {}", k, v);
        }

        Ok(output)
    }
}

///
/// If the specified environment variable is not set for this process, set it to the default value specified.
///
pub fn default_env(key: &str, value: &str) {
    if let Err(VarError::NotPresent) = std::env::var(key) {
        std::env::set_var(key, value);
    }
}
