use std::fmt;
use serde::{Deserialize, Serialize};
use unicode_general_category::{get_general_category, GeneralCategory};
use crate::utils::errors::ErrorCode;
use super::{identity::Identity, outcome::ValidationOutcome};

pub mod prelude {
    // Identity values are split into tokens on these before being screened.
    pub const IDENTITY_SEPARATORS: [char; 6] = [' ', '.', '-', '_', ',', '@'];

    // Identity tokens shorter than this are too common to reject a password over.
    pub const MIN_IDENTITY_TOKEN_LENGTH: usize = 3;

    pub const DEFAULT_HISTORY_LENGTH: u32 = 24;
}

use self::prelude::*;

///
/// The thresholds a password must satisfy. Built once from the configuration and shared.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PasswordPolicy {
    pub min_length: u32,
    pub min_uppercase: u32,
    pub min_lowercase: u32,
    pub min_digits: u32,
    pub min_special: u32,
    pub min_different_characters: u32,
    pub max_history_length: u32,
    pub identity_separators: Vec<char>,
    pub min_identity_token_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        PasswordPolicy {
            min_length: 14,
            min_uppercase: 2,
            min_lowercase: 2,
            min_digits: 2,
            min_special: 2,
            min_different_characters: 4,
            max_history_length: DEFAULT_HISTORY_LENGTH,
            identity_separators: IDENTITY_SEPARATORS.to_vec(),
            min_identity_token_length: MIN_IDENTITY_TOKEN_LENGTH,
        }
    }
}

///
/// How many characters of each class a password contains.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CharacterTally {
    pub uppercase: u32,
    pub lowercase: u32,
    pub digits: u32,
    pub special: u32,
}

impl CharacterTally {
    ///
    /// Every character lands in exactly one class. Anything that isn't an upper or lower case letter
    /// or a decimal digit (punctuation, symbols, whitespace, fractions, ...) counts as special.
    ///
    pub fn of(plain_text_password: &str) -> Self {
        plain_text_password
            .chars()
            .fold(CharacterTally::default(), |mut tally, c| {
                if c.is_uppercase() {
                    tally.uppercase += 1;
                } else if c.is_lowercase() {
                    tally.lowercase += 1;
                } else if get_general_category(c) == GeneralCategory::DecimalNumber {
                    tally.digits += 1;
                } else {
                    tally.special += 1;
                }
                tally
            })
    }
}

impl PasswordPolicy {
    ///
    /// Check a candidate password against this policy.
    ///
    /// Every rule is evaluated and every violation reported - except for an empty password, where
    /// nothing else is worth checking. The current password is only given when an existing
    /// password is being changed.
    ///
    pub fn validate(&self, current_password: Option<&str>, new_password: &str, identity: &Identity) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();

        if new_password.is_empty() {
            outcome.push(ErrorCode::PasswordRequired.with_msg("Must provide a password"));
            return outcome
        }

        if (new_password.chars().count() as u32) < self.min_length {
            outcome.push(ErrorCode::PasswordTooShort
                .with_msg(&format!("Password must be at least {} characters", self.min_length)));
        }

        let tally = CharacterTally::of(new_password);

        if tally.uppercase < self.min_uppercase {
            outcome.push(ErrorCode::NotEnoughUppercase
                .with_msg(&format!("Password must contain {} or more uppercase letters", self.min_uppercase)));
        }

        if tally.lowercase < self.min_lowercase {
            outcome.push(ErrorCode::NotEnoughLowercase
                .with_msg(&format!("Password must contain {} or more lowercase letters", self.min_lowercase)));
        }

        if tally.digits < self.min_digits {
            outcome.push(ErrorCode::NotEnoughNumbers
                .with_msg(&format!("Password must contain {} or more numbers", self.min_digits)));
        }

        if tally.special < self.min_special {
            outcome.push(ErrorCode::NotEnoughSymbols
                .with_msg(&format!("Password must contain {} or more special characters", self.min_special)));
        }

        if let Some(current_password) = current_password.filter(|current| !current.is_empty()) {
            if difference_score(current_password, new_password) < self.min_different_characters as usize {
                outcome.push(ErrorCode::PasswordTooSimilar
                    .with_msg(&format!("New password must differ from current password by at least {} characters", self.min_different_characters)));
            }
        }

        if contains_personal_info(new_password, identity, &self.identity_separators, self.min_identity_token_length) {
            outcome.push(ErrorCode::PasswordContainsPersonalInfo
                .with_msg("Password can't contain account name, username, display name, or personal identifiers"));
        }

        outcome
    }
}

///
/// Count the positions (up to the shorter length) where the passwords differ, plus the difference in
/// their lengths.
///
/// This is not an edit distance - a single inserted character shifts every following position.
///
pub fn difference_score(current_password: &str, new_password: &str) -> usize {
    let current: Vec<char> = current_password.chars().collect();
    let new: Vec<char> = new_password.chars().collect();

    let mismatches = current
        .iter()
        .zip(new.iter())
        .filter(|(a, b)| a != b)
        .count();

    mismatches + current.len().abs_diff(new.len())
}

///
/// Indicates if any token of the user's identifiers appears, case-insensitively, inside the password.
///
pub fn contains_personal_info(plain_text_password: &str, identity: &Identity, separators: &[char], min_token_length: usize) -> bool {
    let password = plain_text_password.to_lowercase();

    identity
        .fields()
        .iter()
        .any(|field| identity_tokens(field, separators, min_token_length)
            .any(|token| password.contains(&token)))
}

fn identity_tokens<'a>(value: &'a str, separators: &'a [char], min_token_length: usize) -> impl Iterator<Item = String> + 'a {
    value
        .split(separators)
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .filter(move |token| token.chars().count() >= min_token_length)
}

///
/// The requirements as shown to a user choosing a password.
///
impl fmt::Display for PasswordPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The password chosen must meet the following requirements:")?;
        writeln!(f, "* Must be at least {} characters in length.", self.min_length)?;
        writeln!(f, "* Must contain at least:")?;
        writeln!(f, "    {} uppercase letters", self.min_uppercase)?;
        writeln!(f, "    {} lowercase letters", self.min_lowercase)?;
        writeln!(f, "    {} numbers", self.min_digits)?;
        writeln!(f, "    {} special characters", self.min_special)?;
        writeln!(f, "* Must differ from the current password by at least {} characters.", self.min_different_characters)?;
        writeln!(f, "* Must not match any of the last {} passwords.", self.max_history_length)?;
        writeln!(f, "* Must not contain the account name, username, display name or other personal identifiers.")
    }
}
