use crate::utils::errors::{ErrorCode, PassguardError};

///
/// The result of checking a candidate password against a policy. Violations are held in the order
/// the rules were evaluated.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationOutcome {
    violations: Vec<PassguardError>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[PassguardError] {
        &self.violations
    }

    pub fn messages(&self) -> Vec<&str> {
        self.violations.iter().map(PassguardError::message).collect()
    }

    pub fn codes(&self) -> Vec<ErrorCode> {
        self.violations.iter().map(PassguardError::error_code).collect()
    }

    pub(crate) fn push(&mut self, violation: PassguardError) {
        self.violations.push(violation);
    }

    pub fn into_violations(self) -> Vec<PassguardError> {
        self.violations
    }
}

///
/// The answer to a credential operation. Expected failures (policy, wrong password, unknown user,
/// reuse) are a Rejected decision; only infrastructure problems are returned as an Err alongside this.
///
#[derive(Clone, Debug, PartialEq)]
pub enum Decision<T> {
    Accepted(T),
    Rejected(Vec<PassguardError>),
}

impl<T> Decision<T> {
    pub fn reject(reason: PassguardError) -> Self {
        Decision::Rejected(vec!(reason))
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted(_))
    }

    pub fn reasons(&self) -> Vec<&str> {
        match self {
            Decision::Accepted(_) => vec!(),
            Decision::Rejected(reasons) => reasons.iter().map(PassguardError::message).collect(),
        }
    }

    pub fn codes(&self) -> Vec<ErrorCode> {
        match self {
            Decision::Accepted(_) => vec!(),
            Decision::Rejected(reasons) => reasons.iter().map(PassguardError::error_code).collect(),
        }
    }

    pub fn accepted(self) -> Option<T> {
        match self {
            Decision::Accepted(value) => Some(value),
            Decision::Rejected(_) => None,
        }
    }
}
