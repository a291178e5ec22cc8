use super::CredentialManager;
use crate::model::{identity::Identity, outcome::Decision, user::HistoryEntry};
use crate::utils::errors::{ErrorCategory, ErrorCode, PassguardError};

///
/// Validate the password against the policy and, if it's okay, store a new user with it as their
/// current credential and first history entry.
///
pub async fn register_user(manager: &CredentialManager, identity: Identity, plain_text_password: &str)
    -> Result<Decision<String>, PassguardError> {

    // Check password against the policy - there's no current password for a new user.
    let outcome = manager.validate(None, plain_text_password, &identity);
    if !outcome.is_valid() {
        tracing::debug!("Registration rejected with {} violation(s)", outcome.violations().len());
        return Ok(Decision::Rejected(outcome.into_violations()))
    }

    if manager.store.get_user_by_username(&identity.username).await?.is_some() {
        return Ok(Decision::reject(ErrorCode::UsernameTaken.with_msg("Username is already taken")))
    }

    let entry = HistoryEntry {
        phc: manager.hash(plain_text_password).await?,
        changed_on: manager.now(),
    };

    // The store may still detect a concurrent registration of the same username.
    match manager.store.create_user(&identity, &entry).await {
        Ok(user_id) => {
            tracing::info!("Registered user {}", user_id);
            Ok(Decision::Accepted(user_id))
        },
        Err(err) if err.category() == ErrorCategory::Conflict => Ok(Decision::reject(err)),
        Err(err) => Err(err),
    }
}
