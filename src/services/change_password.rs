use super::CredentialManager;
use crate::model::{outcome::Decision, user::HistoryEntry};
use crate::utils::errors::{ErrorCode, PassguardError};

///
/// Replace a user's password once the current one is proven, the new one satisfies the policy and
/// it hasn't been used within the reuse window.
///
pub async fn change_password(manager: &CredentialManager, user_id: &str, current_password: &str, new_password: &str)
    -> Result<Decision<()>, PassguardError> {

    let user = match manager.store.get_user_by_id(user_id).await? {
        Some(user) => user,
        None => return Ok(Decision::reject(ErrorCode::UserNotFound.with_msg("User not found."))),
    };

    if !manager.verify(current_password, &user.credential.phc).await? {
        tracing::debug!("Current password did not match for user {}", user_id);
        return Ok(Decision::reject(ErrorCode::PasswordNotMatch.with_msg("Current password is incorrect.")))
    }

    let outcome = manager.validate(Some(current_password), new_password, &user.identity);
    if !outcome.is_valid() {
        return Ok(Decision::Rejected(outcome.into_violations()))
    }

    // Check the new password against the most recent history entries - one verify per entry.
    let max_history_length = manager.policy().max_history_length;
    let history: Vec<String> = manager.store
        .list_history(user_id, max_history_length as usize)
        .await?
        .into_iter()
        .map(|entry| entry.phc)
        .collect();

    if manager.matches_any(new_password, history).await? {
        return Ok(Decision::reject(ErrorCode::PasswordUsedBefore
            .with_msg(&format!("New password must not match any of your last {} passwords", max_history_length))))
    }

    let entry = HistoryEntry {
        phc: manager.hash(new_password).await?,
        changed_on: manager.now(),
    };

    manager.store.record_password_change(user_id, &entry).await?;

    tracing::info!("Password changed for user {}", user_id);
    Ok(Decision::Accepted(()))
}
