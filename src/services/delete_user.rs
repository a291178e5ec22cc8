use super::CredentialManager;
use crate::model::outcome::Decision;
use crate::utils::errors::{ErrorCode, PassguardError};

///
/// Remove the user along with their password history.
///
pub async fn delete_user(manager: &CredentialManager, user_id: &str) -> Result<Decision<()>, PassguardError> {
    match manager.store.delete_user(user_id).await? {
        true => {
            tracing::info!("Deleted user {}", user_id);
            Ok(Decision::Accepted(()))
        },
        false => Ok(Decision::reject(ErrorCode::UserNotFound.with_msg("User not found."))),
    }
}
