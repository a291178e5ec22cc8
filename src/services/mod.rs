mod change_password;
mod delete_user;
mod register_user;

use std::sync::Arc;
use parking_lot::RwLock;
use tracing::instrument;
use chrono::{DateTime, Utc};
use crate::db::CredentialStore;
use crate::utils::time_provider::TimeProvider;
use crate::utils::errors::PassguardError;
use crate::model::{algorithm::{self, HashingPolicy}, identity::Identity, outcome::{Decision, ValidationOutcome}, policy::PasswordPolicy, user::UserRecord};

///
/// Owns the credential lifecycle: registration, password changes and removal. Every operation goes
/// through the policy and the store held here.
///
pub struct CredentialManager {
    store: Arc<dyn CredentialStore>,

    policy: Arc<PasswordPolicy>,

    hashing: HashingPolicy,

    time_provider: RwLock<TimeProvider>,
}

impl CredentialManager {
    pub fn new(store: Arc<dyn CredentialStore>, policy: Arc<PasswordPolicy>, hashing: HashingPolicy) -> Self {
        CredentialManager {
            store,
            policy,
            hashing,
            time_provider: RwLock::new(TimeProvider::default()),
        }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.time_provider.read().now()
    }

    ///
    /// Set or clear the fixed time used to stamp credential changes.
    ///
    pub fn set_now(&self, now: Option<DateTime<Utc>>) {
        self.time_provider.write().fix(now);
    }

    ///
    /// Check a candidate password against the policy without touching the store.
    ///
    pub fn validate(&self, current_password: Option<&str>, new_password: &str, identity: &Identity) -> ValidationOutcome {
        self.policy.validate(current_password, new_password, identity)
    }

    #[instrument(skip(self, identity, password), fields(username = %identity.username))]
    pub async fn register_user(&self, identity: Identity, password: &str) -> Result<Decision<String>, PassguardError> {
        register_user::register_user(self, identity, password).await
    }

    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(&self, user_id: &str, current_password: &str, new_password: &str) -> Result<Decision<()>, PassguardError> {
        change_password::change_password(self, user_id, current_password, new_password).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: &str) -> Result<Decision<()>, PassguardError> {
        delete_user::delete_user(self, user_id).await
    }

    #[instrument(skip(self))]
    pub async fn find_user_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, PassguardError> {
        self.store.get_user_by_id(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, PassguardError> {
        self.store.get_user_by_username(username).await
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserRecord>, PassguardError> {
        self.store.list_users().await
    }

    ///
    /// Hash the password with the configured algorithm. This is a highly CPU-bound activity so it is
    /// performed in the blocking thread pool not on the main event loop.
    ///
    async fn hash(&self, plain_text_password: &str) -> Result<String, PassguardError> {
        let plain_text_password = plain_text_password.to_string();
        let hashing = self.hashing.clone();

        tokio::task::spawn_blocking(move || hashing.hash_into_phc(&plain_text_password))
            .await
            .map_err(PassguardError::from)?
    }

    ///
    /// Does the password match the PHC given? Runs on the blocking thread pool.
    ///
    async fn verify(&self, plain_text_password: &str, phc: &str) -> Result<bool, PassguardError> {
        let plain_text_password = plain_text_password.to_string();
        let phc = phc.to_string();

        tokio::task::spawn_blocking(move || algorithm::validate(&plain_text_password, &phc))
            .await
            .map_err(PassguardError::from)?
    }

    ///
    /// Does the password match any of the PHCs given? Stops at the first match.
    ///
    async fn matches_any(&self, plain_text_password: &str, phcs: Vec<String>) -> Result<bool, PassguardError> {
        let plain_text_password = plain_text_password.to_string();

        tokio::task::spawn_blocking(move || -> Result<bool, PassguardError> {
                for phc in &phcs {
                    if algorithm::validate(&plain_text_password, phc)? {
                        return Ok(true)
                    }
                }
                Ok(false)
            })
            .await
            .map_err(PassguardError::from)?
    }
}
