pub mod memory;
pub mod mongo;

use std::sync::Arc;
use async_trait::async_trait;
use crate::model::{identity::Identity, user::{HistoryEntry, UserRecord}};
use crate::utils::{config::Configuration, errors::{ErrorCode, PassguardError}};

pub mod prelude {
    // Store kinds.
    pub const MEMORY: &str = "memory";
    pub const MONGO:  &str = "mongo";

    // Collection names.
    pub const USERS: &str = "Users";

    // Field names.
    pub const USER_ID:    &str = "user_id";
    pub const USERNAME:   &str = "username";
    pub const PHC:        &str = "phc";
    pub const CHANGED_ON: &str = "changed_on";
    pub const HISTORY:    &str = "history";
}

///
/// Persistence for users, their current credential and their password history.
///
/// Implementations must make create_user and record_password_change atomic: the credential and
/// its history entry are either both written or neither is.
///
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, PassguardError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, PassguardError>;

    async fn list_users(&self) -> Result<Vec<UserRecord>, PassguardError>;

    ///
    /// Store a new user whose current credential and first history entry are both the entry given.
    /// Returns the generated user_id.
    ///
    async fn create_user(&self, identity: &Identity, entry: &HistoryEntry) -> Result<String, PassguardError>;

    ///
    /// Replace the user's current credential with the entry and append it to their history.
    ///
    async fn record_password_change(&self, user_id: &str, entry: &HistoryEntry) -> Result<(), PassguardError>;

    ///
    /// The user's most recent history entries, newest first, at most limit of them.
    ///
    async fn list_history(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryEntry>, PassguardError>;

    ///
    /// Remove the user and their history. Returns false if there was no such user.
    ///
    async fn delete_user(&self, user_id: &str) -> Result<bool, PassguardError>;
}

///
/// Order history entries (given oldest first) newest first and keep at most limit of them. The
/// later of two entries with the same timestamp is the newer.
///
pub(crate) fn newest_first(oldest_first: Vec<HistoryEntry>, limit: usize) -> Vec<HistoryEntry> {
    let mut history: Vec<HistoryEntry> = oldest_first.into_iter().rev().collect();
    history.sort_by(|a, b| b.changed_on.cmp(&a.changed_on));
    history.truncate(limit);
    history
}

///
/// Create the store selected in the configuration.
///
pub async fn connect(app_name: &str, config: &Configuration) -> Result<Arc<dyn CredentialStore>, PassguardError> {
    match config.store.as_str() {
        prelude::MEMORY => {
            tracing::warn!("Using an in-memory store, users will be lost on exit");
            Ok(Arc::new(memory::MemoryStore::new(config.max_history_length)))
        },
        prelude::MONGO => {
            let db = mongo::get_mongo_db(app_name, config).await?;
            mongo::update_mongo(&db).await?;
            Ok(Arc::new(mongo::MongoStore::new(db, config.max_history_length)))
        },
        unknown => Err(ErrorCode::UnknownStore
            .with_msg(&format!("Unknown store '{}', expected '{}' or '{}'", unknown, prelude::MEMORY, prelude::MONGO))),
    }
}
