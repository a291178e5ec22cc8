use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use super::{newest_first, CredentialStore};
use crate::utils::{self, errors::{ErrorCode, PassguardError}};
use crate::model::{identity::Identity, policy::prelude::DEFAULT_HISTORY_LENGTH, user::{CredentialRecord, HistoryEntry, UserRecord}};

///
/// A store that lives and dies with the process. Each write takes the lock once, so a credential
/// and its history entry are never seen apart, and a username can't be claimed twice.
///
/// History beyond max_history_length entries is pruned as each change is written.
///
#[derive(Debug)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<String, StoredUser>>,
    max_history_length: usize,
}

#[derive(Debug)]
struct StoredUser {
    record: UserRecord,
    history: Vec<HistoryEntry>,
}

impl MemoryStore {
    ///
    /// At least one entry is always kept - the current credential.
    ///
    pub fn new(max_history_length: u32) -> Self {
        MemoryStore {
            users: RwLock::new(BTreeMap::new()),
            max_history_length: max_history_length.max(1) as usize,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new(DEFAULT_HISTORY_LENGTH)
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, PassguardError> {
        Ok(self.users.read().get(user_id).map(|user| user.record.clone()))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, PassguardError> {
        Ok(self.users
            .read()
            .values()
            .find(|user| user.record.identity.username == username)
            .map(|user| user.record.clone()))
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, PassguardError> {
        Ok(self.users.read().values().map(|user| user.record.clone()).collect())
    }

    async fn create_user(&self, identity: &Identity, entry: &HistoryEntry) -> Result<String, PassguardError> {
        let mut users = self.users.write();

        if users.values().any(|user| user.record.identity.username == identity.username) {
            return Err(ErrorCode::UsernameTaken
                .with_msg(&format!("The username {} is already taken", identity.username)))
        }

        let user_id = utils::generate_id();
        let user = StoredUser {
            record: UserRecord {
                user_id: user_id.clone(),
                identity: identity.clone(),
                credential: CredentialRecord::from(entry),
            },
            history: vec!(entry.clone()),
        };

        users.insert(user_id.clone(), user);
        Ok(user_id)
    }

    async fn record_password_change(&self, user_id: &str, entry: &HistoryEntry) -> Result<(), PassguardError> {
        let mut users = self.users.write();

        match users.get_mut(user_id) {
            Some(user) => {
                user.record.credential = CredentialRecord::from(entry);
                user.history.push(entry.clone());

                let excess = user.history.len().saturating_sub(self.max_history_length);
                user.history.drain(..excess);
                Ok(())
            },
            None => Err(ErrorCode::UserNotStored
                .with_msg(&format!("User {} was removed before their password change was stored", user_id))),
        }
    }

    async fn list_history(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryEntry>, PassguardError> {
        let users = self.users.read();

        match users.get(user_id) {
            Some(user) => Ok(newest_first(user.history.clone(), limit)),
            None => Ok(vec!()),
        }
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool, PassguardError> {
        Ok(self.users.write().remove(user_id).is_some())
    }
}
