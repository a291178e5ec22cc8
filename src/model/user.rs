use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::identity::Identity;

///
/// A user's current password hash (a PHC string) and when it was set.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CredentialRecord {
    pub phc: String,
    pub changed_on: DateTime<Utc>,
}

///
/// One previously committed password hash. Entries are only ever appended.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct HistoryEntry {
    pub phc: String,
    pub changed_on: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct UserRecord {
    pub user_id: String,
    pub identity: Identity,
    pub credential: CredentialRecord,
}

impl From<&HistoryEntry> for CredentialRecord {
    fn from(entry: &HistoryEntry) -> Self {
        CredentialRecord {
            phc: entry.phc.clone(),
            changed_on: entry.changed_on,
        }
    }
}
