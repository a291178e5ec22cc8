use std::fs;
use async_trait::async_trait;
use futures::TryStreamExt;
use tracing::{debug, info};
use serde::{Deserialize, Serialize};
use mongodb::error::ErrorKind;
use super::{newest_first, prelude::*, CredentialStore};
use crate::utils::{self, config::Configuration, errors::{ErrorCode, PassguardError}};
use crate::model::{identity::Identity, user::{CredentialRecord, HistoryEntry, UserRecord}};
use mongodb::{Client, Collection, Database, bson::{self, Document, doc}, options::ClientOptions};

///
/// One document per user. The password history is embedded in the user document so a credential
/// change and its history entry are a single-document, and therefore atomic, update.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
struct UserDocument {
    user_id: String,
    username: String,
    account_name: String,
    display_name: String,
    first_name: String,
    last_name: String,
    phc: String,
    changed_on: bson::DateTime,
    history: Vec<HistoryDocument>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct HistoryDocument {
    phc: String,
    changed_on: bson::DateTime,
}

pub struct MongoStore {
    db: Database,
    max_history_length: u32,
}

impl MongoStore {
    ///
    /// History beyond max_history_length entries is pruned as each change is written. At least one
    /// entry is always kept - the current credential.
    ///
    pub fn new(db: Database, max_history_length: u32) -> Self {
        MongoStore { db, max_history_length: max_history_length.max(1) }
    }

    fn history_slice(&self) -> i64 {
        -(self.max_history_length as i64)
    }

    fn users(&self) -> Collection<UserDocument> {
        self.db.collection::<UserDocument>(USERS)
    }

    async fn find_one(&self, filter: Document) -> Result<Option<UserDocument>, PassguardError> {
        Ok(self.users().find_one(filter, None).await?)
    }
}

#[async_trait]
impl CredentialStore for MongoStore {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, PassguardError> {
        Ok(self.find_one(doc!{ USER_ID: user_id }).await?.map(UserRecord::from))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, PassguardError> {
        Ok(self.find_one(doc!{ USERNAME: username }).await?.map(UserRecord::from))
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, PassguardError> {
        let users: Vec<UserDocument> = self.users()
            .find(doc!{}, None)
            .await?
            .try_collect()
            .await?;

        Ok(users.into_iter().map(UserRecord::from).collect())
    }

    async fn create_user(&self, identity: &Identity, entry: &HistoryEntry) -> Result<String, PassguardError> {
        let user_id = utils::generate_id();
        let history = HistoryDocument::from(entry);

        let user = UserDocument::new(&user_id, identity, history);

        match self.users().insert_one(user, None).await {
            Ok(_) => Ok(user_id),
            Err(err) if is_duplicate_err(&err) => Err(ErrorCode::UsernameTaken
                .with_msg(&format!("The username {} is already taken", identity.username))),
            Err(err) => Err(err.into()),
        }
    }

    async fn record_password_change(&self, user_id: &str, entry: &HistoryEntry) -> Result<(), PassguardError> {
        let history = HistoryDocument::from(entry);

        let update = doc!{
            "$set": {
                PHC: &history.phc,
                CHANGED_ON: history.changed_on,
            },
            "$push": {
                HISTORY: {
                    "$each": [ bson::to_bson(&history)? ],
                    "$slice": self.history_slice(),
                }
            }
        };

        let result = self.users().update_one(doc!{ USER_ID: user_id }, update, None).await?;

        match result.matched_count {
            0 => Err(ErrorCode::UserNotStored
                .with_msg(&format!("User {} was removed before their password change was stored", user_id))),
            _ => Ok(()),
        }
    }

    async fn list_history(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryEntry>, PassguardError> {
        match self.find_one(doc!{ USER_ID: user_id }).await? {
            Some(user) => Ok(newest_first(user.history.iter().map(HistoryEntry::from).collect(), limit)),
            None => Ok(vec!()),
        }
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool, PassguardError> {
        let result = self.users().delete_one(doc!{ USER_ID: user_id }, None).await?;
        Ok(result.deleted_count > 0)
    }
}

impl UserDocument {
    fn new(user_id: &str, identity: &Identity, history: HistoryDocument) -> Self {
        UserDocument {
            user_id: user_id.to_string(),
            username: identity.username.clone(),
            account_name: identity.account_name.clone(),
            display_name: identity.display_name.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            phc: history.phc.clone(),
            changed_on: history.changed_on,
            history: vec!(history),
        }
    }
}

impl From<UserDocument> for UserRecord {
    fn from(user: UserDocument) -> Self {
        UserRecord {
            user_id: user.user_id,
            identity: Identity {
                username: user.username,
                account_name: user.account_name,
                display_name: user.display_name,
                first_name: user.first_name,
                last_name: user.last_name,
            },
            credential: CredentialRecord {
                phc: user.phc,
                changed_on: user.changed_on.to_chrono(),
            },
        }
    }
}

impl From<&HistoryEntry> for HistoryDocument {
    fn from(entry: &HistoryEntry) -> Self {
        HistoryDocument {
            phc: entry.phc.clone(),
            changed_on: bson::DateTime::from_chrono(entry.changed_on),
        }
    }
}

impl From<&HistoryDocument> for HistoryEntry {
    fn from(history: &HistoryDocument) -> Self {
        HistoryEntry {
            phc: history.phc.clone(),
            changed_on: history.changed_on.to_chrono(),
        }
    }
}

///
/// Run any schema-like updates against MongoDB that haven't been run yet.
///
pub async fn update_mongo(db: &Database) -> Result<(), PassguardError> {
    create_init_indexes(db).await?;
    Ok(())
}

async fn create_init_indexes(db: &Database) -> Result<(), PassguardError> {
    // https://docs.mongodb.com/manual/reference/command/createIndexes/#createindexes
    db.run_command(doc! { "createIndexes": USERS, "indexes": [
        { "key": { USER_ID: 1 },  "name": "idx_user_id",  "unique": true },
        { "key": { USERNAME: 1 }, "name": "idx_username", "unique": true }] }, None).await?;

    Ok(())
}

///
/// Indicates if the MongoDB error is from a duplicate key violation.
///
pub fn is_duplicate_err(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(mongodb::error::WriteFailure::WriteError(we)) => we.code == 11000 /* Duplicate insert */,
        _ => false
    }
}

pub async fn get_mongo_db(app_name: &str, config: &Configuration) -> Result<Database, PassguardError> {

    let uri = match &config.mongo_credentials {
        Some(filename) => {
            debug!("Loading MongoDB credentials from secrets file {}", filename);

            // Read username and password from a secrets file.
            let credentials = fs::read_to_string(filename)
                .map_err(|err| ErrorCode::UnableToReadCredentials
                    .with_msg(&format!("Unable to read credentials from {}: {}", filename, err)))?;
            let mut credentials = credentials.lines();
            let uri = config.mongo_uri.replace("$USERNAME", credentials.next().unwrap_or_default());
            uri.replace("$PASSWORD", credentials.next().unwrap_or_default())
        },
        None => config.mongo_uri.clone(),
    };

    // Parse the uri now.
    let mut client_options = ClientOptions::parse(&uri).await?;

    // Manually set an option.
    client_options.app_name = Some(app_name.to_string());

    // Get a handle to the deployment.
    let client = Client::with_options(client_options)?;

    info!("Connecting to MongoDB...");

    let db = client.database(&config.db_name);
    ping(&db).await?;

    info!("Connected to MongoDB");
    Ok(db)
}

pub async fn ping(db: &Database) -> Result<Document, PassguardError> {
    Ok(db.run_command(doc! { "ping": 1 }, None).await?)
}
