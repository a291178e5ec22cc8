use std::sync::Arc;
use lazy_static::lazy_static;
use chrono::{DateTime, Duration, TimeZone, Utc};
use passguard::db::memory::MemoryStore;
use passguard::services::CredentialManager;
use passguard::model::{algorithm::{HashingPolicy, bcrypt::BCryptPolicy}, identity::Identity, policy::PasswordPolicy};

lazy_static! {
    // Tests call this repeatedly so only the first call installs the subscriber.
    static ref TRACING: () = passguard::init_tracing();
}

///
/// A manager over a fresh in-memory store with the default policy, a cheap bcrypt cost and the
/// clock fixed at start().
///
#[allow(dead_code)]
pub fn manager() -> CredentialManager {
    manager_with_policy(PasswordPolicy::default())
}

#[allow(dead_code)]
pub fn manager_with_policy(policy: PasswordPolicy) -> CredentialManager {
    let store = Arc::new(MemoryStore::new(policy.max_history_length));
    manager_over(store, policy)
}

///
/// A manager over a store the test has already seeded.
///
#[allow(dead_code)]
pub fn manager_over(store: Arc<MemoryStore>, policy: PasswordPolicy) -> CredentialManager {
    lazy_static::initialize(&TRACING);

    let manager = CredentialManager::new(
        store,
        Arc::new(policy),
        HashingPolicy::BCrypt(BCryptPolicy { cost: 4, ..BCryptPolicy::default() }));

    manager.set_now(Some(start()));
    manager
}

#[allow(dead_code)]
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 8, 23, 9, 30, 0).unwrap()
}

///
/// Move the manager's fixed clock on a minute so each change gets a distinct timestamp.
///
#[allow(dead_code)]
pub fn tick(manager: &CredentialManager) {
    manager.set_now(Some(manager.now() + Duration::minutes(1)));
}

#[allow(dead_code)]
pub fn jdoe() -> Identity {
    Identity {
        username: "jdoe".to_string(),
        account_name: "John.Doe".to_string(),
        display_name: "John Doe Systems Administrator NE Florida".to_string(),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
    }
}

///
/// Distinct policy-compliant passwords. Consecutive ones differ in four positions.
///
#[allow(dead_code)]
pub fn historic(index: u32) -> String {
    format!("Hx{0:02}!Yq{0:02}@Zw{0:02}#Kp{0:02}", index)
}
