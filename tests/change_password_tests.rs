mod common;
use std::sync::Arc;
use more_asserts::assert_le;
use passguard::db::{CredentialStore, memory::MemoryStore};
use passguard::model::{algorithm, outcome::Decision, policy::PasswordPolicy, user::HistoryEntry};
use passguard::services::CredentialManager;
use passguard::utils::errors::{ErrorCode, PassguardError};
use crate::common::{historic, jdoe, manager, manager_over, manager_with_policy, start, tick};

const CURRENT: &str = "Current#Pw99ZZqq!";

async fn register(manager: &CredentialManager, password: &str) -> Result<String, PassguardError> {
    match manager.register_user(jdoe(), password).await? {
        Decision::Accepted(user_id) => Ok(user_id),
        wrong @ _ => panic!("Expected the registration to be accepted {:?}", wrong),
    }
}

///
/// Register jdoe with historic(0), change through historic(1) to historic(24) then to CURRENT -
/// 26 committed passwords in total.
///
async fn register_with_long_history(manager: &CredentialManager) -> Result<String, PassguardError> {
    let user_id = register(manager, &historic(0)).await?;

    for index in 1..=24 {
        tick(manager);
        let decision = manager.change_password(&user_id, &historic(index - 1), &historic(index)).await?;
        assert!(decision.is_accepted(), "change {} was rejected {:?}", index, decision.reasons());
    }

    tick(manager);
    let decision = manager.change_password(&user_id, &historic(24), CURRENT).await?;
    assert!(decision.is_accepted(), "change to current was rejected {:?}", decision.reasons());

    Ok(user_id)
}


#[tokio::test]
async fn test_a_valid_change_replaces_the_credential_and_appends_history() -> Result<(), PassguardError> {
    let manager = manager();
    let user_id = register(&manager, "Tr0ub4dor&3Zebra!!").await?;

    tick(&manager);
    let decision = manager.change_password(&user_id, "Tr0ub4dor&3Zebra!!", "Brand#New77!!Zeta").await?;
    assert_eq!(decision, Decision::Accepted(()));

    let user = manager.find_user_by_id(&user_id).await?.expect("The user was not stored");
    assert!(algorithm::validate("Brand#New77!!Zeta", &user.credential.phc)?);
    assert!(!algorithm::validate("Tr0ub4dor&3Zebra!!", &user.credential.phc)?);
    assert_eq!(user.credential.changed_on, manager.now());

    // The newest history entry is always the current credential.
    let history = manager.store().list_history(&user_id, 24).await?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].phc, user.credential.phc);
    assert_eq!(history[0].changed_on, user.credential.changed_on);
    assert_eq!(history[1].changed_on, start());
    Ok(())
}

#[tokio::test]
async fn test_an_unknown_user_is_not_found() -> Result<(), PassguardError> {
    let manager = manager();

    let decision = manager.change_password("missing", "Tr0ub4dor&3Zebra!!", "Brand#New77!!Zeta").await?;
    assert_eq!(decision.codes(), vec!(ErrorCode::UserNotFound));
    assert_eq!(decision.reasons(), vec!("User not found."));
    Ok(())
}

#[tokio::test]
async fn test_the_wrong_current_password_changes_nothing() -> Result<(), PassguardError> {
    let manager = manager();
    let user_id = register(&manager, "Tr0ub4dor&3Zebra!!").await?;
    let before = manager.find_user_by_id(&user_id).await?;

    tick(&manager);
    let decision = manager.change_password(&user_id, "Tr0ub4dor&3Zebra!?", "Brand#New77!!Zeta").await?;
    assert_eq!(decision.codes(), vec!(ErrorCode::PasswordNotMatch));
    assert_eq!(decision.reasons(), vec!("Current password is incorrect."));

    assert_eq!(manager.find_user_by_id(&user_id).await?, before);
    assert_eq!(manager.store().list_history(&user_id, 24).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_the_current_password_is_checked_before_the_policy() -> Result<(), PassguardError> {
    let manager = manager();
    let user_id = register(&manager, "Tr0ub4dor&3Zebra!!").await?;

    let decision = manager.change_password(&user_id, "not it", "weak").await?;
    assert_eq!(decision.codes(), vec!(ErrorCode::PasswordNotMatch));
    Ok(())
}

#[tokio::test]
async fn test_a_new_password_too_similar_to_the_current_is_rejected() -> Result<(), PassguardError> {
    let manager = manager();
    let user_id = register(&manager, "Tr0ub4dor&3Zebra!!").await?;

    // Three positions differ, four are required.
    let decision = manager.change_password(&user_id, "Tr0ub4dor&3Zebra!!", "Tr0ub4dor&3Zexyz!!").await?;
    assert_eq!(decision.codes(), vec!(ErrorCode::PasswordTooSimilar));
    assert_eq!(decision.reasons(), vec!("New password must differ from current password by at least 4 characters"));

    // Re-using the current password is caught by the same rule.
    let decision = manager.change_password(&user_id, "Tr0ub4dor&3Zebra!!", "Tr0ub4dor&3Zebra!!").await?;
    assert_eq!(decision.codes(), vec!(ErrorCode::PasswordTooSimilar));
    Ok(())
}

#[tokio::test]
async fn test_policy_violations_are_all_reported_on_change() -> Result<(), PassguardError> {
    let manager = manager();
    let user_id = register(&manager, "Tr0ub4dor&3Zebra!!").await?;

    let decision = manager.change_password(&user_id, "Tr0ub4dor&3Zebra!!", "johndoe").await?;
    assert_eq!(decision.codes(), vec!(
        ErrorCode::PasswordTooShort,
        ErrorCode::NotEnoughUppercase,
        ErrorCode::NotEnoughNumbers,
        ErrorCode::NotEnoughSymbols,
        ErrorCode::PasswordContainsPersonalInfo));
    Ok(())
}

#[tokio::test]
async fn test_a_password_within_the_reuse_window_is_rejected() -> Result<(), PassguardError> {
    let manager = manager();
    let user_id = register_with_long_history(&manager).await?;

    // Newest first: CURRENT, historic(24), historic(23), historic(22), historic(21) - the 5th.
    tick(&manager);
    let decision = manager.change_password(&user_id, CURRENT, &historic(21)).await?;
    assert_eq!(decision.codes(), vec!(ErrorCode::PasswordUsedBefore));
    assert_eq!(decision.reasons(), vec!("New password must not match any of your last 24 passwords"));

    let user = manager.find_user_by_id(&user_id).await?.expect("The user was not stored");
    assert!(algorithm::validate(CURRENT, &user.credential.phc)?);
    Ok(())
}

#[tokio::test]
async fn test_a_password_outside_the_reuse_window_is_accepted() -> Result<(), PassguardError> {
    let manager = manager();
    let user_id = register_with_long_history(&manager).await?;

    // historic(1) is the 25th most recent, one beyond the window.
    tick(&manager);
    let decision = manager.change_password(&user_id, CURRENT, &historic(1)).await?;
    assert_eq!(decision, Decision::Accepted(()));

    let user = manager.find_user_by_id(&user_id).await?.expect("The user was not stored");
    assert!(algorithm::validate(&historic(1), &user.credential.phc)?);

    let history = manager.store().list_history(&user_id, 24).await?;
    assert_eq!(history.len(), 24);
    assert_eq!(history[0].phc, user.credential.phc);
    Ok(())
}

#[tokio::test]
async fn test_the_reuse_window_follows_the_policy() -> Result<(), PassguardError> {
    let manager = manager_with_policy(PasswordPolicy { max_history_length: 2, ..PasswordPolicy::default() });
    let user_id = register(&manager, &historic(0)).await?;

    for index in 1..=2 {
        tick(&manager);
        assert!(manager.change_password(&user_id, &historic(index - 1), &historic(index)).await?.is_accepted());
    }

    // Only historic(2) and historic(1) are remembered.
    tick(&manager);
    let decision = manager.change_password(&user_id, &historic(2), &historic(1)).await?;
    assert_eq!(decision.reasons(), vec!("New password must not match any of your last 2 passwords"));

    let decision = manager.change_password(&user_id, &historic(2), &historic(0)).await?;
    assert!(decision.is_accepted(), "unexpected reasons {:?}", decision.reasons());

    assert_le!(manager.store().list_history(&user_id, 2).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_changes_keep_the_credential_and_history_together() -> Result<(), PassguardError> {
    let manager = manager();
    let user_id = register(&manager, "Tr0ub4dor&3Zebra!!").await?;

    tick(&manager);
    let (first, second) = tokio::join!(
        manager.change_password(&user_id, "Tr0ub4dor&3Zebra!!", "Brand#New77!!Zeta"),
        manager.change_password(&user_id, "Tr0ub4dor&3Zebra!!", "Other#Pass88??Kilo"));

    let accepted = [first?, second?].iter().filter(|decision| decision.is_accepted()).count();
    assert_le!(1, accepted);

    let user = manager.find_user_by_id(&user_id).await?.expect("The user was not stored");
    let history = manager.store().list_history(&user_id, 24).await?;
    assert_eq!(history.len(), 1 + accepted);
    assert_eq!(history[0].phc, user.credential.phc);
    Ok(())
}

#[tokio::test]
async fn test_changes_at_the_same_instant_keep_the_current_password_newest() -> Result<(), PassguardError> {
    let manager = manager();
    let user_id = register(&manager, &historic(0)).await?;

    // The clock is never moved on so every entry has the same timestamp.
    for index in 1..=3 {
        let decision = manager.change_password(&user_id, &historic(index - 1), &historic(index)).await?;
        assert!(decision.is_accepted(), "change {} was rejected {:?}", index, decision.reasons());
    }

    let user = manager.find_user_by_id(&user_id).await?.expect("The user was not stored");
    let newest = manager.store().list_history(&user_id, 1).await?;
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0].phc, user.credential.phc);
    assert!(algorithm::validate(&historic(3), &newest[0].phc)?);
    Ok(())
}

#[tokio::test]
async fn test_an_unreadable_stored_hash_is_an_error_not_a_rejection() -> Result<(), PassguardError> {
    let store = Arc::new(MemoryStore::default());
    let entry = HistoryEntry { phc: "$md5$x".to_string(), changed_on: start() };
    let user_id = store.create_user(&jdoe(), &entry).await?;

    let manager = manager_over(store.clone(), PasswordPolicy::default());
    tick(&manager);

    let err = match manager.change_password(&user_id, "Tr0ub4dor&3Zebra!!", "Brand#New77!!Zeta").await {
        Err(err) => err,
        Ok(wrong) => panic!("Expected an error but got {:?}", wrong),
    };
    assert_eq!(err.error_code(), ErrorCode::InvalidPHCFormat);

    // Nothing was written.
    assert_eq!(store.list_history(&user_id, 24).await?, vec!(entry.clone()));
    let user = store.get_user_by_id(&user_id).await?.expect("The user was not stored");
    assert_eq!(user.credential.phc, entry.phc);
    Ok(())
}

#[tokio::test]
async fn test_a_deleted_user_can_no_longer_change_their_password() -> Result<(), PassguardError> {
    let manager = manager();
    let user_id = register(&manager, "Tr0ub4dor&3Zebra!!").await?;

    assert_eq!(manager.delete_user(&user_id).await?, Decision::Accepted(()));
    assert!(manager.store().list_history(&user_id, 24).await?.is_empty());

    let decision = manager.change_password(&user_id, "Tr0ub4dor&3Zebra!!", "Brand#New77!!Zeta").await?;
    assert_eq!(decision.codes(), vec!(ErrorCode::UserNotFound));

    let decision = manager.delete_user(&user_id).await?;
    assert_eq!(decision.codes(), vec!(ErrorCode::UserNotFound));
    Ok(())
}
