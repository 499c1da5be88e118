// Versioned store accessor tests against an in-memory database
use super::*;
use serde_json::json;

fn store() -> PortfolioStore {
    PortfolioStore::open_in_memory().unwrap()
}

#[tokio::test]
async fn test_set_active_bumps_version_and_keeps_history() {
    let store = store();
    let v1 = json!({"id": "a", "name": "Rust"});
    let v2 = json!({"id": "a", "name": "Rust (advanced)"});

    let first = store.set_active("skill:a", RecordType::Skill, &v1).await.unwrap();
    let second = store.set_active("skill:a", RecordType::Skill, &v2).await.unwrap();

    assert_eq!(first.version, 1);
    assert_eq!(second.version, 2);
    assert_eq!(store.get_active("skill:a").await.unwrap(), Some(v2.clone()));

    let history = store.list_history("skill:a").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].version, 2);
    assert_eq!(history[1].version, 1);
    assert_eq!(history.iter().filter(|r| r.is_active).count(), 1);
    assert!(history[0].is_active);
    assert_eq!(history[1].value, v1);
}

#[tokio::test]
async fn test_activate_version_rolls_back() {
    let store = store();
    let v1 = json!({"name": "first"});
    let v2 = json!({"name": "second"});
    store.set_active("profile", RecordType::Profile, &v1).await.unwrap();
    store.set_active("profile", RecordType::Profile, &v2).await.unwrap();

    let restored = store.activate_version("profile", 1).await.unwrap();
    assert_eq!(restored.version, 1);
    assert!(restored.is_active);
    assert_eq!(store.get_active("profile").await.unwrap(), Some(v1));

    let active: Vec<_> = store
        .list_history("profile")
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.is_active)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].version, 1);

    // the next write continues after the highest version, not the active one
    let third = store
        .set_active("profile", RecordType::Profile, &json!({"name": "third"}))
        .await
        .unwrap();
    assert_eq!(third.version, 3);
}

#[tokio::test]
async fn test_activate_missing_version_fails() {
    let store = store();
    store
        .set_active("skill:x", RecordType::Skill, &json!({"id": "x"}))
        .await
        .unwrap();

    let err = store.activate_version("skill:x", 7).await.unwrap_err();
    assert!(matches!(err, DataError::VersionNotFound { version: 7, .. }));
    // the current version is untouched
    assert!(store.get_active("skill:x").await.unwrap().is_some());
}

#[tokio::test]
async fn test_list_active_by_type_skips_deactivated() {
    let store = store();
    store.set_active("skill:a", RecordType::Skill, &json!({"id": "a"})).await.unwrap();
    store.set_active("skill:b", RecordType::Skill, &json!({"id": "b"})).await.unwrap();
    store.set_active("skill:b", RecordType::Skill, &json!({"id": "b", "v": 2})).await.unwrap();
    store.set_active("project:p", RecordType::Project, &json!({"id": "p"})).await.unwrap();

    let removed = store.deactivate("skill:b").await.unwrap().unwrap();
    assert_eq!(removed.version, 2);
    assert!(!removed.is_active);

    let skills = store.list_active_by_type(RecordType::Skill).await.unwrap();
    assert_eq!(skills, vec![json!({"id": "a"})]);
    assert_eq!(store.get_active("skill:b").await.unwrap(), None);
    assert_eq!(store.list_history("skill:b").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_deactivate_missing_key_returns_none() {
    let store = store();
    assert!(store.deactivate("skill:nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_counts_by_type() {
    let store = store();
    store.set_active("skill:a", RecordType::Skill, &json!({})).await.unwrap();
    store.set_active("skill:b", RecordType::Skill, &json!({})).await.unwrap();
    store.set_active("skill:b", RecordType::Skill, &json!({"v": 2})).await.unwrap();
    store.set_active("project:p", RecordType::Project, &json!({})).await.unwrap();
    store.deactivate("project:p").await.unwrap();

    let counts = store.counts_by_type().await.unwrap();
    assert_eq!(counts.get(&RecordType::Skill).map(|c| c.count), Some(2));
    assert!(counts.get(&RecordType::Skill).unwrap().last_updated.is_some());
    assert!(!counts.contains_key(&RecordType::Project));
}

#[tokio::test]
async fn test_failed_transaction_applies_nothing() {
    let store = store();
    store.set_active("skill:a", RecordType::Skill, &json!({"v": 1})).await.unwrap();

    let result: Result<()> = store
        .transaction(|tx| {
            records::set_active(tx, "skill:a", RecordType::Skill, &json!({"v": 2}))?;
            records::set_active(tx, "skill:b", RecordType::Skill, &json!({"v": 1}))?;
            Err(DataError::Conflict("forced".to_string()))
        })
        .await;

    assert!(result.is_err());
    assert_eq!(store.get_active("skill:a").await.unwrap(), Some(json!({"v": 1})));
    assert_eq!(store.get_active("skill:b").await.unwrap(), None);
    assert_eq!(store.list_history("skill:a").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_health_check_on_open_store() {
    assert!(store().health_check().await);
}

#[test]
fn test_record_type_parse_matches_column_names() {
    for record_type in RecordType::ALL {
        assert_eq!(RecordType::parse(record_type.as_str()), Some(record_type));
    }
    assert_eq!(RecordType::parse("widget"), None);
}
