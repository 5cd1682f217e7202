use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};

use ekpool_domain::audit::CodeAction;
use ekpool_domain::family::Family;
use ekpool_domain::pagination::PageRequest;
use ekpool_pool::domain::repository::CodeLedger;
use ekpool_pool::domain::types::{AuditFilter, Claim};
use ekpool_pool::infra::memory::MemoryStore;
use ekpool_pool::usecase::audit::{GetAuditBoundsUseCase, QueryAuditLogUseCase};

use crate::helpers::{actor, at, seed};

/// Store whose clock the test moves by hand.
fn store_at(start: DateTime<Utc>) -> (MemoryStore, Arc<Mutex<DateTime<Utc>>>) {
    let now = Arc::new(Mutex::new(start));
    let clock = Arc::clone(&now);
    let store = MemoryStore::with_clock(Arc::new(move || *clock.lock().unwrap()));
    (store, now)
}

/// Three days of activity: ADDED on Feb 1, RESERVED on Feb 2, DELETED on Feb 3.
async fn seeded_store() -> MemoryStore {
    let (store, now) = store_at(at(2025, 2, 1, 10));
    seed(&store, Family::Common, None, &["EK-ALPHA", "EK-BETA"]).await;

    *now.lock().unwrap() = at(2025, 2, 2, 23);
    store
        .claim_available(&Claim {
            family: Family::Common,
            country: None,
            region: None,
            tester_name: "Alice".to_owned(),
            actor: actor(1, "Team-Alpha"),
        })
        .await
        .unwrap();

    *now.lock().unwrap() = at(2025, 2, 3, 0);
    store.remove("EK-BETA", &actor(100, "admin")).await.unwrap();
    store
}

fn query(store: &MemoryStore) -> QueryAuditLogUseCase<MemoryStore> {
    QueryAuditLogUseCase {
        repo: store.clone(),
    }
}

#[tokio::test]
async fn should_return_newest_first_with_total_count() {
    let store = seeded_store().await;

    let page = query(&store)
        .execute(AuditFilter::default(), PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total_count, 4);
    let actions: Vec<CodeAction> = page.items.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            CodeAction::Deleted,
            CodeAction::Reserved,
            CodeAction::Added,
            CodeAction::Added
        ]
    );
    assert_eq!(page.items[2].code, "EK-BETA");
}

#[tokio::test]
async fn should_match_code_and_user_substrings_case_insensitively() {
    let store = seeded_store().await;

    let page = query(&store)
        .execute(
            AuditFilter {
                code: Some("alp".to_owned()),
                user_name: Some("team-ALPHA".to_owned()),
                ..AuditFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].action, CodeAction::Reserved);
    assert_eq!(page.items[0].tester_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn should_ignore_blank_text_filters() {
    let store = seeded_store().await;

    let page = query(&store)
        .execute(
            AuditFilter {
                code: Some("   ".to_owned()),
                ..AuditFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total_count, 4);
}

#[tokio::test]
async fn should_treat_date_bounds_as_inclusive_days() {
    let store = seeded_store().await;

    let page = query(&store)
        .execute(
            AuditFilter {
                start_date: NaiveDate::from_ymd_opt(2025, 2, 2),
                end_date: NaiveDate::from_ymd_opt(2025, 2, 2),
                ..AuditFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].action, CodeAction::Reserved);

    let page = query(&store)
        .execute(
            AuditFilter {
                start_date: NaiveDate::from_ymd_opt(2025, 2, 3),
                ..AuditFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].action, CodeAction::Deleted);
}

#[tokio::test]
async fn should_combine_action_filter_with_paging() {
    let store = seeded_store().await;
    let request = PageRequest {
        page: 2,
        page_size: 1,
    };

    let page = query(&store)
        .execute(
            AuditFilter {
                action: Some(CodeAction::Added),
                ..AuditFilter::default()
            },
            request,
        )
        .await
        .unwrap();

    assert_eq!(page.total_count, 2);
    assert_eq!(page.total_pages(request), 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].code, "EK-ALPHA");
}

#[tokio::test]
async fn should_report_oldest_and_newest_entry() {
    let store = seeded_store().await;

    let bounds = GetAuditBoundsUseCase { repo: store }.execute().await.unwrap();
    assert_eq!(bounds.oldest, Some(at(2025, 2, 1, 10)));
    assert_eq!(bounds.newest, Some(at(2025, 2, 3, 0)));
}

#[tokio::test]
async fn should_report_no_bounds_for_empty_log() {
    let bounds = GetAuditBoundsUseCase {
        repo: MemoryStore::new(),
    }
    .execute()
    .await
    .unwrap();
    assert!(bounds.oldest.is_none());
    assert!(bounds.newest.is_none());
}
