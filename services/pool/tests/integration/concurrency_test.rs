use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::join_all;

use ekpool_domain::audit::CodeAction;
use ekpool_domain::family::Family;
use ekpool_domain::pagination::PageRequest;
use ekpool_pool::domain::repository::{AuditLogRepository, CodeLedger};
use ekpool_pool::domain::types::{AuditFilter, Disposition, NewCode};
use ekpool_pool::error::PoolServiceError;
use ekpool_pool::infra::memory::{Clock, MemoryStore};
use ekpool_pool::usecase::release::ReturnCodeUseCase;
use ekpool_pool::usecase::reserve::{ReserveCodeInput, ReserveCodeUseCase};

use crate::helpers::{actor, at, catalog, seed};

const CODES: usize = 32;
const CALLERS: usize = 40;

async fn reserve(store: MemoryStore, caller: usize) -> Result<String, PoolServiceError> {
    let uc = ReserveCodeUseCase {
        ledger: store,
        catalog: catalog(),
    };
    uc.execute(
        actor(caller as i64, &format!("team-{caller}")),
        ReserveCodeInput {
            family: Family::Hsv,
            country: Some("Germany".to_owned()),
            tester_name: format!("tester-{caller}"),
        },
    )
    .await
    .map(|held| held.code)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_hand_out_each_code_to_exactly_one_caller() {
    let store = MemoryStore::new();
    let codes: Vec<String> = (0..CODES).map(|i| format!("DE{i:03}")).collect();
    let refs: Vec<&str> = codes.iter().map(String::as_str).collect();
    seed(&store, Family::Hsv, Some("Germany"), &refs).await;

    let handles = (0..CALLERS).map(|caller| tokio::spawn(reserve(store.clone(), caller)));
    let results: Vec<Result<String, PoolServiceError>> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let won: Vec<&String> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    let distinct: HashSet<&String> = won.iter().copied().collect();
    assert_eq!(won.len(), CODES);
    assert_eq!(distinct.len(), CODES);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(PoolServiceError::OutOfStock)))
            .count(),
        CALLERS - CODES
    );

    let counts = store.counts().await.unwrap();
    assert_eq!(counts.reserved, CODES as u64);
    assert_eq!(counts.available, 0);

    let reserved_log = store
        .query(
            &AuditFilter {
                action: Some(CodeAction::Reserved),
                ..AuditFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(reserved_log.total_count, CODES as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_release_each_code_once_under_contention() {
    let store = MemoryStore::new();
    seed(&store, Family::Common, None, &["C1"]).await;
    let code = ReserveCodeUseCase {
        ledger: store.clone(),
        catalog: catalog(),
    }
    .execute(
        actor(1, "team-1"),
        ReserveCodeInput {
            family: Family::Common,
            country: None,
            tester_name: "Alice".to_owned(),
        },
    )
    .await
    .unwrap()
    .code;

    let handles = (0..8).map(|caller| {
        let store = store.clone();
        let code = code.clone();
        tokio::spawn(async move {
            ReturnCodeUseCase { ledger: store }
                .execute(
                    actor(caller, &format!("team-{caller}")),
                    &code,
                    Disposition::Release { note: None },
                )
                .await
        })
    });
    let results: Vec<Result<(), PoolServiceError>> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(PoolServiceError::NotReserved)))
    );
    assert_eq!(store.pools().await.unwrap()[&Family::Common].available, vec!["C1"]);
}

async fn insert(store: MemoryStore, code: &str) {
    store
        .insert_available(
            &NewCode {
                code: code.to_owned(),
                family: Family::Common,
                country: None,
            },
            &actor(100, "admin"),
            "batch",
        )
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_keep_audit_ids_in_timestamp_order_when_the_clock_stalls() {
    // The first reading stalls and comes back older than every later one.
    let calls = Arc::new(AtomicUsize::new(0));
    let clock: Clock = {
        let calls = calls.clone();
        Arc::new(move || {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                std::thread::sleep(Duration::from_millis(300));
                at(2026, 10, 1, 9)
            } else {
                at(2026, 10, 1, 10)
            }
        })
    };
    let store = MemoryStore::with_clock(clock);

    let first = tokio::spawn(insert(store.clone(), "A"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = tokio::spawn(insert(store.clone(), "B"));
    first.await.unwrap();
    second.await.unwrap();

    let log = store
        .query(&AuditFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(log.total_count, 2);
    let codes: Vec<&str> = log.items.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, vec!["B", "A"]);
    assert!(
        log.items.windows(2).all(|w| w[0].id > w[1].id),
        "expected ids to follow logged_at, got {:?}",
        log.items
    );
}
