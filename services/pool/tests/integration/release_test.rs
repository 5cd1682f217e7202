use ekpool_domain::audit::CodeAction;
use ekpool_domain::family::Family;
use ekpool_domain::pagination::PageRequest;
use ekpool_pool::domain::repository::{AuditLogRepository, CodeLedger};
use ekpool_pool::domain::types::{AuditFilter, Disposition, ReturnOutcome};
use ekpool_pool::error::PoolServiceError;
use ekpool_pool::infra::memory::MemoryStore;
use ekpool_pool::usecase::release::ReturnCodeUseCase;
use ekpool_pool::usecase::reserve::{ReserveCodeInput, ReserveCodeUseCase};

use crate::helpers::{MockCodeLedger, actor, catalog, seed};

fn release(note: Option<&str>) -> Disposition {
    Disposition::Release {
        note: note.map(str::to_owned),
    }
}

fn clear(clearance_id: &str) -> Disposition {
    Disposition::Clear {
        clearance_id: clearance_id.to_owned(),
    }
}

async fn reserve_common(store: &MemoryStore) -> String {
    let uc = ReserveCodeUseCase {
        ledger: store.clone(),
        catalog: catalog(),
    };
    uc.execute(
        actor(1, "team-a"),
        ReserveCodeInput {
            family: Family::Common,
            country: None,
            tester_name: "Alice".to_owned(),
        },
    )
    .await
    .unwrap()
    .code
}

// ── ReturnCodeUseCase (mock ledger) ──────────────────────────────────────────

#[tokio::test]
async fn should_normalize_code_and_trim_note() {
    let ledger = MockCodeLedger::empty();
    let returns = ledger.returns_handle();
    let uc = ReturnCodeUseCase { ledger };

    uc.execute(actor(1, "team-a"), " ek-12 ", release(Some("  done  ")))
        .await
        .unwrap();

    let returns = returns.lock().unwrap();
    assert_eq!(returns[0].0, "EK-12");
    assert_eq!(returns[0].1, release(Some("done")));
}

#[tokio::test]
async fn should_drop_blank_release_note() {
    let ledger = MockCodeLedger::empty();
    let returns = ledger.returns_handle();
    let uc = ReturnCodeUseCase { ledger };

    uc.execute(actor(1, "team-a"), "EK-12", release(Some("   ")))
        .await
        .unwrap();

    assert_eq!(returns.lock().unwrap()[0].1, release(None));
}

#[tokio::test]
async fn should_require_clearance_id() {
    let ledger = MockCodeLedger::empty();
    let returns = ledger.returns_handle();
    let uc = ReturnCodeUseCase { ledger };

    let result = uc.execute(actor(1, "team-a"), "EK-12", clear("  ")).await;
    assert!(
        matches!(result, Err(PoolServiceError::Validation(_))),
        "expected Validation, got {result:?}"
    );
    assert!(returns.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_map_ledger_outcomes_to_errors() {
    let uc = ReturnCodeUseCase {
        ledger: MockCodeLedger::returning(ReturnOutcome::NotReserved),
    };
    let result = uc.execute(actor(1, "team-a"), "EK-12", release(None)).await;
    assert!(
        matches!(result, Err(PoolServiceError::NotReserved)),
        "expected NotReserved, got {result:?}"
    );

    let uc = ReturnCodeUseCase {
        ledger: MockCodeLedger::returning(ReturnOutcome::NotFound),
    };
    let result = uc.execute(actor(1, "team-a"), "EK-12", release(None)).await;
    assert!(
        matches!(result, Err(PoolServiceError::NotFound)),
        "expected NotFound, got {result:?}"
    );
}

// ── ReturnCodeUseCase (memory store) ─────────────────────────────────────────

#[tokio::test]
async fn should_make_released_code_reservable_again() {
    let store = MemoryStore::new();
    seed(&store, Family::Common, None, &["C1"]).await;
    let code = reserve_common(&store).await;

    let uc = ReturnCodeUseCase {
        ledger: store.clone(),
    };
    uc.execute(actor(2, "team-b"), &code, release(Some("tested")))
        .await
        .unwrap();

    let again = reserve_common(&store).await;
    assert_eq!(again, "C1");
}

#[tokio::test]
async fn should_reject_second_release() {
    let store = MemoryStore::new();
    seed(&store, Family::Common, None, &["C1"]).await;
    let code = reserve_common(&store).await;
    let uc = ReturnCodeUseCase {
        ledger: store.clone(),
    };

    uc.execute(actor(1, "team-a"), &code, release(None))
        .await
        .unwrap();
    let result = uc.execute(actor(1, "team-a"), &code, release(None)).await;
    assert!(
        matches!(result, Err(PoolServiceError::NotReserved)),
        "expected NotReserved, got {result:?}"
    );
}

#[tokio::test]
async fn should_retire_cleared_code_for_good() {
    let store = MemoryStore::new();
    seed(&store, Family::Common, None, &["C1"]).await;
    let code = reserve_common(&store).await;
    let uc = ReturnCodeUseCase {
        ledger: store.clone(),
    };

    uc.execute(actor(1, "team-a"), &code, clear("CLR-0042"))
        .await
        .unwrap();

    let pools = store.pools().await.unwrap();
    assert!(pools[&Family::Common].available.is_empty());
    assert!(pools[&Family::Common].reserved.is_empty());
    let result = uc.execute(actor(1, "team-a"), &code, release(None)).await;
    assert!(
        matches!(result, Err(PoolServiceError::NotFound)),
        "expected NotFound, got {result:?}"
    );

    let log = store
        .query(
            &AuditFilter {
                action: Some(CodeAction::Released),
                ..AuditFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(log.total_count, 1);
    assert_eq!(log.items[0].note.as_deref(), Some("CLR-0042"));
    assert_eq!(log.items[0].acting_user, "team-a");
}

#[tokio::test]
async fn should_write_exactly_one_entry_per_mutation() {
    let store = MemoryStore::new();
    seed(&store, Family::Common, None, &["C1"]).await;
    let code = reserve_common(&store).await;
    ReturnCodeUseCase {
        ledger: store.clone(),
    }
    .execute(actor(1, "team-a"), &code, release(None))
    .await
    .unwrap();

    let log = store
        .query(&AuditFilter::default(), PageRequest::default())
        .await
        .unwrap();
    let actions: Vec<CodeAction> = log.items.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![CodeAction::Released, CodeAction::Reserved, CodeAction::Added]
    );
    assert_eq!(log.items[1].tester_name.as_deref(), Some("Alice"));
    assert!(log.items[0].tester_name.is_none());
}
