use ekpool_domain::country::Region;
use ekpool_domain::family::Family;
use ekpool_pool::error::PoolServiceError;
use ekpool_pool::infra::memory::MemoryStore;
use ekpool_pool::usecase::my_codes::GetMyCodesUseCase;
use ekpool_pool::usecase::reserve::{ReserveCodeInput, ReserveCodeUseCase};

use crate::helpers::{MockCodeLedger, actor, at, catalog, held_code, seed};

fn input(family: Family, country: Option<&str>, tester_name: &str) -> ReserveCodeInput {
    ReserveCodeInput {
        family,
        country: country.map(str::to_owned),
        tester_name: tester_name.to_owned(),
    }
}

// ── ReserveCodeUseCase (mock ledger) ─────────────────────────────────────────

#[tokio::test]
async fn should_pass_canonical_country_and_region_to_ledger() {
    let ledger = MockCodeLedger::with_next(held_code("DE1", 1, at(2025, 2, 1, 9)));
    let claims = ledger.claims_handle();
    let uc = ReserveCodeUseCase {
        ledger,
        catalog: catalog(),
    };

    let held = uc
        .execute(actor(1, "team-a"), input(Family::Hsv, Some(" germany "), "  Alice "))
        .await
        .unwrap();
    assert_eq!(held.code, "DE1");

    let claims = claims.lock().unwrap();
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].country.as_deref(), Some("Germany"));
    assert_eq!(claims[0].region, Some(Region::Europe));
    assert_eq!(claims[0].tester_name, "Alice");
    assert_eq!(claims[0].actor.user_id, 1);
}

#[tokio::test]
async fn should_reject_blank_tester_name_before_touching_ledger() {
    let ledger = MockCodeLedger::empty();
    let claims = ledger.claims_handle();
    let uc = ReserveCodeUseCase {
        ledger,
        catalog: catalog(),
    };

    let result = uc
        .execute(actor(1, "team-a"), input(Family::Common, None, "   "))
        .await;
    assert!(
        matches!(result, Err(PoolServiceError::Validation(_))),
        "expected Validation, got {result:?}"
    );
    assert!(claims.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_unknown_country() {
    let ledger = MockCodeLedger::empty();
    let claims = ledger.claims_handle();
    let uc = ReserveCodeUseCase {
        ledger,
        catalog: catalog(),
    };

    let result = uc
        .execute(actor(1, "team-a"), input(Family::Hsv, Some("Nowhereland"), "Bob"))
        .await;
    assert!(
        matches!(result, Err(PoolServiceError::InvalidCountry(ref c)) if c == "Nowhereland"),
        "expected InvalidCountry, got {result:?}"
    );
    assert!(claims.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_scoped_family_without_country() {
    let uc = ReserveCodeUseCase {
        ledger: MockCodeLedger::empty(),
        catalog: catalog(),
    };

    let result = uc
        .execute(actor(1, "team-a"), input(Family::Osv, None, "Bob"))
        .await;
    assert!(
        matches!(result, Err(PoolServiceError::InvalidCountry(_))),
        "expected InvalidCountry, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_out_of_stock_when_ledger_has_nothing() {
    let uc = ReserveCodeUseCase {
        ledger: MockCodeLedger::empty(),
        catalog: catalog(),
    };

    let result = uc
        .execute(actor(1, "team-a"), input(Family::Common, Some(""), "Alice"))
        .await;
    assert!(
        matches!(result, Err(PoolServiceError::OutOfStock)),
        "expected OutOfStock, got {result:?}"
    );
}

// ── ReserveCodeUseCase (memory store) ────────────────────────────────────────

#[tokio::test]
async fn should_reserve_codes_in_pool_order() {
    let store = MemoryStore::new();
    seed(&store, Family::Common, None, &["C1", "C2"]).await;
    let uc = ReserveCodeUseCase {
        ledger: store.clone(),
        catalog: catalog(),
    };

    let first = uc
        .execute(actor(1, "team-a"), input(Family::Common, None, "Alice"))
        .await
        .unwrap();
    let second = uc
        .execute(actor(2, "team-b"), input(Family::Common, Some("France"), "Bob"))
        .await
        .unwrap();
    assert_eq!(first.code, "C1");
    assert_eq!(second.code, "C2");
    assert_eq!(second.country.as_deref(), Some("France"));

    let result = uc
        .execute(actor(1, "team-a"), input(Family::Common, None, "Alice"))
        .await;
    assert!(
        matches!(result, Err(PoolServiceError::OutOfStock)),
        "expected OutOfStock, got {result:?}"
    );
}

#[tokio::test]
async fn should_only_draw_codes_added_for_requested_country() {
    let store = MemoryStore::new();
    seed(&store, Family::Hsv, Some("France"), &["FR1"]).await;
    let uc = ReserveCodeUseCase {
        ledger: store.clone(),
        catalog: catalog(),
    };

    let result = uc
        .execute(actor(1, "team-a"), input(Family::Hsv, Some("Germany"), "Alice"))
        .await;
    assert!(
        matches!(result, Err(PoolServiceError::OutOfStock)),
        "expected OutOfStock, got {result:?}"
    );

    let held = uc
        .execute(actor(1, "team-a"), input(Family::Hsv, Some("FRANCE"), "Alice"))
        .await
        .unwrap();
    assert_eq!(held.code, "FR1");
}

// ── GetMyCodesUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_own_codes_newest_first() {
    let uc = GetMyCodesUseCase {
        ledger: MockCodeLedger::holding(vec![
            held_code("OLD", 1, at(2025, 2, 1, 9)),
            held_code("OTHER", 2, at(2025, 2, 2, 9)),
            held_code("NEW", 1, at(2025, 2, 3, 9)),
        ]),
    };

    let held = uc.execute(1).await.unwrap();
    let codes: Vec<&str> = held.iter().map(|h| h.code.as_str()).collect();
    assert_eq!(codes, vec!["NEW", "OLD"]);
}
