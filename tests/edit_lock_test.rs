mod common;

use goodsin_api::errors::ServiceError;
use goodsin_api::services::edit_locks::{EditLockService, LockGrant};

use common::{seed_shipment, setup_db};

#[tokio::test]
async fn acquire_extend_release_cycle() {
    let db = setup_db().await;
    let svc = EditLockService::new(db.clone(), None);
    let id = seed_shipment(&db, "purchase_order", "outlet-dst", &[("p", 1)]).await;

    // First acquire creates the lock.
    let grant = svc.acquire(id, 7, "session-a").await.unwrap();
    assert_eq!(grant, LockGrant::Created);

    // Same holder re-acquiring refreshes instead of conflicting.
    let grant = svc.acquire(id, 7, "session-a").await.unwrap();
    assert_eq!(grant, LockGrant::Extended);

    // Explicit extension succeeds while the lock is live.
    assert!(svc.extend(id, 7, "session-a").await.unwrap());

    // A different editor is refused and told who holds it.
    let err = svc.acquire(id, 8, "session-b").await.unwrap_err();
    match err {
        ServiceError::LockHeld { holder, .. } => assert_eq!(holder, 7),
        other => panic!("expected LockHeld, got {:?}", other),
    }

    // Release frees the shipment for the next editor.
    svc.release(id, 7, "session-a").await.unwrap();
    let grant = svc.acquire(id, 8, "session-b").await.unwrap();
    assert_eq!(grant, LockGrant::Created);
}

#[tokio::test]
async fn extend_requires_matching_live_lock() {
    let db = setup_db().await;
    let svc = EditLockService::new(db.clone(), None);
    let id = seed_shipment(&db, "purchase_order", "outlet-dst", &[("p", 1)]).await;

    // Nothing to extend yet.
    assert!(!svc.extend(id, 7, "session-a").await.unwrap());

    svc.acquire(id, 7, "session-a").await.unwrap();

    // Wrong identity or session never extends someone else's lock.
    assert!(!svc.extend(id, 8, "session-a").await.unwrap());
    assert!(!svc.extend(id, 7, "session-b").await.unwrap());

    // Released locks are not extendable either.
    svc.release(id, 7, "session-a").await.unwrap();
    assert!(!svc.extend(id, 7, "session-a").await.unwrap());
}

#[tokio::test]
async fn same_staff_different_session_conflicts() {
    let db = setup_db().await;
    let svc = EditLockService::new(db.clone(), None);
    let id = seed_shipment(&db, "purchase_order", "outlet-dst", &[("p", 1)]).await;

    svc.acquire(id, 7, "desk-terminal").await.unwrap();
    // The same person on a second device still conflicts: the session owns
    // the lock, not the staff id alone.
    let err = svc.acquire(id, 7, "phone").await.unwrap_err();
    assert!(matches!(err, ServiceError::LockHeld { .. }));
}
