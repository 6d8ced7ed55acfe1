mod common;

use std::sync::Arc;

use common::RecordingNotifier;
use marketplace::db::{CodeKey, Store};
use marketplace::domain::{ActorKind, OtpPurpose};
use marketplace::services::otp::Recipient;
use marketplace::services::{OtpError, OtpService};

struct Fixture {
    store: Store,
    notifier: Arc<RecordingNotifier>,
    path: std::path::PathBuf,
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

async fn fixture() -> Fixture {
    let path = std::env::temp_dir().join(format!("marketplace-otp-{}.db", uuid::Uuid::new_v4()));
    let store = Store::new(&format!("sqlite:{}", path.display()))
        .await
        .unwrap();
    Fixture {
        store,
        notifier: Arc::new(RecordingNotifier::default()),
        path,
    }
}

const KEY: CodeKey<'static> = CodeKey {
    subject: "person@x.com",
    purpose: OtpPurpose::EmailVerification,
    actor_kind: ActorKind::Customer,
};

fn recipient() -> Recipient {
    Recipient {
        email: "person@x.com".to_string(),
        name: Some("Person".to_string()),
        context: Vec::new(),
    }
}

#[tokio::test]
async fn test_reissue_supersedes_previous_code() {
    let fx = fixture().await;
    let otp = OtpService::new(fx.notifier.clone(), 600);

    otp.issue(&fx.store.conn, KEY, recipient(), None).await.unwrap();
    let first = fx.notifier.last_code("person@x.com", OtpPurpose::EmailVerification);

    otp.issue(&fx.store.conn, KEY, recipient(), None).await.unwrap();
    let second = fx.notifier.last_code("person@x.com", OtpPurpose::EmailVerification);

    if first != second {
        assert!(matches!(
            otp.validate(&fx.store.conn, KEY, &first).await,
            Err(OtpError::InvalidOrExpiredCode)
        ));
    }
    assert!(otp.validate(&fx.store.conn, KEY, &second).await.is_ok());
}

#[tokio::test]
async fn test_consumed_code_cannot_be_reused() {
    let fx = fixture().await;
    let otp = OtpService::new(fx.notifier.clone(), 600);

    otp.issue(&fx.store.conn, KEY, recipient(), Some("payload".to_string()))
        .await
        .unwrap();
    let code = fx.notifier.last_code("person@x.com", OtpPurpose::EmailVerification);

    let payload = otp.validate(&fx.store.conn, KEY, &code).await.unwrap();
    assert_eq!(payload.as_deref(), Some("payload"));

    assert!(matches!(
        otp.validate(&fx.store.conn, KEY, &code).await,
        Err(OtpError::InvalidOrExpiredCode)
    ));
}

#[tokio::test]
async fn test_expired_code_fails_and_is_purged() {
    let fx = fixture().await;
    let otp = OtpService::new(fx.notifier.clone(), 0);

    otp.issue(&fx.store.conn, KEY, recipient(), None).await.unwrap();
    let code = fx.notifier.last_code("person@x.com", OtpPurpose::EmailVerification);

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    assert!(matches!(
        otp.validate(&fx.store.conn, KEY, &code).await,
        Err(OtpError::InvalidOrExpiredCode)
    ));
    assert_eq!(OtpService::purge_expired(&fx.store.conn).await.unwrap(), 1);
    assert_eq!(OtpService::purge_expired(&fx.store.conn).await.unwrap(), 0);
}

#[tokio::test]
async fn test_code_is_bound_to_purpose_and_actor() {
    let fx = fixture().await;
    let otp = OtpService::new(fx.notifier.clone(), 600);

    otp.issue(&fx.store.conn, KEY, recipient(), None).await.unwrap();
    let code = fx.notifier.last_code("person@x.com", OtpPurpose::EmailVerification);

    let as_seller = CodeKey {
        actor_kind: ActorKind::Seller,
        ..KEY
    };
    let as_reset = CodeKey {
        purpose: OtpPurpose::PasswordReset,
        ..KEY
    };
    assert!(otp.validate(&fx.store.conn, as_seller, &code).await.is_err());
    assert!(otp.validate(&fx.store.conn, as_reset, &code).await.is_err());
    assert!(otp.validate(&fx.store.conn, KEY, &code).await.is_ok());
}

#[tokio::test]
async fn test_malformed_codes_are_rejected() {
    let fx = fixture().await;
    let otp = OtpService::new(fx.notifier.clone(), 600);
    otp.issue(&fx.store.conn, KEY, recipient(), None).await.unwrap();

    for bad in ["", "12345", "1234567", "abcdef"] {
        assert!(matches!(
            otp.validate(&fx.store.conn, KEY, bad).await,
            Err(OtpError::InvalidOrExpiredCode)
        ));
    }
}

#[tokio::test]
async fn test_concurrent_validation_succeeds_once() {
    let fx = fixture().await;
    let otp = OtpService::new(fx.notifier.clone(), 600);

    otp.issue(&fx.store.conn, KEY, recipient(), None).await.unwrap();
    let code = fx.notifier.last_code("person@x.com", OtpPurpose::EmailVerification);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let otp = otp.clone();
        let conn = fx.store.conn.clone();
        let code = code.clone();
        handles.push(tokio::spawn(async move {
            otp.validate(&conn, KEY, &code).await.is_ok()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_failed_delivery_leaves_no_code() {
    use sea_orm::{EntityTrait, PaginatorTrait, TransactionTrait};

    let fx = fixture().await;
    let otp = OtpService::new(fx.notifier.clone(), 600);

    fx.notifier.set_failing(true);
    let txn = fx.store.conn.begin().await.unwrap();
    let result = otp.issue(&txn, KEY, recipient(), None).await;
    assert!(matches!(result, Err(OtpError::Notification(_))));
    txn.rollback().await.unwrap();

    let stored = marketplace::entities::one_time_codes::Entity::find()
        .count(&fx.store.conn)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}
