use crate::domain::entities::OtpRecord;
use crate::errors::StoreError;
use crate::repositories::otp_record::{MockOtpRecordRepository, OtpRecordRepository};

#[tokio::test]
async fn test_put_then_get() {
    let repo = MockOtpRecordRepository::new();
    let record = OtpRecord::new("T1", "123456", "a@b.com", 1_000);

    repo.put(&record).await.unwrap();

    let found = repo.get("T1_123456").await.unwrap();
    assert_eq!(found, Some(record));
    assert_eq!(repo.write_count(), 1);
}

#[tokio::test]
async fn test_put_rejects_existing_key() {
    let repo = MockOtpRecordRepository::new();
    let record = OtpRecord::new("T1", "123456", "a@b.com", 1_000);

    repo.put(&record).await.unwrap();
    let result = repo.put(&record).await;

    assert_eq!(
        result,
        Err(StoreError::Conflict {
            key: "T1_123456".to_string()
        })
    );
    assert_eq!(repo.write_count(), 1);
}

#[tokio::test]
async fn test_failure_injection() {
    let repo = MockOtpRecordRepository::new();
    repo.set_should_fail(true);

    let result = repo.get("T1_123456").await;
    assert!(matches!(result, Err(StoreError::Unavailable { .. })));
}
