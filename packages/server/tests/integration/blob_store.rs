use std::sync::Arc;

use admissions::storage::database::DatabaseBlobStore;
use common::DocumentField;
use common::storage::{BlobId, BlobStore, NewBlob, StorageError};

use crate::common::fresh_database;

async fn store(chunk_size: u32, max_size: u64) -> Arc<dyn BlobStore> {
    let (db, _) = fresh_database().await;
    Arc::new(DatabaseBlobStore::new(db, chunk_size, max_size))
}

fn blob(app: &str, original: &str, tag: Option<DocumentField>) -> NewBlob {
    NewBlob::for_upload(app, original, tag, None)
}

#[tokio::test]
async fn chunked_content_round_trips() {
    let store = store(4, 1024).await;
    let data = b"0123456789abcdefXYZ".to_vec();

    let info = store
        .upload(blob("A100", "digits.txt", Some(DocumentField::AdmitCard)), &data)
        .await
        .unwrap();

    assert_eq!(info.length, data.len() as u64);
    assert_eq!(info.filename, "A100-digits.txt");
    assert_eq!(info.metadata.field_tag, Some(DocumentField::AdmitCard));
    assert_eq!(store.download(&info.id).await.unwrap(), data);
    assert_eq!(store.info(&info.id).await.unwrap(), info);
}

#[tokio::test]
async fn hash_matches_content() {
    let store = store(8, 1024).await;

    let info = store
        .upload(blob("A100", "a.txt", None), b"abc")
        .await
        .unwrap();

    assert_eq!(
        info.sha256,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[tokio::test]
async fn size_limit_leaves_no_rows() {
    let store = store(4, 10).await;

    let err = store
        .upload(blob("A100", "big.bin", None), &[7u8; 11])
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::SizeLimitExceeded { limit: 10, .. }));
    assert!(store.list_for_application("A100").await.unwrap().is_empty());
}

#[tokio::test]
async fn find_by_name_prefers_latest_and_respects_scope() {
    let store = store(1024, 1024).await;
    let first = store
        .upload(blob("A100", "photo.jpg", None), b"first")
        .await
        .unwrap();
    let second = store
        .upload(blob("A100", "photo.jpg", None), b"second")
        .await
        .unwrap();

    let found = store.find_by_name("A100-photo.jpg", None).await.unwrap().unwrap();
    assert_eq!(found.id, second.id);
    assert_ne!(found.id, first.id);

    assert!(
        store
            .find_by_name("A100-photo.jpg", Some("B200"))
            .await
            .unwrap()
            .is_none()
    );
    assert!(store.find_by_name("missing", None).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_removes_descriptor_and_chunks() {
    let store = store(2, 1024).await;
    let info = store
        .upload(blob("A100", "x.bin", None), b"abcdef")
        .await
        .unwrap();

    assert!(store.delete(&info.id).await.unwrap());
    assert!(!store.delete(&info.id).await.unwrap());
    assert!(matches!(
        store.info(&info.id).await,
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        store.open_download_stream(&info.id).await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let store = store(16, 1024).await;

    assert!(matches!(
        store.info(&BlobId::generate()).await,
        Err(StorageError::NotFound(_))
    ));
}
