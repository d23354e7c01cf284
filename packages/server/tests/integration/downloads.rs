use crate::common::{TestApp, routes};

mod download_by_name {
    use super::*;

    #[tokio::test]
    async fn unknown_file_is_not_found() {
        let app = TestApp::spawn().await;
        app.create_student("A100").await;

        let res = app.get(&routes::download("A100", "A100-missing.pdf")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn other_students_files_are_not_served() {
        let app = TestApp::spawn().await;
        app.create_student("A100").await;
        app.create_student("B200").await;
        app.upload(
            &routes::upload("A100"),
            vec![("passportPhoto", "photo.jpg", b"mine".to_vec())],
        )
        .await;

        let res = app.get(&routes::download("B200", "A100-photo.jpg")).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn response_has_disposition_and_etag() {
        let app = TestApp::spawn().await;
        app.create_student("A100").await;
        let upload = app
            .upload(
                &routes::upload("A100"),
                vec![("marksheet_12", "twelfth.pdf", b"%PDF-12".to_vec())],
            )
            .await;
        let sha256 = upload.body["files"][0]["sha256"].as_str().unwrap().to_string();

        let download = app.download(&routes::download("A100", "A100-twelfth.pdf")).await;

        assert_eq!(download.status, 200);
        assert_eq!(download.header("content-type"), "application/pdf");
        assert!(
            download
                .header("content-disposition")
                .contains("filename=\"A100-twelfth.pdf\"")
        );
        assert_eq!(download.header("etag"), format!("\"{sha256}\""));
    }

    #[tokio::test]
    async fn matching_etag_returns_not_modified() {
        let app = TestApp::spawn().await;
        app.create_student("A100").await;
        app.upload(
            &routes::upload("A100"),
            vec![("admitCard", "admit.pdf", b"%PDF".to_vec())],
        )
        .await;
        let first = app.download(&routes::download("A100", "A100-admit.pdf")).await;

        let res = app
            .client
            .get(app.url(&routes::download("A100", "A100-admit.pdf")))
            .header("If-None-Match", first.header("etag"))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 304);
    }
}

mod field_documents {
    use super::*;

    #[tokio::test]
    async fn downloads_linked_document() {
        let app = TestApp::spawn().await;
        app.create_student("A100").await;
        app.upload(
            &routes::upload("A100"),
            vec![("categoryCertificate", "cert.pdf", b"certificate".to_vec())],
        )
        .await;

        let download = app
            .download(&routes::document("A100", "categoryCertificate"))
            .await;

        assert_eq!(download.status, 200);
        assert_eq!(download.bytes, b"certificate");
    }

    #[tokio::test]
    async fn unlinked_field_is_not_found() {
        let app = TestApp::spawn().await;
        app.create_student("A100").await;

        let res = app.get(&routes::document("A100", "admitCard")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn unknown_field_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_student("A100").await;

        let res = app.get(&routes::document("A100", "resume")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "UNKNOWN_FIELD_TAG");
    }

    #[tokio::test]
    async fn unknown_student_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::document("GHOST", "admitCard")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "RECORD_NOT_FOUND");
    }

    #[tokio::test]
    async fn listing_marks_linked_documents() {
        let app = TestApp::spawn().await;
        app.create_student("A100").await;
        app.upload(
            &routes::upload("A100"),
            vec![("passportPhoto", "old.jpg", b"old".to_vec())],
        )
        .await;
        app.upload(
            &routes::upload("A100"),
            vec![
                ("passportPhoto", "new.jpg", b"new".to_vec()),
                ("files", "extra.txt", b"extra".to_vec()),
            ],
        )
        .await;

        let res = app.get(&routes::documents("A100")).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let docs = res.body["documents"].as_array().unwrap();
        let summary: Vec<(&str, bool)> = docs
            .iter()
            .map(|d| {
                (
                    d["filename"].as_str().unwrap(),
                    d["linked"].as_bool().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("A100-old.jpg", false),
                ("A100-new.jpg", true),
                ("A100-extra.txt", false),
            ]
        );
        assert_eq!(
            docs[1]["downloadUrl"],
            format!("/students/A100/files/{}", docs[1]["id"].as_str().unwrap())
        );
    }

    #[tokio::test]
    async fn superseded_document_url_serves_its_own_content() {
        let app = TestApp::spawn().await;
        app.create_student("A100").await;
        for content in [b"first".to_vec(), b"second".to_vec()] {
            let res = app
                .upload(
                    &routes::upload("A100"),
                    vec![("passportPhoto", "photo.jpg", content)],
                )
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
        }

        let res = app.get(&routes::documents("A100")).await;
        let docs = res.body["documents"].as_array().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["linked"], false);

        let old = app.download(docs[0]["downloadUrl"].as_str().unwrap()).await;
        assert_eq!(old.status, 200);
        assert_eq!(old.bytes, b"first");
        let current = app.download(docs[1]["downloadUrl"].as_str().unwrap()).await;
        assert_eq!(current.bytes, b"second");

        // By name, the newest upload still wins.
        let by_name = app.download(&routes::download("A100", "photo.jpg")).await;
        assert_eq!(by_name.bytes, b"second");
    }

    #[tokio::test]
    async fn blob_url_is_scoped_to_its_student() {
        let app = TestApp::spawn().await;
        app.create_student("A100").await;
        let res = app
            .upload(
                &routes::upload("A100"),
                vec![("admitCard", "admit.pdf", b"pdf".to_vec())],
            )
            .await;
        let id = res.body["files"][0]["id"].as_str().unwrap().to_string();

        let res = app.get(&format!("/students/B200/files/{id}")).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");

        let res = app.get("/students/A100/files/not-an-id").await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn listing_requires_student() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::documents("GHOST")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "RECORD_NOT_FOUND");
    }
}

mod store_unavailable {
    use super::*;

    #[tokio::test]
    async fn downloads_wait_for_blob_store() {
        let app = TestApp::spawn_without_blob_store().await;
        app.create_student("A100").await;

        let res = app.get(&routes::download("A100", "A100-photo.jpg")).await;

        assert_eq!(res.status, 503);
        assert_eq!(res.code(), "STORE_UNAVAILABLE");
    }
}
