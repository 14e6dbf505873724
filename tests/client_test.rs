//! Tests for DriveClient with mocked HTTP responses.

use futures::TryStreamExt;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

use drive_cli::models::{NewFile, Permission, FOLDER_MIME_TYPE};
use drive_cli::service::UploadContent;
use drive_cli::{Authenticator, DriveClient, DriveError, FileService};

const TOKEN: &str = "test-token";

fn client_for(server: &ServerGuard) -> DriveClient {
    let base = server.url();
    DriveClient::with_endpoints(
        Authenticator::from_token(TOKEN),
        &base,
        &format!("{}/upload", base),
    )
}

mod files {
    use super::*;

    #[tokio::test]
    async fn test_list_files_sends_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/files")
            .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "title contains 'report'".into()),
                Matcher::UrlEncoded("maxResults".into(), "5".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "items": [
                        {"id": "f1", "title": "report.pdf", "fileSize": "2048",
                         "downloadUrl": "https://example.com/f1"},
                        {"id": "f2", "title": "reports", "mimeType": FOLDER_MIME_TYPE,
                         "labels": {"trashed": true}}
                    ],
                    "nextPageToken": "ignored"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let files = client
            .list_files(Some("title contains 'report'"), Some(5))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_size, Some(2048));
        assert!(files[1].labels.trashed);
    }

    #[tokio::test]
    async fn test_get_file_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/files/missing")
            .with_status(404)
            .with_body(
                json!({"error": {"code": 404, "message": "File not found: missing"}}).to_string(),
            )
            .create_async()
            .await;

        let err = client_for(&server).get_file("missing").await.unwrap_err();
        match err {
            DriveError::ApiError { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "File not found: missing");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_without_envelope() {
        let mut server = Server::new_async().await;
        server
            .mock("DELETE", "/files/abc")
            .with_status(503)
            .with_body("backend unavailable")
            .create_async()
            .await;

        let err = client_for(&server).delete_file("abc").await.unwrap_err();
        assert!(matches!(
            err,
            DriveError::ApiError { status: 503, ref message } if message == "backend unavailable"
        ));
    }

    #[tokio::test]
    async fn test_delete_file() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/files/abc")
            .with_status(204)
            .create_async()
            .await;

        client_for(&server).delete_file("abc").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_folder() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/files")
            .match_query(Matcher::UrlEncoded("convert".into(), "false".into()))
            .match_body(Matcher::PartialJson(json!({
                "title": "Backups",
                "mimeType": FOLDER_MIME_TYPE,
                "parents": [{"id": "p1"}]
            })))
            .with_status(200)
            .with_body(
                json!({"id": "new1", "title": "Backups", "mimeType": FOLDER_MIME_TYPE}).to_string(),
            )
            .create_async()
            .await;

        let folder = client_for(&server)
            .insert_file(NewFile::folder("Backups").with_parent(Some("p1")), None, false)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(folder.id, "new1");
        assert!(folder.is_folder());
    }

    #[tokio::test]
    async fn test_upload_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/upload/files")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("uploadType".into(), "multipart".into()),
                Matcher::UrlEncoded("convert".into(), "true".into()),
            ]))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("\"title\":\"notes.txt\"".into()),
                Matcher::Regex("hello drive".into()),
            ]))
            .with_status(200)
            .with_body(json!({"id": "up1", "title": "notes.txt", "fileSize": "11"}).to_string())
            .create_async()
            .await;

        let content: UploadContent = Box::new(std::io::Cursor::new(b"hello drive".to_vec()));
        let record = client_for(&server)
            .insert_file(
                NewFile::new("notes.txt").with_mime_type("text/plain"),
                Some(content),
                true,
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(record.file_size, Some(11));
    }

    #[tokio::test]
    async fn test_http_get_streams_content() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/content/abc")
            .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
            .with_status(200)
            .with_body(vec![1u8, 2, 3, 4, 5])
            .create_async()
            .await;

        let client = client_for(&server);
        let stream = client
            .http_get(&format!("{}/content/abc", server.url()))
            .await
            .unwrap();
        let chunks: Vec<bytes::Bytes> = stream.try_collect().await.unwrap();

        assert_eq!(chunks.concat(), vec![1u8, 2, 3, 4, 5]);
    }
}

mod permissions {
    use super::*;

    #[tokio::test]
    async fn test_is_shared() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/files/pub/permissions")
            .with_status(200)
            .with_body(
                json!({"items": [
                    {"id": "owner1", "type": "user", "role": "owner"},
                    {"id": "anyone", "type": "anyone", "role": "reader"}
                ]})
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/files/priv/permissions")
            .with_status(200)
            .with_body(json!({"items": [{"id": "owner1", "type": "user", "role": "owner"}]}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(client.is_shared("pub").await.unwrap());
        assert!(!client.is_shared("priv").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_anyone_permission() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/files/abc/permissions")
            .match_body(Matcher::Json(json!({
                "type": "anyone",
                "role": "reader",
                "value": "me"
            })))
            .with_status(200)
            .with_body(json!({"id": "anyone", "type": "anyone", "role": "reader"}).to_string())
            .create_async()
            .await;

        let created = client_for(&server)
            .insert_permission("abc", &Permission::anyone_reader())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created.id.as_deref(), Some("anyone"));
    }

    #[tokio::test]
    async fn test_delete_anyone_permission() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/files/abc/permissions/anyone")
            .with_status(204)
            .create_async()
            .await;

        client_for(&server)
            .delete_permission("abc", "anyone")
            .await
            .unwrap();
        mock.assert_async().await;
    }
}

mod credentials {
    use super::*;

    #[test]
    fn test_authenticator_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let creds_json = json!({
            "client_email": "test@project.iam.gserviceaccount.com",
            "private_key": "key"
        });

        temp_file.write_all(creds_json.to_string().as_bytes()).unwrap();

        let auth = Authenticator::from_file(temp_file.path());
        assert!(auth.is_ok());
    }

    #[test]
    fn test_authenticator_from_invalid_file() {
        let auth = Authenticator::from_file("/nonexistent/path/credentials.json");
        assert!(matches!(auth, Err(DriveError::Io(_))));
    }

    #[test]
    fn test_authenticator_from_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"not valid json").unwrap();

        let auth = Authenticator::from_file(temp_file.path());
        assert!(matches!(auth, Err(DriveError::Json(_))));
    }
}
