fn main() {
    println!("Run `cargo test -p upload-e2e` to execute the end-to-end upload tests.");
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::time::Duration;

    use droplift_api_client::{Client, UploadOptions};
    use droplift_transfer::{
        FileDescriptor, STREAMING_THRESHOLD, TransferProfile, TransferStrategy,
    };
    use droplift_uploader::test_support::{Behavior, MockBackend, body_of};
    use droplift_uploader::{UploadOrchestrator, UploadQueue};

    fn png_file(len: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&vec![0x42u8; len]).unwrap();
        file.flush().unwrap();
        file
    }

    fn orchestrator(backend: &MockBackend, token: &str) -> UploadOrchestrator {
        let client = Client::new(&backend.url, token).unwrap();
        UploadOrchestrator::new(client, TransferProfile::Medium, UploadOptions::default())
            .unwrap()
    }

    #[tokio::test]
    async fn buffered_round_trip_hits_the_full_wire_contract() {
        let backend = MockBackend::spawn(Behavior::default()).await;
        let file = png_file(256 * 1024);

        let orch = orchestrator(&backend, "e2e-token");
        let result = orch.run(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(result.remote_id, "f_1");
        assert_eq!(result.url, "https://cdn.example/f_1");

        // Phase 1: JSON body with camelCase fields and the bearer token.
        let phase1 = backend.find("POST /files/presigned-url").unwrap();
        assert!(
            phase1
                .to_ascii_lowercase()
                .contains("authorization: bearer e2e-token")
        );
        let body: serde_json::Value = serde_json::from_str(body_of(&phase1)).unwrap();
        assert!(body["filename"].as_str().unwrap().ends_with(".png"));
        assert_eq!(body["contentType"], "image/png");
        assert_eq!(body["fileSize"], 256 * 1024);
        assert_eq!(body["preserveFilename"], false);

        // Byte transfer: raw PUT with length and type headers, no JSON wrapper.
        let put = backend.find("PUT /put/k-0").unwrap();
        let put_lower = put.to_ascii_lowercase();
        assert!(put_lower.contains(&format!("content-length: {}", 256 * 1024)));
        assert!(put_lower.contains("content-type: image/png"));

        // Phase 2: keyed finalize carrying the remaining options. The
        // hyphen in the key is percent-encoded on the wire.
        let phase2 = backend.find("POST /files/complete-upload/k%2D0").unwrap();
        let body: serde_json::Value = serde_json::from_str(body_of(&phase2)).unwrap();
        assert_eq!(body["generateThumbnails"], false);
        assert_eq!(body["isPublic"], false);
        assert!(body["customName"].is_null());
    }

    #[tokio::test]
    async fn strategy_flips_to_streamed_past_the_threshold() {
        let at = FileDescriptor {
            path: "/tmp/at.bin".into(),
            display_name: "at.bin".into(),
            size_bytes: STREAMING_THRESHOLD,
            mime_type: "application/octet-stream".into(),
            modified_at: std::time::SystemTime::UNIX_EPOCH,
        };
        let over = FileDescriptor {
            size_bytes: STREAMING_THRESHOLD + 1,
            ..at.clone()
        };
        assert_eq!(droplift_transfer::plan(&at), TransferStrategy::Buffered);
        assert_eq!(droplift_transfer::plan(&over), TransferStrategy::Streamed);
    }

    #[tokio::test]
    async fn expired_session_is_reported_for_reauthentication() {
        let backend = MockBackend::spawn(Behavior {
            auth_expired: true,
            ..Behavior::default()
        })
        .await;
        let file = png_file(1024);

        let orch = orchestrator(&backend, "stale-token");
        let err = orch.run(file.path().to_str().unwrap()).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "Your session has expired. Please sign in again."
        );
        assert!(backend.find("PUT ").is_none());
    }

    #[tokio::test]
    async fn oversize_rejection_leaves_nothing_finalized() {
        let backend = MockBackend::spawn(Behavior {
            put_status: 413,
            ..Behavior::default()
        })
        .await;
        let file = png_file(1024);

        let orch = orchestrator(&backend, "e2e-token");
        let err = orch.run(file.path().to_str().unwrap()).await.unwrap_err();
        assert_eq!(err.user_message(), "Your file is too large for this server.");
        assert!(backend.find("POST /files/complete-upload").is_none());
    }

    #[tokio::test]
    async fn cancellation_mid_transfer_skips_finalize() {
        let backend = MockBackend::spawn(Behavior {
            put_delay: Duration::from_millis(500),
            ..Behavior::default()
        })
        .await;
        let file = png_file(1024);

        let orch = orchestrator(&backend, "e2e-token");
        let cancel = orch.cancel_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });

        let err = orch.run(file.path().to_str().unwrap()).await.unwrap_err();
        assert_eq!(err.user_message(), "Upload cancelled.");
        assert!(backend.find("POST /files/complete-upload").is_none());
    }

    #[tokio::test]
    async fn queue_uploads_a_batch_end_to_end() {
        let backend = MockBackend::spawn(Behavior::default()).await;
        let files: Vec<_> = (0..3).map(|_| png_file(8 * 1024)).collect();
        let paths: Vec<String> = files
            .iter()
            .map(|f| f.path().to_str().unwrap().to_string())
            .collect();

        let client = Client::new(&backend.url, "e2e-token").unwrap();
        let queue = UploadQueue::new(client, TransferProfile::Fast, UploadOptions::default());

        let outcomes = queue.run(&paths).await;
        assert_eq!(outcomes.len(), 3);
        for (outcome, path) in outcomes.iter().zip(&paths) {
            assert_eq!(&outcome.path, path);
            let result = outcome.result.as_ref().unwrap();
            assert!(!result.url.is_empty());
        }
        assert_eq!(backend.count_matching("PUT /put/"), 3);
    }

    #[tokio::test]
    async fn custom_options_flow_through_both_phases() {
        let backend = MockBackend::spawn(Behavior::default()).await;
        let file = png_file(1024);

        let options = UploadOptions {
            preserve_original_name: true,
            optimize: true,
            generate_thumbnails: true,
            custom_display_name: "holiday photo".to_string(),
            is_public: true,
        };
        let client = Client::new(&backend.url, "e2e-token").unwrap();
        let orch = UploadOrchestrator::new(client, TransferProfile::Medium, options).unwrap();

        orch.run(file.path().to_str().unwrap()).await.unwrap();

        let phase1 = backend.find("POST /files/presigned-url").unwrap();
        let body: serde_json::Value = serde_json::from_str(body_of(&phase1)).unwrap();
        assert_eq!(body["preserveFilename"], true);
        assert_eq!(body["optimize"], true);
        assert_eq!(body["generateThumbnails"], true);

        let phase2 = backend.find("POST /files/complete-upload/").unwrap();
        let body: serde_json::Value = serde_json::from_str(body_of(&phase2)).unwrap();
        assert_eq!(body["customName"], "holiday photo");
        assert_eq!(body["isPublic"], true);
    }
}
