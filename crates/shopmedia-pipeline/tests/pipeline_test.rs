//! End-to-end pipeline scenarios against a mock source server and a fake
//! storage backend.

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, ImageReader, Rgba, RgbaImage};
use shopmedia_core::config::PipelineConfig;
use shopmedia_core::models::{IngestionRequest, UploadResult};
use shopmedia_core::AppError;
use shopmedia_pipeline::{BatchDeleter, ImagePipeline};
use shopmedia_storage::{MediaStorage, StorageError, StorageResult};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

const DELIVERY_PREFIX: &str = "https://res.cloudinary.com/demo/image/upload/";

/// Route pipeline tracing through the test harness; safe to call from
/// every test, only the first initialization wins.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
struct UploadRecord {
    folder: String,
    content_type: String,
    data: Bytes,
}

/// In-memory storage double. Uploads are recorded; deletions fail for any
/// public id listed in `failing_ids`.
#[derive(Default)]
struct FakeStorage {
    uploads: Mutex<Vec<UploadRecord>>,
    deletes: Mutex<Vec<String>>,
    failing_ids: Vec<String>,
}

impl FakeStorage {
    fn with_failing_ids(ids: &[&str]) -> Self {
        Self {
            failing_ids: ids.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn uploads(&self) -> Vec<UploadRecord> {
        self.uploads.lock().unwrap().clone()
    }

    fn delete_calls(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStorage for FakeStorage {
    async fn upload(
        &self,
        folder: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<UploadResult> {
        self.uploads.lock().unwrap().push(UploadRecord {
            folder: folder.to_string(),
            content_type: content_type.to_string(),
            data,
        });
        let extension = content_type.strip_prefix("image/").unwrap_or("bin");
        Ok(UploadResult {
            public_url: format!("{}v1/{}/asset.{}", DELIVERY_PREFIX, folder, extension),
        })
    }

    async fn delete(&self, public_id: &str) -> StorageResult<()> {
        self.deletes.lock().unwrap().push(public_id.to_string());
        if self.failing_ids.iter().any(|id| id == public_id) {
            return Err(StorageError::BackendRejected("simulated failure".into()));
        }
        Ok(())
    }

    fn owns_url(&self, url: &str) -> bool {
        url.starts_with(DELIVERY_PREFIX)
    }

    fn public_id_for_url(&self, url: &str) -> Option<String> {
        if url.contains("unparseable") {
            return None;
        }
        let rest = url.strip_prefix(DELIVERY_PREFIX)?;
        let rest = rest.split_once('/').map(|(_, r)| r)?; // skip version segment
        let without_ext = rest.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(rest);
        Some(without_ext.to_string())
    }
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 90, 30, 255]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

fn pipeline_with(storage: Arc<FakeStorage>) -> ImagePipeline {
    ImagePipeline::new(PipelineConfig::default(), storage).unwrap()
}

fn request(url: &str, product_id: Option<&str>) -> IngestionRequest {
    IngestionRequest {
        source_url: url.to_string(),
        product_id: product_id.map(|s| s.to_string()),
        is_main_image: true,
    }
}

#[tokio::test]
async fn ingests_oversized_png_end_to_end() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/photo.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(png_bytes(3000, 2000))
        .create_async()
        .await;

    let storage = Arc::new(FakeStorage::default());
    let pipeline = pipeline_with(Arc::clone(&storage));

    let response = pipeline
        .fetch_image_from_url(request(&format!("{}/photo.png", server.url()), Some("p1")))
        .await
        .unwrap();

    assert!(response.success);
    assert!(response.cloudinary_url.contains("products/p1"));

    let uploads = storage.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].folder, "products/p1");
    assert_eq!(uploads[0].content_type, "image/png");

    // 3000x2000 downsized so the long edge is 1920, aspect preserved.
    let stored = ImageReader::new(Cursor::new(uploads[0].data.as_ref()))
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap();
    assert_eq!((stored.width(), stored.height()), (1920, 1280));
}

#[tokio::test]
async fn missing_product_id_uploads_to_temp_folder() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/photo.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(png_bytes(64, 64))
        .create_async()
        .await;

    let storage = Arc::new(FakeStorage::default());
    let pipeline = pipeline_with(Arc::clone(&storage));

    pipeline
        .fetch_image_from_url(request(&format!("{}/photo.png", server.url()), None))
        .await
        .unwrap();

    assert_eq!(storage.uploads()[0].folder, "products/temp");
}

#[tokio::test]
async fn source_404_maps_to_not_found() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/gone.png")
        .with_status(404)
        .create_async()
        .await;

    let storage = Arc::new(FakeStorage::default());
    let pipeline = pipeline_with(Arc::clone(&storage));

    let err = pipeline
        .fetch_image_from_url(request(&format!("{}/gone.png", server.url()), Some("p1")))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(err.kind(), "NotFound");
    let message = err.client_message();
    assert!(message.contains("not found"));
    assert!(message.contains("404"));
    assert!(storage.uploads().is_empty());
}

#[tokio::test]
async fn html_content_type_rejected_despite_passing_heuristic() {
    init_tracing();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/photo.png")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>definitely not an image</html>")
        .create_async()
        .await;

    let storage = Arc::new(FakeStorage::default());
    let pipeline = pipeline_with(Arc::clone(&storage));

    let err = pipeline
        .fetch_image_from_url(request(&format!("{}/photo.png", server.url()), Some("p1")))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::UnsupportedFormat(_)));
    assert_eq!(err.kind(), "UnsupportedFormat");
    assert_eq!(err.code(), "invalid-argument");
}

#[tokio::test]
async fn empty_url_rejected_before_any_network_call() {
    init_tracing();
    let storage = Arc::new(FakeStorage::default());
    let pipeline = pipeline_with(Arc::clone(&storage));

    let err = pipeline
        .fetch_image_from_url(request("   ", Some("p1")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
    assert!(storage.uploads().is_empty());
}

#[tokio::test]
async fn non_image_like_url_rejected_before_fetch() {
    init_tracing();
    let storage = Arc::new(FakeStorage::default());
    let pipeline = pipeline_with(Arc::clone(&storage));

    let err = pipeline
        .fetch_image_from_url(request("https://example.com/about", Some("p1")))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid-argument");
}

#[tokio::test]
async fn batch_delete_filters_foreign_urls() {
    init_tracing();
    let storage = Arc::new(FakeStorage::default());
    let pipeline = pipeline_with(Arc::clone(&storage));

    let response = pipeline
        .delete_cloudinary_images(vec![
            format!("{}v1/products/p1/main.jpg", DELIVERY_PREFIX),
            "https://not-our-backend.com/x.jpg".to_string(),
        ])
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.deleted_count, 1);
    assert!(response.errors.is_none());
    assert_eq!(storage.delete_calls(), vec!["products/p1/main".to_string()]);
}

#[tokio::test]
async fn batch_delete_partial_failure_is_total() {
    init_tracing();
    let storage = Arc::new(FakeStorage::with_failing_ids(&["products/p1/bad"]));
    let deleter = BatchDeleter::new(Arc::clone(&storage) as Arc<dyn MediaStorage>);

    let urls = vec![
        format!("{}v1/products/p1/good.jpg", DELIVERY_PREFIX),
        format!("{}v1/products/p1/bad.jpg", DELIVERY_PREFIX),
        format!("{}v1/unparseable.jpg", DELIVERY_PREFIX),
        "https://elsewhere.example.com/ignored.jpg".to_string(),
    ];
    let report = deleter.delete_many(&urls).await;

    assert_eq!(report.attempted, 3);
    assert_eq!(report.deleted_count, 1);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.deleted_count + report.errors.len(), report.attempted);
}

#[tokio::test]
async fn batch_delete_empty_and_unrecognized_lists_short_circuit() {
    init_tracing();
    let storage = Arc::new(FakeStorage::default());
    let pipeline = pipeline_with(Arc::clone(&storage));

    let response = pipeline.delete_cloudinary_images(vec![]).await.unwrap();
    assert_eq!(response.deleted_count, 0);
    assert!(response.errors.is_none());

    let response = pipeline
        .delete_cloudinary_images(vec!["https://foreign.example.com/a.jpg".to_string()])
        .await
        .unwrap();
    assert_eq!(response.deleted_count, 0);
    assert!(response.errors.is_none());

    assert!(storage.delete_calls().is_empty());
}
