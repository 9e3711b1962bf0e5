//! Storage backends for Zarr access and the EFI object store.
//!
//! Remote Zarr stores are read through `object_store`, wrapped in
//! `AsyncObjectStore` and an async-to-sync adapter so the synchronous
//! `zarrs` API can drive them from inside the tokio runtime.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use object_store::aws::AmazonS3Builder;
use object_store::http::HttpBuilder;
use object_store::{ClientOptions, ObjectStore};
use reqwest::header::{HeaderMap, HeaderValue, FROM};
use tracing::debug;
use zarrs_filesystem::FilesystemStore;
use zarrs_object_store::AsyncObjectStore;
use zarrs_storage::storage_adapter::async_to_sync::{
    AsyncToSyncBlockOn, AsyncToSyncStorageAdapter,
};
use zarrs_storage::ReadableStorage;

use crate::config::{DynamicalConfig, S3EndpointConfig};
use crate::error::{ReaderError, Result};

/// Blocking executor that works from within a tokio runtime.
///
/// `block_in_place` moves the current task off the async worker thread so
/// the runtime handle can drive the future without nesting runtimes. This
/// requires the multi-threaded runtime.
#[derive(Clone, Copy)]
pub struct TokioBlockOn;

impl AsyncToSyncBlockOn for TokioBlockOn {
    fn block_on<F: core::future::Future>(&self, future: F) -> F::Output {
        tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
    }
}

/// Storage type for HTTP-backed Zarr access (sync adapter).
pub type HttpStorage =
    AsyncToSyncStorageAdapter<AsyncObjectStore<object_store::http::HttpStore>, TokioBlockOn>;

fn client_options(config: &DynamicalConfig) -> Result<ClientOptions> {
    let mut options = ClientOptions::new().with_timeout(Duration::from_secs(config.timeout_secs));

    if let Some(email) = &config.email {
        let value = HeaderValue::from_str(email)
            .map_err(|e| ReaderError::Config(format!("invalid email header '{}': {}", email, e)))?;
        let mut headers = HeaderMap::new();
        headers.insert(FROM, value);
        options = options.with_default_headers(headers);
    }

    Ok(options)
}

/// Open a read-only Zarr store over HTTP.
pub fn open_http_storage(url: &str, config: &DynamicalConfig) -> Result<Arc<HttpStorage>> {
    let http = HttpBuilder::new()
        .with_url(url)
        .with_client_options(client_options(config)?)
        .build()
        .map_err(|e| ReaderError::open_failed(format!("Failed to create HTTP client: {}", e)))?;

    debug!(url = %url, email = config.email.is_some(), "Opened HTTP Zarr store");

    let async_store = Arc::new(AsyncObjectStore::new(http));
    Ok(Arc::new(AsyncToSyncStorageAdapter::new(async_store, TokioBlockOn)))
}

/// Open a Zarr store on the local filesystem.
pub fn open_filesystem_storage(path: impl AsRef<Path>) -> Result<Arc<FilesystemStore>> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Err(ReaderError::open_failed(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    let store = FilesystemStore::new(path)
        .map_err(|e| ReaderError::open_failed(format!("{}: {}", path.display(), e)))?;
    Ok(Arc::new(store))
}

/// Open a store from either an http(s) URL or a local directory.
pub fn open_storage(location: &str, config: &DynamicalConfig) -> Result<ReadableStorage> {
    if location.starts_with("https://") || location.starts_with("http://") {
        Ok(open_http_storage(location, config)?)
    } else {
        Ok(open_filesystem_storage(location)?)
    }
}

/// Object store for the EFI driver bucket.
///
/// Credentials and region come only from `config`; the builder is not
/// seeded from the process environment.
pub fn efi_object_store(config: &S3EndpointConfig) -> Result<Arc<dyn ObjectStore>> {
    config.validate().map_err(ReaderError::Config)?;

    let s3 = AmazonS3Builder::new()
        .with_endpoint(&config.endpoint)
        .with_bucket_name(&config.bucket)
        .with_region(&config.region)
        .with_allow_http(config.allow_http)
        .with_skip_signature(config.skip_signature)
        .build()
        .map_err(|e| ReaderError::storage(format!("Failed to create S3 client: {}", e)))?;

    Ok(Arc::new(s3))
}
