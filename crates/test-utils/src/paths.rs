//! Scratch directories for tests that write stores and forecast files.

/// Temporary directory with a recognisable prefix, removed on drop.
pub fn temp_test_dir(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}
