use std::{fs::create_dir_all, path::PathBuf, str::FromStr};

use uuid::Uuid;

// Random path to avoid confliting file creation from mutliple concurrent tests
#[must_use]
pub fn random_path() -> PathBuf {
    PathBuf::from_str(&Uuid::new_v4().to_string()).unwrap()
}

/// Creates a fresh, empty directory under the OS temp dir and returns its path.
///
/// Each call gets a distinct UUID-named directory so concurrent `#[tokio::test]`
/// functions never share a Titanic store.
#[must_use]
pub fn temp_dir() -> PathBuf {
    let path = std::env::temp_dir().join(random_path());
    create_dir_all(&path).unwrap();
    path
}
