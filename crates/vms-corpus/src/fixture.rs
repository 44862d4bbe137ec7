//! Reading precomputed fixture files.
//!
//! An absent fixture is fatal and reported as [`VmsError::MissingFixture`];
//! there is no silent fallback to an empty table.

use std::path::Path;

use serde::de::DeserializeOwned;
use vms_error::{Result, VmsError};

/// Read a fixture file to a string.
///
/// # Errors
///
/// [`VmsError::MissingFixture`] when the file does not exist, [`VmsError::Io`]
/// for any other read failure.
pub fn read_fixture(path: &Path, fixture: &str) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            VmsError::MissingFixture {
                fixture: fixture.to_owned(),
                path: path.to_path_buf(),
            }
        } else {
            VmsError::io(path, err)
        }
    })
}

/// Parse a JSON fixture document.
///
/// # Errors
///
/// [`VmsError::InvalidFixture`] naming the fixture and the parse position.
pub fn parse_json_fixture<T: DeserializeOwned>(text: &str, fixture: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|err| VmsError::invalid_fixture(fixture, err.to_string()))
}

/// Read and parse a JSON fixture file.
pub fn load_json_fixture<T: DeserializeOwned>(path: &Path, fixture: &str) -> Result<T> {
    let text = read_fixture(path, fixture)?;
    parse_json_fixture(&text, fixture)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn absent_file_is_missing_fixture() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("regimes.json");
        let err = load_json_fixture::<BTreeMap<String, String>>(&path, "regimes")
            .expect_err("absent");
        match err {
            VmsError::MissingFixture { fixture, path: reported } => {
                assert_eq!(fixture, "regimes");
                assert_eq!(reported, path);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_json_is_invalid_fixture() {
        let err = parse_json_fixture::<BTreeMap<String, String>>("{\"f1r\": ", "regimes")
            .expect_err("truncated json");
        assert!(matches!(err, VmsError::InvalidFixture { .. }));
        assert!(err.is_fatal());
    }
}
