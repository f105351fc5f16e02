//! The one-line text file the client leaves behind.
use std::fs;
use std::path::Path;

use log::info;
use quotation_common::{QuotationError, Result};

/// Render the artifact line for `bid`, e.g. `Dólar: {5.43}`.
pub fn render(bid: &str) -> String {
    format!("Dólar: {{{}}}", bid)
}

/// Write the artifact for `bid` to `path`, replacing any previous content.
pub fn write_artifact(path: &Path, bid: &str) -> Result<()> {
    fs::write(path, render(bid)).map_err(|source| QuotationError::ArtifactWriteFailure {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn renders_bid_in_braces() {
        assert_eq!(render("5.43"), "Dólar: {5.43}");
    }

    #[test]
    fn overwrites_previous_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cotacao.txt");
        fs::write(&path, "Dólar: {4.99}\nstale second line\n").unwrap();

        write_artifact(&path, "5.43").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Dólar: {5.43}");
    }

    #[test]
    fn unwritable_path_is_an_artifact_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("cotacao.txt");

        let err = write_artifact(&path, "5.43").unwrap_err();

        assert!(matches!(err, QuotationError::ArtifactWriteFailure { .. }));
    }
}
