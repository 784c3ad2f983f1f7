//! Provisioning of the bundled cover-positioning script.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use tracing::info;

use crate::cover::CoverError;

/// Compiled-in automation script distributed with the integration.
const SET_COVER_POSITION: &str = include_str!("../resources/set_cover_position.yaml");

/// Location of the script below the platform config directory.
pub const SCRIPT_RELATIVE_PATH: &str = "scripts/set_cover_position.yaml";

/// Copy the bundled positioning script to its well-known path below
/// `config_dir`, unless it is already present.
///
/// The copy is verbatim and happens at most once; an existing file is never
/// overwritten, so local modifications survive re-running setup.
pub fn ensure_script(config_dir: &Path) -> Result<PathBuf, CoverError> {
    let path = config_dir.join(SCRIPT_RELATIVE_PATH);
    if path.exists() {
        debug!("Script {} already present", path.display());
        return Ok(path);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CoverError::Io(parent.to_path_buf(), e))?;
    }
    fs::write(&path, SET_COVER_POSITION).map_err(|e| CoverError::Io(path.clone(), e))?;

    info!("Installed cover positioning script at {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_installed_verbatim() {
        let dir = tempfile::tempdir().unwrap();

        let path = ensure_script(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("scripts/set_cover_position.yaml"));

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, SET_COVER_POSITION);
    }

    #[test]
    fn test_existing_script_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SCRIPT_RELATIVE_PATH);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "# locally modified\n").unwrap();

        ensure_script(dir.path()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "# locally modified\n");
    }

    #[test]
    fn test_bundled_script_is_valid_yaml() {
        let parsed: serde_yaml::Value = serde_yaml::from_str(SET_COVER_POSITION).unwrap();
        assert!(parsed.get("set_cover_position").is_some());
    }
}
