//! Loading target declarations from disk.
//!
//! A target is a JSON [`SettingsDecl`] stored as `<id>.json` in the targets
//! directory, or any JSON file passed explicitly. The file stem becomes the
//! target name unless the declaration sets one.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths;
use crate::settings::{Settings, SettingsDecl};

#[derive(Debug, Clone, Serialize)]
pub struct TargetSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_path: Option<String>,
}

/// Parse a declaration from JSON text. Unknown keys are rejected.
pub fn parse(content: &str, source: &str) -> Result<SettingsDecl> {
    serde_json::from_str(content).map_err(|e| Error::config_invalid_json(source, e))
}

/// Load and resolve the declaration at `path`. `~` is expanded.
///
/// An undeclared name falls back to `name`, then to the file stem.
pub fn load_file(path: &str, name: Option<&str>) -> Result<Settings> {
    let expanded = shellexpand::tilde(path).to_string();
    let path = PathBuf::from(expanded);
    if !path.is_file() {
        return Err(Error::target_not_found(path.display().to_string(), vec![]));
    }
    let fallback = name.map(str::to_string).or_else(|| stem(&path));
    read_settings(&path, fallback)
}

/// Load target `id` from the default targets directory.
pub fn load(id: &str) -> Result<Settings> {
    load_from(&paths::targets()?, id)
}

pub fn load_from(dir: &Path, id: &str) -> Result<Settings> {
    let path = dir.join(format!("{}.json", id));
    if !path.is_file() {
        let available = list_from(dir)?.into_iter().map(|t| t.id).collect();
        return Err(Error::target_not_found(id, available));
    }
    read_settings(&path, Some(id.to_string()))
}

pub fn list() -> Result<Vec<TargetSummary>> {
    list_from(&paths::targets()?)
}

/// Declared targets in `dir`, sorted by id. Unreadable files are skipped.
pub fn list_from(dir: &Path) -> Result<Vec<TargetSummary>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("list {}", dir.display())))
    })?;

    let mut targets: Vec<TargetSummary> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| {
            let id = stem(&path)?;
            let content = fs::read_to_string(&path).ok()?;
            let decl = parse(&content, &path.display().to_string()).ok()?;
            Some(TargetSummary {
                id,
                host: decl.host,
                deploy_path: decl.deploy_path,
            })
        })
        .collect();
    targets.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(targets)
}

fn read_settings(path: &Path, fallback_name: Option<String>) -> Result<Settings> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;
    let mut decl = parse(&content, &path.display().to_string())?;
    if decl.port == Some(0) {
        return Err(Error::config_invalid_value(
            "port",
            Some("0".to_string()),
            "SSH port must be between 1 and 65535",
        ));
    }
    if decl.name.is_none() {
        decl.name = fallback_name;
    }
    Ok(Settings::new(decl))
}

fn stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}
