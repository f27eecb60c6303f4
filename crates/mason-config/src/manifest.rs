//! Project manifest model and parsing (tsconfig.json shape)
//!
//! A manifest is JSON with `compilerOptions`, an explicit `files` list, and
//! `references` edges to other projects. Parsing resolves every relative path
//! against the manifest's directory, so the in-memory [`ProjectConfig`] holds
//! only absolute normalized paths.

use crate::error::{ConfigError, Result};
use crate::paths::{resolve_path, ConfigPath};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// JSX emit mode. Only `Preserve` affects output extensions: a `.tsx` input
/// keeps its JSX and is emitted as `.jsx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsxMode {
    Preserve,
    React,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawCompilerOptions {
    root_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    declaration_dir: Option<PathBuf>,
    out_file: Option<PathBuf>,
    declaration: bool,
    declaration_map: bool,
    jsx: Option<JsxMode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    #[serde(default)]
    compiler_options: RawCompilerOptions,
    files: Option<Vec<PathBuf>>,
    #[serde(default)]
    references: Vec<RawReference>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawReference {
    path: PathBuf,
}

/// A parsed project manifest with every path resolved and normalized.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// The resolved path of the manifest itself.
    pub config_path: ConfigPath,
    pub root_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub declaration_dir: Option<PathBuf>,
    /// Bundled-output path; exclusive with per-input outputs.
    pub out_file: Option<PathBuf>,
    pub declaration: bool,
    pub declaration_map: bool,
    pub jsx: Option<JsxMode>,
    /// Ordered absolute input paths.
    pub input_files: Vec<PathBuf>,
    /// Ordered resolved manifest paths of referenced projects.
    pub project_references: Vec<ConfigPath>,
}

impl ProjectConfig {
    /// Parse a manifest from its JSON text.
    ///
    /// An explicit `files` list is required; the orchestrator does no
    /// directory discovery.
    pub fn parse(config_path: ConfigPath, text: &str) -> Result<ProjectConfig> {
        let raw: RawManifest = serde_json::from_str(text)
            .map_err(|error| ConfigError::parse(config_path.as_path(), error))?;

        let dir = config_path.directory().to_path_buf();
        let files = raw
            .files
            .ok_or_else(|| ConfigError::missing_field(config_path.as_path(), "files"))?;

        let options = raw.compiler_options;
        Ok(ProjectConfig {
            root_dir: options.root_dir.map(|p| resolve_path(&dir, &p)),
            out_dir: options.out_dir.map(|p| resolve_path(&dir, &p)),
            declaration_dir: options.declaration_dir.map(|p| resolve_path(&dir, &p)),
            out_file: options.out_file.map(|p| resolve_path(&dir, &p)),
            declaration: options.declaration,
            declaration_map: options.declaration_map,
            jsx: options.jsx,
            input_files: files.iter().map(|f| resolve_path(&dir, f)).collect(),
            project_references: raw
                .references
                .iter()
                .map(|r| resolve_reference_path(&dir, &r.path))
                .collect(),
            config_path,
        })
    }

    /// The directory containing the manifest.
    pub fn directory(&self) -> &Path {
        self.config_path.directory()
    }
}

/// Resolve a raw `references` entry to the manifest path it names.
///
/// A reference may point at a manifest file directly or at a project
/// directory; in the latter case `tsconfig.json` is appended.
pub fn resolve_reference_path(base: &Path, raw: &Path) -> ConfigPath {
    let resolved = resolve_path(base, raw);
    if resolved.extension().is_some_and(|ext| ext == "json") {
        ConfigPath::from_normalized(resolved)
    } else {
        ConfigPath::from_normalized(resolved.join("tsconfig.json"))
    }
}
