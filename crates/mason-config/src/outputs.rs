//! Expected-output computation
//!
//! Pure derivation of the output paths a project is expected to produce,
//! from its manifest alone. The analyzer compares these against the
//! filesystem; the clean operation deletes them.

use crate::manifest::{JsxMode, ProjectConfig};
use crate::paths::{append_extension, relative_path, resolve_path};
use std::path::{Path, PathBuf};

/// All output paths the project is expected to produce, in a stable order:
/// for each input (or for the bundle), the primary output, then the
/// declaration output, then the declaration map.
pub fn output_files(config: &ProjectConfig) -> Vec<PathBuf> {
    if let Some(out_file) = &config.out_file {
        let mut outputs = vec![out_file.clone()];
        if config.declaration {
            let declaration = out_file.with_extension("d.ts");
            outputs.push(declaration.clone());
            if config.declaration_map {
                outputs.push(append_extension(&declaration, "map"));
            }
        }
        return outputs;
    }

    let mut outputs = Vec::new();
    for input in &config.input_files {
        outputs.extend(output_files_for_input(config, input));
    }
    outputs
}

/// The outputs produced for a single input file, per-input mode only.
pub fn output_files_for_input(config: &ProjectConfig, input: &Path) -> Vec<PathBuf> {
    let manifest_dir = config.directory();
    let root_dir = config.root_dir.as_deref().unwrap_or(manifest_dir);
    let out_dir = config.out_dir.as_deref().unwrap_or(manifest_dir);
    let declaration_dir = config
        .declaration_dir
        .as_deref()
        .or(config.out_dir.as_deref())
        .unwrap_or(manifest_dir);

    let rel = relative_path(root_dir, input);
    let preserve_jsx = config.jsx == Some(JsxMode::Preserve)
        && input.extension().is_some_and(|ext| ext == "tsx");

    let primary = resolve_path(out_dir, &rel)
        .with_extension(if preserve_jsx { "jsx" } else { "js" });

    let mut outputs = vec![primary];
    if config.declaration {
        let declaration = resolve_path(declaration_dir, &rel).with_extension("d.ts");
        outputs.push(declaration.clone());
        if config.declaration_map {
            outputs.push(append_extension(&declaration, "map"));
        }
    }
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::ConfigPath;
    use pretty_assertions::assert_eq;

    fn config(text: &str) -> ProjectConfig {
        let path = ConfigPath::resolve(Path::new("/"), Path::new("/ws/app/tsconfig.json"));
        ProjectConfig::parse(path, text).unwrap()
    }

    #[test]
    fn test_outputs_default_next_to_manifest() {
        let config = config(r#"{ "files": ["a.ts"] }"#);
        assert_eq!(output_files(&config), vec![PathBuf::from("/ws/app/a.js")]);
    }

    #[test]
    fn test_outputs_under_out_dir_preserve_structure() {
        let config = config(
            r#"{
                "compilerOptions": { "rootDir": "src", "outDir": "dist" },
                "files": ["src/a.ts", "src/nested/b.ts"]
            }"#,
        );
        assert_eq!(
            output_files(&config),
            vec![
                PathBuf::from("/ws/app/dist/a.js"),
                PathBuf::from("/ws/app/dist/nested/b.js"),
            ]
        );
    }

    #[test]
    fn test_outputs_with_declarations_and_maps() {
        let config = config(
            r#"{
                "compilerOptions": {
                    "outDir": "dist",
                    "declaration": true,
                    "declarationMap": true
                },
                "files": ["a.ts"]
            }"#,
        );
        assert_eq!(
            output_files(&config),
            vec![
                PathBuf::from("/ws/app/dist/a.js"),
                PathBuf::from("/ws/app/dist/a.d.ts"),
                PathBuf::from("/ws/app/dist/a.d.ts.map"),
            ]
        );
    }

    #[test]
    fn test_declaration_dir_overrides_out_dir_for_declarations_only() {
        let config = config(
            r#"{
                "compilerOptions": {
                    "outDir": "dist",
                    "declarationDir": "types",
                    "declaration": true
                },
                "files": ["a.ts"]
            }"#,
        );
        assert_eq!(
            output_files(&config),
            vec![
                PathBuf::from("/ws/app/dist/a.js"),
                PathBuf::from("/ws/app/types/a.d.ts"),
            ]
        );
    }

    #[test]
    fn test_tsx_with_jsx_preserve_emits_jsx_extension() {
        let config = config(
            r#"{
                "compilerOptions": { "jsx": "preserve" },
                "files": ["view.tsx", "logic.ts"]
            }"#,
        );
        assert_eq!(
            output_files(&config),
            vec![
                PathBuf::from("/ws/app/view.jsx"),
                PathBuf::from("/ws/app/logic.js"),
            ]
        );
    }

    #[test]
    fn test_tsx_without_preserve_emits_js_extension() {
        let config = config(
            r#"{
                "compilerOptions": { "jsx": "react" },
                "files": ["view.tsx"]
            }"#,
        );
        assert_eq!(output_files(&config), vec![PathBuf::from("/ws/app/view.js")]);
    }

    #[test]
    fn test_out_file_bundles_everything() {
        let config = config(
            r#"{
                "compilerOptions": {
                    "outFile": "dist/bundle.js",
                    "declaration": true,
                    "declarationMap": true
                },
                "files": ["a.ts", "b.ts"]
            }"#,
        );
        assert_eq!(
            output_files(&config),
            vec![
                PathBuf::from("/ws/app/dist/bundle.js"),
                PathBuf::from("/ws/app/dist/bundle.d.ts"),
                PathBuf::from("/ws/app/dist/bundle.d.ts.map"),
            ]
        );
    }

    #[test]
    fn test_no_inputs_no_outputs() {
        let config = config(r#"{ "files": [] }"#);
        assert!(output_files(&config).is_empty());
    }
}
