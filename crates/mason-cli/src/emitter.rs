//! Reference project compiler
//!
//! Carries each input's text through to its primary output and produces a
//! deterministic declaration stub per input, so a source that did not change
//! re-emits byte-identical declarations. No checking of any kind; the real
//! compiler slots in behind [`CompilerFactory`] without touching the core.

use mason_build::{BuildHost, CompilerFactory, Diagnostic, Program, ProgramRequest};
use mason_config::{append_extension, output_files_for_input, ProjectConfig};
use std::path::{Path, PathBuf};

pub struct PassthroughCompiler;

impl CompilerFactory for PassthroughCompiler {
    fn create_program(
        &self,
        request: ProgramRequest<'_>,
        host: &dyn BuildHost,
    ) -> Box<dyn Program> {
        let mut sources = Vec::new();
        let mut syntactic = Vec::new();
        for root in request.root_names {
            match host.read_file(root) {
                Some(text) => sources.push((root.clone(), text)),
                None => syntactic.push(Diagnostic::error(format!(
                    "Cannot read input file {}",
                    root.display()
                ))),
            }
        }
        Box::new(PassthroughProgram {
            config: request.config.clone(),
            sources,
            syntactic,
        })
    }
}

struct PassthroughProgram {
    config: ProjectConfig,
    sources: Vec<(PathBuf, String)>,
    syntactic: Vec<Diagnostic>,
}

impl Program for PassthroughProgram {
    fn options_diagnostics(&self) -> Vec<Diagnostic> {
        Vec::new()
    }

    fn syntactic_diagnostics(&self) -> Vec<Diagnostic> {
        self.syntactic.clone()
    }

    fn declaration_diagnostics(&self) -> Vec<Diagnostic> {
        Vec::new()
    }

    fn semantic_diagnostics(&self) -> Vec<Diagnostic> {
        Vec::new()
    }

    fn emit(&mut self, write: &mut dyn FnMut(&Path, &str)) {
        if let Some(out_file) = &self.config.out_file {
            let bundle: String = self
                .sources
                .iter()
                .map(|(_, text)| text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            write(out_file, &bundle);
            if self.config.declaration {
                let declaration = out_file.with_extension("d.ts");
                write(&declaration, &declaration_stub(out_file));
                if self.config.declaration_map {
                    write(&append_extension(&declaration, "map"), EMPTY_SOURCE_MAP);
                }
            }
            return;
        }

        for (input, text) in &self.sources {
            for output in output_files_for_input(&self.config, input) {
                let name = output.to_string_lossy().into_owned();
                if name.ends_with(".d.ts.map") {
                    write(&output, EMPTY_SOURCE_MAP);
                } else if name.ends_with(".d.ts") {
                    write(&output, &declaration_stub(input));
                } else {
                    write(&output, text);
                }
            }
        }
    }
}

const EMPTY_SOURCE_MAP: &str = "{\"version\":3,\"sources\":[],\"mappings\":\"\"}\n";

fn declaration_stub(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("// Declarations for {name}\nexport {{}};\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mason_build::MemoryHost;
    use mason_config::ConfigPath;
    use std::collections::HashMap;

    fn emit_all(host: &MemoryHost, manifest: &str) -> HashMap<PathBuf, String> {
        let path = ConfigPath::resolve(Path::new("/"), Path::new("/p/tsconfig.json"));
        host.write_file(path.as_path(), manifest).unwrap();
        let config = ProjectConfig::parse(path, manifest).unwrap();

        let mut program = PassthroughCompiler.create_program(
            ProgramRequest {
                root_names: &config.input_files,
                config: &config,
            },
            host,
        );
        assert!(program.syntactic_diagnostics().is_empty());

        let mut written = HashMap::new();
        program.emit(&mut |path, content| {
            written.insert(path.to_path_buf(), content.to_string());
        });
        written
    }

    #[test]
    fn test_emit_carries_source_through() {
        let host = MemoryHost::new();
        host.write_file(Path::new("/p/a.ts"), "const a = 1;").unwrap();

        let written = emit_all(&host, r#"{ "files": ["a.ts"] }"#);
        assert_eq!(
            written.get(Path::new("/p/a.js")).map(String::as_str),
            Some("const a = 1;")
        );
    }

    #[test]
    fn test_emit_declaration_stub_is_stable() {
        let host = MemoryHost::new();
        host.write_file(Path::new("/p/a.ts"), "const a = 1;").unwrap();
        let manifest = r#"{ "compilerOptions": { "declaration": true }, "files": ["a.ts"] }"#;

        let first = emit_all(&host, manifest);
        host.write_file(Path::new("/p/a.ts"), "const a = 2;").unwrap();
        let second = emit_all(&host, manifest);

        // Source changed, declaration bytes did not.
        assert_ne!(first.get(Path::new("/p/a.js")), second.get(Path::new("/p/a.js")));
        assert_eq!(
            first.get(Path::new("/p/a.d.ts")),
            second.get(Path::new("/p/a.d.ts"))
        );
    }

    #[test]
    fn test_unreadable_input_is_a_syntactic_diagnostic() {
        let host = MemoryHost::new();
        let manifest = r#"{ "files": ["missing.ts"] }"#;
        let path = ConfigPath::resolve(Path::new("/"), Path::new("/p/tsconfig.json"));
        host.write_file(path.as_path(), manifest).unwrap();
        let config = ProjectConfig::parse(path, manifest).unwrap();

        let program = PassthroughCompiler.create_program(
            ProgramRequest {
                root_names: &config.input_files,
                config: &config,
            },
            &host,
        );
        let diagnostics = program.syntactic_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("missing.ts"));
    }
}
