//! The project-compiler seam
//!
//! Compilation itself is not this crate's business. The driver hands a
//! [`CompilerFactory`] the root names and options of one project and gets
//! back a [`Program`] it can interrogate for diagnostics, in stages, before
//! asking it to emit. Emit streams `(path, content)` pairs through a
//! callback; the driver owns the actual writes so it can observe
//! byte-identical declaration rewrites.

use crate::diagnostics::Diagnostic;
use crate::host::BuildHost;
use mason_config::ProjectConfig;
use std::path::{Path, PathBuf};

pub struct ProgramRequest<'a> {
    pub root_names: &'a [PathBuf],
    pub config: &'a ProjectConfig,
}

pub trait Program {
    fn options_diagnostics(&self) -> Vec<Diagnostic>;
    fn syntactic_diagnostics(&self) -> Vec<Diagnostic>;
    fn declaration_diagnostics(&self) -> Vec<Diagnostic>;
    fn semantic_diagnostics(&self) -> Vec<Diagnostic>;

    /// Produce every output as a `(path, content)` pair, in output order.
    fn emit(&mut self, write: &mut dyn FnMut(&Path, &str));
}

pub trait CompilerFactory {
    fn create_program(&self, request: ProgramRequest<'_>, host: &dyn BuildHost)
        -> Box<dyn Program>;
}
