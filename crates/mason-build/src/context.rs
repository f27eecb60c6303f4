//! Session-scoped build state
//!
//! One [`BuildContext`] lives for the duration of a build or clean session.
//! It memoizes project statuses (write-once from the analyzer's point of
//! view; the driver refreshes entries after building) and remembers which
//! declaration outputs were rewritten with identical bytes, keyed by output
//! path with the mtime from before the rewrite.

use crate::diagnostics::{Diagnostic, Reporter};
use crate::status::UpToDateStatus;
use mason_config::{ConfigPath, FileMap};
use std::path::Path;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Report decisions without touching the filesystem.
    pub dry: bool,
    /// Rebuild regardless of status.
    pub force: bool,
    /// Emit per-project status diagnostics.
    pub verbose: bool,
}

pub struct BuildContext {
    pub options: BuildOptions,
    project_status: FileMap<UpToDateStatus>,
    unchanged_outputs: FileMap<SystemTime>,
}

impl BuildContext {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            project_status: FileMap::new(),
            unchanged_outputs: FileMap::new(),
        }
    }

    pub fn status_of(&self, project: &ConfigPath) -> Option<&UpToDateStatus> {
        self.project_status.get(project)
    }

    pub fn set_status(&mut self, project: &ConfigPath, status: UpToDateStatus) {
        self.project_status.insert(project, status);
    }

    /// The pre-rewrite mtime of a declaration output whose emitted bytes
    /// matched what was already on disk, if that happened this session.
    pub fn unchanged_output_time(&self, output: &Path) -> Option<SystemTime> {
        self.unchanged_outputs.get(output).copied()
    }

    pub fn record_unchanged_output(&mut self, output: &Path, prior_mtime: SystemTime) {
        self.unchanged_outputs.insert(output, prior_mtime);
    }

    /// Discard all memoized state, keeping the options.
    pub fn reset(&mut self) {
        self.project_status.clear();
        self.unchanged_outputs.clear();
    }

    /// Emit a diagnostic only when verbose output was requested.
    pub fn verbose(&self, reporter: &dyn Reporter, message: String) {
        if self.options.verbose {
            reporter.report(&Diagnostic::verbose(message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Freshness;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    fn project(path: &str) -> ConfigPath {
        ConfigPath::resolve(Path::new("/"), Path::new(path))
    }

    #[test]
    fn test_status_round_trip() {
        let mut context = BuildContext::new(BuildOptions::default());
        let proj = project("/a/tsconfig.json");
        assert!(context.status_of(&proj).is_none());

        context.set_status(&proj, UpToDateStatus::UpToDate(Freshness::default()));
        assert!(context.status_of(&proj).unwrap().is_up_to_date());
    }

    #[test]
    fn test_reset_discards_memoization() {
        let mut context = BuildContext::new(BuildOptions::default());
        let proj = project("/a/tsconfig.json");
        context.set_status(&proj, UpToDateStatus::UpToDate(Freshness::default()));
        context.record_unchanged_output(Path::new("/a/out.d.ts"), SystemTime::UNIX_EPOCH);

        context.reset();
        assert!(context.status_of(&proj).is_none());
        assert!(context
            .unchanged_output_time(Path::new("/a/out.d.ts"))
            .is_none());
    }

    #[test]
    fn test_verbose_is_gated_by_options() {
        let seen: RefCell<Vec<Diagnostic>> = RefCell::new(Vec::new());
        let reporter = |d: &Diagnostic| seen.borrow_mut().push(d.clone());

        let quiet = BuildContext::new(BuildOptions::default());
        quiet.verbose(&reporter, "hidden".to_string());
        assert!(seen.borrow().is_empty());

        let loud = BuildContext::new(BuildOptions {
            verbose: true,
            ..Default::default()
        });
        loud.verbose(&reporter, "shown".to_string());
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].message, "shown");
    }

    #[test]
    fn test_unchanged_outputs_keyed_by_normalized_path() {
        let mut context = BuildContext::new(BuildOptions::default());
        let stamp = SystemTime::UNIX_EPOCH;
        context.record_unchanged_output(&PathBuf::from("/out/./a.d.ts"), stamp);
        assert_eq!(
            context.unchanged_output_time(Path::new("/out/a.d.ts")),
            Some(stamp)
        );
    }
}
