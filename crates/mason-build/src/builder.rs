//! The solution builder
//!
//! Drives a whole build or clean session: resolves the user's project specs,
//! constructs the dependency graph, and consumes the build queue in
//! dependency order, deciding per project whether to skip, refresh
//! timestamps, invoke the compiler, or stand aside because an upstream
//! failed. Per-project failure never aborts the session; downstream projects
//! observe it through their own status.

use crate::analyzer::Analysis;
use crate::cache::ConfigCache;
use crate::compiler::{CompilerFactory, ProgramRequest};
use crate::context::{BuildContext, BuildOptions};
use crate::diagnostics::{Diagnostic, Reporter};
use crate::error::{BuildError, Result};
use crate::graph::create_dependency_graph;
use crate::host::BuildHost;
use crate::status::{Freshness, UpToDateStatus, MINIMUM_DATE};
use mason_config::{is_declaration_file, output_files, ConfigPath, ProjectConfig};
use std::path::Path;

bitflags::bitflags! {
    /// Outcome of one project build attempt.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BuildResultFlags: u8 {
        const SUCCESS = 1 << 0;
        /// Historical polarity: this bit starts set and is *cleared* when an
        /// emitted declaration file's bytes equal what was already on disk.
        /// See DESIGN.md before relying on it.
        const DECLARATION_OUTPUT_UNCHANGED = 1 << 1;
        const CONFIG_FILE_ERRORS = 1 << 2;
        const SYNTAX_ERRORS = 1 << 3;
        const TYPE_ERRORS = 1 << 4;
        const DECLARATION_EMIT_ERRORS = 1 << 5;
        const ANY_ERRORS = Self::CONFIG_FILE_ERRORS.bits()
            | Self::SYNTAX_ERRORS.bits()
            | Self::TYPE_ERRORS.bits()
            | Self::DECLARATION_EMIT_ERRORS.bits();
    }
}

pub struct SolutionBuilder<'a> {
    host: &'a dyn BuildHost,
    compiler: &'a dyn CompilerFactory,
    reporter: &'a dyn Reporter,
    cache: ConfigCache,
    context: BuildContext,
}

impl<'a> SolutionBuilder<'a> {
    pub fn new(
        host: &'a dyn BuildHost,
        compiler: &'a dyn CompilerFactory,
        options: BuildOptions,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            host,
            compiler,
            reporter,
            cache: ConfigCache::new(),
            context: BuildContext::new(options),
        }
    }

    /// Discard all session memoization, optionally swapping the options.
    pub fn reset_context(&mut self, options: Option<BuildOptions>) {
        if let Some(options) = options {
            self.context = BuildContext::new(options);
        } else {
            self.context.reset();
        }
    }

    /// Memoized up-to-date status of a parsed project.
    pub fn up_to_date_status(&mut self, config: &ProjectConfig) -> UpToDateStatus {
        self.analysis().up_to_date_status(config)
    }

    /// Memoized up-to-date status of a project named by manifest path.
    pub fn up_to_date_status_of_file(&mut self, path: &ConfigPath) -> UpToDateStatus {
        self.analysis().up_to_date_status_of_path(path)
    }

    /// Build the given project specs and everything they transitively
    /// reference, in dependency order.
    pub fn build_projects(&mut self, project_specs: &[String]) -> Result<()> {
        let roots = self.resolve_project_specs(project_specs)?;
        let mut graph =
            create_dependency_graph(self.host, &mut self.cache, self.reporter, &roots);

        if self.context.options.verbose {
            let order = graph
                .build_queue
                .attempt_order()
                .map(|p| format!("    {p}"))
                .collect::<Vec<_>>()
                .join("\n");
            self.context.verbose(
                self.reporter,
                format!("Projects in this build:\n{order}"),
            );
        }

        while let Some(project) = graph.build_queue.next() {
            let Some(config) = self.cache.parse(self.host, self.reporter, &project) else {
                self.reporter.report(&Diagnostic::error(format!(
                    "Could not load project '{project}'"
                )));
                break;
            };

            let status = self.up_to_date_status(&config);
            self.report_status(&project, &status);

            let force = self.context.options.force;
            match &status {
                UpToDateStatus::UpToDate(_) if !force => {
                    if self.context.options.dry {
                        self.reporter.report(&Diagnostic::message(format!(
                            "Project '{project}' is up to date"
                        )));
                    }
                }
                UpToDateStatus::PseudoUpToDate(_) if !force => {
                    self.update_output_timestamps(&config);
                }
                UpToDateStatus::UpstreamBlocked { upstream } => {
                    self.context.verbose(
                        self.reporter,
                        format!(
                            "Skipping project '{project}' because its upstream '{upstream}' cannot be built"
                        ),
                    );
                }
                _ => {
                    self.build_single_project(&project);
                }
            }
        }
        Ok(())
    }

    /// Delete every expected output of the given project specs and their
    /// transitive references that currently exists (or list them, in dry
    /// mode).
    pub fn clean_projects(&mut self, project_specs: &[String]) -> Result<()> {
        let roots = self.resolve_project_specs(project_specs)?;
        let mut graph =
            create_dependency_graph(self.host, &mut self.cache, self.reporter, &roots);

        let mut files_to_delete = Vec::new();
        while let Some(project) = graph.build_queue.next() {
            let Some(config) = self.cache.parse(self.host, self.reporter, &project) else {
                continue;
            };
            for output in output_files(&config) {
                if self.host.file_exists(&output) {
                    files_to_delete.push(output);
                }
            }
        }

        if self.context.options.dry {
            let listing = files_to_delete
                .iter()
                .map(|f| format!("    {}", f.display()))
                .collect::<Vec<_>>()
                .join("\n");
            self.reporter.report(&Diagnostic::message(format!(
                "A non-dry build would delete the following files:\n{listing}"
            )));
        } else {
            for file in &files_to_delete {
                if let Err(error) = self.host.delete_file(file) {
                    self.reporter.report(&Diagnostic::error(format!(
                        "Could not delete file {}: {error}",
                        file.display()
                    )));
                }
            }
        }
        Ok(())
    }

    fn analysis(&mut self) -> Analysis<'_> {
        Analysis {
            host: self.host,
            cache: &mut self.cache,
            context: &mut self.context,
            reporter: self.reporter,
        }
    }

    /// Resolve user-provided project specs against the working directory.
    /// A spec naming an existing file is taken verbatim; otherwise
    /// `tsconfig.json` is appended and re-tested. A spec resolving to
    /// neither aborts the whole invocation.
    fn resolve_project_specs(&mut self, project_specs: &[String]) -> Result<Vec<ConfigPath>> {
        let current_dir = self.host.current_dir();
        let mut roots = Vec::new();
        for spec in project_specs {
            let direct = ConfigPath::resolve(&current_dir, Path::new(spec));
            if self.host.file_exists(direct.as_path()) {
                roots.push(direct);
                continue;
            }
            let with_manifest =
                ConfigPath::resolve(direct.as_path(), Path::new("tsconfig.json"));
            if self.host.file_exists(with_manifest.as_path()) {
                roots.push(with_manifest);
                continue;
            }
            return Err(BuildError::unresolved_spec(spec));
        }
        Ok(roots)
    }

    /// Resolve a pseudo-up-to-date project by stamping every expected output
    /// with the current time. The memoized status keeps the newest *prior*
    /// declaration mtime as its declaration-change time so downstream
    /// decisions are not fooled by the touch.
    fn update_output_timestamps(&mut self, config: &ProjectConfig) {
        let project = &config.config_path;
        if self.context.options.dry {
            self.reporter.report(&Diagnostic::message(format!(
                "A non-dry build would update timestamps for output of project '{project}'"
            )));
            return;
        }
        self.context.verbose(
            self.reporter,
            format!("Updating output timestamps of project '{project}'"),
        );

        let now = self.host.now();
        let mut prior_newest_decl = MINIMUM_DATE;
        for output in output_files(config) {
            if is_declaration_file(&output) {
                if let Some(prior) = self.host.modified_time(&output) {
                    if prior > prior_newest_decl {
                        prior_newest_decl = prior;
                    }
                }
            }
            if let Err(error) = self.host.set_modified_time(&output, now) {
                self.reporter.report(&Diagnostic::error(format!(
                    "Could not update timestamp of {}: {error}",
                    output.display()
                )));
            }
        }

        self.context.set_status(
            project,
            UpToDateStatus::UpToDate(Freshness {
                newest_input_time: None,
                newest_decl_change_time: Some(prior_newest_decl),
                newest_output_time: None,
            }),
        );
    }

    fn build_single_project(&mut self, project: &ConfigPath) -> BuildResultFlags {
        if self.context.options.dry {
            self.reporter.report(&Diagnostic::message(format!(
                "A non-dry build would build project '{project}'"
            )));
            return BuildResultFlags::SUCCESS;
        }
        self.context
            .verbose(self.reporter, format!("Building project '{project}'"));

        let mut result_flags = BuildResultFlags::DECLARATION_OUTPUT_UNCHANGED;

        let Some(config) = self.cache.parse(self.host, self.reporter, project) else {
            result_flags |= BuildResultFlags::CONFIG_FILE_ERRORS;
            self.context.set_status(
                project,
                UpToDateStatus::Unbuildable {
                    reason: "Config file errors".to_string(),
                },
            );
            return result_flags;
        };

        if config.input_files.is_empty() {
            // A bare aggregator of references; nothing to emit.
            return BuildResultFlags::empty();
        }

        let mut program = self.compiler.create_program(
            ProgramRequest {
                root_names: &config.input_files,
                config: &config,
            },
            self.host,
        );

        // Diagnostics gate emit in a fixed order; the first failing stage
        // short-circuits the rest.
        let mut diagnostics = program.options_diagnostics();
        diagnostics.extend(program.syntactic_diagnostics());
        if !diagnostics.is_empty() {
            return self.fail_project(
                project,
                diagnostics,
                result_flags | BuildResultFlags::SYNTAX_ERRORS,
                "Syntactic errors",
            );
        }

        if config.declaration {
            let diagnostics = program.declaration_diagnostics();
            if !diagnostics.is_empty() {
                return self.fail_project(
                    project,
                    diagnostics,
                    result_flags | BuildResultFlags::DECLARATION_EMIT_ERRORS,
                    "Declaration file errors",
                );
            }
        }

        let diagnostics = program.semantic_diagnostics();
        if !diagnostics.is_empty() {
            return self.fail_project(
                project,
                diagnostics,
                result_flags | BuildResultFlags::TYPE_ERRORS,
                "Semantic errors",
            );
        }

        // Emit. The driver owns the writes so it can notice declaration
        // outputs whose new bytes match the old ones; those keep their
        // pre-write mtime as their content-change time.
        let host = self.host;
        let reporter = self.reporter;
        let context = &mut self.context;
        let mut newest_decl_change_time = MINIMUM_DATE;
        program.emit(&mut |path, content| {
            let mut prior_mtime = None;
            if is_declaration_file(path) {
                if let Some(existing) = host.read_file(path) {
                    if existing == content {
                        result_flags.remove(BuildResultFlags::DECLARATION_OUTPUT_UNCHANGED);
                        prior_mtime = host.modified_time(path);
                    }
                }
            }
            if let Err(error) = host.write_file(path, content) {
                reporter.report(&Diagnostic::error(format!(
                    "Could not write file {}: {error}",
                    path.display()
                )));
                return;
            }
            if let Some(prior) = prior_mtime {
                context.record_unchanged_output(path, prior);
                if prior > newest_decl_change_time {
                    newest_decl_change_time = prior;
                }
            }
        });

        result_flags |= BuildResultFlags::SUCCESS;
        self.context.set_status(
            project,
            UpToDateStatus::UpToDate(Freshness {
                newest_input_time: None,
                newest_decl_change_time: Some(newest_decl_change_time),
                newest_output_time: None,
            }),
        );
        result_flags
    }

    fn fail_project(
        &mut self,
        project: &ConfigPath,
        diagnostics: Vec<Diagnostic>,
        result_flags: BuildResultFlags,
        reason: &str,
    ) -> BuildResultFlags {
        for diagnostic in &diagnostics {
            self.reporter.report(diagnostic);
        }
        self.context.set_status(
            project,
            UpToDateStatus::Unbuildable {
                reason: reason.to_string(),
            },
        );
        result_flags
    }

    /// One verbose diagnostic per project, keyed on the status variant.
    /// Distinct texts per variant; none of these is fatal.
    fn report_status(&self, project: &ConfigPath, status: &UpToDateStatus) {
        if !self.context.options.verbose {
            return;
        }
        let message = match status {
            UpToDateStatus::Unbuildable { reason } => {
                format!("Project '{project}' can't be built: {reason}")
            }
            UpToDateStatus::UpToDate(_) => format!("Project '{project}' is up to date"),
            UpToDateStatus::PseudoUpToDate(_) => format!(
                "Project '{project}' is up to date with its upstream types; only output timestamps need updating"
            ),
            UpToDateStatus::OutputMissing { missing_output } => format!(
                "Project '{project}' is out of date because output file '{}' does not exist",
                missing_output.display()
            ),
            UpToDateStatus::OutOfDateWithSelf {
                stale_output,
                newer_input,
            } => format!(
                "Project '{project}' is out of date because output '{}' is older than input '{}'",
                stale_output.display(),
                newer_input.display()
            ),
            UpToDateStatus::OutOfDateWithUpstream {
                stale_output,
                newer_project,
            } => format!(
                "Project '{project}' is out of date because output '{}' is older than the newest input of project '{newer_project}'",
                stale_output.display()
            ),
            UpToDateStatus::UpstreamOutOfDate { upstream } => format!(
                "Project '{project}' is out of date because its upstream project '{upstream}' is out of date"
            ),
            UpToDateStatus::UpstreamBlocked { upstream } => format!(
                "Project '{project}' can't be built because its upstream project '{upstream}' failed to build"
            ),
        };
        self.reporter.report(&Diagnostic::verbose(message));
    }
}
