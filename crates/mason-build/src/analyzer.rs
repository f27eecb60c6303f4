//! Up-to-date analysis
//!
//! Computes one [`UpToDateStatus`] per project per session from input and
//! output modification times plus the memoized statuses of upstream
//! projects. All comparisons are strict: equal timestamps count as up to
//! date.
//!
//! Scan order matters and is load-bearing. Inputs first (a missing input is
//! unbuildable, full stop). Outputs next, stopping at the first missing or
//! input-stale output but *not* returning yet. Upstreams next, so that an
//! upstream failure wins over a local missing-output or stale-output
//! conclusion: rebuilding locally is futile while an upstream is broken.

use crate::cache::ConfigCache;
use crate::context::BuildContext;
use crate::diagnostics::Reporter;
use crate::host::BuildHost;
use crate::status::{Freshness, UpToDateStatus, MINIMUM_DATE};
use mason_config::{is_declaration_file, output_files, ConfigPath, ProjectConfig};
use std::path::PathBuf;
use std::time::SystemTime;

/// One analysis pass over a project DAG, borrowing the session state.
pub(crate) struct Analysis<'a> {
    pub host: &'a dyn BuildHost,
    pub cache: &'a mut ConfigCache,
    pub context: &'a mut BuildContext,
    pub reporter: &'a dyn Reporter,
}

impl Analysis<'_> {
    /// Memoized status of a parsed project.
    pub fn up_to_date_status(&mut self, config: &ProjectConfig) -> UpToDateStatus {
        if let Some(existing) = self.context.status_of(&config.config_path) {
            return existing.clone();
        }
        let status = self.compute_status(config);
        self.context.set_status(&config.config_path, status.clone());
        status
    }

    /// Status of a project named by manifest path, parsing through the cache.
    ///
    /// A manifest that cannot be loaded is unbuildable; the result is not
    /// memoized so there is no status entry for a path with no project.
    pub fn up_to_date_status_of_path(&mut self, path: &ConfigPath) -> UpToDateStatus {
        match self.cache.parse(self.host, self.reporter, path) {
            Some(config) => self.up_to_date_status(&config),
            None => UpToDateStatus::Unbuildable {
                reason: format!("Config file '{path}' could not be loaded"),
            },
        }
    }

    fn compute_status(&mut self, config: &ProjectConfig) -> UpToDateStatus {
        // Input scan: every input must exist; track the newest.
        let mut newest_input: Option<(PathBuf, SystemTime)> = None;
        for input in &config.input_files {
            let Some(mtime) = self.host.modified_time(input) else {
                return UpToDateStatus::Unbuildable {
                    reason: format!("{} does not exist", input.display()),
                };
            };
            if newest_input.as_ref().is_none_or(|(_, t)| mtime > *t) {
                newest_input = Some((input.clone(), mtime));
            }
        }

        // Output scan. Stop at the first missing or input-stale output, but
        // conclude nothing until the upstreams have been consulted.
        let mut oldest_output: Option<(PathBuf, SystemTime)> = None;
        let mut newest_output_time: Option<SystemTime> = None;
        let mut newest_decl_change_time = MINIMUM_DATE;
        let mut missing_output: Option<PathBuf> = None;
        let mut stale_output: Option<(PathBuf, PathBuf)> = None;
        for output in output_files(config) {
            let Some(mtime) = self.host.modified_time(&output) else {
                missing_output = Some(output);
                break;
            };
            if oldest_output.as_ref().is_none_or(|(_, t)| mtime < *t) {
                oldest_output = Some((output.clone(), mtime));
            }
            if newest_output_time.is_none_or(|t| mtime > t) {
                newest_output_time = Some(mtime);
            }
            if let Some((input, input_time)) = &newest_input {
                if mtime < *input_time {
                    stale_output = Some((output, input.clone()));
                    break;
                }
            }
            if is_declaration_file(&output) {
                // An output rewritten byte-identically this session last
                // *changed* at its pre-rewrite mtime, not at its current one.
                let changed_at = self
                    .context
                    .unchanged_output_time(&output)
                    .unwrap_or(mtime);
                if changed_at > newest_decl_change_time {
                    newest_decl_change_time = changed_at;
                }
            }
        }
        let oldest_output_time = oldest_output.as_ref().map(|(_, t)| *t);

        // Upstream scan, before any local conclusion.
        let mut pseudo_up_to_date = false;
        for reference in &config.project_references {
            let upstream_status = self.up_to_date_status_of_path(reference);
            match upstream_status {
                UpToDateStatus::Unbuildable { .. } => {
                    return UpToDateStatus::UpstreamBlocked {
                        upstream: reference.clone(),
                    };
                }
                UpToDateStatus::UpToDate(freshness) => {
                    if not_newer_than(freshness.newest_input_time, oldest_output_time) {
                        continue;
                    }
                    if not_newer_than(freshness.newest_decl_change_time, oldest_output_time) {
                        // The upstream moved, but its declaration content
                        // did not; a timestamp refresh will settle this.
                        pseudo_up_to_date = true;
                        continue;
                    }
                    let Some((stale, _)) = &oldest_output else {
                        // No output on disk to be out of date with.
                        continue;
                    };
                    return UpToDateStatus::OutOfDateWithUpstream {
                        stale_output: stale.clone(),
                        newer_project: reference.clone(),
                    };
                }
                _ => {
                    return UpToDateStatus::UpstreamOutOfDate {
                        upstream: reference.clone(),
                    };
                }
            }
        }

        // Local conclusion.
        if let Some(missing_output) = missing_output {
            return UpToDateStatus::OutputMissing { missing_output };
        }
        if let Some((stale_output, newer_input)) = stale_output {
            return UpToDateStatus::OutOfDateWithSelf {
                stale_output,
                newer_input,
            };
        }

        let freshness = Freshness {
            newest_input_time: Some(
                newest_input.map_or(MINIMUM_DATE, |(_, t)| t),
            ),
            newest_decl_change_time: Some(newest_decl_change_time),
            newest_output_time,
        };
        if pseudo_up_to_date {
            UpToDateStatus::PseudoUpToDate(freshness)
        } else {
            UpToDateStatus::UpToDate(freshness)
        }
    }
}

/// Whether an upstream time puts no pressure on our oldest on-disk output.
///
/// `newest` is `None` when it was never observed (the upstream's status was
/// recorded by the driver after an in-session build); an unobserved time can
/// never vouch for being old enough. An absent `oldest` means no output is
/// on disk yet, so nothing can be older than it.
fn not_newer_than(newest: Option<SystemTime>, oldest: Option<SystemTime>) -> bool {
    match (newest, oldest) {
        (Some(n), Some(o)) => n <= o,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
