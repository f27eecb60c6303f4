//! Per-project up-to-date status
//!
//! The analyzer produces exactly one of these per project per session.
//! Consumers match exhaustively; adding a variant is a compile-time
//! obligation on every reporter and dispatcher.

use mason_config::ConfigPath;
use std::path::PathBuf;
use std::time::SystemTime;

/// The earliest representable time; stands in for "older than everything"
/// when a freshly computed status has no inputs or no declaration outputs.
pub const MINIMUM_DATE: SystemTime = SystemTime::UNIX_EPOCH;

/// Timestamps collected while computing an up-to-date status.
///
/// Fields are `None` when the time was never observed: statuses recorded by
/// the driver after an in-session build or stamp do not rescan inputs or
/// outputs. Freshly computed statuses always carry `Some` input and
/// declaration times (falling back to [`MINIMUM_DATE`]), and downstream
/// analysis treats an unobserved time as "cannot vouch", never as "old".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Freshness {
    pub newest_input_time: Option<SystemTime>,
    /// Newest time at which a declaration output last changed content.
    /// For outputs rewritten byte-identically this session, that is the
    /// mtime from *before* the rewrite.
    pub newest_decl_change_time: Option<SystemTime>,
    pub newest_output_time: Option<SystemTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpToDateStatus {
    /// Config error, missing input, or a compilation failure this session.
    Unbuildable { reason: String },
    /// Every output is newer than every input and every upstream output.
    UpToDate(Freshness),
    /// Outputs are older than an upstream output, but that upstream's
    /// declaration content did not change since our last build; a
    /// timestamp-only refresh is semantically a rebuild.
    PseudoUpToDate(Freshness),
    /// At least one expected output is absent on disk.
    OutputMissing { missing_output: PathBuf },
    /// An output is older than one of this project's own inputs.
    OutOfDateWithSelf {
        stale_output: PathBuf,
        newer_input: PathBuf,
    },
    /// An output is older than the newest input of an upstream project
    /// whose declaration content actually changed.
    OutOfDateWithUpstream {
        stale_output: PathBuf,
        newer_project: ConfigPath,
    },
    /// An upstream project is itself not up to date.
    UpstreamOutOfDate { upstream: ConfigPath },
    /// An upstream project cannot be built; building this one is futile.
    UpstreamBlocked { upstream: ConfigPath },
}

impl UpToDateStatus {
    /// Strictly `UpToDate`; the pseudo state does not count.
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, UpToDateStatus::UpToDate(_))
    }

    pub fn is_unbuildable(&self) -> bool {
        matches!(self, UpToDateStatus::Unbuildable { .. })
    }
}
