//! Solution-level incremental build orchestration
//!
//! Given root projects whose manifests reference each other in a DAG, this
//! crate decides per project whether it is up to date, can be refreshed by
//! stamping timestamps, must be rebuilt, or is blocked by an upstream
//! failure, and drives an external project compiler accordingly:
//! - Dependency graph construction and reverse-topological build ordering
//! - Per-project up-to-date analysis from modification times
//! - Session-scoped memoization of statuses and byte-identical declaration
//!   rewrites (the "pseudo up to date" fast path)
//! - A build driver with dry-run, force, and clean modes
//!
//! Compilation itself and the filesystem are consumed through the
//! [`CompilerFactory`] and [`BuildHost`] seams.

mod analyzer;

pub mod builder;
pub mod cache;
pub mod compiler;
pub mod context;
pub mod depmap;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod host;
pub mod status;

pub use builder::{BuildResultFlags, SolutionBuilder};
pub use cache::ConfigCache;
pub use compiler::{CompilerFactory, Program, ProgramRequest};
pub use context::{BuildContext, BuildOptions};
pub use depmap::DependencyMapper;
pub use diagnostics::{Diagnostic, Reporter, Severity};
pub use error::{BuildError, Result};
pub use graph::{create_dependency_graph, BuildQueue, DependencyGraph};
pub use host::{BuildHost, MemoryHost, SystemHost};
pub use status::{Freshness, UpToDateStatus, MINIMUM_DATE};
