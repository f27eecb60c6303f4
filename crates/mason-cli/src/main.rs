use anyhow::Result;
use clap::Parser;
use mason_build::{BuildOptions, Diagnostic, Reporter, Severity, SolutionBuilder, SystemHost};
use std::cell::Cell;
use std::process::ExitCode;

mod emitter;

#[derive(Parser)]
#[command(name = "mason")]
#[command(about = "Incremental build orchestrator for multi-project solutions", long_about = None)]
#[command(version)]
struct Cli {
    /// Project manifests, or directories containing tsconfig.json
    projects: Vec<String>,

    /// Report each project's up-to-date status while building
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Show what would be done without touching the filesystem
    #[arg(short = 'd', long)]
    dry: bool,

    /// Rebuild every project regardless of status
    #[arg(short = 'f', long)]
    force: bool,

    /// Delete the outputs of the selected projects instead of building
    #[arg(long)]
    clean: bool,
}

/// Prints diagnostics and remembers whether any error went by; the process
/// exit status is nonzero iff one did.
struct ConsoleReporter {
    saw_error: Cell<bool>,
}

impl ConsoleReporter {
    fn new() -> Self {
        Self {
            saw_error: Cell::new(false),
        }
    }

    fn saw_error(&self) -> bool {
        self.saw_error.get()
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Error => {
                self.saw_error.set(true);
                eprintln!("error: {}", diagnostic.message);
            }
            Severity::Warning => eprintln!("warning: {}", diagnostic.message),
            Severity::Message | Severity::Verbose => println!("{}", diagnostic.message),
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let mut projects = cli.projects;
    if projects.is_empty() {
        projects.push(".".to_string());
    }

    let options = BuildOptions {
        dry: cli.dry,
        force: cli.force,
        verbose: cli.verbose,
    };
    let host = SystemHost;
    let compiler = emitter::PassthroughCompiler;
    let reporter = ConsoleReporter::new();
    let mut builder = SolutionBuilder::new(&host, &compiler, options, &reporter);

    if cli.clean {
        builder.clean_projects(&projects)?;
    } else {
        builder.build_projects(&projects)?;
    }
    Ok(!reporter.saw_error())
}
