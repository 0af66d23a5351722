//! # Declarative
//!
//! A framework for declarative, idempotent machine-state convergence.
//!
//! This crate provides the core abstractions for declaring desired state,
//! detecting current state, and converging systems to match it.
//!
//! ## Core Concepts
//!
//! - **Resource**: Something with state that can be checked and converged
//! - **Declaration**: A named resource with guards, dependencies and notifications
//! - **Plan**: A validated, ordered list of declarations
//! - **run**: Processes a plan sequentially and returns a [`RunReport`]
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{Declaration, Plan, RunOptions, NoProgress, run};
//!
//! let plan = Plan::new(vec![
//!     Declaration::new("zsh", Package::formula("zsh")),
//!     Declaration::new("default shell", Command::new(["chsh", "-s", "/opt/homebrew/bin/zsh"]))
//!         .depends_on("zsh")
//!         .guard(Guard::LoginShell("/opt/homebrew/bin/zsh".into())),
//! ])?;
//!
//! let report = run(&plan, &ctx, &RunOptions::default(), &mut NoProgress);
//! std::process::exit(report.status(false).exit_code(false).into());
//! ```
//!
//! ## Collaborator Traits
//!
//! Resources reach the system only through traits bundled in [`ApplyContext`]:
//!
//! - [`PackageManager`]: Probes and installs packages
//! - [`FileFetcher`]: Downloads files with checksum verification
//! - [`PreferenceStore`]: Reads and writes typed preference values
//! - [`ProcessRunner`]: Runs external commands
//! - [`AccountProbe`]: Reads account facts such as the login shell
//!
//! This keeps the engine testable with in-memory fakes.

pub mod context;
pub mod error;
pub mod executor;
pub mod guard;
pub mod plan;
pub mod resource;
pub mod types;
pub mod value;

// Re-export main types at crate root
pub use context::{
    AccountProbe, ApplyContext, FileFetcher, NoProgress, PackageManager, PreferenceStore,
    ProcessRunner, ProgressCallback,
};
pub use error::ValidationError;
pub use executor::{RunOptions, dry_run, run};
pub use guard::Guard;
pub use plan::{Declaration, Plan, Selector};
pub use resource::{BoxedResource, Resource};
pub use types::{
    CommandLine, CommandOutput, FailureKind, Outcome, PackageKind, PackageSpec, ReportEntry,
    ResourceKind, RunReport, RunStatus, RunSummary,
};
pub use value::TypedValue;
