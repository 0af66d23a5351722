//! Resource trait for declarative state management
//!
//! A Resource is something that can be in a certain state, and can be
//! changed to reach a desired state.

use crate::context::ApplyContext;
use crate::types::ResourceKind;
use anyhow::Result;
use std::fmt;

/// Core trait for declarative resources
///
/// Every resource kind implements this trait, which provides:
/// - Identity (kind, description)
/// - State detection (`is_satisfied`, the resource's own guard)
/// - State convergence (`apply`)
///
/// Both methods reach the outside world only through the collaborators in
/// [`ApplyContext`].
///
/// # Example
///
/// ```ignore
/// use declarative::{ApplyContext, Resource, ResourceKind};
///
/// #[derive(Debug)]
/// struct Tap { name: String }
///
/// impl Resource for Tap {
///     fn kind(&self) -> ResourceKind {
///         ResourceKind::Package
///     }
///
///     fn description(&self) -> String {
///         format!("Tap {}", self.name)
///     }
///
///     fn is_satisfied(&self, ctx: &ApplyContext) -> anyhow::Result<bool> {
///         ctx.packages.is_installed(&self.spec())
///     }
///
///     fn apply(&self, ctx: &ApplyContext) -> anyhow::Result<()> {
///         ctx.packages.install(&self.spec())
///     }
/// }
/// ```
pub trait Resource: fmt::Debug {
    /// Resource kind
    ///
    /// Used for listings and reports.
    fn kind(&self) -> ResourceKind;

    /// Human-readable description of what this resource does
    fn description(&self) -> String;

    /// Check whether the system already has the desired state
    ///
    /// Must not mutate anything. It is evaluated fresh on every run.
    fn is_satisfied(&self, ctx: &ApplyContext) -> Result<bool>;

    /// Converge the system to the desired state
    ///
    /// Called when the guard does not hold, or unconditionally when the
    /// resource is notified.
    fn apply(&self, ctx: &ApplyContext) -> Result<()>;
}

/// A boxed resource for type-erased storage
pub type BoxedResource = Box<dyn Resource>;
