//! Convention trait for composable build policy.

use crate::context::BuildContext;
use crate::error::ConfigurationError;
use crate::module::Module;

/// A named, composable, idempotent unit of build-graph mutation.
///
/// Applying a convention through [`Module::apply`] first applies every
/// convention returned by [`Convention::composes`], in order, and then calls
/// [`Convention::configure`]. The module remembers applied ids, so a
/// convention reached through several composition paths configures the
/// module exactly once.
///
/// # Example
///
/// ```ignore
/// use gatekeep_core::{BuildContext, ConfigurationError, Convention, ConventionBox, Module};
///
/// pub struct StrictLibrary;
///
/// impl Convention for StrictLibrary {
///     fn id(&self) -> &'static str { "strict-library" }
///
///     fn composes(&self) -> Vec<ConventionBox> {
///         vec![Box::new(CoreLibraryConvention::new())]
///     }
///
///     fn configure(&self, module: &mut Module, _ctx: &BuildContext) -> Result<(), ConfigurationError> {
///         module.tasks_mut().add_dependency("build", "check");
///         Ok(())
///     }
/// }
/// ```
pub trait Convention: Send + Sync {
    /// Stable identifier a module declares to adopt this convention.
    fn id(&self) -> &'static str;

    /// Returns a brief description of what this convention sets up.
    fn description(&self) -> &'static str {
        ""
    }

    /// Conventions applied before this one, in order.
    fn composes(&self) -> Vec<ConventionBox> {
        Vec::new()
    }

    /// Registers tasks and configures extensions on `module`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] to abort configuration; no task of
    /// the module will run.
    fn configure(&self, module: &mut Module, ctx: &BuildContext) -> Result<(), ConfigurationError>;
}

/// Type alias for boxed Convention trait objects.
pub type ConventionBox = Box<dyn Convention>;
