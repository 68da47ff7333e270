//! Weaver plugin interface and the host-side pipeline driving it.
//!
//! A weaver is a pass over a loaded [`Module`]. The host loads the module, hands it to
//! every registered weaver together with a shared [`Diagnostics`] channel, and writes
//! the module back afterwards. Weavers advertise two capabilities to the host:
//!
//! - extra assemblies the host should load so the weaver can resolve references
//! - whether the host should drop assembly references left unused after weaving
//!
//! # Key Components
//!
//! - [`Weaver`] - The plugin interface
//! - [`WeavingPipeline`] - Runs weavers in order and applies reference cleanup
//! - [`WeaveReport`] - Outcome of a pipeline run
//! - [`remove_unused_references`] - The reference cleanup step
//!
//! # Example
//!
//! ```rust
//! use cilpurge::{
//!     metadata::module::Module,
//!     purge::MetadataPurger,
//!     weaver::WeavingPipeline,
//! };
//!
//! let mut pipeline = WeavingPipeline::new();
//! pipeline.register(Box::new(MetadataPurger::default()));
//!
//! let mut module = Module::new("Library.dll");
//! let report = pipeline.run(&mut module)?;
//! assert!(!report.diagnostics.has_warnings());
//! # Ok::<(), cilpurge::Error>(())
//! ```

mod pipeline;
mod references;

pub use pipeline::{WeaveReport, WeavingPipeline};
pub use references::remove_unused_references;

use crate::{
    metadata::{diagnostics::Diagnostics, module::Module},
    Result,
};

/// A pass that mutates a loaded module.
///
/// Implementations are registered explicitly with a [`WeavingPipeline`]; there is no
/// global registration.
pub trait Weaver {
    /// Human-readable name, used in logs and error messages.
    fn name(&self) -> &str;

    /// Processes `module` in place, reporting problems through `diagnostics`.
    ///
    /// # Errors
    ///
    /// Returns an error if the weaver cannot continue; the pipeline stops at the first
    /// failing weaver.
    fn execute(&self, module: &mut Module, diagnostics: &Diagnostics) -> Result<()>;

    /// Simple names of additional assemblies the host should load for reference
    /// resolution. Default is none.
    fn assemblies_for_scanning(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether the host should remove assembly references that are unused after
    /// weaving. Default is `false`.
    fn should_clean_references(&self) -> bool {
        false
    }
}
