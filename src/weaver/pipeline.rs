//! The host side of the weaver interface.

use std::collections::BTreeSet;

use crate::{
    metadata::{diagnostics::Diagnostics, module::Module, references::AssemblyReference},
    weaver::{remove_unused_references, Weaver},
    Error, Result,
};

/// Outcome of a [`WeavingPipeline::run`].
#[derive(Debug, Default)]
pub struct WeaveReport {
    /// Everything the weavers reported
    pub diagnostics: Diagnostics,
    /// Names of the weavers that ran, in order
    pub weavers_run: Vec<String>,
    /// Assembly references dropped by the post-weave cleanup
    pub removed_references: Vec<AssemblyReference>,
    /// Union of the assemblies the weavers asked to be scanned
    pub assemblies_for_scanning: BTreeSet<String>,
}

/// Runs registered weavers against a module, one after another.
///
/// All weavers share one [`Diagnostics`] channel. After the last weaver, unused assembly
/// references are removed if any weaver asked for it.
#[derive(Default)]
pub struct WeavingPipeline {
    weavers: Vec<Box<dyn Weaver>>,
}

impl WeavingPipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a weaver. Weavers run in registration order.
    pub fn register(&mut self, weaver: Box<dyn Weaver>) -> &mut Self {
        self.weavers.push(weaver);
        self
    }

    /// Number of registered weavers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weavers.len()
    }

    /// Returns true if no weaver is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weavers.is_empty()
    }

    /// Union of the assemblies all registered weavers ask to be scanned.
    #[must_use]
    pub fn assemblies_for_scanning(&self) -> BTreeSet<String> {
        self.weavers
            .iter()
            .flat_map(|weaver| weaver.assemblies_for_scanning())
            .collect()
    }

    /// Runs every weaver against `module`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Weaver`] for the first weaver that fails. Weavers registered after
    /// it do not run, and the reference cleanup is skipped.
    pub fn run(&self, module: &mut Module) -> Result<WeaveReport> {
        let mut report = WeaveReport {
            assemblies_for_scanning: self.assemblies_for_scanning(),
            ..WeaveReport::default()
        };

        for weaver in &self.weavers {
            log::debug!("Executing weaver {} on {}", weaver.name(), module.name);

            weaver
                .execute(module, &report.diagnostics)
                .map_err(|error| match error {
                    Error::Weaver { .. } => error,
                    other => Error::Weaver {
                        name: weaver.name().to_string(),
                        message: other.to_string(),
                    },
                })?;
            report.weavers_run.push(weaver.name().to_string());
        }

        if self.weavers.iter().any(|weaver| weaver.should_clean_references()) {
            report.removed_references = remove_unused_references(module);
        }

        Ok(report)
    }
}
