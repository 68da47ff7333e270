//! The metadata purger weaver.
//!
//! Walks a [`Module`] and strips metadata contributed by the foreign runtime library:
//!
//! - AssemblyRef and ModuleRef rows naming the library are removed
//! - module- and assembly-level attributes from the library are removed
//! - type attributes from the library are removed if their name is in the configured
//!   removal set, and kept otherwise
//! - field, property, event and method attributes from the library are removed
//!   unconditionally
//!
//! Foreign types, fields and methods used by signatures, locals and instruction operands
//! are never rewritten. Each occurrence is reported as a warning on the diagnostic
//! channel so an operator can see which code still depends on the library.
//!
//! Every purge operation returns a removable signal and the caller removes the element
//! when it is set. Under the current policy no operation ever sets it, so definitions are
//! never deleted; only attributes and reference rows are.

use std::collections::HashMap;

use crate::{
    metadata::{
        customattributes::CustomAttributeList,
        diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics},
        members::{
            EventDefinition, FieldDefinition, MethodDefinition, PropertyDefinition,
            TypeDefinition,
        },
        module::Module,
        references::{ReferenceKind, TypeReference},
        token::Token,
    },
    purge::{PurgeConfig, PurgeStats, WEAVER_NAME},
    weaver::Weaver,
    Result,
};

/// Mutable state of one purge run.
///
/// Holds the diagnostic channel supplied by the host and accumulates [`PurgeStats`].
#[derive(Debug)]
pub struct PurgeContext<'a> {
    diagnostics: &'a Diagnostics,
    stats: PurgeStats,
    // Removable signals of accessors already purged through their property, keyed by
    // index into the current type's method list.
    accessor_signals: HashMap<usize, bool>,
}

impl<'a> PurgeContext<'a> {
    /// Creates a context reporting into `diagnostics`.
    pub fn new(diagnostics: &'a Diagnostics) -> Self {
        PurgeContext {
            diagnostics,
            stats: PurgeStats::new(),
            accessor_signals: HashMap::new(),
        }
    }

    /// Statistics collected so far.
    #[must_use]
    pub fn stats(&self) -> &PurgeStats {
        &self.stats
    }

    /// Consumes the context and returns the collected statistics.
    #[must_use]
    pub fn into_stats(self) -> PurgeStats {
        self.stats
    }

    fn report(&mut self, kind: ReferenceKind, symbol: String, usage: &str, owner: Token) {
        self.diagnostics.push(
            Diagnostic::new(
                DiagnosticSeverity::Warning,
                DiagnosticCategory::from(kind),
                format!("Unresolved {} reference {} in {}", kind, symbol, usage),
            )
            .with_symbol(symbol)
            .with_token(owner),
        );
        self.stats.unresolved_reported += 1;
    }
}

/// Runs `purge` on every element of `items` exactly once and removes the elements that
/// signal removable. Returns the number of removed elements.
///
/// Indices are collected in a first pass and removed back to front in a second, so
/// removals never shift an element that still has to be visited.
pub fn purge_each<T>(items: &mut Vec<T>, mut purge: impl FnMut(&mut T) -> bool) -> usize {
    let removable: Vec<usize> = items
        .iter_mut()
        .enumerate()
        .filter_map(|(index, item)| purge(item).then_some(index))
        .collect();

    remove_indices(items, &removable);
    removable.len()
}

/// Clears the getter and setter of `property` for which `removable` returns true, and
/// returns the number of accessors cleared.
///
/// `removable` is called once for each present accessor, getter first, with the
/// accessor's method token. Only the property's reference is dropped; the method
/// definition itself stays with its declaring type.
pub fn detach_accessors(
    property: &mut PropertyDefinition,
    mut removable: impl FnMut(Token) -> bool,
) -> usize {
    let mut detached = 0;
    for accessor in [&mut property.getter, &mut property.setter] {
        if let Some(token) = *accessor {
            if removable(token) {
                *accessor = None;
                detached += 1;
            }
        }
    }
    detached
}

// `indices` must be ascending.
fn remove_indices<T>(items: &mut Vec<T>, indices: &[usize]) {
    for &index in indices.iter().rev() {
        items.remove(index);
    }
}

/// Strips foreign runtime-library metadata from modules.
///
/// # Examples
///
/// ```rust
/// use cilpurge::{
///     metadata::{
///         diagnostics::Diagnostics,
///         module::Module,
///         references::{AssemblyReference, AssemblyVersion},
///     },
///     purge::MetadataPurger,
/// };
///
/// let mut module = Module::new("Library.dll");
/// module
///     .assembly_references
///     .push(AssemblyReference::new("FSharp.Core", AssemblyVersion::new(8, 0, 0, 0)));
///
/// let diagnostics = Diagnostics::new();
/// let stats = MetadataPurger::default().purge_module(&mut module, &diagnostics);
///
/// assert!(module.assembly_references.is_empty());
/// assert_eq!(stats.assembly_references_removed, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetadataPurger {
    config: PurgeConfig,
}

impl MetadataPurger {
    /// Creates a purger with the given configuration.
    #[must_use]
    pub fn new(config: PurgeConfig) -> Self {
        MetadataPurger { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &PurgeConfig {
        &self.config
    }

    /// Purges a whole module and returns what was done.
    pub fn purge_module(&self, module: &mut Module, diagnostics: &Diagnostics) -> PurgeStats {
        let mut ctx = PurgeContext::new(diagnostics);
        let library = self.config.foreign_library.as_str();

        let before = module.assembly_references.len();
        module
            .assembly_references
            .retain(|reference| reference.name != library);
        ctx.stats.assembly_references_removed = before - module.assembly_references.len();

        let before = module.module_references.len();
        module
            .module_references
            .retain(|reference| reference.name != library);
        ctx.stats.module_references_removed = before - module.module_references.len();

        ctx.stats.module_attributes_removed += self.remove_foreign(&mut module.custom_attributes);
        if let Some(assembly) = module.assembly.as_mut() {
            ctx.stats.module_attributes_removed +=
                self.remove_foreign(&mut assembly.custom_attributes);
        }

        let removed = purge_each(&mut module.types, |definition| {
            self.purge_type(definition, &mut ctx)
        });
        ctx.stats.types_removed += removed;

        ctx.into_stats()
    }

    /// Purges a type and, recursively, its members and nested types.
    ///
    /// Foreign attributes on the type are removed only when their name is in the removal
    /// set. Returns the removable signal for the type, which is always `false`.
    pub fn purge_type(&self, definition: &mut TypeDefinition, ctx: &mut PurgeContext<'_>) -> bool {
        ctx.stats.types_visited += 1;

        let library = self.config.foreign_library.as_str();
        let type_name = definition.full_name();
        let mut removed = 0;
        let mut kept = 0;
        definition.custom_attributes.retain(|attribute| {
            if !attribute.is_from(library) {
                return true;
            }
            if self.config.is_removable_attribute(attribute.name()) {
                log::debug!("Removing {} from {}", attribute.name(), type_name);
                removed += 1;
                false
            } else {
                log::debug!("Keeping unrecognized {} on {}", attribute.name(), type_name);
                kept += 1;
                true
            }
        });
        ctx.stats.type_attributes_removed += removed;
        ctx.stats.type_attributes_kept += kept;

        ctx.accessor_signals.clear();
        let methods = &mut definition.methods;
        let mut members_removed = purge_each(&mut definition.properties, |property| {
            self.purge_property(property, methods, ctx)
        });
        members_removed += purge_each(&mut definition.fields, |field| {
            self.purge_field(field, ctx)
        });
        members_removed += purge_each(&mut definition.events, |event| {
            self.purge_event(event, ctx)
        });

        let accessor_signals = std::mem::take(&mut ctx.accessor_signals);
        let mut removable = Vec::new();
        for (index, method) in definition.methods.iter_mut().enumerate() {
            let signal = match accessor_signals.get(&index) {
                Some(&signal) => signal,
                None => self.purge_method(method, ctx),
            };
            if signal {
                removable.push(index);
            }
        }
        remove_indices(&mut definition.methods, &removable);
        members_removed += removable.len();
        ctx.stats.members_removed += members_removed;

        let types_removed = purge_each(&mut definition.nested_types, |nested| {
            self.purge_type(nested, ctx)
        });
        ctx.stats.types_removed += types_removed;

        false
    }

    /// Removes every foreign attribute from a field. Always returns `false`.
    pub fn purge_field(&self, field: &mut FieldDefinition, ctx: &mut PurgeContext<'_>) -> bool {
        ctx.stats.member_attributes_removed += self.remove_foreign(&mut field.custom_attributes);
        false
    }

    /// Removes every foreign attribute from an event. Always returns `false`.
    pub fn purge_event(&self, event: &mut EventDefinition, ctx: &mut PurgeContext<'_>) -> bool {
        ctx.stats.member_attributes_removed += self.remove_foreign(&mut event.custom_attributes);
        false
    }

    /// Removes every foreign attribute from a property and purges its accessors.
    ///
    /// `methods` is the declaring type's method list the accessor tokens point into. An
    /// accessor whose purge signals removable is detached from the property; the method
    /// itself stays in `methods`. Accessors that are absent or do not resolve are
    /// skipped. Always returns `false`.
    pub fn purge_property(
        &self,
        property: &mut PropertyDefinition,
        methods: &mut [MethodDefinition],
        ctx: &mut PurgeContext<'_>,
    ) -> bool {
        ctx.stats.member_attributes_removed +=
            self.remove_foreign(&mut property.custom_attributes);

        let detached = detach_accessors(property, |token| {
            let Some(index) = methods.iter().position(|method| method.token == token) else {
                log::debug!("Accessor {} is not declared by its type", token);
                return false;
            };

            match ctx.accessor_signals.get(&index) {
                Some(&signal) => signal,
                None => {
                    let signal = self.purge_method(&mut methods[index], ctx);
                    ctx.accessor_signals.insert(index, signal);
                    signal
                }
            }
        });
        ctx.stats.accessors_detached += detached;

        false
    }

    /// Removes every foreign attribute from a method and reports foreign symbols in its
    /// signature, locals and instruction operands. Nothing is rewritten. Always returns
    /// `false`.
    pub fn purge_method(&self, method: &mut MethodDefinition, ctx: &mut PurgeContext<'_>) -> bool {
        ctx.stats.methods_visited += 1;
        ctx.stats.member_attributes_removed += self.remove_foreign(&mut method.custom_attributes);

        let owner = method.token;
        self.check_type(&method.return_type, ctx, owner, || {
            format!("return type of {}", method.name)
        });
        for parameter in &method.parameters {
            self.check_type(&parameter.parameter_type, ctx, owner, || {
                format!("parameter '{}' of {}", parameter.name, method.name)
            });
        }

        let Some(body) = &method.body else {
            return false;
        };

        for local in &body.locals {
            self.check_type(&local.variable_type, ctx, owner, || {
                format!("local {} of {}", local.index, method.name)
            });
        }

        let library = self.config.foreign_library.as_str();
        for instruction in &body.instructions {
            let usage = || {
                format!(
                    "'{}' at IL_{:04x} of {}",
                    instruction.mnemonic, instruction.offset, method.name
                )
            };
            let operand = &instruction.operand;
            if let Some(kind) = operand.reference_kind() {
                if operand.is_from(library) {
                    ctx.report(kind, operand.to_string(), &usage(), owner);
                }
            }
        }

        false
    }

    // Declared types are never substituted: a foreign type is reported and kept.
    fn check_type(
        &self,
        reference: &TypeReference,
        ctx: &mut PurgeContext<'_>,
        owner: Token,
        usage: impl FnOnce() -> String,
    ) {
        if reference.is_from(&self.config.foreign_library) {
            ctx.report(ReferenceKind::Type, reference.to_string(), &usage(), owner);
        }
    }

    fn remove_foreign(&self, attributes: &mut CustomAttributeList) -> usize {
        let before = attributes.len();
        attributes.retain(|attribute| !attribute.is_from(&self.config.foreign_library));
        before - attributes.len()
    }
}

impl Weaver for MetadataPurger {
    fn name(&self) -> &str {
        WEAVER_NAME
    }

    fn execute(&self, module: &mut Module, diagnostics: &Diagnostics) -> Result<()> {
        log::debug!(
            "Purging {} from {} ({})",
            self.config.foreign_library,
            module.name,
            module.mvid
        );

        let stats = self.purge_module(module, diagnostics);
        log::info!("{}: {}", module.name, stats);
        Ok(())
    }

    fn should_clean_references(&self) -> bool {
        true
    }
}
