//! Removal of assembly references left unused after weaving.

use crate::metadata::{module::Module, references::AssemblyReference};

/// Removes AssemblyRef rows that nothing in `module` refers to.
///
/// Every type reference reachable from the module is considered: attribute types, base
/// types and interfaces, member and signature types, locals, and instruction operands
/// including the declaring types and signatures of field and method references. So are
/// the assemblies named by assembly-qualified `System.Type` and enum arguments of custom
/// attributes. Kept references stay in their original order.
///
/// Returns the removed references, in their original order.
pub fn remove_unused_references(module: &mut Module) -> Vec<AssemblyReference> {
    let used = module.referenced_assemblies();

    let (kept, removed): (Vec<_>, Vec<_>) = std::mem::take(&mut module.assembly_references)
        .into_iter()
        .partition(|reference| used.contains(&reference.name));
    module.assembly_references = kept;

    for reference in &removed {
        log::debug!("Removing unused assembly reference {}", reference);
    }
    removed
}
