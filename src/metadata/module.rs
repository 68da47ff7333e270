//! The module being woven: the root of the metadata tree.

use std::collections::BTreeSet;

use uguid::Guid;

use crate::metadata::{
    customattributes::{CustomAttribute, CustomAttributeList},
    members::TypeDefinition,
    references::{AssemblyReference, AssemblyVersion, ModuleReference, TypeReference},
    token::{table, Token},
};

/// The assembly manifest owning a module (Assembly row).
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyDefinition {
    /// Token of the Assembly row
    pub token: Token,
    /// Simple assembly name
    pub name: String,
    /// Assembly version
    pub version: AssemblyVersion,
    /// Assembly-level custom attributes
    pub custom_attributes: CustomAttributeList,
}

impl AssemblyDefinition {
    /// Creates a manifest without attributes.
    pub fn new(name: impl Into<String>, version: AssemblyVersion) -> Self {
        AssemblyDefinition {
            token: Token::from_parts(table::ASSEMBLY, 1),
            name: name.into(),
            version,
            custom_attributes: Vec::new(),
        }
    }
}

/// A compiled module, loaded and mutable.
///
/// The host builds this tree once before weaving and serializes it once afterwards.
/// Weavers only mutate collections within it.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Module file name, e.g. `Library.dll`
    pub name: String,
    /// Module version identifier
    pub mvid: Guid,
    /// The owning assembly, `None` for netmodules
    pub assembly: Option<AssemblyDefinition>,
    /// AssemblyRef table, in row order
    pub assembly_references: Vec<AssemblyReference>,
    /// ModuleRef table, in row order
    pub module_references: Vec<ModuleReference>,
    /// Module-level custom attributes
    pub custom_attributes: CustomAttributeList,
    /// Top-level type definitions, in row order
    pub types: Vec<TypeDefinition>,
}

impl Module {
    /// Creates an empty module with a zero MVID.
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            mvid: Guid::ZERO,
            assembly: None,
            assembly_references: Vec::new(),
            module_references: Vec::new(),
            custom_attributes: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Returns the assembly reference with the given simple name.
    #[must_use]
    pub fn assembly_reference(&self, name: &str) -> Option<&AssemblyReference> {
        self.assembly_references
            .iter()
            .find(|reference| reference.name == name)
    }

    /// Finds a type by namespace-qualified name, searching nested types as well.
    ///
    /// Nested types are addressed as `Outer/Inner`.
    #[must_use]
    pub fn find_type(&self, full_name: &str) -> Option<&TypeDefinition> {
        let mut parts = full_name.split('/');
        let first = parts.next()?;
        let mut current = self.types.iter().find(|ty| ty.full_name() == first)?;
        for part in parts {
            current = current.nested_types.iter().find(|ty| ty.name == part)?;
        }
        Some(current)
    }

    /// Returns the total number of type definitions, including nested types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.iter().map(TypeDefinition::type_count).sum()
    }

    /// Calls `visitor` for every type reference reachable from this module.
    pub fn visit_type_references(&self, visitor: &mut dyn FnMut(&TypeReference)) {
        if let Some(assembly) = &self.assembly {
            for attribute in &assembly.custom_attributes {
                attribute.attribute_type.visit(visitor);
            }
        }
        for attribute in &self.custom_attributes {
            attribute.attribute_type.visit(visitor);
        }
        for definition in &self.types {
            definition.visit_type_references(visitor);
        }
    }

    /// Calls `visitor` for every custom attribute in this module: assembly, module, type
    /// and member attributes.
    pub fn visit_custom_attributes(&self, visitor: &mut dyn FnMut(&CustomAttribute)) {
        if let Some(assembly) = &self.assembly {
            for attribute in &assembly.custom_attributes {
                visitor(attribute);
            }
        }
        for attribute in &self.custom_attributes {
            visitor(attribute);
        }
        for definition in &self.types {
            definition.visit_custom_attributes(visitor);
        }
    }

    /// Returns the names of all assemblies this module refers to.
    ///
    /// That is every assembly a type reference resolves from, plus every assembly named
    /// by an assembly-qualified type in a custom attribute argument.
    #[must_use]
    pub fn referenced_assemblies(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.visit_type_references(&mut |reference| {
            if let Some(name) = reference.assembly_name() {
                names.insert(name.to_string());
            }
        });
        self.visit_custom_attributes(&mut |attribute| {
            attribute.visit_argument_assemblies(&mut |name| {
                names.insert(name.to_string());
            });
        });
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        customattributes::CustomAttributeArgument,
        members::{FieldDefinition, MethodDefinition},
        references::ResolutionScope,
    };

    #[test]
    fn test_find_type_nested() {
        let mut module = Module::new("Library.dll");
        let mut outer = TypeDefinition::new("Lib", "Outer");
        let mut inner = TypeDefinition::new("", "Inner");
        inner.nested_types.push(TypeDefinition::new("", "Deepest"));
        outer.nested_types.push(inner);
        module.types.push(outer);

        assert!(module.find_type("Lib.Outer").is_some());
        assert_eq!(
            module.find_type("Lib.Outer/Inner/Deepest").map(|t| t.name.as_str()),
            Some("Deepest")
        );
        assert!(module.find_type("Lib.Outer/Missing").is_none());
        assert!(module.find_type("Lib.Missing").is_none());
        assert_eq!(module.type_count(), 3);
    }

    #[test]
    fn test_referenced_assemblies() {
        let mut module = Module::new("Library.dll");
        let mut assembly = AssemblyDefinition::new("Library", AssemblyVersion::new(1, 0, 0, 0));
        assembly.custom_attributes.push(CustomAttribute::new(TypeReference::external(
            "System.Runtime",
            "System.Runtime.Versioning",
            "TargetFrameworkAttribute",
        )));
        module.assembly = Some(assembly);

        let mut definition = TypeDefinition::new("Lib", "Values");
        definition.fields.push(FieldDefinition::new(
            "empty",
            TypeReference::external("FSharp.Core", "Microsoft.FSharp.Collections", "FSharpList`1"),
        ));
        module.types.push(definition);

        let names: Vec<String> = module.referenced_assemblies().into_iter().collect();
        assert_eq!(names, vec!["FSharp.Core", "System.Runtime"]);
    }

    #[test]
    fn test_referenced_assemblies_from_attribute_arguments() {
        let mut module = Module::new("Library.dll");
        module.custom_attributes.push(
            CustomAttribute::new(TypeReference::new(
                "Lib",
                "PluginAttribute",
                ResolutionScope::CurrentModule,
            ))
            .with_argument(CustomAttributeArgument::Type("Host.Plugin, HostLib".into())),
        );

        let mut definition = TypeDefinition::new("Lib", "Values");
        let mut method = MethodDefinition::new(
            "Convert",
            TypeReference::new("Lib", "Values", ResolutionScope::CurrentModule),
        );
        method.custom_attributes.push(
            CustomAttribute::new(TypeReference::new(
                "Lib",
                "ConverterAttribute",
                ResolutionScope::CurrentModule,
            ))
            .with_argument(CustomAttributeArgument::Enum(
                "Other.Mode, OtherLib".into(),
                Box::new(CustomAttributeArgument::I4(2)),
            )),
        );
        definition.methods.push(method);
        let mut nested = TypeDefinition::new("", "Inner");
        nested.custom_attributes.push(
            CustomAttribute::new(TypeReference::new(
                "Lib",
                "ConverterAttribute",
                ResolutionScope::CurrentModule,
            ))
            .with_argument(CustomAttributeArgument::Type("Third.Thing, ThirdLib".into())),
        );
        definition.nested_types.push(nested);
        module.types.push(definition);

        let mut visited = 0;
        module.visit_custom_attributes(&mut |_| visited += 1);
        assert_eq!(visited, 3);

        let names: Vec<String> = module.referenced_assemblies().into_iter().collect();
        assert_eq!(names, vec!["HostLib", "OtherLib", "ThirdLib"]);
    }

    #[test]
    fn test_assembly_reference_lookup() {
        let mut module = Module::new("Library.dll");
        module
            .assembly_references
            .push(AssemblyReference::new("FSharp.Core", AssemblyVersion::new(8, 0, 0, 0)));

        assert!(module.assembly_reference("FSharp.Core").is_some());
        assert!(module.assembly_reference("System.Runtime").is_none());
        assert_eq!(module.mvid, Guid::ZERO);
    }
}
