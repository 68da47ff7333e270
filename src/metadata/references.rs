//! References to metadata defined outside the module being woven.
//!
//! This module contains the handles that appear as declared types, attribute types and
//! instruction operands ([`TypeReference`], [`FieldReference`], [`MethodReference`]), as
//! well as the module-level reference tables ([`AssemblyReference`], [`ModuleReference`]).
//!
//! # Origin
//!
//! The origin of a reference is the name of the assembly or module it resolves from.
//! For a nested type reference the origin is the origin of its enclosing type, and a
//! generic instantiation also depends on the origins of all of its type arguments. This
//! is what [`TypeReference::is_from`] checks.

use std::fmt;

use strum::{Display, EnumIter};

use crate::metadata::token::Token;

/// The kind of symbol a reference handle points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ReferenceKind {
    /// A type (TypeRef / TypeSpec)
    Type,
    /// A field (MemberRef with a field signature)
    Field,
    /// A method (MemberRef with a method signature, or MethodSpec)
    Method,
}

/// Where a [`TypeReference`] is resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionScope {
    /// The type is defined in the module being woven
    CurrentModule,
    /// The type lives in the referenced assembly with this name
    Assembly(String),
    /// The type lives in another module of the same assembly
    Module(String),
    /// The type is nested inside the given type
    Nested(Box<TypeReference>),
}

/// A reference to a type, as used by signatures, attributes and operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    /// Token of the TypeRef, TypeDef or TypeSpec row this reference was read from
    pub token: Token,
    /// `TypeNamespace`, empty for nested types and the global namespace
    pub namespace: String,
    /// `TypeName`
    pub name: String,
    /// Resolution scope
    pub scope: ResolutionScope,
    /// Type arguments of a generic instantiation, in declaration order
    pub generic_arguments: Vec<TypeReference>,
}

impl TypeReference {
    /// Creates a non-generic type reference.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, scope: ResolutionScope) -> Self {
        TypeReference {
            token: Token::default(),
            namespace: namespace.into(),
            name: name.into(),
            scope,
            generic_arguments: Vec::new(),
        }
    }

    /// Creates a reference to a type in the referenced assembly `assembly`.
    pub fn external(
        assembly: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(namespace, name, ResolutionScope::Assembly(assembly.into()))
    }

    /// Creates a reference to a type nested in `enclosing`.
    pub fn nested(enclosing: TypeReference, name: impl Into<String>) -> Self {
        Self::new("", name, ResolutionScope::Nested(Box::new(enclosing)))
    }

    /// Sets the metadata token of this reference.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = token;
        self
    }

    /// Appends a type argument, turning this reference into a generic instantiation.
    #[must_use]
    pub fn with_generic_argument(mut self, argument: TypeReference) -> Self {
        self.generic_arguments.push(argument);
        self
    }

    /// Returns the name of the assembly or module this type resolves from.
    ///
    /// Nested types report the scope of their outermost enclosing type. Types of the
    /// current module have no scope name.
    #[must_use]
    pub fn scope_name(&self) -> Option<&str> {
        match &self.scope {
            ResolutionScope::CurrentModule => None,
            ResolutionScope::Assembly(name) | ResolutionScope::Module(name) => Some(name),
            ResolutionScope::Nested(enclosing) => enclosing.scope_name(),
        }
    }

    /// Returns the assembly name this type resolves from, if it is external.
    #[must_use]
    pub fn assembly_name(&self) -> Option<&str> {
        match &self.scope {
            ResolutionScope::Assembly(name) => Some(name),
            ResolutionScope::Nested(enclosing) => enclosing.assembly_name(),
            ResolutionScope::CurrentModule | ResolutionScope::Module(_) => None,
        }
    }

    /// Returns true if this type, or any of its generic arguments, originates from `library`.
    #[must_use]
    pub fn is_from(&self, library: &str) -> bool {
        self.scope_name() == Some(library)
            || self.generic_arguments.iter().any(|arg| arg.is_from(library))
    }

    /// Returns the namespace-qualified name, using `/` between enclosing and nested types.
    ///
    /// Generic arguments and the scope are not part of the full name.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.scope {
            ResolutionScope::Nested(enclosing) => format!("{}/{}", enclosing.full_name(), self.name),
            _ if self.namespace.is_empty() => self.name.clone(),
            _ => format!("{}.{}", self.namespace, self.name),
        }
    }

    /// Calls `visitor` for this reference, its enclosing types and all generic arguments.
    pub fn visit(&self, visitor: &mut dyn FnMut(&TypeReference)) {
        visitor(self);
        if let ResolutionScope::Nested(enclosing) = &self.scope {
            enclosing.visit(visitor);
        }
        for argument in &self.generic_arguments {
            argument.visit(visitor);
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = self.scope_name() {
            write!(f, "[{}]", scope)?;
        }
        write!(f, "{}", self.full_name())?;

        if !self.generic_arguments.is_empty() {
            write!(f, "<")?;
            for (index, argument) in self.generic_arguments.iter().enumerate() {
                if index > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", argument)?;
            }
            write!(f, ">")?;
        }

        Ok(())
    }
}

/// A reference to a field, as used by `ldfld`, `stsfld` and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldReference {
    /// Token of the MemberRef or Field row
    pub token: Token,
    /// Field name
    pub name: String,
    /// Type declaring the field
    pub declaring_type: TypeReference,
    /// Declared type of the field
    pub field_type: TypeReference,
}

impl FieldReference {
    /// Creates a new field reference.
    pub fn new(
        declaring_type: TypeReference,
        name: impl Into<String>,
        field_type: TypeReference,
    ) -> Self {
        FieldReference {
            token: Token::default(),
            name: name.into(),
            declaring_type,
            field_type,
        }
    }

    /// Returns true if the declaring type originates from `library`.
    #[must_use]
    pub fn is_from(&self, library: &str) -> bool {
        self.declaring_type.is_from(library)
    }

    /// Calls `visitor` for every type reference this field reference mentions.
    pub fn visit(&self, visitor: &mut dyn FnMut(&TypeReference)) {
        self.declaring_type.visit(visitor);
        self.field_type.visit(visitor);
    }
}

impl fmt::Display for FieldReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_type, self.name)
    }
}

/// A reference to a method, as used by `call`, `newobj`, `ldftn` and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodReference {
    /// Token of the MemberRef, MethodDef or MethodSpec row
    pub token: Token,
    /// Method name
    pub name: String,
    /// Type declaring the method
    pub declaring_type: TypeReference,
    /// Return type from the method signature
    pub return_type: TypeReference,
    /// Parameter types from the method signature
    pub parameter_types: Vec<TypeReference>,
}

impl MethodReference {
    /// Creates a new method reference without parameters.
    pub fn new(
        declaring_type: TypeReference,
        name: impl Into<String>,
        return_type: TypeReference,
    ) -> Self {
        MethodReference {
            token: Token::default(),
            name: name.into(),
            declaring_type,
            return_type,
            parameter_types: Vec::new(),
        }
    }

    /// Appends a parameter type to the signature.
    #[must_use]
    pub fn with_parameter(mut self, parameter_type: TypeReference) -> Self {
        self.parameter_types.push(parameter_type);
        self
    }

    /// Returns true if the declaring type originates from `library`.
    #[must_use]
    pub fn is_from(&self, library: &str) -> bool {
        self.declaring_type.is_from(library)
    }

    /// Calls `visitor` for every type reference this method reference mentions.
    pub fn visit(&self, visitor: &mut dyn FnMut(&TypeReference)) {
        self.declaring_type.visit(visitor);
        self.return_type.visit(visitor);
        for parameter in &self.parameter_types {
            parameter.visit(visitor);
        }
    }
}

impl fmt::Display for MethodReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(", self.declaring_type, self.name)?;
        for (index, parameter) in self.parameter_types.iter().enumerate() {
            if index > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", parameter)?;
        }
        write!(f, ")")
    }
}

/// Four-part assembly version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssemblyVersion {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl AssemblyVersion {
    /// Creates a new version.
    #[must_use]
    pub fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// A row of the AssemblyRef table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReference {
    /// Token of the AssemblyRef row
    pub token: Token,
    /// Simple name of the referenced assembly
    pub name: String,
    /// Referenced version
    pub version: AssemblyVersion,
    /// Culture, `None` for neutral assemblies
    pub culture: Option<String>,
    /// Public key token, `None` for unsigned assemblies
    pub public_key_token: Option<[u8; 8]>,
}

impl AssemblyReference {
    /// Creates a culture-neutral, unsigned reference.
    pub fn new(name: impl Into<String>, version: AssemblyVersion) -> Self {
        AssemblyReference {
            token: Token::default(),
            name: name.into(),
            version,
            culture: None,
            public_key_token: None,
        }
    }

    /// Sets the metadata token of this reference.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = token;
        self
    }

    /// Sets the public key token of this reference.
    #[must_use]
    pub fn with_public_key_token(mut self, public_key_token: [u8; 8]) -> Self {
        self.public_key_token = Some(public_key_token);
        self
    }
}

impl fmt::Display for AssemblyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, Version={}, Culture={}",
            self.name,
            self.version,
            self.culture.as_deref().unwrap_or("neutral")
        )?;
        match &self.public_key_token {
            Some(token) => {
                write!(f, ", PublicKeyToken=")?;
                for byte in token {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            None => write!(f, ", PublicKeyToken=null"),
        }
    }
}

/// A row of the ModuleRef table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReference {
    /// Token of the ModuleRef row
    pub token: Token,
    /// Name of the referenced module
    pub name: String,
}

impl ModuleReference {
    /// Creates a new module reference.
    pub fn new(name: impl Into<String>) -> Self {
        ModuleReference {
            token: Token::default(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn fsharp_list(argument: TypeReference) -> TypeReference {
        TypeReference::external("FSharp.Core", "Microsoft.FSharp.Collections", "FSharpList`1")
            .with_generic_argument(argument)
    }

    fn system_int32() -> TypeReference {
        TypeReference::external("System.Runtime", "System", "Int32")
    }

    #[test]
    fn test_scope_of_nested_reference() {
        let outer = TypeReference::external("FSharp.Core", "Microsoft.FSharp.Core", "Operators");
        let nested = TypeReference::nested(outer, "Unchecked");

        assert_eq!(nested.scope_name(), Some("FSharp.Core"));
        assert_eq!(nested.assembly_name(), Some("FSharp.Core"));
        assert_eq!(nested.full_name(), "Microsoft.FSharp.Core.Operators/Unchecked");
        assert!(nested.is_from("FSharp.Core"));
    }

    #[test]
    fn test_generic_argument_origin() {
        let list_of_unit = TypeReference::external("System.Collections", "System.Collections.Generic", "List`1")
            .with_generic_argument(TypeReference::external(
                "FSharp.Core",
                "Microsoft.FSharp.Core",
                "Unit",
            ));

        assert!(list_of_unit.is_from("FSharp.Core"));
        assert!(!system_int32().is_from("FSharp.Core"));
        assert!(fsharp_list(system_int32()).is_from("FSharp.Core"));
    }

    #[test]
    fn test_module_scope_has_no_assembly() {
        let reference = TypeReference::new("", "Native", ResolutionScope::Module("native.dll".into()));

        assert_eq!(reference.scope_name(), Some("native.dll"));
        assert_eq!(reference.assembly_name(), None);

        let local = TypeReference::new("App", "Program", ResolutionScope::CurrentModule);
        assert_eq!(local.scope_name(), None);
        assert_eq!(format!("{}", local), "App.Program");
    }

    #[test]
    fn test_display_generic_instantiation() {
        let list = fsharp_list(system_int32());
        assert_eq!(
            format!("{}", list),
            "[FSharp.Core]Microsoft.FSharp.Collections.FSharpList`1<[System.Runtime]System.Int32>"
        );
    }

    #[test]
    fn test_visit_covers_nested_and_arguments() {
        let outer = TypeReference::external("FSharp.Core", "Microsoft.FSharp.Core", "Operators");
        let nested = TypeReference::nested(outer, "Unchecked").with_generic_argument(system_int32());

        let mut seen = Vec::new();
        nested.visit(&mut |reference| seen.push(reference.name.clone()));

        assert_eq!(seen, vec!["Unchecked", "Operators", "Int32"]);
    }

    #[test]
    fn test_member_reference_display_and_origin() {
        let unit = TypeReference::external("FSharp.Core", "Microsoft.FSharp.Core", "Unit");
        let field = FieldReference::new(unit.clone(), "value", unit.clone());
        let method = MethodReference::new(
            TypeReference::external("FSharp.Core", "Microsoft.FSharp.Core", "Operators"),
            "Raise",
            system_int32(),
        )
        .with_parameter(system_int32());

        assert!(field.is_from("FSharp.Core"));
        assert_eq!(
            format!("{}", field),
            "[FSharp.Core]Microsoft.FSharp.Core.Unit::value"
        );
        assert!(method.is_from("FSharp.Core"));
        assert_eq!(
            format!("{}", method),
            "[FSharp.Core]Microsoft.FSharp.Core.Operators::Raise([System.Runtime]System.Int32)"
        );
    }

    #[test]
    fn test_assembly_reference_display() {
        let reference = AssemblyReference::new("FSharp.Core", AssemblyVersion::new(8, 0, 0, 0))
            .with_public_key_token([0xb0, 0x3f, 0x5f, 0x7f, 0x11, 0xd5, 0x0a, 0x3a]);

        assert_eq!(
            format!("{}", reference),
            "FSharp.Core, Version=8.0.0.0, Culture=neutral, PublicKeyToken=b03f5f7f11d50a3a"
        );
    }

    #[test]
    fn test_reference_kind_names() {
        let names: Vec<String> = ReferenceKind::iter().map(|kind| kind.to_string()).collect();
        assert_eq!(names, vec!["type", "field", "method"]);
    }
}
