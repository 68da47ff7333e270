//! Custom attributes attached to modules, assemblies, types and members.
//!
//! Only the attribute type takes part in purging decisions; constructor arguments are
//! carried along so that kept attributes are written back unchanged. `System.Type` and
//! enum arguments name their type as a serialized, possibly assembly-qualified string
//! (`Ns.Type, OtherLib, Version=1.0.0.0`), and the assemblies named there still count as
//! referenced by the module.

use crate::metadata::{references::TypeReference, token::Token};

/// An ordered list of custom attributes on a metadata element
pub type CustomAttributeList = Vec<CustomAttribute>;

/// A single custom attribute instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttribute {
    /// Token of the CustomAttribute row
    pub token: Token,
    /// The attribute's type, i.e. the declaring type of its constructor
    pub attribute_type: TypeReference,
    /// Fixed constructor arguments
    pub arguments: Vec<CustomAttributeArgument>,
}

impl CustomAttribute {
    /// Creates an attribute instance without constructor arguments.
    pub fn new(attribute_type: TypeReference) -> Self {
        CustomAttribute {
            token: Token::default(),
            attribute_type,
            arguments: Vec::new(),
        }
    }

    /// Appends a fixed constructor argument.
    #[must_use]
    pub fn with_argument(mut self, argument: CustomAttributeArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Sets the metadata token of this attribute.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = token;
        self
    }

    /// The attribute type's short name, e.g. `CompilationMappingAttribute`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.attribute_type.name
    }

    /// Returns true if the attribute type is declared in `library`.
    ///
    /// Only the declaring scope counts. An attribute of another assembly instantiated over
    /// a type from `library`, e.g. `ValidateAttribute<Unit>`, is not from `library`.
    #[must_use]
    pub fn is_from(&self, library: &str) -> bool {
        self.attribute_type.scope_name() == Some(library)
    }

    /// Calls `visitor` with every assembly name that a `System.Type` or enum argument
    /// qualifies its type with.
    pub fn visit_argument_assemblies(&self, visitor: &mut dyn FnMut(&str)) {
        for argument in &self.arguments {
            argument.visit_assemblies(visitor);
        }
    }
}

/// A fixed argument value of a custom attribute constructor.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomAttributeArgument {
    /// Boolean value
    Bool(bool),
    /// Signed 32-bit integer
    I4(i32),
    /// Unsigned 32-bit integer
    U4(u32),
    /// Signed 64-bit integer
    I8(i64),
    /// 64-bit floating point
    R8(f64),
    /// UTF-8 string, `None` for a null string
    String(Option<String>),
    /// Type reference (as string)
    Type(String),
    /// Array of arguments
    Array(Vec<CustomAttributeArgument>),
    /// Enum value (enum type name + underlying value)
    Enum(String, Box<CustomAttributeArgument>),
}

impl CustomAttributeArgument {
    /// Calls `visitor` with the assembly names in this argument's serialized type names,
    /// including those of generic arguments and array elements.
    pub fn visit_assemblies(&self, visitor: &mut dyn FnMut(&str)) {
        match self {
            CustomAttributeArgument::Type(type_name) => {
                visit_qualified_assemblies(type_name, visitor);
            }
            CustomAttributeArgument::Enum(type_name, value) => {
                visit_qualified_assemblies(type_name, visitor);
                value.visit_assemblies(visitor);
            }
            CustomAttributeArgument::Array(elements) => {
                for element in elements {
                    element.visit_assemblies(visitor);
                }
            }
            _ => {}
        }
    }
}

/// Walks a serialized type name such as
/// ``Ns.Map`2[[Ns.Key, LibA],[Ns.Value, LibB]][], LibC, Version=1.0.0.0`` and reports
/// `LibA`, `LibB` and `LibC`.
///
/// The assembly name follows the first comma outside brackets. Bracket groups hold
/// generic arguments (each optionally wrapped in its own brackets when qualified) or
/// array ranks, which contain no names.
fn visit_qualified_assemblies(type_name: &str, visitor: &mut dyn FnMut(&str)) {
    let mut depth = 0usize;
    let mut group_start = 0;

    for (index, c) in type_name.char_indices() {
        match c {
            '[' => {
                if depth == 0 {
                    group_start = index + 1;
                }
                depth += 1;
            }
            ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    for argument in split_top_level(&type_name[group_start..index]) {
                        let argument = argument.trim();
                        let argument = argument
                            .strip_prefix('[')
                            .and_then(|inner| inner.strip_suffix(']'))
                            .unwrap_or(argument);
                        if !argument.is_empty() {
                            visit_qualified_assemblies(argument, visitor);
                        }
                    }
                }
            }
            ',' if depth == 0 => {
                if let Some(assembly) = type_name[index + 1..]
                    .split(',')
                    .next()
                    .map(str::trim)
                    .filter(|assembly| !assembly.is_empty())
                {
                    visitor(assembly);
                }
                return;
            }
            _ => {}
        }
    }
}

fn split_top_level(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (index, c) in list.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&list[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);
    parts
}
