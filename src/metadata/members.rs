//! Type definitions and their members.
//!
//! The tree is owned and mutable: a [`TypeDefinition`] owns its fields, properties,
//! events, methods and nested types directly, so a weaver can remove or detach elements
//! in place. Property accessors are referenced by token into the declaring type's
//! method list, mirroring the MethodSemantics table.

use crate::metadata::{
    customattributes::{CustomAttribute, CustomAttributeList},
    method::MethodBody,
    references::{ResolutionScope, TypeReference},
    token::Token,
};

/// A type defined in the module (TypeDef row).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeDefinition {
    /// Token of the TypeDef row
    pub token: Token,
    /// `TypeNamespace`, empty for nested types
    pub namespace: String,
    /// `TypeName`
    pub name: String,
    /// Base type, `None` for interfaces and `System.Object`
    pub base_type: Option<TypeReference>,
    /// Implemented interfaces
    pub interfaces: Vec<TypeReference>,
    /// Custom attributes on the type
    pub custom_attributes: CustomAttributeList,
    /// Fields
    pub fields: Vec<FieldDefinition>,
    /// Properties
    pub properties: Vec<PropertyDefinition>,
    /// Events
    pub events: Vec<EventDefinition>,
    /// Methods, including property accessors
    pub methods: Vec<MethodDefinition>,
    /// Nested types
    pub nested_types: Vec<TypeDefinition>,
}

impl TypeDefinition {
    /// Creates an empty type definition.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeDefinition {
            namespace: namespace.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns the namespace-qualified name.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Returns a reference to this type as seen from inside the defining module.
    #[must_use]
    pub fn to_reference(&self) -> TypeReference {
        TypeReference::new(
            self.namespace.clone(),
            self.name.clone(),
            ResolutionScope::CurrentModule,
        )
        .with_token(self.token)
    }

    /// Looks up a method of this type by token.
    #[must_use]
    pub fn method(&self, token: Token) -> Option<&MethodDefinition> {
        self.methods.iter().find(|method| method.token == token)
    }

    /// Returns the number of types in this subtree, including this one.
    #[must_use]
    pub fn type_count(&self) -> usize {
        1 + self
            .nested_types
            .iter()
            .map(TypeDefinition::type_count)
            .sum::<usize>()
    }

    /// Calls `visitor` for every type reference mentioned by this type and its members,
    /// recursing into nested types.
    pub fn visit_type_references(&self, visitor: &mut dyn FnMut(&TypeReference)) {
        if let Some(base) = &self.base_type {
            base.visit(visitor);
        }
        for interface in &self.interfaces {
            interface.visit(visitor);
        }
        for attribute in &self.custom_attributes {
            attribute.attribute_type.visit(visitor);
        }
        for field in &self.fields {
            field.field_type.visit(visitor);
            for attribute in &field.custom_attributes {
                attribute.attribute_type.visit(visitor);
            }
        }
        for property in &self.properties {
            property.property_type.visit(visitor);
            for attribute in &property.custom_attributes {
                attribute.attribute_type.visit(visitor);
            }
        }
        for event in &self.events {
            event.event_type.visit(visitor);
            for attribute in &event.custom_attributes {
                attribute.attribute_type.visit(visitor);
            }
        }
        for method in &self.methods {
            method.visit_type_references(visitor);
        }
        for nested in &self.nested_types {
            nested.visit_type_references(visitor);
        }
    }

    /// Calls `visitor` for every custom attribute on this type, its members and its nested
    /// types.
    pub fn visit_custom_attributes(&self, visitor: &mut dyn FnMut(&CustomAttribute)) {
        let member_attributes = self
            .fields
            .iter()
            .flat_map(|field| &field.custom_attributes)
            .chain(self.properties.iter().flat_map(|property| &property.custom_attributes))
            .chain(self.events.iter().flat_map(|event| &event.custom_attributes))
            .chain(self.methods.iter().flat_map(|method| &method.custom_attributes));

        for attribute in self.custom_attributes.iter().chain(member_attributes) {
            visitor(attribute);
        }
        for nested in &self.nested_types {
            nested.visit_custom_attributes(visitor);
        }
    }
}

/// A field defined in the module (Field row).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    /// Token of the Field row
    pub token: Token,
    /// Field name
    pub name: String,
    /// Declared field type
    pub field_type: TypeReference,
    /// Custom attributes on the field
    pub custom_attributes: CustomAttributeList,
}

impl FieldDefinition {
    /// Creates a field without attributes.
    pub fn new(name: impl Into<String>, field_type: TypeReference) -> Self {
        FieldDefinition {
            token: Token::default(),
            name: name.into(),
            field_type,
            custom_attributes: Vec::new(),
        }
    }
}

/// A property defined in the module (Property row).
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    /// Token of the Property row
    pub token: Token,
    /// Property name
    pub name: String,
    /// Declared property type
    pub property_type: TypeReference,
    /// Custom attributes on the property
    pub custom_attributes: CustomAttributeList,
    /// Token of the getter in the declaring type's method list
    pub getter: Option<Token>,
    /// Token of the setter in the declaring type's method list
    pub setter: Option<Token>,
}

impl PropertyDefinition {
    /// Creates a property without accessors or attributes.
    pub fn new(name: impl Into<String>, property_type: TypeReference) -> Self {
        PropertyDefinition {
            token: Token::default(),
            name: name.into(),
            property_type,
            custom_attributes: Vec::new(),
            getter: None,
            setter: None,
        }
    }
}

/// An event defined in the module (Event row).
#[derive(Debug, Clone, PartialEq)]
pub struct EventDefinition {
    /// Token of the Event row
    pub token: Token,
    /// Event name
    pub name: String,
    /// Delegate type of the event
    pub event_type: TypeReference,
    /// Custom attributes on the event
    pub custom_attributes: CustomAttributeList,
}

impl EventDefinition {
    /// Creates an event without attributes.
    pub fn new(name: impl Into<String>, event_type: TypeReference) -> Self {
        EventDefinition {
            token: Token::default(),
            name: name.into(),
            event_type,
            custom_attributes: Vec::new(),
        }
    }
}

/// A method parameter (Param row plus its signature type).
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDefinition {
    /// 1-based sequence number
    pub sequence: u16,
    /// Parameter name
    pub name: String,
    /// Declared parameter type
    pub parameter_type: TypeReference,
}

/// A method defined in the module (MethodDef row).
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    /// Token of the MethodDef row
    pub token: Token,
    /// Method name
    pub name: String,
    /// Return type
    pub return_type: TypeReference,
    /// Parameters, in declaration order
    pub parameters: Vec<ParameterDefinition>,
    /// Custom attributes on the method
    pub custom_attributes: CustomAttributeList,
    /// IL body, `None` for abstract, extern and runtime-implemented methods
    pub body: Option<MethodBody>,
}

impl MethodDefinition {
    /// Creates a parameterless method without a body.
    pub fn new(name: impl Into<String>, return_type: TypeReference) -> Self {
        MethodDefinition {
            token: Token::default(),
            name: name.into(),
            return_type,
            parameters: Vec::new(),
            custom_attributes: Vec::new(),
            body: None,
        }
    }

    /// Appends a parameter with the next sequence number.
    ///
    /// Sequence numbers are 16-bit and start at 1, so at most 65535 parameters get
    /// distinct numbers. Parameters past that limit all get `u16::MAX` instead of wrapping
    /// around.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, parameter_type: TypeReference) -> Self {
        let sequence = u16::try_from(self.parameters.len() + 1).unwrap_or(u16::MAX);
        self.parameters.push(ParameterDefinition {
            sequence,
            name: name.into(),
            parameter_type,
        });
        self
    }

    /// Attaches an IL body.
    #[must_use]
    pub fn with_body(mut self, body: MethodBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Calls `visitor` for every type reference in the signature, attributes and body.
    pub fn visit_type_references(&self, visitor: &mut dyn FnMut(&TypeReference)) {
        self.return_type.visit(visitor);
        for parameter in &self.parameters {
            parameter.parameter_type.visit(visitor);
        }
        for attribute in &self.custom_attributes {
            attribute.attribute_type.visit(visitor);
        }
        if let Some(body) = &self.body {
            for local in &body.locals {
                local.variable_type.visit(visitor);
            }
            for instruction in &body.instructions {
                instruction.operand.visit(visitor);
            }
        }
    }
}
