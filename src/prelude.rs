//! # cilpurge Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the cilpurge library. Import this module to get quick access to the metadata
//! model, the purger and the weaving pipeline.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilpurge operations
pub use crate::Error;

/// The result type used throughout cilpurge
pub use crate::Result;

// ================================================================================================
// Metadata Model
// ================================================================================================

/// Module root and assembly manifest
pub use crate::metadata::module::{AssemblyDefinition, Module};

/// Type definitions and members
pub use crate::metadata::members::{
    EventDefinition, FieldDefinition, MethodDefinition, ParameterDefinition, PropertyDefinition,
    TypeDefinition,
};

/// Method bodies and instructions
pub use crate::metadata::method::{Immediate, Instruction, LocalVariable, MethodBody, Operand};

/// References to external metadata
pub use crate::metadata::references::{
    AssemblyReference, AssemblyVersion, FieldReference, MethodReference, ModuleReference,
    ReferenceKind, ResolutionScope, TypeReference,
};

/// Custom attributes
pub use crate::metadata::customattributes::{CustomAttribute, CustomAttributeArgument};

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Diagnostic channel
pub use crate::metadata::diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics,
};

// ================================================================================================
// Purging and Weaving
// ================================================================================================

/// The purger, its configuration and statistics
pub use crate::purge::{MetadataPurger, PurgeConfig, PurgeContext, PurgeStats};

/// Weaver interface and host pipeline
pub use crate::weaver::{WeaveReport, Weaver, WeavingPipeline};
