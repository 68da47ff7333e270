//! Owned, mutable metadata object model for .NET modules.
//!
//! This module contains the tree a weaving host hands to its weavers: a [`module::Module`]
//! with its reference tables and attributes, type definitions with their members, method
//! bodies with decoded instructions, and the reference handles that connect them to other
//! assemblies.
//!
//! # Key Components
//!
//! - [`module`] - The root [`module::Module`] and its owning [`module::AssemblyDefinition`]
//! - [`members`] - Type, field, property, event and method definitions
//! - [`method`] - Method bodies, locals, instructions and operands
//! - [`references`] - Type, field, method, assembly and module references
//! - [`customattributes`] - Custom attribute instances
//! - [`token`] - Metadata table row references used throughout .NET
//! - [`diagnostics`] - The diagnostic channel weavers report through
//!
//! # Examples
//!
//! ```rust
//! use cilpurge::metadata::{
//!     members::TypeDefinition,
//!     module::Module,
//!     references::{AssemblyReference, AssemblyVersion},
//! };
//!
//! let mut module = Module::new("Library.dll");
//! module
//!     .assembly_references
//!     .push(AssemblyReference::new("FSharp.Core", AssemblyVersion::new(8, 0, 0, 0)));
//! module.types.push(TypeDefinition::new("Library", "Say"));
//!
//! assert_eq!(module.type_count(), 1);
//! ```

/// Custom attribute instances
pub mod customattributes;

/// Diagnostic channel shared between host and weavers
pub mod diagnostics;

/// Type definitions and their members
pub mod members;

/// Method bodies and instructions
pub mod method;

/// The module root
pub mod module;

/// References to external metadata
pub mod references;

/// Metadata tokens
pub mod token;
