// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![allow(dead_code)]

//! # cilpurge
//!
//! A weaving pass that strips a foreign runtime library's metadata from compiled .NET
//! modules. By default it targets `FSharp.Core`: the compiler's bookkeeping attributes
//! and the assembly and module references to the library are removed, so that modules
//! which never actually call into the library no longer depend on it.
//!
//! ## Features
//!
//! - **Owned metadata model** - A mutable module tree (types, members, bodies, references)
//!   that hosts build once and write back once
//! - **Attribute purging** - Name-filtered on types, unconditional on members
//! - **Dependency reporting** - Foreign types, fields and methods still used by code are
//!   reported as warnings, never silently rewritten
//! - **Explicit plugin interface** - The [`weaver::Weaver`] trait and a
//!   [`weaver::WeavingPipeline`] that drives weavers and cleans up unused references
//!
//! ## Quick Start
//!
//! ```rust
//! use cilpurge::prelude::*;
//!
//! let mut module = Module::new("Library.dll");
//! module
//!     .assembly_references
//!     .push(AssemblyReference::new("FSharp.Core", AssemblyVersion::new(8, 0, 0, 0)));
//!
//! let mut pipeline = WeavingPipeline::new();
//! pipeline.register(Box::new(MetadataPurger::new(PurgeConfig::default())));
//!
//! let report = pipeline.run(&mut module)?;
//! assert!(module.assembly_references.is_empty());
//! println!("{}", report.diagnostics);
//! # Ok::<(), cilpurge::Error>(())
//! ```
//!
//! ## Logging
//!
//! The crate logs through the `log` facade. Every diagnostic a weaver reports is mirrored
//! at the matching level under the `cilpurge` target; the purger also logs its progress
//! at `debug` and a per-module summary at `info`.
//!
//! ## Development
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cilpurge::prelude::*;
///
/// let purger = MetadataPurger::default();
/// assert_eq!(purger.config().foreign_library, "FSharp.Core");
/// ```
pub mod prelude;

/// Owned metadata object model of a .NET module
///
/// This module provides the tree weavers operate on:
///
/// - **Module root**: reference tables, module and assembly attributes, type definitions
/// - **Members**: fields, properties, events, methods and nested types
/// - **Method bodies**: local variables and decoded instructions with structured operands
/// - **References**: type, field, method, assembly and module references
/// - **Diagnostics**: the channel weavers report unresolved symbols through
pub mod metadata;

/// Purging of foreign runtime-library metadata
///
/// See [`purge::MetadataPurger`] for the purge operations and [`purge::PurgeConfig`] for
/// what is considered foreign.
pub mod purge;

/// Weaver plugin interface and pipeline
///
/// See [`weaver::Weaver`] for the interface weavers implement and
/// [`weaver::WeavingPipeline`] for the host side driving them.
pub mod weaver;

/// `cilpurge` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cilpurge` Error type
///
/// The main error type for all fallible operations in this crate: configuration parsing
/// and pipeline execution. Purging itself reports problems as diagnostics instead.
pub use error::Error;
