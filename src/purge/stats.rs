//! Statistics tracking for purge runs.
//!
//! Provides [`PurgeStats`] to track what was removed and what was only reported,
//! useful for logging and for asserting behavior in tests.

use std::fmt;

/// Statistics from a purge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeStats {
    /// Number of AssemblyRef entries removed.
    pub assembly_references_removed: usize,
    /// Number of ModuleRef entries removed.
    pub module_references_removed: usize,
    /// Number of module- and assembly-level custom attributes removed.
    pub module_attributes_removed: usize,
    /// Number of custom attributes removed from types.
    pub type_attributes_removed: usize,
    /// Number of custom attributes removed from fields, properties, events and methods.
    pub member_attributes_removed: usize,
    /// Number of foreign type attributes kept because they are not in the removal set.
    pub type_attributes_kept: usize,
    /// Number of property accessors detached.
    pub accessors_detached: usize,
    /// Number of fields, properties, events and methods removed.
    pub members_removed: usize,
    /// Number of type definitions removed.
    pub types_removed: usize,
    /// Number of type definitions visited.
    pub types_visited: usize,
    /// Number of methods visited.
    pub methods_visited: usize,
    /// Number of unresolved foreign symbols reported.
    pub unresolved_reported: usize,
}

impl PurgeStats {
    /// Creates a new empty stats instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of custom attributes removed.
    #[must_use]
    pub fn attributes_removed(&self) -> usize {
        self.module_attributes_removed + self.type_attributes_removed + self.member_attributes_removed
    }

    /// Returns the total number of metadata entries removed or detached.
    #[must_use]
    pub fn total_removed(&self) -> usize {
        self.assembly_references_removed
            + self.module_references_removed
            + self.attributes_removed()
            + self.accessors_detached
            + self.members_removed
            + self.types_removed
    }

    /// Returns true if the run changed the module.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.total_removed() > 0
    }

    /// Merges stats from another run into this one.
    pub fn merge(&mut self, other: &PurgeStats) {
        self.assembly_references_removed += other.assembly_references_removed;
        self.module_references_removed += other.module_references_removed;
        self.module_attributes_removed += other.module_attributes_removed;
        self.type_attributes_removed += other.type_attributes_removed;
        self.member_attributes_removed += other.member_attributes_removed;
        self.type_attributes_kept += other.type_attributes_kept;
        self.accessors_detached += other.accessors_detached;
        self.members_removed += other.members_removed;
        self.types_removed += other.types_removed;
        self.types_visited += other.types_visited;
        self.methods_visited += other.methods_visited;
        self.unresolved_reported += other.unresolved_reported;
    }
}

impl fmt::Display for PurgeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_changes() && self.unresolved_reported == 0 {
            return write!(f, "No changes");
        }

        let mut parts = Vec::new();

        if self.assembly_references_removed > 0 {
            parts.push(format!(
                "{} assembly references",
                self.assembly_references_removed
            ));
        }
        if self.module_references_removed > 0 {
            parts.push(format!("{} module references", self.module_references_removed));
        }
        if self.attributes_removed() > 0 {
            parts.push(format!("{} attributes", self.attributes_removed()));
        }
        if self.accessors_detached > 0 {
            parts.push(format!("{} accessors", self.accessors_detached));
        }
        if self.members_removed > 0 {
            parts.push(format!("{} members", self.members_removed));
        }
        if self.types_removed > 0 {
            parts.push(format!("{} types", self.types_removed));
        }

        if parts.is_empty() {
            write!(f, "Removed nothing")?;
        } else {
            write!(f, "Removed {}", parts.join(", "))?;
        }

        if self.unresolved_reported > 0 {
            write!(f, "; {} unresolved symbols reported", self.unresolved_reported)?;
        }

        Ok(())
    }
}
