//! Per-role capability binding.
//!
//! Which tools a sub-agent may call is an access-control decision made
//! once, at construction time, from an enumerated role table. There is no
//! runtime filtering a prompt could talk its way around: a tool absent
//! from the set simply does not exist for that agent.

use crate::inference::types::ToolDefinition;
use crate::tools::{ToolSpec, READ_FILE, UPDATE_DOCUMENTATION};

// ─── Roles ──────────────────────────────────────────────────────────────────

/// The fixed pipeline roles and what each is authorized to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityRole {
    /// Read-only file inspection for the analysis stage.
    Reader,
    /// Document mutation for the generation/refinement stages.
    Writer,
    /// No tools at all (help mode).
    None,
}

impl CapabilityRole {
    /// The tool names this role is authorized for.
    pub const fn authorized(self) -> &'static [&'static str] {
        match self {
            CapabilityRole::Reader => &[READ_FILE],
            CapabilityRole::Writer => &[UPDATE_DOCUMENTATION],
            CapabilityRole::None => &[],
        }
    }
}

// ─── CapabilitySet ──────────────────────────────────────────────────────────

/// The tools bound to one sub-agent, selected from the catalogue at
/// construction time by role.
#[derive(Debug, Clone)]
pub struct CapabilitySet {
    role: CapabilityRole,
    tools: Vec<ToolSpec>,
}

impl CapabilitySet {
    /// Bind the role's authorized tools out of the catalogue, preserving
    /// the role table's declared order.
    pub fn bind(role: CapabilityRole, catalogue: &[ToolSpec]) -> Self {
        let tools = role
            .authorized()
            .iter()
            .filter_map(|name| catalogue.iter().find(|spec| spec.name == *name).cloned())
            .collect();
        Self { role, tools }
    }

    pub fn role(&self) -> CapabilityRole {
        self.role
    }

    /// Look up a bound tool by name. Returns `None` for anything the role
    /// is not authorized for, including tools that exist in the catalogue.
    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|spec| spec.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Names of the bound tools.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|spec| spec.name).collect()
    }

    /// Wire-format tool definitions for a chat request; `None` when the
    /// role has no tools, so the request omits the field entirely.
    pub fn definitions(&self) -> Option<Vec<ToolDefinition>> {
        if self.tools.is_empty() {
            return None;
        }
        Some(self.tools.iter().map(ToolSpec::to_definition).collect())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{builtin_catalogue, DocumentStore, PlainTextParser};
    use std::sync::Arc;

    fn catalogue() -> Vec<ToolSpec> {
        let (document, _rx) = DocumentStore::new();
        builtin_catalogue(Arc::new(PlainTextParser), document)
    }

    #[test]
    fn reader_binds_only_read_file() {
        let set = CapabilitySet::bind(CapabilityRole::Reader, &catalogue());
        assert_eq!(set.names(), vec![READ_FILE]);
        assert!(set.get(READ_FILE).is_some());
        assert!(set.get(UPDATE_DOCUMENTATION).is_none());
        assert!(set.get("list_files").is_none());
    }

    #[test]
    fn writer_binds_only_update_documentation() {
        let set = CapabilitySet::bind(CapabilityRole::Writer, &catalogue());
        assert_eq!(set.names(), vec![UPDATE_DOCUMENTATION]);
        assert!(set.get(READ_FILE).is_none());
    }

    #[test]
    fn none_role_binds_nothing() {
        let set = CapabilitySet::bind(CapabilityRole::None, &catalogue());
        assert!(set.is_empty());
        assert!(set.definitions().is_none());
    }

    #[test]
    fn sets_never_exceed_role_authorization() {
        let catalogue = catalogue();
        for role in [
            CapabilityRole::Reader,
            CapabilityRole::Writer,
            CapabilityRole::None,
        ] {
            let set = CapabilitySet::bind(role, &catalogue);
            for name in set.names() {
                assert!(
                    role.authorized().contains(&name),
                    "{name} exceeds {role:?} authorization"
                );
            }
        }
    }

    #[test]
    fn definitions_match_bound_tools() {
        let set = CapabilitySet::bind(CapabilityRole::Writer, &catalogue());
        let defs = set.definitions().unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].function.name, UPDATE_DOCUMENTATION);
    }
}
