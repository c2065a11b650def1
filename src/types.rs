//! Core domain types for embedsync file references and resolution scopes.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// An opaque managed-file identifier — `file-` prefixed, never containing
/// `/` or `?`. Newtype prevents mixing with arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(
    /// The raw identifier string, including the `file-` prefix.
    pub String,
);

impl FileId {
    /// The raw identifier without token brackets.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }

    /// The bracket-wrapped token form embedded in stored content.
    pub fn token(&self) -> String {
        return format!("<{}>", self.0);
    }
}

impl std::fmt::Display for FileId {
    /// Displays the raw identifier, not the token form.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", self.0);
    }
}

/// Organizational context that scopes file URL resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceGroup {
    /// Domain-wide files, visible to every workspace.
    Domain,
    /// Files belonging to a single project.
    Project,
    /// System files, managed outside any tenant.
    System,
    /// Files belonging to a single workspace.
    Workspace,
}

impl ResourceGroup {
    /// URL path segment used when no resource id narrows the scope.
    pub fn path_segment(self) -> &'static str {
        return match self {
            ResourceGroup::Domain => "domain",
            ResourceGroup::Project => "project",
            ResourceGroup::System => "system",
            ResourceGroup::Workspace => "workspace",
        };
    }
}

/// The (group, optional id) pair that parameterizes file-token resolution.
/// Changing the scope invalidates view derivations without touching
/// stored content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceScope {
    /// The resource group this scope belongs to.
    pub group: ResourceGroup,
    /// Optional qualifier narrowing the scope to one project/workspace.
    pub resource_id: Option<String>,
}

impl ResourceScope {
    /// Scope for a whole resource group, with no narrowing id.
    pub fn new(group: ResourceGroup) -> Self {
        return Self {
            group,
            resource_id: None,
        };
    }

    /// URL path segment for this scope: the resource id when present,
    /// otherwise the group name.
    pub fn segment(&self) -> &str {
        return self
            .resource_id
            .as_deref()
            .unwrap_or_else(|| return self.group.path_segment());
    }

    /// Scope narrowed to a specific resource id.
    pub fn with_resource_id(group: ResourceGroup, resource_id: &str) -> Self {
        return Self {
            group,
            resource_id: Some(resource_id.to_string()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{FileId, ResourceGroup, ResourceScope};

    #[test]
    fn token_wraps_in_angle_brackets() {
        assert_eq!(FileId("file-abc".to_string()).token(), "<file-abc>");
    }

    #[test]
    fn scope_segment_prefers_resource_id() {
        let scope = ResourceScope::with_resource_id(ResourceGroup::Project, "p-1");
        assert_eq!(scope.segment(), "p-1");
    }

    #[test]
    fn scope_segment_falls_back_to_group() {
        let scope = ResourceScope::new(ResourceGroup::Workspace);
        assert_eq!(scope.segment(), "workspace");
    }
}
