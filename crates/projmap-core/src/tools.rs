//! Editor tools.

use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    /// Select, move and warp regions; select and move masks.
    #[default]
    Select,
    /// Author mask outlines.
    Mask,
    /// Hand every event to the hosted programs.
    Interact,
}

impl ToolKind {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "Select",
            Self::Mask => "Mask",
            Self::Interact => "Interact",
        }
    }

    /// Whether the editor hit-tests events under this tool.
    pub fn is_editing(self) -> bool {
        !matches!(self, Self::Interact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_select() {
        assert_eq!(ToolKind::default(), ToolKind::Select);
    }

    #[test]
    fn test_interact_is_not_editing() {
        assert!(ToolKind::Select.is_editing());
        assert!(ToolKind::Mask.is_editing());
        assert!(!ToolKind::Interact.is_editing());
    }

    #[test]
    fn test_names() {
        assert_eq!(ToolKind::Select.name(), "Select");
        assert_eq!(ToolKind::Mask.name(), "Mask");
        assert_eq!(ToolKind::Interact.name(), "Interact");
    }
}
