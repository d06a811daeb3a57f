use crate::config::MenuEntryConfig;
use crate::shellext::com::Guid;

/// One configured context menu entry.
///
/// Factories and command objects hold their own copy, so nothing done to the
/// shared table after creation reaches an existing command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Canonical name reported to the shell; the class id the entry was resolved through.
    pub clsid: Guid,
    pub title: String,
    pub tool_tip: String,
    /// Icon resource path, interpreted by the shell.
    pub icon: String,
    /// Command template with `%1` / `%*` placeholders.
    pub command: String,
}

impl CommandDescriptor {
    /// Copy of this descriptor carrying `clsid` as its identity.
    pub fn stamped(&self, clsid: Guid) -> Self {
        Self {
            clsid,
            ..self.clone()
        }
    }
}

impl From<&MenuEntryConfig> for CommandDescriptor {
    fn from(entry: &MenuEntryConfig) -> Self {
        Self {
            clsid: Guid::nil(),
            title: entry.title.clone(),
            tool_tip: entry.tool_tip.clone(),
            icon: entry.icon.clone(),
            command: entry.command.clone(),
        }
    }
}
