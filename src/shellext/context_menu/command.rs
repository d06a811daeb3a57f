use super::descriptor::CommandDescriptor;
use super::expand::{directory_of, expand_command};
use crate::error::{Result, ShellExError};
use crate::shellext::com::{ComPtr, Guid, IID_IEXPLORER_COMMAND, ModuleRef, Unknown};
use crate::shellext::launcher::Launcher;
use std::sync::Arc;

/// Menu item state reported to the shell (`EXPCMDSTATE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Enabled,
    Disabled,
    Hidden,
}

impl CommandState {
    pub fn bits(self) -> u32 {
        match self {
            CommandState::Enabled => 0x00,
            CommandState::Disabled => 0x01,
            CommandState::Hidden => 0x02,
        }
    }
}

/// Menu item flags reported to the shell (`EXPCMDFLAGS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandFlags(u32);

impl CommandFlags {
    pub const DEFAULT: Self = Self(0x00);

    pub fn bits(self) -> u32 {
        self.0
    }
}

/// The explorer-command capability set.
pub trait ExplorerCommand: Unknown {
    fn title(&self, items: &[String]) -> Result<String>;
    fn icon(&self, items: &[String]) -> Result<String>;
    fn tool_tip(&self, items: &[String]) -> Result<String>;
    fn canonical_name(&self) -> Result<Guid>;
    fn state(&self, items: &[String], ok_to_be_slow: bool) -> Result<CommandState>;
    fn invoke(&self, items: &[String]) -> Result<()>;
    fn flags(&self) -> Result<CommandFlags>;
    fn enum_sub_commands(&self) -> Result<Vec<ComPtr<Self>>>
    where
        Self: Sized;
}

/// A context menu command driven by one configured entry.
pub struct MenuCommand {
    descriptor: CommandDescriptor,
    launcher: Arc<dyn Launcher>,
    _module: ModuleRef,
}

impl std::fmt::Debug for MenuCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuCommand")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl MenuCommand {
    pub fn new(descriptor: CommandDescriptor, launcher: Arc<dyn Launcher>) -> Self {
        tracing::debug!(target: "shellext::context_menu", clsid = %descriptor.clsid, "Initializing context menu command");
        Self {
            descriptor,
            launcher,
            _module: ModuleRef::new(),
        }
    }

    pub fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }
}

impl Unknown for MenuCommand {
    fn interfaces(&self) -> &'static [Guid] {
        &[IID_IEXPLORER_COMMAND]
    }
}

impl ExplorerCommand for MenuCommand {
    fn title(&self, _items: &[String]) -> Result<String> {
        Ok(self.descriptor.title.clone())
    }

    fn icon(&self, _items: &[String]) -> Result<String> {
        Ok(self.descriptor.icon.clone())
    }

    fn tool_tip(&self, _items: &[String]) -> Result<String> {
        Ok(self.descriptor.tool_tip.clone())
    }

    fn canonical_name(&self) -> Result<Guid> {
        Ok(self.descriptor.clsid)
    }

    fn state(&self, _items: &[String], _ok_to_be_slow: bool) -> Result<CommandState> {
        Ok(CommandState::Enabled)
    }

    fn invoke(&self, items: &[String]) -> Result<()> {
        let command = expand_command(&self.descriptor.command, items);
        let directory = directory_of(items);
        tracing::debug!(target: "shellext::context_menu", items = items.len(), directory = %directory, "Context menu command invoked");

        self.launcher.launch(&directory, &command)
    }

    fn flags(&self) -> Result<CommandFlags> {
        Ok(CommandFlags::DEFAULT)
    }

    fn enum_sub_commands(&self) -> Result<Vec<ComPtr<Self>>> {
        Err(ShellExError::NotImplemented)
    }
}
