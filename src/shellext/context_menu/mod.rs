// Context menu handler for Windows Explorer
// Commands are synthesized from the configured entries; the Windows adapters
// expose them to the shell as IExplorerCommand / IClassFactory objects.

mod command;
mod descriptor;
mod expand;
mod factory;

#[cfg(windows)]
mod class_factory;
#[cfg(windows)]
mod explorer_command;

pub use command::{CommandFlags, CommandState, ExplorerCommand, MenuCommand};
pub use descriptor::CommandDescriptor;
pub use expand::{ALL_ITEMS_TOKEN, FIRST_ITEM_TOKEN, directory_of, expand_command, quote};
pub use factory::{ClassFactory, MenuCommandFactory};

#[cfg(windows)]
pub use class_factory::ConfiguredCommandFactory;
#[cfg(windows)]
pub use explorer_command::ConfiguredCommandHandler;

#[cfg(test)]
pub(crate) use command::tests::{DropCounter, RecordingLauncher};
