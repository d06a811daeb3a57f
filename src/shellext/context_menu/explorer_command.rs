use super::{ExplorerCommand, MenuCommand};
use crate::error::ShellExError;
use crate::shellext::com::{ComPtr, Guid};
use windows::{
    Win32::{Foundation::*, System::Com::*, UI::Shell::*},
    core::*,
};

/// Filesystem paths of the shell items, in selection order. Items without a
/// filesystem path are skipped.
fn selection_paths(items: Option<&IShellItemArray>) -> Vec<String> {
    let Some(items) = items else {
        return Vec::new();
    };

    unsafe {
        let count = items.GetCount().unwrap_or(0);
        (0..count)
            .filter_map(|index| {
                let item = items.GetItemAt(index).ok()?;
                let display_name = item.GetDisplayName(SIGDN_FILESYSPATH).ok()?;
                let path = display_name.to_string();
                CoTaskMemFree(Some(display_name.0 as *const _));
                path.ok()
            })
            .collect()
    }
}

fn to_guid(guid: Guid) -> GUID {
    GUID::from_u128(guid.as_u128())
}

/// Allocates `value` with the shell allocator; the caller frees it.
fn dup_string(value: &str) -> Result<PWSTR> {
    let hstring = HSTRING::from(value);
    unsafe { SHStrDupW(&hstring) }
}

#[implement(IExplorerCommand)]
pub struct ConfiguredCommandHandler {
    command: ComPtr<MenuCommand>,
}

impl ConfiguredCommandHandler {
    pub fn new(command: ComPtr<MenuCommand>) -> Self {
        Self { command }
    }
}

impl IExplorerCommand_Impl for ConfiguredCommandHandler_Impl {
    fn GetTitle(&self, items: Option<&IShellItemArray>) -> Result<PWSTR> {
        dup_string(&self.command.title(&selection_paths(items))?)
    }

    fn GetIcon(&self, items: Option<&IShellItemArray>) -> Result<PWSTR> {
        dup_string(&self.command.icon(&selection_paths(items))?)
    }

    fn GetToolTip(&self, items: Option<&IShellItemArray>) -> Result<PWSTR> {
        dup_string(&self.command.tool_tip(&selection_paths(items))?)
    }

    fn GetCanonicalName(&self) -> Result<GUID> {
        Ok(to_guid(self.command.canonical_name()?))
    }

    fn GetState(&self, items: Option<&IShellItemArray>, oktobeslow: BOOL) -> Result<u32> {
        let state = self
            .command
            .state(&selection_paths(items), oktobeslow.as_bool())?;
        Ok(state.bits())
    }

    fn Invoke(
        &self,
        selection: Option<&IShellItemArray>,
        _bindctx: Option<&IBindCtx>,
    ) -> Result<()> {
        let paths = selection_paths(selection);
        self.command.invoke(&paths).map_err(|e| {
            tracing::error!(target: "shellext::context_menu", error = %e, "Context menu command failed");
            Error::from(e)
        })
    }

    fn GetFlags(&self) -> Result<u32> {
        Ok(self.command.flags()?.bits())
    }

    fn EnumSubCommands(&self) -> Result<IEnumExplorerCommand> {
        tracing::trace!(target: "shellext::context_menu", "EnumSubCommands called");
        let error = self
            .command
            .enum_sub_commands()
            .err()
            .unwrap_or(ShellExError::NotImplemented);
        Err(error.into())
    }
}
