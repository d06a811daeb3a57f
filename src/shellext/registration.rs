use crate::config::ExtensionConfig;
use crate::error::{Result, ShellExError};
use crate::shellext::com::{ComPtr, Guid};
use crate::shellext::context_menu::{CommandDescriptor, MenuCommandFactory};
use crate::shellext::launcher::Launcher;
use std::collections::HashMap;
use std::sync::Arc;

/// Handler registered for all files (`HKCR\*`).
pub const CLSID_STAR_CONTEXT_MENU: Guid = Guid::from_u128(0x5f0c5b3e_7a2d_4e0b_9c3a_2b8e6d1f4a01);
/// Handler registered for folders (`HKCR\Directory`).
pub const CLSID_DIRECTORY_CONTEXT_MENU: Guid =
    Guid::from_u128(0x5f0c5b3e_7a2d_4e0b_9c3a_2b8e6d1f4a02);
/// Handler registered for folder backgrounds (`HKCR\Directory\Background`).
pub const CLSID_DIRECTORY_BACKGROUND_CONTEXT_MENU: Guid =
    Guid::from_u128(0x5f0c5b3e_7a2d_4e0b_9c3a_2b8e6d1f4a03);

/// The shell object types a command can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuType {
    AllFiles,
    Directory,
    DirectoryBackground,
}

impl MenuType {
    pub const ALL: [MenuType; 3] = [
        MenuType::AllFiles,
        MenuType::Directory,
        MenuType::DirectoryBackground,
    ];

    pub fn from_clsid(clsid: &Guid) -> Option<Self> {
        Self::ALL.into_iter().find(|menu_type| menu_type.clsid() == *clsid)
    }

    pub fn clsid(self) -> Guid {
        match self {
            MenuType::AllFiles => CLSID_STAR_CONTEXT_MENU,
            MenuType::Directory => CLSID_DIRECTORY_CONTEXT_MENU,
            MenuType::DirectoryBackground => CLSID_DIRECTORY_BACKGROUND_CONTEXT_MENU,
        }
    }

    /// Key under `types` in the configuration file.
    pub fn type_key(self) -> &'static str {
        match self {
            MenuType::AllFiles => "*",
            MenuType::Directory => "Directory",
            MenuType::DirectoryBackground => "Directory\\Background",
        }
    }
}

/// Resolves class ids to factories. Built once and read-only afterwards.
pub struct Registration {
    descriptors: HashMap<String, CommandDescriptor>,
    launcher: Arc<dyn Launcher>,
}

impl Registration {
    pub fn from_config(config: &ExtensionConfig, launcher: Arc<dyn Launcher>) -> Self {
        let descriptors: HashMap<_, _> = config
            .types
            .iter()
            .map(|(type_key, entry)| (type_key.clone(), CommandDescriptor::from(entry)))
            .collect();

        for type_key in descriptors.keys() {
            if !MenuType::ALL.iter().any(|t| t.type_key() == type_key.as_str()) {
                tracing::debug!(target: "shellext::registration", type_key = %type_key, "Type has no registered handler and is never shown");
            }
        }

        Self {
            descriptors,
            launcher,
        }
    }

    /// Number of configured types.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// The configured descriptor for `clsid`, stamped with `clsid` as its identity.
    pub fn resolve(&self, clsid: &Guid) -> Result<CommandDescriptor> {
        let Some(menu_type) = MenuType::from_clsid(clsid) else {
            tracing::error!(target: "shellext::registration", clsid = %clsid, "Unable to map CLSID to type");
            return Err(ShellExError::ClassNotAvailable { clsid: *clsid });
        };

        let type_key = menu_type.type_key();
        tracing::debug!(target: "shellext::registration", clsid = %clsid, type_key = %type_key, "CLSID refers to type");

        let descriptor = self.descriptors.get(type_key).ok_or_else(|| {
            tracing::error!(target: "shellext::registration", type_key = %type_key, "Config file does not define type");
            ShellExError::TypeNotConfigured {
                type_key: type_key.to_string(),
            }
        })?;

        Ok(descriptor.stamped(*clsid))
    }

    /// Builds the factory for `clsid` and negotiates `iid` on it.
    pub fn class_object(&self, clsid: &Guid, iid: &Guid) -> Result<ComPtr<MenuCommandFactory>> {
        let descriptor = self.resolve(clsid)?;
        let factory = ComPtr::new(MenuCommandFactory::new(descriptor, self.launcher.clone()));
        factory.query(iid)
    }
}
