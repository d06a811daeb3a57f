use super::command::MenuCommand;
use super::descriptor::CommandDescriptor;
use crate::error::{Result, ShellExError};
use crate::shellext::com::{ComPtr, Guid, IID_ICLASS_FACTORY, ModuleRef, Unknown};
use crate::shellext::launcher::Launcher;
use std::sync::Arc;

/// The class-factory capability set.
pub trait ClassFactory: Unknown {
    type Object: Unknown;

    /// Creates an object and negotiates `iid` on it. `outer` is the
    /// aggregation controller, which must be absent.
    fn create_instance(
        &self,
        outer: Option<&dyn Unknown>,
        iid: &Guid,
    ) -> Result<ComPtr<Self::Object>>;

    fn lock_server(&self, lock: bool) -> Result<()>;
}

// Class factory minting context menu commands for one configured entry
pub struct MenuCommandFactory {
    descriptor: CommandDescriptor,
    launcher: Arc<dyn Launcher>,
    _module: ModuleRef,
}

impl std::fmt::Debug for MenuCommandFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuCommandFactory")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl MenuCommandFactory {
    pub fn new(descriptor: CommandDescriptor, launcher: Arc<dyn Launcher>) -> Self {
        tracing::debug!(target: "shellext::context_menu", clsid = %descriptor.clsid, "Initializing context menu command factory");
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

impl Unknown for MenuCommandFactory {
    fn interfaces(&self) -> &'static [Guid] {
        &[IID_ICLASS_FACTORY]
    }
}

impl ClassFactory for MenuCommandFactory {
    type Object = MenuCommand;

    fn create_instance(
        &self,
        outer: Option<&dyn Unknown>,
        iid: &Guid,
    ) -> Result<ComPtr<MenuCommand>> {
        if outer.is_some() {
            return Err(ShellExError::NoAggregation);
        }

        let command = ComPtr::new(MenuCommand::new(
            self.descriptor.clone(),
            self.launcher.clone(),
        ));

        // The transient reference is released when `command` goes out of scope.
        command.query(iid)
    }

    fn lock_server(&self, _lock: bool) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shellext::com::{IID_IEXPLORER_COMMAND, IID_IUNKNOWN};
    use crate::shellext::context_menu::ExplorerCommand;
    use crate::shellext::context_menu::{DropCounter, RecordingLauncher};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn factory(launcher: Arc<RecordingLauncher>) -> MenuCommandFactory {
        MenuCommandFactory::new(
            CommandDescriptor {
                clsid: Guid::from_u128(0xabc),
                title: "Terminal here".to_string(),
                command: "wt.exe -d %1".to_string(),
                ..Default::default()
            },
            launcher,
        )
    }

    struct Controller;

    impl Unknown for Controller {
        fn interfaces(&self) -> &'static [Guid] {
            &[]
        }
    }

    #[test]
    fn test_create_instance_returns_single_reference() {
        let factory = factory(Arc::new(RecordingLauncher::default()));
        let command = factory
            .create_instance(None, &IID_IEXPLORER_COMMAND)
            .unwrap();
        assert_eq!(command.ref_count(), 1);
        assert_eq!(command.title(&[]).unwrap(), "Terminal here");
        assert_eq!(command.canonical_name().unwrap(), Guid::from_u128(0xabc));
    }

    #[test]
    fn test_create_instance_base_identity() {
        let factory = factory(Arc::new(RecordingLauncher::default()));
        assert!(factory.create_instance(None, &IID_IUNKNOWN).is_ok());
    }

    #[test]
    fn test_create_instance_rejects_aggregation() {
        let factory = factory(Arc::new(RecordingLauncher::default()));
        let result = factory.create_instance(Some(&Controller), &IID_IEXPLORER_COMMAND);
        assert_eq!(result.unwrap_err(), ShellExError::NoAggregation);
    }

    #[test]
    fn test_create_instance_unsupported_interface_destroys_object() {
        let drops = Arc::new(AtomicUsize::new(0));
        let launcher = Arc::new(RecordingLauncher {
            drops: Some(DropCounter(drops.clone())),
            ..Default::default()
        });
        let factory = factory(launcher);

        let result = factory.create_instance(None, &IID_ICLASS_FACTORY);
        assert_eq!(result.unwrap_err(), ShellExError::NoInterface);

        // The launcher is still shared with the factory.
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        drop(factory);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_instances_share_descriptor_but_not_lifetime() {
        let launcher = Arc::new(RecordingLauncher::default());
        let factory = factory(launcher.clone());
        let first = factory.create_instance(None, &IID_IEXPLORER_COMMAND).unwrap();
        let second = factory.create_instance(None, &IID_IEXPLORER_COMMAND).unwrap();
        drop(first);

        second.invoke(&["C:\\projects".to_string()]).unwrap();
        let calls = launcher.calls.lock().unwrap();
        assert_eq!(calls[0], ("C:".to_string(), "wt.exe -d \"C:\\projects\"".to_string()));
    }

    #[test]
    fn test_debug_shows_descriptor() {
        let factory = factory(Arc::new(RecordingLauncher::default()));
        let command = factory.create_instance(None, &IID_IEXPLORER_COMMAND).unwrap();
        assert!(format!("{factory:?}").contains("Terminal here"));
        assert!(format!("{command:?}").contains("wt.exe -d %1"));
    }

    #[test]
    fn test_lock_server_is_noop() {
        let factory = factory(Arc::new(RecordingLauncher::default()));
        assert!(factory.lock_server(true).is_ok());
        assert!(factory.lock_server(false).is_ok());
    }

    #[test]
    fn test_factory_negotiates_class_factory_only() {
        let factory = ComPtr::new(factory(Arc::new(RecordingLauncher::default())));
        assert!(factory.query(&IID_ICLASS_FACTORY).is_ok());
        assert!(factory.query(&IID_IUNKNOWN).is_ok());
        assert_eq!(
            factory.query(&IID_IEXPLORER_COMMAND).unwrap_err(),
            ShellExError::NoInterface
        );
    }
}
