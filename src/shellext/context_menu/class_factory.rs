use super::{ClassFactory, ConfiguredCommandHandler, MenuCommandFactory};
use crate::shellext::com::{ComPtr, IID_IUNKNOWN};
use windows::{
    Win32::{Foundation::*, System::Com::*},
    core::*,
};

// Class factory handed to the shell for one configured menu type
#[implement(IClassFactory)]
pub struct ConfiguredCommandFactory {
    factory: ComPtr<MenuCommandFactory>,
}

impl ConfiguredCommandFactory {
    pub fn new(factory: ComPtr<MenuCommandFactory>) -> Self {
        Self { factory }
    }
}

impl IClassFactory_Impl for ConfiguredCommandFactory_Impl {
    fn CreateInstance(
        &self,
        outer: Option<&IUnknown>,
        iid: *const GUID,
        result: *mut *mut core::ffi::c_void,
    ) -> Result<()> {
        if outer.is_some() {
            return Err(Error::from(CLASS_E_NOAGGREGATION));
        }

        // Interface negotiation happens on the COM wrapper below.
        let command = self.factory.create_instance(None, &IID_IUNKNOWN)?;
        let handler: IUnknown = ConfiguredCommandHandler::new(command).into();

        unsafe { handler.query(iid, result).ok() }
    }

    fn LockServer(&self, lock: BOOL) -> Result<()> {
        Ok(self.factory.lock_server(lock.as_bool())?)
    }
}
