// Entry points the shell calls through the DLL export table
use crate::shellext::com::{self, Guid};
use crate::shellext::context_menu::ConfiguredCommandFactory;
use std::ffi::c_void;
use std::ptr::null_mut;
use windows::Win32::Foundation::{E_POINTER, S_FALSE, S_OK};
use windows::core::{GUID, HRESULT, IUnknown, Interface};

fn to_uuid(guid: &GUID) -> Guid {
    Guid::from_fields(guid.data1, guid.data2, guid.data3, &guid.data4)
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "system" fn DllGetClassObject(
    rclsid: *const GUID,
    riid: *const GUID,
    ppv: *mut *mut c_void,
) -> HRESULT {
    if ppv.is_null() || rclsid.is_null() || riid.is_null() {
        return E_POINTER;
    }

    unsafe {
        *ppv = null_mut();

        let clsid = to_uuid(&*rclsid);
        let registration = crate::initialize();
        tracing::info!(target: "dll", clsid = %clsid, "Class object requested");

        // The factory always answers IClassFactory; the caller's interface is
        // negotiated on the COM wrapper.
        let factory = match registration.class_object(&clsid, &com::IID_ICLASS_FACTORY) {
            Ok(factory) => factory,
            Err(e) => return HRESULT(e.hresult()),
        };

        let unknown: IUnknown = ConfiguredCommandFactory::new(factory).into();
        let result = unknown.query(riid, ppv);
        tracing::debug!(target: "dll", clsid = %clsid, result = result.0, "Initialized class object");
        result
    }
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn DllCanUnloadNow() -> HRESULT {
    if com::can_unload_now() { S_OK } else { S_FALSE }
}
