use thiserror::Error;
use uuid::Uuid;

/// Host status codes (HRESULT values) the extension reports.
pub mod hresult {
    pub const S_OK: i32 = 0;
    pub const E_NOTIMPL: i32 = 0x8000_4001_u32 as i32;
    pub const E_NOINTERFACE: i32 = 0x8000_4002_u32 as i32;
    pub const E_FAIL: i32 = 0x8000_4005_u32 as i32;
    pub const CLASS_E_NOAGGREGATION: i32 = 0x8004_0110_u32 as i32;
    pub const CLASS_E_CLASSNOTAVAILABLE: i32 = 0x8004_0111_u32 as i32;

    /// Equivalent of the `HRESULT_FROM_WIN32` macro.
    pub const fn from_win32(code: u32) -> i32 {
        if code as i32 <= 0 {
            code as i32
        } else {
            ((code & 0x0000_FFFF) | 0x8007_0000) as i32
        }
    }
}

/// Errors surfaced to the shell through a failure status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellExError {
    #[error("class {clsid} is not provided by this extension")]
    ClassNotAvailable { clsid: Uuid },

    #[error("configuration does not define type {type_key}")]
    TypeNotConfigured { type_key: String },

    #[error("aggregation is not supported")]
    NoAggregation,

    #[error("requested interface is not supported")]
    NoInterface,

    #[error("operation is not implemented")]
    NotImplemented,

    #[error("failed to launch process (os error {os_error})")]
    LaunchFailed { os_error: i32 },
}

impl ShellExError {
    /// Status code reported to the host for this error.
    pub fn hresult(&self) -> i32 {
        match self {
            ShellExError::ClassNotAvailable { .. } | ShellExError::TypeNotConfigured { .. } => {
                hresult::CLASS_E_CLASSNOTAVAILABLE
            }
            ShellExError::NoAggregation => hresult::CLASS_E_NOAGGREGATION,
            ShellExError::NoInterface => hresult::E_NOINTERFACE,
            ShellExError::NotImplemented => hresult::E_NOTIMPL,
            ShellExError::LaunchFailed { os_error } if *os_error > 0 => {
                hresult::from_win32(*os_error as u32)
            }
            ShellExError::LaunchFailed { .. } => hresult::E_FAIL,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShellExError>;

#[cfg(windows)]
impl From<ShellExError> for windows::core::Error {
    fn from(error: ShellExError) -> Self {
        windows::core::Error::from(windows::core::HRESULT(error.hresult()))
    }
}
