use crate::error::{Result, ShellExError};

/// Starts a process for an expanded command line.
pub trait Launcher: Send + Sync {
    /// Starts `command_line` in `working_directory` without waiting for it.
    /// An empty `working_directory` inherits the caller's.
    fn launch(&self, working_directory: &str, command_line: &str) -> Result<()>;
}

/// Launcher backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
impl Launcher for ProcessLauncher {
    fn launch(&self, working_directory: &str, command_line: &str) -> Result<()> {
        use widestring::U16CString;
        use windows::Win32::Foundation::{CloseHandle, FALSE};
        use windows::Win32::System::Threading::{
            CreateProcessW, PROCESS_CREATION_FLAGS, PROCESS_INFORMATION, STARTUPINFOW,
        };
        use windows::core::{PCWSTR, PWSTR};

        // ERROR_INVALID_PARAMETER
        let invalid = |_| ShellExError::LaunchFailed { os_error: 87 };

        // CreateProcessW may write into the command line buffer.
        let mut command = U16CString::from_str(command_line)
            .map_err(invalid)?
            .into_vec_with_nul();
        let directory = if working_directory.is_empty() {
            None
        } else {
            Some(U16CString::from_str(working_directory).map_err(invalid)?)
        };
        let directory_ptr = directory
            .as_ref()
            .map(|dir| PCWSTR(dir.as_ptr()))
            .unwrap_or(PCWSTR::null());

        let startup_info = STARTUPINFOW {
            cb: std::mem::size_of::<STARTUPINFOW>() as u32,
            ..Default::default()
        };
        let mut process_info = PROCESS_INFORMATION::default();

        let created = unsafe {
            CreateProcessW(
                PCWSTR::null(),
                PWSTR(command.as_mut_ptr()),
                None,
                None,
                FALSE,
                PROCESS_CREATION_FLAGS(0),
                None,
                directory_ptr,
                &startup_info,
                &mut process_info,
            )
        };

        match created {
            Ok(()) => {
                unsafe {
                    let _ = CloseHandle(process_info.hThread);
                    let _ = CloseHandle(process_info.hProcess);
                }
                tracing::info!(target: "shellext::launcher", directory = %working_directory, command = %command_line, "Launched process");
                Ok(())
            }
            Err(e) => {
                let code = e.code().0 as u32;
                let os_error = if code & 0xFFFF_0000 == 0x8007_0000 {
                    (code & 0xFFFF) as i32
                } else {
                    code as i32
                };
                tracing::error!(target: "shellext::launcher", os_error, command = %command_line, "CreateProcessW failed: {}", e.message());
                Err(ShellExError::LaunchFailed { os_error })
            }
        }
    }
}

#[cfg(not(windows))]
impl Launcher for ProcessLauncher {
    fn launch(&self, working_directory: &str, command_line: &str) -> Result<()> {
        let mut command = std::process::Command::new("sh");
        command.arg("-c").arg(command_line);
        if !working_directory.is_empty() {
            command.current_dir(working_directory);
        }

        match command.spawn() {
            // The child is not waited on; dropping the handle detaches it.
            Ok(_child) => {
                tracing::info!(target: "shellext::launcher", directory = %working_directory, command = %command_line, "Launched process");
                Ok(())
            }
            Err(e) => {
                let os_error = e.raw_os_error().unwrap_or(-1);
                tracing::error!(target: "shellext::launcher", os_error, command = %command_line, "Failed to spawn process: {}", e);
                Err(ShellExError::LaunchFailed { os_error })
            }
        }
    }
}
