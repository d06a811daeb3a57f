pub mod config;
pub mod error;
pub mod logging;
pub mod shellext;

#[cfg(windows)]
mod dll;

// Re-export commonly used types
pub use config::{ConfigWarning, ExtensionConfig, MenuEntryConfig};
pub use error::{Result, ShellExError};
pub use logging::LogConfig;
pub use shellext::com::{ComPtr, Guid};
pub use shellext::context_menu::{
    ClassFactory, CommandDescriptor, ExplorerCommand, MenuCommand, MenuCommandFactory,
};
pub use shellext::launcher::{Launcher, ProcessLauncher};
pub use shellext::registration::{MenuType, Registration};

use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Process-wide registration, built by the first `initialize*` call.
static REGISTRATION: OnceLock<Registration> = OnceLock::new();

/// Initialize the extension from the default config file.
///
/// Safe to call any number of times; only the first call loads configuration.
pub fn initialize() -> &'static Registration {
    REGISTRATION.get_or_init(|| match ExtensionConfig::default_path() {
        Ok(path) => build_registration(&path),
        Err(e) => {
            tracing::warn!(target: "config", error = ?e, "No config file location, no context menu types available");
            Registration::from_config(&ExtensionConfig::default(), Arc::new(ProcessLauncher::new()))
        }
    })
}

/// Initialize the extension from `config_path`. Ignored if already initialized.
pub fn initialize_from(config_path: &Path) -> &'static Registration {
    REGISTRATION.get_or_init(|| build_registration(config_path))
}

fn build_registration(config_path: &Path) -> Registration {
    let loaded = ExtensionConfig::load_from_path(config_path);

    // Logging needs the config, so setup outcomes are reported afterwards.
    if let Ok(ExtensionConfig {
        log_file: Some(log_file),
        ..
    }) = &loaded
    {
        if let Err(e) = logging::init_logging(&LogConfig::new(log_file)) {
            tracing::warn!(target: "config", error = ?e, "Logging disabled");
        }
    }

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!(target: "config", path = %config_path.display(), error = ?e, "Unusable config file, no context menu types available");
        ExtensionConfig::default()
    });
    config.log_warnings();

    let registration = Registration::from_config(&config, Arc::new(ProcessLauncher::new()));
    tracing::info!(target: "config", path = %config_path.display(), types = registration.len(), "Context menu extension initialized");
    registration
}
