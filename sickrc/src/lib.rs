pub mod cli_commands;
pub mod commands;
pub mod pidfile;
pub mod settings;
pub mod sysdir;

// re-export selected public API
pub use pidfile::PidFile;
pub use settings::Settings;
pub use sysdir::Owner;
