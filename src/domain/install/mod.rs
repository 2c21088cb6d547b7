pub mod hop;
pub mod install_strategy;
pub mod path_installer;
pub mod waiting_path;
