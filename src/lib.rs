use crate::api::controller_config_dto::ControllerConfigDto;
use crate::domain::controller::controller_config::ControllerConfig;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Loads the controller configuration from a JSON file, or the defaults without one.
pub fn load_config(file_path: Option<&str>) -> Result<ControllerConfig> {
    let Some(file_path) = file_path else {
        log::info!("No config file given. Using default controller configuration.");
        return Ok(ControllerConfig::default());
    };

    let dto: ControllerConfigDto = parse_json_file::<ControllerConfigDto>(file_path)?;
    log::info!("Config file '{}' parsed successfully.", file_path);

    ControllerConfig::try_from(dto)
}
