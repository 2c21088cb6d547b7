pub mod controller_config_dto;
