use std::net::SocketAddr;

use crate::api::controller_config_dto::ControllerConfigDto;
use crate::domain::controller::port_weight::DEFAULT_PORT_WEIGHT;
use crate::domain::install::install_strategy::InstallStrategy;
use crate::error::{Error, Result};

pub const FLOW_IDLE_TIMEOUT_S: u16 = 10;
pub const FLOW_HARD_TIMEOUT_S: u16 = 30;
pub const PATH_SETUP_TIME_MS: i64 = 40_000;
pub const SWEEP_INTERVAL_MS: u64 = 5_000;
pub const LISTEN_ADDRESS: &str = "0.0.0.0:6633";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub strategy: InstallStrategy,
    pub flow_idle_timeout_s: u16,
    pub flow_hard_timeout_s: u16,
    /// Lifetime of a waiting path before the sweep discards it.
    pub path_setup_time_ms: i64,
    pub sweep_interval_ms: u64,
    pub default_port_weight: u64,
    pub listen_address: SocketAddr,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            strategy: InstallStrategy::Barrier,
            flow_idle_timeout_s: FLOW_IDLE_TIMEOUT_S,
            flow_hard_timeout_s: FLOW_HARD_TIMEOUT_S,
            path_setup_time_ms: PATH_SETUP_TIME_MS,
            sweep_interval_ms: SWEEP_INTERVAL_MS,
            default_port_weight: DEFAULT_PORT_WEIGHT,
            listen_address: SocketAddr::from(([0, 0, 0, 0], 6633)),
        }
    }
}

impl ControllerConfig {
    pub fn with_strategy(strategy: InstallStrategy) -> Self {
        Self { strategy, ..Self::default() }
    }
}

impl TryFrom<ControllerConfigDto> for ControllerConfig {
    type Error = Error;

    fn try_from(dto: ControllerConfigDto) -> Result<Self> {
        let defaults = ControllerConfig::default();

        let strategy = match dto.install_strategy {
            Some(name) => name.parse::<InstallStrategy>()?,
            None => defaults.strategy,
        };

        let path_setup_time_ms = match dto.path_setup_time_s {
            Some(0) => return Err(Error::ConfigError("pathSetupTimeS must be positive".to_string())),
            Some(seconds) => i64::from(seconds) * 1000,
            None => defaults.path_setup_time_ms,
        };

        let sweep_interval_ms = dto.sweep_interval_ms.unwrap_or(defaults.sweep_interval_ms);
        if sweep_interval_ms == 0 {
            return Err(Error::ConfigError("sweepIntervalMs must be positive".to_string()));
        }

        let default_port_weight = dto.default_port_weight.unwrap_or(defaults.default_port_weight);
        if default_port_weight == 0 {
            return Err(Error::ConfigError("defaultPortWeight must be positive".to_string()));
        }

        let listen_address = match dto.listen_address {
            Some(address) => address.parse::<SocketAddr>().map_err(|e| Error::ConfigError(format!("listenAddress '{}': {}", address, e)))?,
            None => defaults.listen_address,
        };

        Ok(ControllerConfig {
            strategy,
            flow_idle_timeout_s: dto.flow_idle_timeout_s.unwrap_or(defaults.flow_idle_timeout_s),
            flow_hard_timeout_s: dto.flow_hard_timeout_s.unwrap_or(defaults.flow_hard_timeout_s),
            path_setup_time_ms,
            sweep_interval_ms,
            default_port_weight,
            listen_address,
        })
    }
}
