use serde::{Deserialize, Serialize};

/// Controller configuration file. Every field is optional and falls back to the built-in
/// default.
#[derive(Debug, Deserialize, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfigDto {
    pub install_strategy: Option<String>,
    pub flow_idle_timeout_s: Option<u16>,
    pub flow_hard_timeout_s: Option<u16>,
    pub path_setup_time_s: Option<u32>,
    pub sweep_interval_ms: Option<u64>,
    pub default_port_weight: Option<u64>,
    pub listen_address: Option<String>,
}
