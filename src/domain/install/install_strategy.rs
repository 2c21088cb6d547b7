use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// How a multi-hop path is programmed before the triggering packet is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InstallStrategy {
    /// Installs every hop destination first, each followed by a barrier. The packet is
    /// released once every barrier is acknowledged.
    #[default]
    Barrier,
    /// Installs only the first hop and releases the packet. Later hops are installed when the
    /// packet reaches them.
    NextHop,
    /// Installs every hop without waiting and releases the packet.
    EagerReinstall,
}

impl FromStr for InstallStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Barrier" | "barrier" => Ok(InstallStrategy::Barrier),
            "NextHop" | "next-hop" => Ok(InstallStrategy::NextHop),
            "EagerReinstall" | "eager-reinstall" => Ok(InstallStrategy::EagerReinstall),
            _ => Err(Error::ConfigError(format!("unknown install strategy '{}'", s))),
        }
    }
}

impl fmt::Display for InstallStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallStrategy::Barrier => "barrier",
            InstallStrategy::NextHop => "next-hop",
            InstallStrategy::EagerReinstall => "eager-reinstall",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_both_spellings() {
        assert_eq!("NextHop".parse::<InstallStrategy>().unwrap(), InstallStrategy::NextHop);
        assert_eq!("eager-reinstall".parse::<InstallStrategy>().unwrap(), InstallStrategy::EagerReinstall);
        assert_eq!(InstallStrategy::Barrier.to_string().parse::<InstallStrategy>().unwrap(), InstallStrategy::Barrier);
        assert!(matches!("flood".parse::<InstallStrategy>(), Err(Error::ConfigError(_))));
    }
}
