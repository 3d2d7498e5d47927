use log::info;
use std::env;
use std::net::{IpAddr, SocketAddr};
use time::UtcOffset;

use crate::utils::parse_utc_offset;

const DEFAULT_SERIAL_PORT: &str = "/dev/ttyS0";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub serial_port: String,
    pub listen_addr: SocketAddr,
    /// Fixed offset for summary timestamps. When unset the local offset is
    /// read once at startup and does not follow later daylight-saving changes.
    pub utc_offset: Option<UtcOffset>,
}

impl MonitorConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup, applying defaults
    fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let serial_port = lookup("SERIAL_PORT")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SERIAL_PORT.to_string());

        let host: IpAddr = lookup("HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .trim()
            .parse()
            .map_err(|e| format!("Invalid HOST: {}", e))?;

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|e| format!("Invalid PORT '{}': {}", value, e))?,
            None => DEFAULT_PORT,
        };

        let utc_offset = match lookup("UTC_OFFSET") {
            Some(value) => Some(
                parse_utc_offset(&value).map_err(|e| {
                    format!("Invalid UTC_OFFSET '{}' (expected +HH:MM): {}", value, e)
                })?,
            ),
            None => None,
        };

        info!("Serial device: {}", serial_port);
        info!("Listen address: {}:{}", host, port);
        if let Some(offset) = utc_offset {
            info!("Summary timestamps in UTC offset {}", offset);
        }

        Ok(MonitorConfig {
            serial_port,
            listen_addr: SocketAddr::new(host, port),
            utc_offset,
        })
    }
}
