/// Connection and start-up parameters for a [`crate::supply::Supply`].
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyConfig {
    pub port: String,
    pub channel_count: u8,
    /// Display name, only used in logs.
    pub device_name: String,
    pub initial_voltage: f64,
    pub initial_current: f64,
}

#[cfg(windows)]
pub const DEFAULT_PORT: &str = "COM1";
#[cfg(not(windows))]
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

pub const DEFAULT_CHANNEL_COUNT: u8 = 3;
pub const DEFAULT_DEVICE_NAME: &str = "HAMEG";

impl Default for SupplyConfig {
    fn default() -> Self {
        SupplyConfig {
            port: DEFAULT_PORT.to_string(),
            channel_count: DEFAULT_CHANNEL_COUNT,
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            initial_voltage: 1.0,
            initial_current: 0.1,
        }
    }
}

impl SupplyConfig {
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    pub fn with_channel_count(mut self, channel_count: u8) -> Self {
        self.channel_count = channel_count;
        self
    }

    pub fn with_device_name(mut self, device_name: impl Into<String>) -> Self {
        self.device_name = device_name.into();
        self
    }

    pub fn with_initial_setpoints(mut self, voltage: f64, current: f64) -> Self {
        self.initial_voltage = voltage;
        self.initial_current = current;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SupplyConfig::default();
        assert_eq!(config.channel_count, 3);
        assert_eq!(config.device_name, "HAMEG");
        assert_eq!(config.initial_voltage, 1.0);
        assert_eq!(config.initial_current, 0.1);
    }

    #[test]
    fn test_overrides() {
        let config = SupplyConfig::default()
            .with_port("/dev/ttyACM1")
            .with_channel_count(4)
            .with_initial_setpoints(5.0, 0.5);
        assert_eq!(config.port, "/dev/ttyACM1");
        assert_eq!(config.channel_count, 4);
        assert_eq!(config.initial_voltage, 5.0);
        assert_eq!(config.initial_current, 0.5);
    }
}
