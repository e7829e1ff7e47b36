//! Decoder configuration.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// SQL Server's limit on parameters per procedure call.
pub const DEFAULT_MAX_PARAMETERS: usize = 2100;

/// How much of the parameter section the decoder reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterMode {
    /// Decode only the first parameter value; trailing records are ignored.
    #[default]
    First,
    /// Decode every parameter record until the payload is exhausted.
    All,
}

impl FromStr for ParameterMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("first") || s == "1" {
            Ok(Self::First)
        } else if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Err(ConfigError::InvalidValue {
                key: "parameters",
                value: s.to_string(),
            })
        }
    }
}

impl fmt::Display for ParameterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::All => f.write_str("all"),
        }
    }
}

/// Errors raised while parsing a settings string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A `key=value` pair without the `=`.
    #[error("invalid key-value: {0}")]
    InvalidPair(String),

    /// A known key with a value that does not parse.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// The setting.
        key: &'static str,
        /// The offending value.
        value: String,
    },
}

/// Configuration for [`RpcDecoder`](crate::RpcDecoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Parameter decoding mode (default: first parameter only).
    pub parameter_mode: ParameterMode,
    /// Upper bound on decoded parameters in [`ParameterMode::All`] (default: 2100).
    pub max_parameters: usize,
    /// Truncate rendered parameter text to this many characters (default: none).
    pub max_display_len: Option<usize>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            parameter_mode: ParameterMode::First,
            max_parameters: DEFAULT_MAX_PARAMETERS,
            max_display_len: None,
        }
    }
}

impl DecoderConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parameter decoding mode.
    #[must_use]
    pub fn parameter_mode(mut self, mode: ParameterMode) -> Self {
        self.parameter_mode = mode;
        self
    }

    /// Set the maximum number of parameters decoded per request.
    #[must_use]
    pub fn max_parameters(mut self, max: usize) -> Self {
        self.max_parameters = max;
        self
    }

    /// Truncate each rendered parameter to at most `len` characters.
    #[must_use]
    pub fn max_display_len(mut self, len: usize) -> Self {
        self.max_display_len = Some(len);
        self
    }

    /// Parse a `key=value;` settings string.
    ///
    /// Keys are case-insensitive. Recognized keys:
    ///
    /// | key | value |
    /// |-----|-------|
    /// | `parameters`, `parameter mode` | `first` or `all` |
    /// | `max parameters` | positive integer |
    /// | `max display length`, `max display len` | integer, `0` or `none` disables |
    ///
    /// Unknown keys are ignored.
    pub fn from_settings_string(settings: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for part in settings.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidPair(part.to_string()))?;

            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "parameters" | "parameter mode" => {
                    config.parameter_mode = value.parse()?;
                }
                "max parameters" => {
                    config.max_parameters = match value.parse() {
                        Ok(max) if max > 0 => max,
                        _ => {
                            return Err(ConfigError::InvalidValue {
                                key: "max parameters",
                                value: value.to_string(),
                            });
                        }
                    };
                }
                "max display length" | "max display len" => {
                    config.max_display_len = if value == "0" || value.eq_ignore_ascii_case("none")
                    {
                        None
                    } else {
                        Some(value.parse().map_err(|_| ConfigError::InvalidValue {
                            key: "max display length",
                            value: value.to_string(),
                        })?)
                    };
                }
                _ => {
                    tracing::warn!(key = %key, value, "ignoring unknown decoder setting");
                }
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.parameter_mode, ParameterMode::First);
        assert_eq!(config.max_parameters, 2100);
        assert_eq!(config.max_display_len, None);
    }

    #[test]
    fn test_builder() {
        let config = DecoderConfig::new()
            .parameter_mode(ParameterMode::All)
            .max_parameters(8)
            .max_display_len(64);
        assert_eq!(config.parameter_mode, ParameterMode::All);
        assert_eq!(config.max_parameters, 8);
        assert_eq!(config.max_display_len, Some(64));
    }

    #[test]
    fn test_settings_string() {
        let config =
            DecoderConfig::from_settings_string("Parameters=ALL; Max Parameters = 10;").unwrap();
        assert_eq!(config.parameter_mode, ParameterMode::All);
        assert_eq!(config.max_parameters, 10);

        let config = DecoderConfig::from_settings_string("max display length=none").unwrap();
        assert_eq!(config.max_display_len, None);
        let config = DecoderConfig::from_settings_string("max display len=32").unwrap();
        assert_eq!(config.max_display_len, Some(32));
    }

    #[test]
    fn test_settings_string_unknown_keys_ignored() {
        let config = DecoderConfig::from_settings_string("color=blue;parameters=first").unwrap();
        assert_eq!(config, DecoderConfig::default());
    }

    #[test]
    fn test_settings_string_errors() {
        assert_eq!(
            DecoderConfig::from_settings_string("parameters"),
            Err(ConfigError::InvalidPair("parameters".into()))
        );
        assert!(matches!(
            DecoderConfig::from_settings_string("parameters=some"),
            Err(ConfigError::InvalidValue {
                key: "parameters",
                ..
            })
        ));
        assert!(DecoderConfig::from_settings_string("max parameters=0").is_err());
        assert!(DecoderConfig::from_settings_string("max parameters=-1").is_err());
        assert!(DecoderConfig::from_settings_string("max display length=x").is_err());
    }

    #[test]
    fn test_parameter_mode_display_roundtrip() {
        for mode in [ParameterMode::First, ParameterMode::All] {
            assert_eq!(mode.to_string().parse::<ParameterMode>().unwrap(), mode);
        }
    }
}
