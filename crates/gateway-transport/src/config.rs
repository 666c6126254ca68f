//! Pipeline configuration.
//!
//! Defaults or overrides via a few environment variables:
//!
//! - `GATEWAY_CHANNEL`        (default: "loopback://gateway")
//! - `GATEWAY_STREAM_ID`      (default: "10")
//! - `GATEWAY_BUFFER_SIZE`    (default: 128 MiB)
//! - `GATEWAY_MESSAGE_SIZE`   (default: 256 KiB)
//! - `GATEWAY_FRAGMENT_LIMIT` (default: "1024")

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Settings shared by the outbound and inbound pipelines.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Transport channel identifier (informational for the loopback
    /// transport, meaningful for networked ones).
    pub channel: String,

    /// Stream id within the channel.
    pub stream_id: i32,

    /// Capacity of the outbound ring buffer in bytes.
    pub buffer_size: usize,

    /// Largest single framed message the drain loop will peek at once.
    pub message_size: usize,

    /// Most fragments one inbound poll pass may deliver.
    pub fragment_limit: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            channel: "loopback://gateway".to_string(),
            stream_id: 10,
            buffer_size: 128 * 1024 * 1024,
            message_size: 256 * 1024,
            fragment_limit: 1024,
        }
    }
}

impl PipelineSettings {
    /// Construct settings from environment variables, falling back to
    /// the defaults above.
    pub fn from_env() -> Result<Self> {
        let defaults = PipelineSettings::default();
        let channel = env::var("GATEWAY_CHANNEL").unwrap_or(defaults.channel);
        let stream_id = read_env_or_default("GATEWAY_STREAM_ID", defaults.stream_id)?;
        let buffer_size = read_env_or_default("GATEWAY_BUFFER_SIZE", defaults.buffer_size)?;
        let message_size = read_env_or_default("GATEWAY_MESSAGE_SIZE", defaults.message_size)?;
        let fragment_limit =
            read_env_or_default("GATEWAY_FRAGMENT_LIMIT", defaults.fragment_limit)?;

        Ok(PipelineSettings {
            channel,
            stream_id,
            buffer_size,
            message_size,
            fragment_limit,
        })
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn with_stream_id(mut self, stream_id: i32) -> Self {
        self.stream_id = stream_id;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_message_size(mut self, message_size: usize) -> Self {
        self.message_size = message_size;
        self
    }

    pub fn with_fragment_limit(mut self, fragment_limit: usize) -> Self {
        self.fragment_limit = fragment_limit;
        self
    }
}

fn read_env_or_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {val:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_sizes() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.stream_id, 10);
        assert_eq!(settings.buffer_size, 134_217_728);
        assert_eq!(settings.message_size, 262_144);
        assert_eq!(settings.fragment_limit, 1024);
    }

    #[test]
    fn builders_override_fields() {
        let settings = PipelineSettings::default()
            .with_channel("loopback://test")
            .with_stream_id(7)
            .with_buffer_size(4096)
            .with_message_size(512)
            .with_fragment_limit(16);
        assert_eq!(settings.channel, "loopback://test");
        assert_eq!(settings.stream_id, 7);
        assert_eq!(settings.buffer_size, 4096);
        assert_eq!(settings.message_size, 512);
        assert_eq!(settings.fragment_limit, 16);
    }
}
