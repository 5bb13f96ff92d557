//! Runtime configuration
//!
//! Built from the command line (`--broker`) on top of fixed defaults. There
//! is no config file; tests override individual values with the `with_*`
//! builders.

use crate::domain::topics::{self, SYS_BROKER_PREFIX};
use anyhow::{anyhow, bail, Context};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BROKER_URL: &str = "tcp://127.0.0.1:1883";
const DEFAULT_MQTT_PORT: u16 = 1883;

/// Broker host and port parsed from `tcp://host:port` style addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    host: String,
    port: u16,
}

impl BrokerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "tcp://[{}]:{}", self.host, self.port)
        } else {
            write!(f, "tcp://{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for BrokerAddress {
    type Err = anyhow::Error;

    /// Accepts `tcp://`, `mqtt://` or no scheme; port defaults to 1883
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = match s.split_once("://") {
            Some(("tcp" | "mqtt", rest)) => rest,
            Some((scheme, _)) => bail!("unsupported broker scheme '{}' in '{}'", scheme, s),
            None => s,
        };
        let rest = rest.trim_end_matches('/');

        let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
            // [ipv6]:port
            let (host, tail) = bracketed
                .split_once(']')
                .ok_or_else(|| anyhow!("unterminated IPv6 host in '{}'", s))?;
            match tail {
                "" => (host, None),
                _ => {
                    let port = tail
                        .strip_prefix(':')
                        .ok_or_else(|| anyhow!("unexpected text after IPv6 host in '{}'", s))?;
                    (host, Some(port))
                }
            }
        } else {
            match rest.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (rest, None),
            }
        };

        if host.is_empty() {
            bail!("missing broker host in '{}'", s);
        }
        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("invalid broker port '{}' in '{}'", port, s))?,
            None => DEFAULT_MQTT_PORT,
        };

        Ok(Self::new(host, port))
    }
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    broker: BrokerAddress,
    client_id: String,
    topic_prefix: String,
    keep_alive: Duration,
    tick_rate: Duration,
    disconnect_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            broker: BrokerAddress::new("127.0.0.1", DEFAULT_MQTT_PORT),
            client_id: format!("mqtt-sysmon-{}", std::process::id()),
            topic_prefix: SYS_BROKER_PREFIX.to_string(),
            keep_alive: Duration::from_secs(30),
            tick_rate: Duration::from_secs(1),
            disconnect_grace: Duration::from_secs(2),
        }
    }
}

impl Config {
    /// Defaults with the broker taken from a `--broker` value
    pub fn from_broker_url(url: &str) -> anyhow::Result<Self> {
        let broker = url.parse::<BrokerAddress>().with_context(|| format!("invalid broker address '{}'", url))?;
        Ok(Self { broker, ..Self::default() })
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.topic_prefix = prefix.into();
        self
    }

    pub fn broker(&self) -> &BrokerAddress {
        &self.broker
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn topic_prefix(&self) -> &str {
        &self.topic_prefix
    }

    /// Full topic paths to subscribe, in order
    pub fn topics(&self) -> Vec<String> {
        topics::subscription_list(&self.topic_prefix)
    }

    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Dashboard refresh interval
    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    /// Time allowed for the MQTT DISCONNECT to flush on shutdown
    pub fn disconnect_grace(&self) -> Duration {
        self.disconnect_grace
    }
}
