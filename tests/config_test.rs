//! Integration tests for configuration built from command-line values

use mqtt_sysmon::infra::config::DEFAULT_BROKER_URL;
use mqtt_sysmon::infra::{BrokerAddress, Config};
use std::time::Duration;

#[test]
fn test_config_from_default_broker_flag() {
    let config = Config::from_broker_url(DEFAULT_BROKER_URL).unwrap();

    assert_eq!(config.broker().host(), "127.0.0.1");
    assert_eq!(config.broker().port(), 1883);
    assert_eq!(config.keep_alive(), Duration::from_secs(30));
    assert_eq!(config.tick_rate(), Duration::from_secs(1));
    assert_eq!(config.disconnect_grace(), Duration::from_secs(2));

    let topics = config.topics();
    assert_eq!(topics.len(), 9);
    assert!(topics.iter().all(|t| t.starts_with("$SYS/broker/")));
    assert!(topics.contains(&"$SYS/broker/clients/connected".to_string()));
    assert!(topics.contains(&"$SYS/broker/load/messages/received/5min".to_string()));
}

#[test]
fn test_config_from_custom_broker_flag() {
    let config = Config::from_broker_url("mqtt://broker.example:1884").unwrap();
    assert_eq!(config.broker(), &BrokerAddress::new("broker.example", 1884));
    assert_eq!(config.broker().to_string(), "tcp://broker.example:1884");
}

#[test]
fn test_invalid_broker_flag_reports_address() {
    let err = Config::from_broker_url("wss://broker.example").unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("invalid broker address 'wss://broker.example'"));
    assert!(message.contains("unsupported broker scheme 'wss'"));
}
