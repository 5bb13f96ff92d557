//! Broker status topics monitored by the dashboard

/// Prefix under which brokers publish their `$SYS` status tree
pub const SYS_BROKER_PREFIX: &str = "$SYS/broker/";

pub const UPTIME: &str = "uptime";
pub const MESSAGES_INFLIGHT: &str = "messages/inflight";
pub const CLIENTS_CONNECTED: &str = "clients/connected";
pub const HEAP_CURRENT: &str = "heap/current";
pub const HEAP_MAXIMUM: &str = "heap/maximum";
pub const CLIENTS_MAXIMUM: &str = "clients/maximum";
pub const SUBSCRIPTIONS_COUNT: &str = "subscriptions/count";
pub const SUBSCRIPTIONS_COUNT_5M: &str = "subscriptions/count/5m";
pub const LOAD_RECEIVED_5MIN: &str = "load/messages/received/5min";

/// Topic suffixes in subscription order
///
/// `messages/inflight` and `subscriptions/count/5m` are subscribed but have
/// no decoder; their messages are ignored.
pub const MONITORED: [&str; 9] = [
    UPTIME,
    MESSAGES_INFLIGHT,
    CLIENTS_CONNECTED,
    HEAP_CURRENT,
    HEAP_MAXIMUM,
    CLIENTS_MAXIMUM,
    SUBSCRIPTIONS_COUNT,
    SUBSCRIPTIONS_COUNT_5M,
    LOAD_RECEIVED_5MIN,
];

/// Full topic paths for every monitored suffix under `prefix`
pub fn subscription_list(prefix: &str) -> Vec<String> {
    MONITORED.iter().map(|suffix| format!("{}{}", prefix, suffix)).collect()
}
