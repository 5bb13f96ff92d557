//! Embedded rumqttd broker shared by the integration tests

pub mod scripted;

use rumqttd::{Broker, Config, ConnectionSettings, RouterConfig, ServerSettings};
use std::collections::HashMap;
use std::net::{SocketAddr, TcpStream};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

const BROKER_PORT: u16 = 18_830;

static BROKER: OnceLock<u16> = OnceLock::new();

/// Start the broker once per test binary and return its port
pub fn broker_port() -> u16 {
    *BROKER.get_or_init(|| {
        let listen: SocketAddr = ([127, 0, 0, 1], BROKER_PORT).into();

        let mut servers = HashMap::new();
        servers.insert(
            "v4".to_string(),
            ServerSettings {
                name: "v4".to_string(),
                listen,
                tls: None,
                next_connection_delay_ms: 1,
                connections: ConnectionSettings {
                    connection_timeout_ms: 5000,
                    max_payload_size: 262144,
                    max_inflight_count: 200,
                    auth: None,
                    dynamic_filters: false,
                    external_auth: None,
                },
            },
        );

        let config = Config {
            id: 0,
            router: RouterConfig {
                max_segment_size: 104857600,
                max_segment_count: 10,
                max_connections: 100,
                max_outgoing_packet_count: 200,
                initialized_filters: None,
                ..Default::default()
            },
            v4: Some(servers),
            v5: None,
            ws: None,
            prometheus: None,
            metrics: None,
            bridge: None,
            console: None,
            cluster: None,
        };

        thread::spawn(move || {
            let mut broker = Broker::new(config);
            broker.start().expect("embedded broker failed");
        });

        let deadline = Instant::now() + Duration::from_secs(5);
        while TcpStream::connect(listen).is_err() {
            assert!(Instant::now() < deadline, "embedded broker did not start");
            thread::sleep(Duration::from_millis(20));
        }
        BROKER_PORT
    })
}
