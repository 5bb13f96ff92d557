//! Hand-driven MQTT 3.1.1 peer that answers with canned packets
//!
//! Covers broker behaviour the embedded broker never produces, such as a
//! rejected SUBSCRIBE or a dropped connection.

use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const CONNECT: u8 = 0x10;
const SUBSCRIBE: u8 = 0x82;
const CONNACK_ACCEPTED: [u8; 4] = [0x20, 0x02, 0x00, 0x00];

pub const SUBACK_QOS0: u8 = 0x00;
pub const SUBACK_FAILURE: u8 = 0x80;

/// Bind an ephemeral local port
pub async fn listen() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Fixed-header type byte and the packet body
async fn read_packet(stream: &mut TcpStream) -> io::Result<(u8, Vec<u8>)> {
    let header = stream.read_u8().await?;
    let (mut len, mut shift) = (0usize, 0);
    loop {
        let byte = stream.read_u8().await?;
        len |= usize::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    let mut body = vec![0; len];
    stream.read_exact(&mut body).await?;
    Ok((header, body))
}

/// Accept one client, read its CONNECT and reply with a clean-session CONNACK
pub async fn accept_session(listener: &TcpListener) -> io::Result<TcpStream> {
    let (mut stream, _) = listener.accept().await?;
    let (header, _) = read_packet(&mut stream).await?;
    assert_eq!(header, CONNECT, "expected CONNECT");
    stream.write_all(&CONNACK_ACCEPTED).await?;
    Ok(stream)
}

/// Answer the next SUBSCRIBE with `return_code` and return its first filter
pub async fn answer_subscribe(stream: &mut TcpStream, return_code: u8) -> io::Result<String> {
    loop {
        let (header, body) = read_packet(stream).await?;
        if header != SUBSCRIBE {
            continue;
        }
        let len = usize::from(u16::from_be_bytes([body[2], body[3]]));
        let filter = String::from_utf8_lossy(&body[4..4 + len]).into_owned();
        stream.write_all(&[0x90, 0x03, body[0], body[1], return_code]).await?;
        return Ok(filter);
    }
}
