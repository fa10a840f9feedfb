use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};

use crate::error::Result;
use crate::session::SessionEvent;
use crate::sink::TelemetrySink;

fn accept_thread(listener: TcpListener, client_tx: Sender<TcpStream>) {
    for stream in listener.incoming() {
        match stream {
            Ok(xa) => {
                info!("Telemetry: client connected {:?}", xa.peer_addr().ok());
                if client_tx.send(xa).is_err() {
                    break;
                }
            }
            Err(e) => warn!("Telemetry: accept failed: {}", e),
        }
    }
}

///
/// ## TcpSink
///
/// Fans every payload out to all connected TCP clients, one JSON object per
/// line. Clients that fail a write are dropped; late joiners only see
/// payloads emitted after they connected.
///
pub struct TcpSink {
    addr: SocketAddr,
    new_clients: Receiver<TcpStream>,
    clients: Vec<TcpStream>,
}

impl TcpSink {
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        let addr = listener.local_addr()?;
        let (client_tx, client_rx) = unbounded();

        std::thread::Builder::new()
            .name("dsky-telemetry".into())
            .spawn(move || accept_thread(listener, client_tx))?;
        info!("Telemetry: listening on {}", addr);

        Ok(TcpSink {
            addr,
            new_clients: client_rx,
            clients: Vec::new(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl TelemetrySink for TcpSink {
    fn emit(&mut self, payload: &str) -> Result<()> {
        self.clients.extend(self.new_clients.try_iter());

        let mut line = String::with_capacity(payload.len() + 1);
        line.push_str(payload);
        line.push('\n');

        self.clients.retain_mut(|xa| match xa.write_all(line.as_bytes()) {
            Ok(_x) => true,
            Err(e) => {
                debug!("Telemetry: dropping client: {}", e);
                false
            }
        });
        Ok(())
    }
}

fn handle_stream_input(stream: TcpStream, tx: Sender<SessionEvent>) {
    let peer = stream.peer_addr().ok();
    for line in BufReader::new(stream).lines() {
        let line = match line {
            Ok(x) => x,
            _ => break,
        };
        for token in line.split_whitespace() {
            if tx.send(SessionEvent::Key(token.to_string())).is_err() {
                return;
            }
        }
    }
    info!("Keys: {:?} disconnected", peer);
}

///
/// # Description
///
/// Accepts TCP connections on `addr` and forwards every whitespace separated
/// token they send as a `SessionEvent::Key`. Each connection gets its own
/// reader thread.
///
/// # Return Value
///
///  - Address actually bound, useful when binding port `0`.
///
pub fn spawn_key_listener<A: ToSocketAddrs>(addr: A, tx: Sender<SessionEvent>) -> Result<SocketAddr> {
    let listener = TcpListener::bind(addr)?;
    let local = listener.local_addr()?;

    std::thread::Builder::new()
        .name("dsky-keys".into())
        .spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(xa) => {
                        info!("Keys: connection from {:?}", xa.peer_addr().ok());
                        let keytx = tx.clone();
                        std::thread::spawn(move || handle_stream_input(xa, keytx));
                    }
                    Err(e) => warn!("Keys: accept failed: {}", e),
                }
            }
        })?;
    info!("Keys: listening on {}", local);
    Ok(local)
}

#[cfg(test)]
mod net_unittests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn key_tokens_are_forwarded() {
        let (tx, rx) = unbounded();
        let addr = spawn_key_listener("127.0.0.1:0", tx).unwrap();

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"VERB 3 5\nENTR\n").unwrap();

        let mut tokens = Vec::new();
        for _ in 0..4 {
            match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                SessionEvent::Key(t) => tokens.push(t),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(tokens, ["VERB", "3", "5", "ENTR"]);
    }

    #[test]
    fn payloads_reach_connected_clients() {
        let mut sink = TcpSink::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(sink.local_addr()).unwrap();
        client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut reader = BufReader::new(client);

        // The accept thread hands the client over asynchronously
        let mut line = String::new();
        for _ in 0..100 {
            sink.emit("{\"VERB\":\"35\"}").unwrap();
            if !sink.clients.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        reader.read_line(&mut line).unwrap();
        assert_eq!(line, "{\"VERB\":\"35\"}\n");
    }

    #[test]
    fn emit_without_clients_succeeds() {
        let mut sink = TcpSink::bind("127.0.0.1:0").unwrap();
        assert!(sink.emit("{}").is_ok());
    }
}
