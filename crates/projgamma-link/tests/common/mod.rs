//! Loopback projector for link tests.
//!
//! Serves one connection at a time on `127.0.0.1`, keeps written tables and
//! settings in memory and records every request frame.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use projgamma_curve::CodeTable;
use projgamma_link::frame::{self, END, TABLE_BYTES};
use projgamma_link::LinkConfig;

/// How the mock answers.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Like a projector.
    Normal,
    /// Negative acknowledgement for one command.
    Reject {
        /// Command to reject
        command: &'static [u8],
        /// Status byte sent back
        status: u8,
    },
    /// Handshake, then never answer.
    Silent,
    /// Handshake, then answer with an unknown frame header.
    Garble,
    /// Wrong greeting.
    BadHandshake,
    /// Accept table writes without storing them.
    Forgetful,
    /// Cut table reads short and hang up.
    Truncate,
}

/// Everything the mock has seen and stored.
#[derive(Debug)]
pub struct State {
    pub tables: HashMap<Vec<u8>, Vec<u8>>,
    pub settings: HashMap<Vec<u8>, Vec<u8>>,
    pub requests: Vec<Vec<u8>>,
}

impl Default for State {
    fn default() -> Self {
        let settings = [
            ("PW", "1"),
            ("PMPM", "0C"),
            ("PMGT", "4"),
            ("PMGC", "04"),
            ("PMCN", "0000"),
            ("PMBR", "0000"),
            ("ISIL", "0"),
            ("MD", "ILAFPJ -- XHP3"),
        ]
        .into_iter()
        .map(|(k, v)| (k.as_bytes().to_vec(), v.as_bytes().to_vec()))
        .collect();
        Self {
            tables: HashMap::new(),
            settings,
            requests: Vec::new(),
        }
    }
}

pub struct MockProjector {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
}

impl MockProjector {
    pub fn start(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(State::default()));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                // the client hanging up ends a session
                let _ = serve(stream, behavior, &shared);
            }
        });
        Self { addr, state }
    }

    /// Link settings pointing at the mock, with short waits.
    pub fn config(&self) -> LinkConfig {
        LinkConfig {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            connect_timeout_ms: 1000,
            ack_timeout_ms: 200,
            setting_timeout_ms: 200,
            data_timeout_ms: 500,
        }
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

fn serve(mut stream: TcpStream, behavior: Behavior, state: &Mutex<State>) -> io::Result<()> {
    if let Behavior::BadHandshake = behavior {
        return stream.write_all(b"PJ_NG");
    }
    stream.write_all(frame::HANDSHAKE_READY)?;
    let mut request = [0; 5];
    stream.read_exact(&mut request)?;
    if request[..] != *frame::HANDSHAKE_REQUEST {
        return Ok(());
    }
    stream.write_all(frame::HANDSHAKE_ACCEPT)?;

    while let Some(request) = read_request(&mut stream)? {
        state.lock().unwrap().requests.push(request.clone());
        let header = request[0];
        let (command, value) = split_command(&request[3..request.len() - 1]);

        match behavior {
            Behavior::Silent => continue,
            Behavior::Garble => {
                stream.write_all(&[0x7f, 0x89, 0x01, END])?;
                continue;
            }
            Behavior::Reject {
                command: rejected,
                status,
            } if command == rejected => {
                stream.write_all(&frame::nak(command, status))?;
                continue;
            }
            _ => {}
        }

        match header {
            b'!' => operation(&mut stream, behavior, state, command, value)?,
            b'?' => reference(&mut stream, behavior, state, command)?,
            _ => return Ok(()),
        }
    }
    Ok(())
}

fn read_request(stream: &mut TcpStream) -> io::Result<Option<Vec<u8>>> {
    let mut request = Vec::new();
    let mut byte = [0];
    loop {
        if stream.read(&mut byte)? == 0 {
            return Ok(None);
        }
        request.push(byte[0]);
        if byte[0] == END {
            return Ok(Some(request));
        }
    }
}

fn split_command(body: &[u8]) -> (&[u8], &[u8]) {
    let len = if body.starts_with(b"PM") || body.starts_with(b"IS") {
        4
    } else {
        2
    };
    body.split_at(len.min(body.len()))
}

fn is_table(command: &[u8]) -> bool {
    matches!(command, b"PMDR" | b"PMDG" | b"PMDB")
}

fn operation(
    stream: &mut TcpStream,
    behavior: Behavior,
    state: &Mutex<State>,
    command: &[u8],
    value: &[u8],
) -> io::Result<()> {
    if !is_table(command) && command != b"RC" && command != b"\0\0" {
        // record the setting before acknowledging so the client never
        // observes an ack ahead of the stored value
        state
            .lock()
            .unwrap()
            .settings
            .insert(command.to_vec(), value.to_vec());
    }
    stream.write_all(&frame::ack(command))?;
    if is_table(command) {
        let mut payload = vec![0; TABLE_BYTES];
        stream.read_exact(&mut payload)?;
        if !matches!(behavior, Behavior::Forgetful) {
            state.lock().unwrap().tables.insert(command.to_vec(), payload);
        }
        stream.write_all(&frame::payload_ack(command))?;
    }
    Ok(())
}

fn reference(
    stream: &mut TcpStream,
    behavior: Behavior,
    state: &Mutex<State>,
    command: &[u8],
) -> io::Result<()> {
    if is_table(command) {
        let payload = state
            .lock()
            .unwrap()
            .tables
            .get(command)
            .cloned()
            .unwrap_or_else(|| frame::pack_table(&CodeTable::identity()));
        stream.write_all(&frame::ack(command))?;
        if let Behavior::Truncate = behavior {
            stream.write_all(&payload[..100])?;
            return stream.shutdown(std::net::Shutdown::Both);
        }
        return stream.write_all(&payload);
    }

    let value = state.lock().unwrap().settings.get(command).cloned();
    match value {
        Some(value) => {
            stream.write_all(&frame::ack(command))?;
            stream.write_all(&frame::response(command, &value))
        }
        None => stream.write_all(&frame::nak(command, 0x01)),
    }
}
