//! Projector connection.
//!
//! One request is in flight at a time. Every wait is bounded by a timeout
//! from [`LinkConfig`]; nothing is retried. After a timeout, a bad frame or
//! a socket error the stream is shut down and every later call fails with
//! [`LinkError::Closed`].

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use projgamma_curve::{CodeTable, RawTable};
use tracing::{debug, trace, warn};

use crate::codes::{ModelId, PowerState, ProjectorModel};
use crate::config::LinkConfig;
use crate::error::{command_name, LinkError, LinkResult};
use crate::frame::{self, HexDump, Header};
use crate::setting::{Setting, SettingValue};

/// Keep-alive command.
const NULL_COMMAND: &[u8] = b"\0\0";

/// Model id query.
const MODEL_COMMAND: &[u8] = b"MD";

/// Custom gamma table channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableId {
    /// Red channel.
    Red,
    /// Green channel.
    Green,
    /// Blue channel.
    Blue,
}

impl TableId {
    /// Every channel, in upload order.
    pub const ALL: [TableId; 3] = [Self::Red, Self::Green, Self::Blue];

    /// Command carrying the channel's table.
    pub const fn command(&self) -> &'static [u8] {
        match self {
            Self::Red => b"PMDR",
            Self::Green => b"PMDG",
            Self::Blue => b"PMDB",
        }
    }

    /// Channel for a name (`red`, `r`, ...), ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "red" | "r" => Some(Self::Red),
            "green" | "g" => Some(Self::Green),
            "blue" | "b" => Some(Self::Blue),
            _ => None,
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        })
    }
}

/// A command the projector acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    command: String,
}

impl Ack {
    fn new(command: &[u8]) -> Self {
        Self {
            command: command_name(command),
        }
    }

    /// Acknowledged command.
    pub fn command(&self) -> &str {
        &self.command
    }
}

/// Opens a connection to `host` on the default port.
pub fn connect(host: &str) -> LinkResult<Connection> {
    Connection::open(&LinkConfig::with_host(host))
}

/// Runs `f` on a fresh connection and closes it afterwards, whatever `f`
/// returns.
pub fn with_connection<T, E>(
    config: &LinkConfig,
    f: impl FnOnce(&mut Connection) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<LinkError>,
{
    let mut conn = Connection::open(config)?;
    let result = f(&mut conn);
    conn.close();
    result
}

/// An open, handshaken connection.
///
/// Dropping the connection shuts the socket down.
pub struct Connection {
    stream: Option<TcpStream>,
    config: LinkConfig,
    addr: String,
}

impl Connection {
    /// Connects and performs the `PJ_OK`, `PJREQ`, `PJACK` handshake.
    ///
    /// The socket is closed again if the handshake fails.
    pub fn open(config: &LinkConfig) -> LinkResult<Self> {
        let addr = config.address();
        if config.host.is_empty() {
            return Err(LinkError::Connect {
                addr,
                source: io::Error::new(io::ErrorKind::InvalidInput, "no projector host configured"),
            });
        }
        let stream = connect_stream(&addr, config.connect_timeout())?;
        stream.set_nodelay(true)?;

        let mut conn = Self {
            stream: Some(stream),
            config: config.clone(),
            addr,
        };
        let timeout = conn.config.ack_timeout();
        conn.exchange(|wire| wire.handshake(timeout))?;
        debug!(addr = %conn.addr, "connected");
        Ok(conn)
    }

    /// `host:port` of the projector.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Settings the connection was opened with.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Returns true until the connection is closed.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Shuts the socket down. Later calls fail with [`LinkError::Closed`].
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                trace!(error = %e, "shutdown");
            }
            debug!(addr = %self.addr, "disconnected");
        }
    }

    /// Keep-alive.
    pub fn null(&mut self) -> LinkResult<Ack> {
        self.operation(NULL_COMMAND, b"")?;
        Ok(Ack::new(NULL_COMMAND))
    }

    /// Model id.
    pub fn model(&mut self) -> LinkResult<ProjectorModel> {
        let value = self.reference(MODEL_COMMAND, ModelId::WIDTH)?;
        Ok(ProjectorModel::from_bytes(&value))
    }

    /// Writes one channel of the custom gamma table.
    pub fn write_table(&mut self, id: TableId, table: &CodeTable) -> LinkResult<Ack> {
        let command = id.command();
        let payload = frame::pack_table(table);
        let (ack_timeout, data_timeout) = (self.config.ack_timeout(), self.config.data_timeout());
        debug!(table = %id, peak = table.peak(), "writing gamma table");

        self.exchange(|wire| {
            wire.send(&frame::request(Header::Operation, command, b""))?;
            wire.expect_ack(command, &frame::ack(command), ack_timeout)?;
            wire.send(&payload)?;
            wire.expect_ack(command, &frame::payload_ack(command), data_timeout)
        })?;
        Ok(Ack::new(command))
    }

    /// Writes `table` to the red, green and blue channels.
    pub fn write_gamma_table(&mut self, table: impl AsRef<CodeTable>) -> LinkResult<Vec<Ack>> {
        let table = table.as_ref();
        TableId::ALL
            .iter()
            .map(|id| self.write_table(*id, table))
            .collect()
    }

    /// Reads one channel's table payload as sent.
    pub fn read_table_payload(&mut self, id: TableId) -> LinkResult<Vec<u8>> {
        let command = id.command();
        let (ack_timeout, data_timeout) = (self.config.ack_timeout(), self.config.data_timeout());
        debug!(table = %id, "reading gamma table");

        self.exchange(|wire| {
            wire.send(&frame::request(Header::Reference, command, b""))?;
            wire.expect_ack(command, &frame::ack(command), ack_timeout)?;
            wire.receive(frame::TABLE_BYTES, data_timeout, command)
        })
    }

    /// Reads one channel's table.
    pub fn read_raw_table(&mut self, id: TableId) -> LinkResult<RawTable> {
        let payload = self.read_table_payload(id)?;
        Ok(frame::unpack_table(&payload)?.into())
    }

    /// Changes a setting.
    pub fn write_scalar_setting(&mut self, setting: Setting, value: SettingValue) -> LinkResult<Ack> {
        if !value.fits(setting) {
            return Err(LinkError::invalid_value(format!(
                "{value} cannot be sent as {setting}"
            )));
        }
        if let SettingValue::Power(state) = value {
            if !matches!(state, PowerState::StandBy | PowerState::LampOn) {
                return Err(LinkError::invalid_value(format!(
                    "power cannot be set to {state}"
                )));
            }
        }
        self.operation(setting.command(), &value.encode())?;
        Ok(Ack::new(setting.command()))
    }

    /// Changes a setting and reads it back where the projector reports
    /// the written value.
    pub fn write_verified_setting(
        &mut self,
        setting: Setting,
        value: SettingValue,
    ) -> LinkResult<Ack> {
        let ack = self.write_scalar_setting(setting, value)?;
        if setting.is_verifiable() {
            let current = self.read_scalar_setting(setting)?;
            if current != value {
                warn!(%setting, wrote = %value, read = %current, "setting did not stick");
                return Err(LinkError::VerifyFailed {
                    command: ack.command,
                });
            }
        }
        Ok(ack)
    }

    /// Reads a setting.
    pub fn read_scalar_setting(&mut self, setting: Setting) -> LinkResult<SettingValue> {
        if !setting.is_readable() {
            return Err(LinkError::invalid_value(format!("{setting} is write only")));
        }
        let value = self.reference(setting.command(), setting.value_width())?;
        SettingValue::decode(setting, &value)
    }

    fn operation(&mut self, command: &[u8], value: &[u8]) -> LinkResult<()> {
        // settings take a while to apply before the projector answers
        let timeout = if value.is_empty() {
            self.config.ack_timeout()
        } else {
            self.config.setting_timeout()
        };
        debug!(command = %command_name(command), value = %value.escape_ascii(), "operation");

        self.exchange(|wire| {
            wire.send(&frame::request(Header::Operation, command, value))?;
            wire.expect_ack(command, &frame::ack(command), timeout)
        })
    }

    fn reference(&mut self, command: &[u8], width: usize) -> LinkResult<Vec<u8>> {
        let timeout = self.config.ack_timeout();
        debug!(command = %command_name(command), "reference");

        self.exchange(|wire| {
            wire.send(&frame::request(Header::Reference, command, b""))?;
            wire.expect_ack(command, &frame::ack(command), timeout)?;
            wire.expect_response(command, width, timeout)
        })
    }

    /// Runs one request on the stream, tearing the stream down when the
    /// request leaves it out of step with the device.
    fn exchange<T>(&mut self, op: impl FnOnce(&mut Wire<'_>) -> LinkResult<T>) -> LinkResult<T> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(LinkError::Closed);
        };
        let result = op(&mut Wire { stream });
        if let Err(err) = &result {
            if err.is_fatal() {
                warn!(addr = %self.addr, error = %err, "closing connection");
                self.close();
            }
        }
        result
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("addr", &self.addr)
            .field("open", &self.is_open())
            .finish()
    }
}

fn connect_stream(addr: &str, timeout: Duration) -> LinkResult<TcpStream> {
    let connect_error = |source: io::Error| LinkError::Connect {
        addr: addr.to_string(),
        source,
    };
    let mut last = None;
    for sock in addr.to_socket_addrs().map_err(connect_error)? {
        match TcpStream::connect_timeout(&sock, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last = Some(e),
        }
    }
    Err(connect_error(last.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
    })))
}

/// Frame level reads and writes on an open stream.
struct Wire<'a> {
    stream: &'a mut TcpStream,
}

impl Wire<'_> {
    fn send(&mut self, bytes: &[u8]) -> LinkResult<()> {
        trace!(frame = %HexDump(bytes), "send");
        self.stream.write_all(bytes)?;
        Ok(())
    }

    /// Reads exactly `len` bytes. `waiting_for` names the command in errors.
    fn receive(&mut self, len: usize, timeout: Duration, waiting_for: &[u8]) -> LinkResult<Vec<u8>> {
        // a zero read timeout is rejected by the socket
        self.stream
            .set_read_timeout(Some(timeout.max(Duration::from_millis(1))))?;
        let mut buf = vec![0; len];
        match self.stream.read_exact(&mut buf) {
            Ok(()) => {
                trace!(frame = %HexDump(&buf), "receive");
                Ok(buf)
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Err(LinkError::Timeout {
                    command: command_name(waiting_for),
                    waited: timeout,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(LinkError::protocol(format!(
                "connection closed while waiting for {}",
                command_name(waiting_for)
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn handshake(&mut self, timeout: Duration) -> LinkResult<()> {
        self.expect_exact(frame::HANDSHAKE_READY, timeout)?;
        self.send(frame::HANDSHAKE_REQUEST)?;
        self.expect_exact(frame::HANDSHAKE_ACCEPT, timeout)
    }

    fn expect_exact(&mut self, expected: &[u8], timeout: Duration) -> LinkResult<()> {
        let got = self.receive(expected.len(), timeout, expected)?;
        if got != expected {
            return Err(LinkError::protocol(format!(
                "expected {}, got {}",
                expected.escape_ascii(),
                got.escape_ascii()
            )));
        }
        Ok(())
    }

    /// Waits for `expected`, or a negative acknowledgement of `command`.
    fn expect_ack(&mut self, command: &[u8], expected: &[u8], timeout: Duration) -> LinkResult<()> {
        let header = self.receive(1, timeout, command)?[0];
        match header {
            frame::ACK => {
                let rest = self.receive(expected.len() - 1, timeout, command)?;
                if rest[..] != expected[1..] {
                    return Err(LinkError::protocol(format!(
                        "bad acknowledgement for {}: {}",
                        command_name(command),
                        HexDump(&rest)
                    )));
                }
                Ok(())
            }
            frame::NAK => Err(self.rejection(command, timeout)),
            other => Err(unexpected_header(command, other)),
        }
    }

    /// Reads a reference response carrying a `width` byte value.
    fn expect_response(
        &mut self,
        command: &[u8],
        width: usize,
        timeout: Duration,
    ) -> LinkResult<Vec<u8>> {
        let header = self.receive(1, timeout, command)?[0];
        match header {
            frame::RESPONSE => {
                let echo = frame::echo(command);
                let rest = self.receive(frame::UNIT_ID.len() + echo.len() + width + 1, timeout, command)?;
                let (prefix, tail) = rest.split_at(frame::UNIT_ID.len() + echo.len());
                let (value, end) = tail.split_at(width);
                if prefix[..2] != frame::UNIT_ID || &prefix[2..] != echo || end != [frame::END] {
                    return Err(LinkError::protocol(format!(
                        "bad response for {}: {}",
                        command_name(command),
                        HexDump(&rest)
                    )));
                }
                Ok(value.to_vec())
            }
            frame::NAK => Err(self.rejection(command, timeout)),
            other => Err(unexpected_header(command, other)),
        }
    }

    /// Reads the rest of a negative acknowledgement.
    fn rejection(&mut self, command: &[u8], timeout: Duration) -> LinkError {
        let echo = frame::echo(command);
        let rest = match self.receive(frame::UNIT_ID.len() + echo.len() + 2, timeout, command) {
            Ok(rest) => rest,
            Err(e) => return e,
        };
        let (prefix, tail) = rest.split_at(frame::UNIT_ID.len() + echo.len());
        if prefix[..2] != frame::UNIT_ID || &prefix[2..] != echo || tail[1] != frame::END {
            return LinkError::protocol(format!(
                "bad negative acknowledgement for {}: {}",
                command_name(command),
                HexDump(&rest)
            ));
        }
        warn!(command = %command_name(command), status = tail[0], "rejected");
        LinkError::DeviceRejected {
            command: command_name(command),
            code: tail[0],
        }
    }
}

fn unexpected_header(command: &[u8], header: u8) -> LinkError {
    LinkError::protocol(format!(
        "unexpected frame header {header:#04x} in reply to {}",
        command_name(command)
    ))
}
