use crate::{
    constants::{CMD_SHUTDOWN, CMD_STOP, LISTEN_BACKLOG},
    device::JoystickDevice,
    sampler::Sampler,
};
use socket2::{Domain, Protocol, Socket, Type};
use std::{
    io::{self, Read, Write},
    net::{Shutdown, SocketAddr, TcpListener, TcpStream},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Startup failures. None of these are retried.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to create listening socket: {0}")]
    Socket(#[source] io::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to listen on {addr}: {source}")]
    Listen {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// One byte from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Poll,
    Stop,
    Shutdown,
}

impl Command {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 | CMD_STOP => Command::Stop,
            CMD_SHUTDOWN => Command::Shutdown,
            _ => Command::Poll,
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Client sent the stop byte (or a zero byte).
    Stopped,
    /// Peer closed, or a read/write failed.
    Disconnected,
    /// Client asked the whole server to exit.
    Shutdown,
}

enum ServerState {
    Listening,
    SessionActive(TcpStream, SocketAddr),
    ShuttingDown,
}

/// Single-client TCP server handing out gamepad snapshots on request.
#[derive(Debug)]
pub struct PadServer {
    listener: TcpListener,
    running: Arc<AtomicBool>,
}

impl PadServer {
    /// Bind and listen on `addr` with a fixed backlog.
    ///
    /// `running` is the external shutdown flag; clearing it stops the server
    /// the next time it returns to accepting connections.
    pub fn bind(addr: SocketAddr, running: Arc<AtomicBool>) -> Result<Self, ServerError> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(ServerError::Socket)?;
        // On Windows SO_REUSEADDR would let a second listener take the port.
        #[cfg(unix)]
        socket.set_reuse_address(true).map_err(ServerError::Socket)?;
        socket
            .bind(&addr.into())
            .map_err(|source| ServerError::Bind { addr, source })?;
        socket
            .listen(LISTEN_BACKLOG)
            .map_err(|source| ServerError::Listen { addr, source })?;

        Ok(Self {
            listener: socket.into(),
            running,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve clients one at a time until a client sends the shutdown byte or
    /// the running flag is cleared. The listening socket is closed on return.
    pub fn run<D: JoystickDevice>(self, sampler: &mut Sampler<D>) {
        match self.local_addr() {
            Ok(addr) => info!("server started on {addr}"),
            Err(_) => info!("server started"),
        }

        let mut state = ServerState::Listening;
        loop {
            state = match state {
                ServerState::Listening => {
                    if !self.running.load(Ordering::SeqCst) {
                        ServerState::ShuttingDown
                    } else {
                        match self.listener.accept() {
                            Ok((stream, peer)) => ServerState::SessionActive(stream, peer),
                            Err(e) => {
                                warn!("accept failed: {e}");
                                ServerState::Listening
                            }
                        }
                    }
                }
                ServerState::SessionActive(mut stream, peer) => {
                    info!("client connected from {peer}. Send 'q' to exit, 's' to stop");
                    let end = serve_session(&mut stream, sampler);
                    let _ = stream.shutdown(Shutdown::Both);
                    drop(stream);
                    info!("client gone ({end:?})");

                    match end {
                        SessionEnd::Shutdown => ServerState::ShuttingDown,
                        SessionEnd::Stopped | SessionEnd::Disconnected => ServerState::Listening,
                    }
                }
                ServerState::ShuttingDown => break,
            };
        }

        info!("server shutting down");
    }
}

/// Run the command loop for one connected client.
///
/// Reads one byte at a time; each poll byte gets exactly one snapshot back
/// before the next byte is read. The caller closes the stream.
pub fn serve_session<S, D>(stream: &mut S, sampler: &mut Sampler<D>) -> SessionEnd
where
    S: Read + Write,
    D: JoystickDevice,
{
    let mut byte = [0u8; 1];
    loop {
        match stream.read(&mut byte) {
            Ok(0) => return SessionEnd::Disconnected,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("session read failed: {e}");
                return SessionEnd::Disconnected;
            }
        }

        match Command::from_byte(byte[0]) {
            Command::Stop => return SessionEnd::Stopped,
            Command::Shutdown => return SessionEnd::Shutdown,
            Command::Poll => {
                let reply = sampler.sample().to_bytes();
                trace!("poll 0x{:02X} -> {:?}", byte[0], sampler.snapshot());
                if let Err(e) = stream.write_all(&reply).and_then(|_| stream.flush()) {
                    debug!("session write failed: {e}");
                    return SessionEnd::Disconnected;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::button_bits;
    use crate::device::{MockJoystick, RawJoystickState};
    use crate::pad_state::{GamepadSnapshot, SNAPSHOT_LEN};
    use std::io::Cursor;

    /// In-memory stream: reads from a fixed script, collects writes.
    struct ScriptedStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl ScriptedStream {
        fn new(script: &[u8]) -> Self {
            Self {
                input: Cursor::new(script.to_vec()),
                output: Vec::new(),
            }
        }
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for ScriptedStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Accepts reads, refuses every write.
    struct BrokenPipe(Cursor<Vec<u8>>);

    impl Read for BrokenPipe {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_command_from_byte() {
        assert_eq!(Command::from_byte(b's'), Command::Stop);
        assert_eq!(Command::from_byte(0), Command::Stop);
        assert_eq!(Command::from_byte(b'q'), Command::Shutdown);
        assert_eq!(Command::from_byte(0x01), Command::Poll);
        assert_eq!(Command::from_byte(b'i'), Command::Poll);
        assert_eq!(Command::from_byte(b'S'), Command::Poll);
        assert_eq!(Command::from_byte(0xFF), Command::Poll);
    }

    #[test]
    fn test_each_poll_gets_one_reply() {
        // Arrange
        let mut stream = ScriptedStream::new(&[0x01, 0x01, 0x01, b's']);
        let device = MockJoystick::new();
        let mut sampler = Sampler::new(device.clone());

        // Act
        let end = serve_session(&mut stream, &mut sampler);

        // Assert
        assert_eq!(end, SessionEnd::Stopped);
        assert_eq!(stream.output.len(), 3 * SNAPSHOT_LEN);
        assert_eq!(device.query_count(), 3);
    }

    #[test]
    fn test_reply_is_encoded_snapshot() {
        let device = MockJoystick::with_state(Some(RawJoystickState {
            buttons: 1 << button_bits::SQUARE,
            ..RawJoystickState::centered()
        }));
        let mut stream = ScriptedStream::new(&[b'i']);
        let mut sampler = Sampler::new(device);

        serve_session(&mut stream, &mut sampler);

        let snap = GamepadSnapshot::from_bytes(&stream.output).expect("decode");
        assert!(snap.is_pressed(button_bits::SQUARE));
    }

    #[test]
    fn test_stop_sends_nothing() {
        let mut stream = ScriptedStream::new(b"s");
        let mut sampler = Sampler::new(MockJoystick::new());

        assert_eq!(serve_session(&mut stream, &mut sampler), SessionEnd::Stopped);
        assert!(stream.output.is_empty());
    }

    #[test]
    fn test_zero_byte_behaves_like_stop() {
        let mut stream = ScriptedStream::new(&[0x00, 0x01]);
        let mut sampler = Sampler::new(MockJoystick::new());

        assert_eq!(serve_session(&mut stream, &mut sampler), SessionEnd::Stopped);
        assert!(stream.output.is_empty());
    }

    #[test]
    fn test_shutdown_after_polls() {
        let mut stream = ScriptedStream::new(&[0x01, b'q', 0x01]);
        let mut sampler = Sampler::new(MockJoystick::new());

        assert_eq!(serve_session(&mut stream, &mut sampler), SessionEnd::Shutdown);
        assert_eq!(stream.output.len(), SNAPSHOT_LEN);
    }

    #[test]
    fn test_eof_is_disconnect() {
        let mut stream = ScriptedStream::new(&[0x01]);
        let mut sampler = Sampler::new(MockJoystick::new());

        assert_eq!(
            serve_session(&mut stream, &mut sampler),
            SessionEnd::Disconnected
        );
        assert_eq!(stream.output.len(), SNAPSHOT_LEN);
    }

    #[test]
    fn test_write_failure_is_disconnect() {
        let mut stream = BrokenPipe(Cursor::new(vec![0x01, 0x01]));
        let device = MockJoystick::new();
        let mut sampler = Sampler::new(device.clone());

        assert_eq!(
            serve_session(&mut stream, &mut sampler),
            SessionEnd::Disconnected
        );
        assert_eq!(device.query_count(), 1);
    }

    #[test]
    fn test_absent_device_still_replies() {
        let mut stream = ScriptedStream::new(&[0x01, b's']);
        let mut sampler = Sampler::new(MockJoystick::absent());

        serve_session(&mut stream, &mut sampler);

        assert_eq!(
            GamepadSnapshot::from_bytes(&stream.output),
            Ok(GamepadSnapshot::neutral())
        );
    }

    #[test]
    fn test_second_bind_on_live_port_fails() {
        // Arrange
        let running = Arc::new(AtomicBool::new(true));
        let first =
            PadServer::bind("127.0.0.1:0".parse().unwrap(), running.clone()).expect("bind");
        let taken = first.local_addr().unwrap();

        // Act
        let err = PadServer::bind(taken, running).unwrap_err();

        // Assert
        assert!(
            matches!(err, ServerError::Bind { addr, .. } if addr == taken),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_cleared_flag_stops_before_accepting() {
        let running = Arc::new(AtomicBool::new(false));
        let server = PadServer::bind("127.0.0.1:0".parse().unwrap(), running).expect("bind");
        let mut sampler = Sampler::new(MockJoystick::new());

        // Returns immediately instead of blocking in accept.
        server.run(&mut sampler);

        assert_eq!(sampler.device().query_count(), 0);
    }
}
