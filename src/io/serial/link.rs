// src/io/serial/link.rs
//
// Byte-level link to the controller. The connection state machine and the
// poller only talk to `SerialLink`; `SystemSerialOpener` backs it with a real
// serial port.

use std::io::{self, Read, Write};

use serialport::SerialPort;

use super::utils::{BAUD_RATE, DATA_BITS, PARITY, STOP_BITS, WRITE_TIMEOUT};

/// An open, exclusively owned link to the controller.
pub trait SerialLink: Send {
    /// Bytes that can be read right now without blocking.
    fn bytes_available(&mut self) -> io::Result<usize>;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write the whole payload, bounded by the link's write timeout.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Release the OS handle without waiting for queued output. Further I/O fails with `NotConnected`.
    fn close(&mut self) -> io::Result<()>;
}

/// Opens links by port identifier.
pub trait LinkOpener: Send {
    fn open(&self, port: &str) -> io::Result<Box<dyn SerialLink>>;
}

// ============================================================================
// serialport backend
// ============================================================================

/// Opens real serial ports at 19200 8-N-1, no flow control.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemSerialOpener;

impl SystemSerialOpener {
    pub fn new() -> Self {
        SystemSerialOpener
    }
}

impl LinkOpener for SystemSerialOpener {
    fn open(&self, port: &str) -> io::Result<Box<dyn SerialLink>> {
        // Reads never wait: the poller only reads what bytes_to_read() reports,
        // so this timeout only bounds writes.
        let serial = serialport::new(port, BAUD_RATE)
            .data_bits(DATA_BITS)
            .stop_bits(STOP_BITS)
            .parity(PARITY)
            .flow_control(serialport::FlowControl::None)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(io::Error::from)?;

        Ok(Box::new(SerialPortLink::new(serial)))
    }
}

struct SerialPortLink {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialPortLink {
    fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port: Some(port) }
    }

    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "port closed"))
    }
}

// Never flush(): on POSIX it is tcdrain(), which ignores the port timeout.
impl SerialLink for SerialPortLink {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let port = self.port()?;
        port.bytes_to_read()
            .map(|n| n as usize)
            .map_err(io::Error::from)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port()?.read(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port()?.write_all(data)
    }

    fn close(&mut self) -> io::Result<()> {
        // Dropping the boxed port closes the file descriptor
        self.port.take();
        Ok(())
    }
}

// ============================================================================
// In-memory link for tests
// ============================================================================

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Arc, Mutex, MutexGuard};

    use super::{LinkOpener, SerialLink};

    #[derive(Default)]
    pub(crate) struct MockLinkState {
        pub inbound: VecDeque<u8>,
        pub outbound: Vec<u8>,
        pub open_error: Option<io::ErrorKind>,
        pub read_error: Option<io::ErrorKind>,
        pub write_error: Option<io::ErrorKind>,
        pub close_error: Option<io::ErrorKind>,
        /// Reads fail once this many more bytes have been delivered
        pub fail_after: Option<usize>,
        pub opened: Vec<String>,
        pub open_links: usize,
        pub close_calls: usize,
    }

    /// Shared handle to script a mock link from a test.
    #[derive(Clone, Default)]
    pub(crate) struct MockHandle(Arc<Mutex<MockLinkState>>);

    impl MockHandle {
        pub fn state(&self) -> MutexGuard<'_, MockLinkState> {
            self.0.lock().unwrap()
        }

        pub fn push_inbound(&self, data: &[u8]) {
            self.state().inbound.extend(data.iter().copied());
        }

        pub fn take_outbound(&self) -> Vec<u8> {
            std::mem::take(&mut self.state().outbound)
        }

        pub fn opener(&self) -> MockOpener {
            MockOpener {
                handle: self.clone(),
                max_read: 256,
            }
        }
    }

    pub(crate) struct MockOpener {
        handle: MockHandle,
        max_read: usize,
    }

    impl MockOpener {
        /// Limit how many bytes a single read() returns.
        pub fn with_max_read(mut self, max_read: usize) -> Self {
            self.max_read = max_read;
            self
        }
    }

    impl LinkOpener for MockOpener {
        fn open(&self, port: &str) -> io::Result<Box<dyn SerialLink>> {
            let mut state = self.handle.state();
            if let Some(kind) = state.open_error {
                return Err(io::Error::new(kind, format!("cannot open {}", port)));
            }
            state.opened.push(port.to_string());
            state.open_links += 1;
            Ok(Box::new(MockLink {
                handle: self.handle.clone(),
                max_read: self.max_read,
                open: true,
            }))
        }
    }

    pub(crate) struct MockLink {
        handle: MockHandle,
        max_read: usize,
        open: bool,
    }

    impl MockLink {
        fn check_open(&self) -> io::Result<()> {
            if self.open {
                Ok(())
            } else {
                Err(io::Error::new(io::ErrorKind::NotConnected, "port closed"))
            }
        }
    }

    impl SerialLink for MockLink {
        fn bytes_available(&mut self) -> io::Result<usize> {
            self.check_open()?;
            let state = self.handle.state();
            if let Some(kind) = state.read_error {
                return Err(io::Error::new(kind, "device unplugged"));
            }
            Ok(state.inbound.len())
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.check_open()?;
            let mut state = self.handle.state();
            if let Some(kind) = state.read_error {
                return Err(io::Error::new(kind, "device unplugged"));
            }
            let mut n = buf.len().min(self.max_read).min(state.inbound.len());
            if let Some(remaining) = state.fail_after {
                if remaining == 0 {
                    return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
                }
                n = n.min(remaining);
                state.fail_after = Some(remaining - n);
            }
            for (slot, byte) in buf.iter_mut().zip(state.inbound.drain(..n)) {
                *slot = byte;
            }
            Ok(n)
        }

        fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            self.check_open()?;
            let mut state = self.handle.state();
            if let Some(kind) = state.write_error {
                return Err(io::Error::new(kind, "write failed"));
            }
            state.outbound.extend_from_slice(data);
            Ok(())
        }

        fn close(&mut self) -> io::Result<()> {
            let mut state = self.handle.state();
            state.close_calls += 1;
            if self.open {
                self.open = false;
                state.open_links -= 1;
            }
            match state.close_error {
                Some(kind) => Err(io::Error::new(kind, "close failed")),
                None => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockHandle;
    use super::*;

    #[test]
    fn test_mock_link_reads_in_bounded_chunks() {
        let handle = MockHandle::default();
        let opener = handle.opener().with_max_read(3);
        let mut link = opener.open("COM3").unwrap();

        handle.push_inbound(b"abcdefg");
        assert_eq!(link.bytes_available().unwrap(), 7);

        let mut buf = [0u8; 16];
        let n = link.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"abc");
        assert_eq!(link.bytes_available().unwrap(), 4);
    }

    #[test]
    fn test_mock_link_closed_rejects_io() {
        let handle = MockHandle::default();
        let mut link = handle.opener().open("COM3").unwrap();
        link.close().unwrap();

        assert_eq!(handle.state().open_links, 0);
        let err = link.write_all(b"$01\r").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn test_mock_link_fail_after() {
        let handle = MockHandle::default();
        let mut link = handle.opener().open("COM3").unwrap();
        handle.push_inbound(b"abcdef");
        handle.state().fail_after = Some(4);

        let mut buf = [0u8; 16];
        assert_eq!(link.read(&mut buf).unwrap(), 4);
        assert_eq!(link.bytes_available().unwrap(), 2);
        let err = link.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_system_opener_missing_port() {
        let opener = SystemSerialOpener::new();
        assert!(opener.open("/dev/elevator-link-does-not-exist").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_serial_port_link_close_does_not_drain() {
        let (master, _slave) = serialport::TTYPort::pair().unwrap();
        let mut link = SerialPortLink::new(Box::new(master));

        link.write_all(b"$02\r").unwrap();
        link.close().unwrap();
        assert!(link.port.is_none());

        let err = link.write_all(b"$03\r").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        // Closing twice is harmless
        link.close().unwrap();
    }
}
