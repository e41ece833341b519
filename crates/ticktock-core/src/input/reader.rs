use std::io::{self, IsTerminal, Read};

use tracing::trace;

use super::terminal::RawModeGuard;
use crate::error::InputError;

/// Reads single keystrokes (and the odd line) from a byte stream.
///
/// When reading from a terminal, each [`read_key`](Self::read_key) call
/// holds the terminal in raw mode and restores it on every exit path.
pub struct KeyReader<R> {
    input: R,
    raw_mode: bool,
}

impl KeyReader<io::Stdin> {
    /// Reader over stdin; raw mode is used only if stdin is a terminal.
    pub fn stdin() -> Self {
        let input = io::stdin();
        let raw_mode = input.is_terminal();
        Self { input, raw_mode }
    }
}

impl<R: Read> KeyReader<R> {
    /// Reader over an arbitrary stream, never touching the terminal mode.
    pub fn new(input: R) -> Self {
        Self {
            input,
            raw_mode: false,
        }
    }

    /// Block until a byte in `accepted` arrives and return it.
    ///
    /// Every other byte is discarded.
    ///
    /// # Errors
    ///
    /// `NonAsciiKey` if `accepted` holds a key that is not a single ASCII
    /// byte, `TerminalMode` if raw mode cannot be entered, `Read` on a
    /// failed read and `Closed` at end of input.
    pub fn read_key(&mut self, accepted: &[char]) -> Result<char, InputError> {
        if let Some(&bad) = accepted.iter().find(|c| !c.is_ascii()) {
            return Err(InputError::NonAsciiKey(bad));
        }

        let _guard = if self.raw_mode {
            RawModeGuard::enter()?
        } else {
            RawModeGuard::inactive()
        };

        loop {
            let byte = self.read_byte()?.ok_or(InputError::Closed)?;
            let key = char::from(byte);
            if accepted.contains(&key) {
                return Ok(key);
            }
            trace!(byte, "discarding unaccepted key");
        }
    }

    /// Read one line in the terminal's normal mode, without the newline.
    ///
    /// # Errors
    ///
    /// `Read` on a failed read, `Closed` if input ends before any byte.
    pub fn read_line(&mut self) -> Result<String, InputError> {
        let mut line = Vec::new();
        loop {
            match self.read_byte()? {
                Some(b'\n') => break,
                Some(byte) => line.push(byte),
                None if line.is_empty() => return Err(InputError::Closed),
                None => break,
            }
        }
        Ok(String::from_utf8_lossy(&line).trim().to_string())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, InputError> {
        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(InputError::Read(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct FailingRead;

    impl Read for FailingRead {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn returns_first_accepted_key() {
        let mut reader = KeyReader::new(Cursor::new(b"xyz\nse".to_vec()));
        assert_eq!(reader.read_key(&['s', 'e']).unwrap(), 's');
        assert_eq!(reader.read_key(&['s', 'e']).unwrap(), 'e');
    }

    #[test]
    fn end_of_input_is_closed() {
        let mut reader = KeyReader::new(Cursor::new(b"abc".to_vec()));
        assert!(matches!(reader.read_key(&['q']), Err(InputError::Closed)));
    }

    #[test]
    fn non_ascii_accepted_key_is_rejected() {
        let mut reader = KeyReader::new(Cursor::new(b"s".to_vec()));
        assert!(matches!(
            reader.read_key(&['s', 'é']),
            Err(InputError::NonAsciiKey('é'))
        ));
    }

    #[test]
    fn read_failure_is_reported() {
        let mut reader = KeyReader::new(FailingRead);
        assert!(matches!(reader.read_key(&['q']), Err(InputError::Read(_))));
        assert!(matches!(reader.read_line(), Err(InputError::Read(_))));
    }

    #[test]
    fn read_line_trims_and_continues_stream() {
        let mut reader = KeyReader::new(Cursor::new(b" 00:01:00 \r\nq".to_vec()));
        assert_eq!(reader.read_line().unwrap(), "00:01:00");
        assert_eq!(reader.read_key(&['q']).unwrap(), 'q');
    }

    #[test]
    fn read_line_without_newline_at_eof() {
        let mut reader = KeyReader::new(Cursor::new(b"00:00:05".to_vec()));
        assert_eq!(reader.read_line().unwrap(), "00:00:05");
        assert!(matches!(reader.read_line(), Err(InputError::Closed)));
    }
}
