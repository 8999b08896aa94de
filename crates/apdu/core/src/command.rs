//! APDU command definitions
//!
//! Short-length command APDUs as defined by ISO/IEC 7816-4: a four byte header
//! followed by an optional Lc + data field and an optional Le byte.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::Error;

/// Generic APDU command structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected length (optional)
    pub le: Option<u8>,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Create a new command with expected response length (Le)
    pub const fn new_with_le(cla: u8, ins: u8, p1: u8, p2: u8, le: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: Some(le),
        }
    }

    /// Create a new command carrying a static data field
    ///
    /// Usable in `const` items, which lets fixed command tables live in statics.
    pub const fn new_with_static_data(cla: u8, ins: u8, p1: u8, p2: u8, data: &'static [u8]) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Some(Bytes::from_static(data)),
            le: None,
        }
    }

    /// Create a new command with data payload
    pub fn new_with_data<T: Into<Bytes>>(cla: u8, ins: u8, p1: u8, p2: u8, data: T) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Some(data.into()),
            le: None,
        }
    }

    /// Set the expected length field
    pub const fn with_le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    /// Length of the serialized command in bytes
    pub fn command_length(&self) -> usize {
        4 + self.data.as_ref().map_or(0, |d| 1 + d.len()) + usize::from(self.le.is_some())
    }

    /// Serialize to raw APDU bytes
    pub fn to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(self.command_length());

        buffer.put_u8(self.cla);
        buffer.put_u8(self.ins);
        buffer.put_u8(self.p1);
        buffer.put_u8(self.p2);

        if let Some(data) = &self.data {
            buffer.put_u8(data.len() as u8);
            buffer.put_slice(data);
        }

        if let Some(le) = self.le {
            buffer.put_u8(le);
        }

        buffer.freeze()
    }

    /// Parse a command from raw bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let [cla, ins, p1, p2, body @ ..] = data else {
            return Err(Error::InvalidCommandLength(data.len()));
        };

        let mut command = Self::new(*cla, *ins, *p1, *p2);

        match body {
            [] => {}
            [le] => command.le = Some(*le),
            [lc, rest @ ..] => {
                let lc = *lc as usize;
                if rest.len() < lc {
                    return Err(Error::InvalidCommandLength(data.len()));
                }
                let (payload, trailer) = rest.split_at(lc);
                if lc > 0 {
                    command.data = Some(Bytes::copy_from_slice(payload));
                }
                match trailer {
                    [] => {}
                    [le] => command.le = Some(*le),
                    _ => return Err(Error::InvalidCommandLength(data.len())),
                }
            }
        }

        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = Command::new_with_static_data(
            0x00,
            0xA4,
            0x04,
            0x00,
            &[0xA0, 0x00, 0x00, 0x00, 0x54, 0x48, 0x00, 0x01],
        );
        assert_eq!(
            cmd.to_bytes().as_ref(),
            &[
                0x00, 0xA4, 0x04, 0x00, 0x08, 0xA0, 0x00, 0x00, 0x00, 0x54, 0x48, 0x00, 0x01
            ]
        );
        assert_eq!(cmd.command_length(), 13);
    }

    #[test]
    fn test_command_length() {
        assert_eq!(Command::new(0x00, 0xB0, 0x00, 0x00).command_length(), 4);
        assert_eq!(Command::new_with_le(0x00, 0xC0, 0x00, 0x00, 0x0D).command_length(), 5);

        let cmd = Command::new_with_data(0x80, 0xB0, 0x00, 0x04, vec![0x00, 0x0D]);
        assert_eq!(cmd.command_length(), 7);
        assert_eq!(cmd.with_le(0xFF).command_length(), 8);
    }

    #[test]
    fn test_command_from_bytes() {
        let cmd = Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00]).unwrap();
        assert!(cmd.data.is_none());
        assert!(cmd.le.is_none());

        let cmd = Command::from_bytes(&[0x00, 0xC0, 0x00, 0x00, 0x05]).unwrap();
        assert!(cmd.data.is_none());
        assert_eq!(cmd.le, Some(0x05));

        let cmd = Command::from_bytes(&[0x80, 0xB0, 0x00, 0x04, 0x02, 0x00, 0x0D]).unwrap();
        assert_eq!(cmd.data.as_deref(), Some(&[0x00, 0x0D][..]));
        assert!(cmd.le.is_none());

        let cmd = Command::from_bytes(&[0x80, 0xB0, 0x00, 0x04, 0x02, 0x00, 0x0D, 0xFF]).unwrap();
        assert_eq!(cmd.le, Some(0xFF));

        assert!(Command::from_bytes(&[0x00, 0xA4, 0x04]).is_err());
        assert!(Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00, 0x03, 0x01]).is_err());
    }

    #[test]
    fn test_command_display() {
        let cmd = Command::new_with_le(0x00, 0xC0, 0x00, 0x00, 0x0D);
        assert_eq!(cmd.to_string(), "00C000000D");
    }
}
