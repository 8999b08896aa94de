//! Photo assembly from the card's 20 chunks

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::{Bytes, BytesMut};
use thaiid_apdu_core::processor::GetResponseProcessor;
use thaiid_apdu_core::CardTransport;
use tracing::{debug, info, warn};

use crate::constants::{PHOTO_CHUNK_LEN, PHOTO_PARTS};
use crate::error::{CardError, Result};
use crate::fields::photo_command;
use crate::reader::exchange;

/// Reads the photo chunks in order and joins the ones that succeeded
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoAssembler {
    processor: GetResponseProcessor,
}

impl PhotoAssembler {
    /// Create an assembler using the given continuation processor
    pub const fn new(processor: GetResponseProcessor) -> Self {
        Self { processor }
    }

    /// Read all chunks from an already selected card
    ///
    /// Chunks answered with a non-success status or without payload are
    /// skipped. Returns `Ok(None)` when nothing at all could be read and
    /// [`CardError::Disconnected`] when the reader goes away mid-photo.
    pub fn assemble(&self, transport: &mut dyn CardTransport) -> Result<Option<Bytes>> {
        let mut photo = BytesMut::with_capacity(usize::from(PHOTO_PARTS) * usize::from(PHOTO_CHUNK_LEN));
        let mut failed = 0usize;

        for index in 0..PHOTO_PARTS {
            let part = index + 1;
            match exchange(&self.processor, transport, &photo_command(index)) {
                Ok(response) if response.is_success() && !response.payload().is_empty() => {
                    debug!(part, len = response.payload().len(), "Photo part read");
                    photo.extend_from_slice(response.payload());
                }
                Ok(response) => {
                    warn!(part, status = %response.status(), "Photo part failed");
                    failed += 1;
                }
                Err(CardError::Disconnected) => return Err(CardError::Disconnected),
                Err(e) => {
                    warn!(part, error = %e, "Photo part failed");
                    failed += 1;
                }
            }
        }

        info!(len = photo.len(), failed, "Photo assembled");

        if photo.is_empty() {
            return Ok(None);
        }
        Ok(Some(photo.freeze()))
    }
}

/// Encode photo bytes for transport: standard alphabet, padded, no line breaks
pub fn encode_photo(photo: &[u8]) -> String {
    STANDARD.encode(photo)
}

#[cfg(test)]
mod tests {
    use thaiid_apdu_core::transport::{MockTransport, TransportError};

    use super::*;

    fn chunk(part: u8) -> Vec<u8> {
        let mut data = vec![part; usize::from(part) + 10];
        data.extend_from_slice(&[0x90, 0x00]);
        data
    }

    fn photo_card(failing: &'static [u8]) -> MockTransport {
        MockTransport::with_handler(move |command| {
            let part = command[2];
            if failing.contains(&part) {
                return Ok(Bytes::from_static(&[0x6B, 0x00]));
            }
            Ok(Bytes::from(chunk(part)))
        })
    }

    #[test]
    fn test_assemble_all_parts() {
        let mut transport = photo_card(&[]);
        let photo = PhotoAssembler::default().assemble(&mut transport).unwrap().unwrap();

        let expected: usize = (1..=20).map(|part| part + 10).sum();
        assert_eq!(photo.len(), expected);
        assert_eq!(transport.commands.len(), 20);
    }

    #[test]
    fn test_assemble_skips_failed_parts_in_order() {
        let mut transport = photo_card(&[3, 7]);
        let photo = PhotoAssembler::default().assemble(&mut transport).unwrap().unwrap();

        let expected: Vec<u8> = (1..=20u8)
            .filter(|part| *part != 3 && *part != 7)
            .flat_map(|part| vec![part; usize::from(part) + 10])
            .collect();
        assert_eq!(photo.as_ref(), expected.as_slice());
        assert_eq!(transport.commands.len(), 20);
    }

    #[test]
    fn test_assemble_status_only_success_is_a_failed_part() {
        let mut transport = MockTransport::with_handler(|command| {
            if command[2] == 1 {
                Ok(Bytes::from_static(&[0x90, 0x00]))
            } else {
                Ok(Bytes::from_static(&[0xAB, 0x90, 0x00]))
            }
        });
        let photo = PhotoAssembler::default().assemble(&mut transport).unwrap().unwrap();
        assert_eq!(photo.len(), 19);
    }

    #[test]
    fn test_assemble_nothing_read() {
        let mut transport = MockTransport::with_handler(|_| Ok(Bytes::from_static(&[0x6A, 0x82])));
        assert!(PhotoAssembler::default().assemble(&mut transport).unwrap().is_none());
    }

    #[test]
    fn test_assemble_follows_continuation() {
        let mut transport = MockTransport::with_handler(|command| match command[1] {
            0xC0 => Ok(Bytes::from_static(&[0x01, 0x02, 0x90, 0x00])),
            _ => Ok(Bytes::from_static(&[0x61, 0x02])),
        });
        let photo = PhotoAssembler::default().assemble(&mut transport).unwrap().unwrap();
        assert_eq!(photo.len(), 40);
        assert_eq!(transport.commands.len(), 40);
    }

    #[test]
    fn test_assemble_stops_when_reader_gone() {
        let mut transport = MockTransport::with_handler(|_| {
            Err(TransportError::ReaderUnavailable("unplugged".into()))
        });
        let err = PhotoAssembler::default().assemble(&mut transport).unwrap_err();
        assert!(err.is_disconnect());
        assert_eq!(transport.commands.len(), 1);
    }

    #[test]
    fn test_encode_photo_has_no_line_breaks() {
        let encoded = encode_photo(&[0xFF; 301]);
        assert!(!encoded.contains('\n'));
        assert!(encoded.ends_with('='));
    }
}
