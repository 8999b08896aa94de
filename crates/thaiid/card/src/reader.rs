//! Thai ID card reader
//!
//! Drives one card through a [`CardTransport`]: power on, select the
//! application, then read the identity fields and the photo. Every exchange
//! follows `61 xx` with GET RESPONSE.

use bytes::Bytes;
use thaiid_apdu_core::processor::{CommandProcessor, GetResponseProcessor, ProcessorError};
use thaiid_apdu_core::{CardTransport, Command, Response};
use tracing::{debug, info, warn};

use crate::charset::decode_tis620;
use crate::error::{CardError, Result};
use crate::fields::{FIELDS, FieldSpec, SELECT_APPLICATION};
use crate::photo::PhotoAssembler;
use crate::record::CardRecord;

/// Send one command with continuation, classifying transport failures
///
/// A transport failure becomes [`CardError::Disconnected`] when the reader
/// is gone and [`CardError::Transport`] otherwise.
pub(crate) fn exchange(
    processor: &GetResponseProcessor,
    transport: &mut dyn CardTransport,
    command: &Command,
) -> Result<Response> {
    match processor.process_command(command, transport) {
        Ok(response) => Ok(response),
        Err(ProcessorError::Transport(e)) => {
            if e.is_disconnect() || !transport.is_connected() {
                warn!(error = %e, "Reader disconnected during exchange");
                Err(CardError::Disconnected)
            } else {
                Err(CardError::Transport(e))
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Reader for Thai national ID cards
#[derive(Debug)]
pub struct CardReader<T: CardTransport> {
    transport: T,
    processor: GetResponseProcessor,
    photo: PhotoAssembler,
}

impl<T: CardTransport> CardReader<T> {
    /// Create a reader over `transport`
    pub fn new(transport: T) -> Self {
        let processor = GetResponseProcessor::default();
        Self {
            transport,
            processor,
            photo: PhotoAssembler::new(processor),
        }
    }

    /// Get a reference to the underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the underlying transport
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the reader and return the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Whether the reader is still attached
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Release the card
    pub fn close(&mut self) {
        self.transport.close();
    }

    fn exchange(&mut self, command: &Command) -> Result<Response> {
        exchange(&self.processor, &mut self.transport, command)
    }

    /// Power the card on, returning `false` when there is no usable card
    pub fn power_on(&mut self) -> Result<bool> {
        match self.transport.power_on() {
            Ok(()) => Ok(true),
            Err(e) if e.is_disconnect() || !self.transport.is_connected() => {
                warn!(error = %e, "Power on failed, reader disconnected");
                Err(CardError::Disconnected)
            }
            Err(e) => {
                warn!(error = %e, "No card detected or power on failed");
                Ok(false)
            }
        }
    }

    /// Select the Thai ID application
    pub fn select_application(&mut self) -> Result<()> {
        let response = self.exchange(&SELECT_APPLICATION)?;
        if !response.is_success() {
            warn!(status = %response.status(), "Card not responding or not a Thai ID card");
            return Err(CardError::NotResponding);
        }
        debug!("Thai ID application selected");
        Ok(())
    }

    /// Read and decode a single field
    ///
    /// Returns `Ok(None)` when the field could not be read and `Ok(Some(""))`
    /// when it was read but holds no text. Only a disconnect is an error.
    pub fn read_field(&mut self, spec: &FieldSpec) -> Result<Option<String>> {
        let response = match self.exchange(&spec.command()) {
            Ok(response) => response,
            Err(CardError::Disconnected) => return Err(CardError::Disconnected),
            Err(e) => {
                debug!(field = %spec.key, error = %e, "Field exchange failed");
                return Ok(None);
            }
        };

        if !response.is_success() || response.payload().is_empty() {
            debug!(field = %spec.key, status = %response.status(), "Field unreadable");
            return Ok(None);
        }

        Ok(Some(decode_tis620(response.payload())))
    }

    /// Power on, select and read all identity fields
    ///
    /// Returns `Ok(None)` when the card does not respond, when no field
    /// could be read, or when the CID is empty.
    pub fn read_basic_info(&mut self) -> Result<Option<CardRecord>> {
        if !self.power_on()? {
            return Ok(None);
        }

        match self.select_application() {
            Ok(()) => {}
            Err(CardError::Disconnected) => return Err(CardError::Disconnected),
            Err(e) => {
                warn!(error = %e, "Select failed");
                return Ok(None);
            }
        }

        let mut record = CardRecord::default();
        let mut read = 0usize;

        for spec in &FIELDS {
            match self.read_field(spec)? {
                Some(value) => {
                    record = spec.apply(&value, record);
                    read += 1;
                    debug!(field = %spec.key, label = spec.label_th, "Field read");
                }
                None => debug!(field = %spec.key, label = spec.label_th, "Field has no data"),
            }
        }

        if read == 0 {
            warn!("No field could be read");
            return Ok(None);
        }

        if !record.is_valid() {
            warn!(fields = read, "Card read without CID, discarding");
            return Ok(None);
        }

        info!(fields = read, "Card read");
        Ok(Some(record))
    }

    /// Power on, select and read the photo
    pub fn read_photo(&mut self) -> Result<Option<Bytes>> {
        if !self.power_on()? {
            return Ok(None);
        }

        match self.select_application() {
            Ok(()) => {}
            Err(CardError::Disconnected) => return Err(CardError::Disconnected),
            Err(e) => {
                warn!(error = %e, "Select before photo failed");
                return Ok(None);
            }
        }

        self.photo.assemble(&mut self.transport)
    }
}

#[cfg(test)]
mod tests {
    use thaiid_apdu_core::transport::{MockTransport, TransportError};

    use super::*;
    use crate::record::FieldKey;
    use crate::testing::SimulatedCard;

    #[test]
    fn test_read_field_follows_continuation() {
        let transport = MockTransport::new([
            Bytes::from_static(&[0x61, 0x05]),
            Bytes::from_static(b"12345\x90\x00"),
        ]);
        let mut reader = CardReader::new(transport);

        let value = reader.read_field(&FIELDS[0]).unwrap();

        assert_eq!(value.as_deref(), Some("12345"));
        assert_eq!(reader.transport().commands.len(), 2);
        assert_eq!(
            reader.transport().commands[1].as_ref(),
            &[0x00, 0xC0, 0x00, 0x00, 0x05]
        );
    }

    #[test]
    fn test_read_field_distinguishes_empty_from_unreadable() {
        let transport = MockTransport::new([
            Bytes::from_static(b"   \x90\x00"),
            Bytes::from_static(&[0x6A, 0x82]),
            Bytes::from_static(&[0x90, 0x00]),
        ]);
        let mut reader = CardReader::new(transport);

        assert_eq!(reader.read_field(&FIELDS[1]).unwrap().as_deref(), Some(""));
        assert_eq!(reader.read_field(&FIELDS[1]).unwrap(), None);
        assert_eq!(reader.read_field(&FIELDS[1]).unwrap(), None);
    }

    #[test]
    fn test_read_field_transient_transport_error() {
        let mut reader = CardReader::new(MockTransport::new([]));
        assert_eq!(reader.read_field(&FIELDS[0]).unwrap(), None);
    }

    #[test]
    fn test_read_basic_info() {
        let mut reader = CardReader::new(SimulatedCard::sample().into_transport());

        let record = reader.read_basic_info().unwrap().unwrap();

        assert_eq!(record.cid(), Some("1101700203451"));
        assert_eq!(record.name_th(), Some("นาย สมชาย  ใจดี"));
        assert_eq!(record.name_en(), Some("Mr. Somchai  Jaidee"));
        assert_eq!(record.birth_date(), Some("15 ม.ค. 2530"));
        assert_eq!(record.birth_date_en(), Some("15 Jan 1987"));
        assert_eq!(record.gender(), Some("ชาย"));
        assert_eq!(record.issue_date_en(), Some("01 Mar 2022"));
        assert_eq!(record.expire_date(), Some("14 ม.ค. 2574"));
        assert_eq!(record.address(), Some("99 หมู่ที่ 1    แขวงสีลม เขตบางรัก กรุงเทพมหานคร"));
        assert_eq!(record.present_fields(), 12);

        // SELECT + nine fields
        assert_eq!(reader.transport().commands.len(), 10);
        assert_eq!(reader.transport().power_on_count(), 1);
    }

    #[test]
    fn test_read_basic_info_with_continuation() {
        let card = SimulatedCard::sample().with_continuation(true);
        let mut reader = CardReader::new(card.into_transport());

        let record = reader.read_basic_info().unwrap().unwrap();

        assert_eq!(record.cid(), Some("1101700203451"));
        // SELECT + nine fields, each field followed by GET RESPONSE
        assert_eq!(reader.transport().commands.len(), 19);
    }

    #[test]
    fn test_read_basic_info_empty_cid() {
        let card = SimulatedCard::sample().with_text(FieldKey::Cid, "");
        let mut reader = CardReader::new(card.into_transport());

        assert!(reader.read_basic_info().unwrap().is_none());
    }

    #[test]
    fn test_read_basic_info_missing_cid() {
        let card = SimulatedCard::sample().without_field(FieldKey::Cid);
        let mut reader = CardReader::new(card.into_transport());

        assert!(reader.read_basic_info().unwrap().is_none());
    }

    #[test]
    fn test_read_basic_info_partial_record() {
        let card = SimulatedCard::sample().without_field(FieldKey::Address);
        let mut reader = CardReader::new(card.into_transport());

        let record = reader.read_basic_info().unwrap().unwrap();
        assert_eq!(record.address(), None);
        assert_eq!(record.present_fields(), 11);
    }

    #[test]
    fn test_read_basic_info_select_rejected() {
        let card = SimulatedCard::sample().rejecting_select();
        let mut reader = CardReader::new(card.into_transport());

        assert!(reader.read_basic_info().unwrap().is_none());
        assert_eq!(reader.transport().commands.len(), 1);
    }

    #[test]
    fn test_read_basic_info_no_card() {
        let transport = SimulatedCard::sample()
            .into_transport()
            .failing_power_on(TransportError::NoCard);
        let mut reader = CardReader::new(transport);

        assert!(reader.read_basic_info().unwrap().is_none());
        assert!(reader.transport().commands.is_empty());
    }

    #[test]
    fn test_read_basic_info_reader_unplugged() {
        let transport = SimulatedCard::sample()
            .into_transport()
            .failing_power_on(TransportError::ReaderUnavailable("gone".into()));
        let mut reader = CardReader::new(transport);

        assert!(reader.read_basic_info().unwrap_err().is_disconnect());
    }

    #[test]
    fn test_read_field_with_reader_gone() {
        let mut transport = MockTransport::new([Bytes::from_static(&[0x90, 0x00])]);
        transport.connected = false;
        let mut reader = CardReader::new(transport);

        assert!(reader.read_field(&FIELDS[0]).unwrap_err().is_disconnect());
    }

    #[test]
    fn test_read_photo() {
        let card = SimulatedCard::sample();
        let expected = card.photo_len();
        let mut reader = CardReader::new(card.into_transport());

        let photo = reader.read_photo().unwrap().unwrap();

        assert_eq!(photo.len(), expected);
        assert_eq!(&photo[..2], &[0xFF, 0xD8]);
        // SELECT + 20 parts
        assert_eq!(reader.transport().commands.len(), 21);
    }

    #[test]
    fn test_read_photo_with_failed_parts() {
        let card = SimulatedCard::sample().failing_photo_parts(&[3, 7]);
        let expected = card.photo_len();
        let mut reader = CardReader::new(card.into_transport());

        let photo = reader.read_photo().unwrap().unwrap();

        assert_eq!(photo.len(), expected);
        assert_eq!(expected, 18 * 255);
    }
}
