//! Simulated Thai ID card for tests
//!
//! [`SimulatedCard`] answers SELECT, READ BINARY and GET RESPONSE the way a
//! real card does, from an in-memory file image. Turn it into a
//! [`MockTransport`] with [`SimulatedCard::into_transport`].

use std::collections::HashMap;

use bytes::{BufMut, Bytes, BytesMut};
use encoding_rs::WINDOWS_874;
use parking_lot::Mutex;
use thaiid_apdu_core::transport::{MockTransport, TransportError};
use thaiid_apdu_core::Command;

use crate::constants::{PHOTO_CHUNK_LEN, PHOTO_OFFSET, PHOTO_PARTS};
use crate::fields::FIELDS;
use crate::record::FieldKey;

const SW_SUCCESS: [u8; 2] = [0x90, 0x00];
const SW_NOT_FOUND: [u8; 2] = [0x6A, 0x82];
const SW_WRONG_P1P2: [u8; 2] = [0x6B, 0x00];
const SW_INS_NOT_SUPPORTED: [u8; 2] = [0x6D, 0x00];

/// In-memory Thai ID card
#[derive(Debug, Clone)]
pub struct SimulatedCard {
    fields: HashMap<u16, Vec<u8>>,
    photo: Vec<Vec<u8>>,
    failing_photo_parts: Vec<u8>,
    continuation: bool,
    select_ok: bool,
}

impl Default for SimulatedCard {
    fn default() -> Self {
        Self::sample()
    }
}

fn offset_of(key: FieldKey) -> u16 {
    FIELDS
        .iter()
        .find(|spec| spec.key == key)
        .map_or(0, |spec| spec.offset)
}

impl SimulatedCard {
    /// A card holding a complete, plausible record and a 20 chunk photo
    pub fn sample() -> Self {
        let photo = (0..PHOTO_PARTS)
            .map(|index| {
                let mut chunk = vec![index.wrapping_mul(7); usize::from(PHOTO_CHUNK_LEN)];
                if index == 0 {
                    chunk[..2].copy_from_slice(&[0xFF, 0xD8]);
                }
                chunk
            })
            .collect();

        Self {
            fields: HashMap::new(),
            photo,
            failing_photo_parts: Vec::new(),
            continuation: false,
            select_ok: true,
        }
        .with_text(FieldKey::Cid, "1101700203451")
        .with_text(FieldKey::NameTh, "นาย#สมชาย##ใจดี")
        .with_text(FieldKey::NameEn, "Mr.#Somchai##Jaidee")
        .with_text(FieldKey::BirthDate, "25300115")
        .with_text(FieldKey::Gender, "1")
        .with_text(FieldKey::Issuer, "สำนักงานเขตบางรัก/กรุงเทพมหานคร")
        .with_text(FieldKey::IssueDate, "25650301")
        .with_text(FieldKey::ExpireDate, "25740114")
        .with_text(
            FieldKey::Address,
            "99#หมู่ที่ 1####แขวงสีลม#เขตบางรัก#กรุงเทพมหานคร",
        )
    }

    /// Store `text` TIS-620 encoded under the field for `key`
    pub fn with_text(self, key: FieldKey, text: &str) -> Self {
        let (encoded, _, _) = WINDOWS_874.encode(text);
        self.with_raw(key, encoded.into_owned())
    }

    /// Store raw bytes under the field for `key`
    pub fn with_raw(mut self, key: FieldKey, raw: Vec<u8>) -> Self {
        self.fields.insert(offset_of(key), raw);
        self
    }

    /// Make reads of the field for `key` fail with `6A 82`
    pub fn without_field(mut self, key: FieldKey) -> Self {
        self.fields.remove(&offset_of(key));
        self
    }

    /// Make the photo chunks with these one-based part numbers fail
    pub fn failing_photo_parts(mut self, parts: &[u8]) -> Self {
        self.failing_photo_parts = parts.to_vec();
        self
    }

    /// Answer every read with `61 xx` and deliver the data on GET RESPONSE
    pub const fn with_continuation(mut self, continuation: bool) -> Self {
        self.continuation = continuation;
        self
    }

    /// Reject SELECT, as a card other than a Thai ID would
    pub const fn rejecting_select(mut self) -> Self {
        self.select_ok = false;
        self
    }

    /// Number of photo bytes a complete read returns
    pub fn photo_len(&self) -> usize {
        self.photo
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.failing_photo_parts.contains(&(*index as u8 + 1)))
            .map(|(_, chunk)| chunk.len())
            .sum()
    }

    fn read_binary(&self, offset: u16, length: u8) -> Result<Vec<u8>, [u8; 2]> {
        if let Some(raw) = self.fields.get(&offset) {
            let mut data = raw.clone();
            data.resize(usize::from(length), b' ');
            return Ok(data);
        }

        let photo_end = PHOTO_OFFSET + u16::from(PHOTO_PARTS) * u16::from(PHOTO_CHUNK_LEN);
        if (PHOTO_OFFSET..photo_end).contains(&offset) {
            let index = (offset - PHOTO_OFFSET) / u16::from(PHOTO_CHUNK_LEN);
            let part = index as u8 + 1;
            if self.failing_photo_parts.contains(&part) {
                return Err(SW_WRONG_P1P2);
            }
            return Ok(self.photo[usize::from(index)].clone());
        }

        Err(SW_NOT_FOUND)
    }

    fn respond(&self, pending: &Mutex<Option<Vec<u8>>>, raw: &[u8]) -> Bytes {
        let Ok(command) = Command::from_bytes(raw) else {
            return Bytes::copy_from_slice(&SW_INS_NOT_SUPPORTED);
        };

        let payload = match (command.cla, command.ins) {
            (0x00, 0xA4) if self.select_ok => Ok(Vec::new()),
            (0x00, 0xA4) => Err(SW_NOT_FOUND),
            (0x00, 0xC0) => match pending.lock().take() {
                Some(data) => Ok(data),
                None => Err(SW_INS_NOT_SUPPORTED),
            },
            (0x80, 0xB0) => {
                let length = command.data.as_ref().and_then(|data| data.get(1)).copied();
                let offset = u16::from_be_bytes([command.p1, command.p2]);
                match length {
                    Some(length) => self.read_binary(offset, length),
                    None => Err(SW_WRONG_P1P2),
                }
            }
            _ => Err(SW_INS_NOT_SUPPORTED),
        };

        let mut out = BytesMut::new();
        match payload {
            Ok(data) if self.continuation && !data.is_empty() && command.ins != 0xC0 => {
                out.put_u8(0x61);
                out.put_u8(data.len() as u8);
                *pending.lock() = Some(data);
            }
            Ok(data) => {
                out.put_slice(&data);
                out.put_slice(&SW_SUCCESS);
            }
            Err(status) => out.put_slice(&status),
        }
        out.freeze()
    }

    /// Build a transport answering from this card
    pub fn into_transport(self) -> MockTransport {
        let pending = Mutex::new(None);
        MockTransport::with_handler(move |command| Ok::<_, TransportError>(self.respond(&pending, command)))
    }
}
