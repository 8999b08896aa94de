//! Location and decoding rules of the identity fields

use thaiid_apdu_core::Command;

use crate::constants::{
    CLA_PROPRIETARY, INS_READ_BINARY, PHOTO_CHUNK_LEN, PHOTO_OFFSET, PHOTO_PARTS, THAI_ID_AID,
};
use crate::format::{clean_text, format_date_en, format_date_th, format_gender};
use crate::record::{CardRecord, FieldKey};

/// SELECT of the Thai ID application
pub static SELECT_APPLICATION: Command =
    Command::new_with_static_data(0x00, 0xA4, 0x04, 0x00, THAI_ID_AID);

/// How a decoded field value is turned into record values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Stored as decoded
    Raw,
    /// `#` padding replaced by spaces, then trimmed
    Text,
    /// Buddhist Era date; the Gregorian rendering is stored under `english`
    Date {
        /// Key receiving the Gregorian rendering
        english: FieldKey,
    },
    /// Gender code
    Gender,
}

/// One fixed-offset field of the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Record key
    pub key: FieldKey,
    /// Thai label, used in logs
    pub label_th: &'static str,
    /// Offset in the card's data file
    pub offset: u16,
    /// Number of bytes to read
    pub length: u8,
    /// Value transform
    pub transform: Transform,
}

/// The nine fields, in read order
pub const FIELDS: [FieldSpec; 9] = [
    FieldSpec {
        key: FieldKey::Cid,
        label_th: "เลขบัตรประชาชน",
        offset: 0x0004,
        length: 0x0D,
        transform: Transform::Raw,
    },
    FieldSpec {
        key: FieldKey::NameTh,
        label_th: "ชื่อ-สกุล (ไทย)",
        offset: 0x0011,
        length: 0x64,
        transform: Transform::Text,
    },
    FieldSpec {
        key: FieldKey::NameEn,
        label_th: "ชื่อ-สกุล (English)",
        offset: 0x0075,
        length: 0x64,
        transform: Transform::Text,
    },
    FieldSpec {
        key: FieldKey::BirthDate,
        label_th: "วันเกิด",
        offset: 0x00D9,
        length: 0x08,
        transform: Transform::Date {
            english: FieldKey::BirthDateEn,
        },
    },
    FieldSpec {
        key: FieldKey::Gender,
        label_th: "เพศ",
        offset: 0x00E1,
        length: 0x01,
        transform: Transform::Gender,
    },
    FieldSpec {
        key: FieldKey::Issuer,
        label_th: "ผู้ออกบัตร",
        offset: 0x00F6,
        length: 0x64,
        transform: Transform::Text,
    },
    FieldSpec {
        key: FieldKey::IssueDate,
        label_th: "วันออกบัตร",
        offset: 0x0167,
        length: 0x08,
        transform: Transform::Date {
            english: FieldKey::IssueDateEn,
        },
    },
    FieldSpec {
        key: FieldKey::ExpireDate,
        label_th: "วันหมดอายุ",
        offset: 0x016F,
        length: 0x08,
        transform: Transform::Date {
            english: FieldKey::ExpireDateEn,
        },
    },
    FieldSpec {
        key: FieldKey::Address,
        label_th: "ที่อยู่",
        offset: 0x1579,
        length: 0x64,
        transform: Transform::Text,
    },
];

/// Proprietary READ BINARY: `80 B0 <offset> 02 00 <length>`
pub fn read_binary(offset: u16, length: u8) -> Command {
    let [hi, lo] = offset.to_be_bytes();
    Command::new_with_data(CLA_PROPRIETARY, INS_READ_BINARY, hi, lo, vec![0x00, length])
}

/// READ BINARY for photo chunk `index` (zero based)
pub fn photo_command(index: u8) -> Command {
    debug_assert!(index < PHOTO_PARTS);
    read_binary(
        PHOTO_OFFSET + u16::from(index) * u16::from(PHOTO_CHUNK_LEN),
        PHOTO_CHUNK_LEN,
    )
}

impl FieldSpec {
    /// Command reading this field
    pub fn command(&self) -> Command {
        read_binary(self.offset, self.length)
    }

    /// Store the decoded `value` into `record` according to the transform
    pub fn apply(&self, value: &str, record: CardRecord) -> CardRecord {
        match self.transform {
            Transform::Raw => record.with(self.key, value),
            Transform::Text => record.with(self.key, clean_text(value)),
            Transform::Gender => record.with(self.key, format_gender(value)),
            Transform::Date { english } => record
                .with(self.key, format_date_th(value))
                .with(english, format_date_en(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(command: &Command) -> String {
        command.to_string()
    }

    #[test]
    fn test_select_command_bytes() {
        assert_eq!(
            SELECT_APPLICATION.to_bytes().as_ref(),
            &[0x00, 0xA4, 0x04, 0x00, 0x08, 0xA0, 0x00, 0x00, 0x00, 0x54, 0x48, 0x00, 0x01]
        );
    }

    #[test]
    fn test_field_commands_match_card_layout() {
        let expected = [
            (FieldKey::Cid, "80B0000402000D"),
            (FieldKey::NameTh, "80B00011020064"),
            (FieldKey::NameEn, "80B00075020064"),
            (FieldKey::BirthDate, "80B000D9020008"),
            (FieldKey::Gender, "80B000E1020001"),
            (FieldKey::Issuer, "80B000F6020064"),
            (FieldKey::IssueDate, "80B00167020008"),
            (FieldKey::ExpireDate, "80B0016F020008"),
            (FieldKey::Address, "80B01579020064"),
        ];

        for (spec, (key, bytes)) in FIELDS.iter().zip(expected) {
            assert_eq!(spec.key, key);
            assert_eq!(hex(&spec.command()), bytes, "{key}");
        }
    }

    #[test]
    fn test_photo_commands() {
        assert_eq!(hex(&photo_command(0)), "80B0017B0200FF");
        assert_eq!(hex(&photo_command(1)), "80B0027A0200FF");
        assert_eq!(hex(&photo_command(9)), "80B00A720200FF");
        assert_eq!(hex(&photo_command(19)), "80B014680200FF");
    }

    #[test]
    fn test_apply_date_stores_both_renderings() {
        let spec = FIELDS[3];
        let record = spec.apply("25300115", CardRecord::default());
        assert_eq!(record.birth_date(), Some("15 ม.ค. 2530"));
        assert_eq!(record.birth_date_en(), Some("15 Jan 1987"));
    }
}
