/// AID of the Thai national ID card application (MOI applet)
pub const THAI_ID_AID: &[u8] = b"\xA0\x00\x00\x00\x54\x48\x00\x01";

/// CLA byte of the card's proprietary READ BINARY
pub const CLA_PROPRIETARY: u8 = 0x80;
/// INS byte of READ BINARY
pub const INS_READ_BINARY: u8 = 0xB0;

/// Number of chunks the photo is stored in
pub const PHOTO_PARTS: u8 = 20;
/// File offset of the first photo chunk
pub const PHOTO_OFFSET: u16 = 0x017B;
/// Size of one photo chunk
pub const PHOTO_CHUNK_LEN: u8 = 0xFF;

/// Difference between a Buddhist Era year and the Gregorian year
pub const BUDDHIST_ERA_OFFSET: i32 = 543;
