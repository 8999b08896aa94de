//! Thai national ID card support
//!
//! Reads the identity fields and the photo of a Thai ID card through any
//! [`thaiid_apdu_core::CardTransport`].
//!
//! ```no_run
//! # fn demo<T: thaiid_apdu_core::CardTransport>(transport: T) -> thaiid_card::Result<()> {
//! use thaiid_card::{CardReader, encode_photo};
//!
//! let mut reader = CardReader::new(transport);
//! if let Some(record) = reader.read_basic_info()? {
//!     println!("CID {}", record.cid().unwrap_or_default());
//!     if let Some(photo) = reader.read_photo()? {
//!         println!("photo: {} base64 chars", encode_photo(&photo).len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

mod charset;
mod constants;
mod error;
pub mod fields;
pub mod format;
mod photo;
mod reader;
mod record;
#[cfg(any(test, feature = "mock"))]
pub mod testing;

pub use charset::decode_tis620;
pub use constants::*;
pub use error::{CardError, Result};
pub use fields::{FIELDS, FieldSpec, SELECT_APPLICATION, Transform};
pub use photo::{PhotoAssembler, encode_photo};
pub use reader::CardReader;
pub use record::{CardRecord, FieldKey};
