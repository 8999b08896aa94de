//! The decoded identity record

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Keys of the values a [`CardRecord`] holds, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    /// National identification number
    Cid,
    /// Full name in Thai
    NameTh,
    /// Full name in English
    NameEn,
    /// Birth date, Thai rendering
    BirthDate,
    /// Birth date, Gregorian English rendering
    BirthDateEn,
    /// Gender
    Gender,
    /// Registered address
    Address,
    /// Issuing office
    Issuer,
    /// Issue date, Thai rendering
    IssueDate,
    /// Issue date, Gregorian English rendering
    IssueDateEn,
    /// Expiry date, Thai rendering
    ExpireDate,
    /// Expiry date, Gregorian English rendering
    ExpireDateEn,
}

impl FieldKey {
    /// Every key, in wire order
    pub const ALL: [Self; 12] = [
        Self::Cid,
        Self::NameTh,
        Self::NameEn,
        Self::BirthDate,
        Self::BirthDateEn,
        Self::Gender,
        Self::Address,
        Self::Issuer,
        Self::IssueDate,
        Self::IssueDateEn,
        Self::ExpireDate,
        Self::ExpireDateEn,
    ];

    /// Name of the key in the JSON sent to the controller
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cid => "CID",
            Self::NameTh => "NameTH",
            Self::NameEn => "NameEN",
            Self::BirthDate => "BirthDate",
            Self::BirthDateEn => "BirthDateEN",
            Self::Gender => "Gender",
            Self::Address => "Address",
            Self::Issuer => "Issuer",
            Self::IssueDate => "IssueDate",
            Self::IssueDateEn => "IssueDateEN",
            Self::ExpireDate => "ExpireDate",
            Self::ExpireDateEn => "ExpireDateEN",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn empty_if_none<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or_default())
}

/// Identity data read from one card
///
/// `None` marks a field the card did not deliver, `Some("")` a field that was
/// delivered but empty. Serialized, both become `""` so the controller always
/// receives every key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardRecord {
    #[serde(rename = "CID", serialize_with = "empty_if_none")]
    cid: Option<String>,
    #[serde(rename = "NameTH", serialize_with = "empty_if_none")]
    name_th: Option<String>,
    #[serde(rename = "NameEN", serialize_with = "empty_if_none")]
    name_en: Option<String>,
    #[serde(rename = "BirthDate", serialize_with = "empty_if_none")]
    birth_date: Option<String>,
    #[serde(rename = "BirthDateEN", serialize_with = "empty_if_none")]
    birth_date_en: Option<String>,
    #[serde(rename = "Gender", serialize_with = "empty_if_none")]
    gender: Option<String>,
    #[serde(rename = "Address", serialize_with = "empty_if_none")]
    address: Option<String>,
    #[serde(rename = "Issuer", serialize_with = "empty_if_none")]
    issuer: Option<String>,
    #[serde(rename = "IssueDate", serialize_with = "empty_if_none")]
    issue_date: Option<String>,
    #[serde(rename = "IssueDateEN", serialize_with = "empty_if_none")]
    issue_date_en: Option<String>,
    #[serde(rename = "ExpireDate", serialize_with = "empty_if_none")]
    expire_date: Option<String>,
    #[serde(rename = "ExpireDateEN", serialize_with = "empty_if_none")]
    expire_date_en: Option<String>,
}

macro_rules! getters {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(&self) -> Option<&str> {
                self.$name.as_deref()
            }
        )*
    };
}

impl CardRecord {
    getters! {
        /// National identification number
        cid,
        /// Full name in Thai
        name_th,
        /// Full name in English
        name_en,
        /// Birth date as `DD <Thai month> YYYY` (Buddhist Era)
        birth_date,
        /// Birth date as `DD Mon YYYY` (Gregorian)
        birth_date_en,
        /// Gender in Thai
        gender,
        /// Registered address
        address,
        /// Issuing office
        issuer,
        /// Issue date (Buddhist Era)
        issue_date,
        /// Issue date (Gregorian)
        issue_date_en,
        /// Expiry date (Buddhist Era)
        expire_date,
        /// Expiry date (Gregorian)
        expire_date_en,
    }

    const fn slot(&mut self, key: FieldKey) -> &mut Option<String> {
        match key {
            FieldKey::Cid => &mut self.cid,
            FieldKey::NameTh => &mut self.name_th,
            FieldKey::NameEn => &mut self.name_en,
            FieldKey::BirthDate => &mut self.birth_date,
            FieldKey::BirthDateEn => &mut self.birth_date_en,
            FieldKey::Gender => &mut self.gender,
            FieldKey::Address => &mut self.address,
            FieldKey::Issuer => &mut self.issuer,
            FieldKey::IssueDate => &mut self.issue_date,
            FieldKey::IssueDateEn => &mut self.issue_date_en,
            FieldKey::ExpireDate => &mut self.expire_date,
            FieldKey::ExpireDateEn => &mut self.expire_date_en,
        }
    }

    /// Value stored under `key`
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        match key {
            FieldKey::Cid => self.cid(),
            FieldKey::NameTh => self.name_th(),
            FieldKey::NameEn => self.name_en(),
            FieldKey::BirthDate => self.birth_date(),
            FieldKey::BirthDateEn => self.birth_date_en(),
            FieldKey::Gender => self.gender(),
            FieldKey::Address => self.address(),
            FieldKey::Issuer => self.issuer(),
            FieldKey::IssueDate => self.issue_date(),
            FieldKey::IssueDateEn => self.issue_date_en(),
            FieldKey::ExpireDate => self.expire_date(),
            FieldKey::ExpireDateEn => self.expire_date_en(),
        }
    }

    /// Return the record with `key` set to `value`
    pub fn with(mut self, key: FieldKey, value: impl Into<String>) -> Self {
        *self.slot(key) = Some(value.into());
        self
    }

    /// A record is usable only when it carries a non-empty CID
    pub fn is_valid(&self) -> bool {
        self.cid().is_some_and(|cid| !cid.is_empty())
    }

    /// Number of fields the card delivered
    pub fn present_fields(&self) -> usize {
        FieldKey::ALL.iter().filter(|key| self.get(**key).is_some()).count()
    }
}
