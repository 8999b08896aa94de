//! Wire types exchanged with the controller

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thaiid_card::CardRecord;

/// A command issued by the controller
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemoteCommand {
    /// Read the card in the reader
    ReadCard,
    /// Discard the current record and photo
    ClearData,
    /// The controller saved the current record
    SaveData,
    /// Anything else, kept verbatim
    Unknown(String),
}

impl RemoteCommand {
    /// Name used on the wire
    pub fn as_str(&self) -> &str {
        match self {
            Self::ReadCard => "read_card",
            Self::ClearData => "clear_data",
            Self::SaveData => "save_data",
            Self::Unknown(name) => name,
        }
    }
}

impl From<&str> for RemoteCommand {
    fn from(s: &str) -> Self {
        match s.trim() {
            "read_card" => Self::ReadCard,
            "clear_data" => Self::ClearData,
            "save_data" => Self::SaveData,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl FromStr for RemoteCommand {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `GET /api/command/latest`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommandPoll {
    /// Whether a command is pending
    pub has_command: bool,
    /// The pending command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl CommandPoll {
    /// The pending command, if the body announces one
    pub fn pending(&self) -> Option<RemoteCommand> {
        match (&self.has_command, &self.command) {
            (true, Some(name)) if !name.trim().is_empty() => Some(name.as_str().into()),
            _ => None,
        }
    }
}

/// Body of `POST /api/command/acknowledge`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledge {
    /// The command being acknowledged
    pub command: String,
    /// Acknowledging device
    pub device_id: String,
}

/// Body of `POST /api/card/update`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum CardUpdate {
    /// A freshly read record and its photo
    CardData {
        /// Sending device
        device_id: String,
        /// Unix epoch milliseconds
        timestamp: i64,
        /// The record
        data: CardRecord,
        /// Base64 photo
        #[serde(default, skip_serializing_if = "Option::is_none")]
        photo: Option<String>,
    },
    /// A human readable status line
    Status {
        /// Sending device
        device_id: String,
        /// Unix epoch milliseconds
        timestamp: i64,
        /// Status text
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use thaiid_card::FieldKey;

    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(RemoteCommand::from("read_card"), RemoteCommand::ReadCard);
        assert_eq!(RemoteCommand::from(" clear_data "), RemoteCommand::ClearData);
        assert_eq!(RemoteCommand::from("save_data"), RemoteCommand::SaveData);
        assert_eq!(
            RemoteCommand::from("reboot"),
            RemoteCommand::Unknown("reboot".into())
        );
        assert_eq!(RemoteCommand::Unknown("reboot".into()).to_string(), "reboot");
    }

    #[test]
    fn test_command_poll() {
        let poll: CommandPoll =
            serde_json::from_str(r#"{"hasCommand":true,"command":"read_card"}"#).unwrap();
        assert_eq!(poll.pending(), Some(RemoteCommand::ReadCard));

        let poll: CommandPoll = serde_json::from_str(r#"{"hasCommand":false}"#).unwrap();
        assert_eq!(poll.pending(), None);

        let poll: CommandPoll = serde_json::from_str(r#"{"hasCommand":true}"#).unwrap();
        assert_eq!(poll.pending(), None);
    }

    #[test]
    fn test_card_update_shapes() {
        let update = CardUpdate::CardData {
            device_id: "dev-1".into(),
            timestamp: 1_700_000_000_000,
            data: CardRecord::default().with(FieldKey::Cid, "1101700203451"),
            photo: None,
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["type"], "card_data");
        assert_eq!(value["deviceId"], "dev-1");
        assert_eq!(value["data"]["CID"], "1101700203451");
        assert!(value.get("photo").is_none());

        let update = CardUpdate::Status {
            device_id: "dev-1".into(),
            timestamp: 1,
            message: "พร้อมใช้งาน".into(),
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"type": "status", "deviceId": "dev-1", "timestamp": 1, "message": "พร้อมใช้งาน"})
        );
    }
}
