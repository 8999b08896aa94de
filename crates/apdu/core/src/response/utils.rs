//! Utility functions for APDU response handling

use tracing::debug;

use crate::response::error::ResponseError;
use crate::response::status::StatusWord;

/// Extract status word (SW1, SW2) and payload from raw APDU response data
///
/// # Errors
/// Returns an error if the data is too short to contain a status word.
pub fn extract_response_parts(data: &[u8]) -> Result<((u8, u8), &[u8]), ResponseError> {
    match data {
        [payload @ .., sw1, sw2] => Ok(((*sw1, *sw2), payload)),
        _ => {
            debug!("Response too short: {} bytes", data.len());
            Err(ResponseError::Incomplete(data.len()))
        }
    }
}

/// Extract status word as a [`StatusWord`] and payload from raw APDU response data
pub fn extract_status_and_payload(data: &[u8]) -> Result<(StatusWord, &[u8]), ResponseError> {
    let ((sw1, sw2), payload) = extract_response_parts(data)?;
    Ok((StatusWord::new(sw1, sw2), payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_response_parts() {
        let data = [0x01, 0x02, 0x03, 0x90, 0x00];
        let result = extract_response_parts(&data).unwrap();
        assert_eq!(result.0, (0x90, 0x00));
        assert_eq!(result.1, &[0x01, 0x02, 0x03]);

        let data = [0x61, 0x05];
        let result = extract_response_parts(&data).unwrap();
        assert_eq!(result.0, (0x61, 0x05));
        assert!(result.1.is_empty());

        assert_eq!(
            extract_response_parts(&[0x90]).unwrap_err(),
            ResponseError::Incomplete(1)
        );
    }

    #[test]
    fn test_extract_status_and_payload() {
        let data = [0x31, 0x90, 0x00];
        let (status, payload) = extract_status_and_payload(&data).unwrap();
        assert!(status.is_success());
        assert_eq!(payload, b"1");
    }
}
