use crate::error::{MatchingError, Result};
use base64::{engine::general_purpose, Engine as _};

/// Opaque page cursor: base64 of the decimal offset
pub fn encode_cursor(offset: usize) -> String {
    general_purpose::STANDARD.encode(offset.to_string())
}

/// Absent or empty cursor means offset 0
pub fn decode_cursor(cursor: Option<&str>) -> Result<usize> {
    match cursor {
        Some(cursor) if !cursor.is_empty() => {
            let decoded = general_purpose::STANDARD
                .decode(cursor)
                .map_err(|_| MatchingError::InvalidRequest("Invalid cursor format".to_string()))?;
            let offset_str = String::from_utf8(decoded)
                .map_err(|_| MatchingError::InvalidRequest("Invalid cursor encoding".to_string()))?;
            offset_str
                .parse::<usize>()
                .map_err(|_| MatchingError::InvalidRequest("Invalid cursor offset".to_string()))
        }
        _ => Ok(0),
    }
}
