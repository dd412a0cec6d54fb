//! Response envelope detection.
//!
//! The spreadsheet web app has answered in three shapes over time:
//! `{"success": true, "data": [...]}`, a bare array, and `{"data": [...]}`.
//! Anything else is rejected with a description of what arrived.

use serde_json::Value;
use shared::TransactionRecord;

use super::traits::SourceError;

const DEFAULT_REJECTION_MESSAGE: &str = "the spreadsheet service could not return the data";

/// Decode a parsed response body into records
pub fn decode_payload(payload: Value) -> Result<Vec<TransactionRecord>, SourceError> {
    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(mut object) => {
            if let Some(success) = object.get("success") {
                if success.as_bool() != Some(true) {
                    let message = object
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or(DEFAULT_REJECTION_MESSAGE)
                        .to_string();
                    return Err(SourceError::Rejected { message });
                }
            }
            match object.remove("data") {
                Some(Value::Array(rows)) => rows,
                Some(other) => {
                    return Err(SourceError::UnrecognizedShape {
                        found: format!("an object whose `data` is {}", describe(&other)),
                    })
                }
                None => {
                    return Err(SourceError::UnrecognizedShape {
                        found: "an object without a `data` field".to_string(),
                    })
                }
            }
        }
        other => {
            return Err(SourceError::UnrecognizedShape {
                found: describe(&other).to_string(),
            })
        }
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value(row).map_err(|source| SourceError::InvalidRow { index, source })
        })
        .collect()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
