//! Errors raised while reading, decoding, and compiling a sheet.
//!
//! Both variants are local to one sheet: a batch import records the failure
//! for that file and moves on.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// The obfuscated note payload did not decode to JSON.
    ///
    /// ```
    /// # use sheet::SheetError;
    /// let err = SheetError::Decode("unexpected end of input".to_string());
    /// assert_eq!(err.to_string(), "Decode error: unexpected end of input");
    /// ```
    #[error("Decode error: {0}")]
    Decode(String),

    /// The sheet is JSON but its note structure is missing or malformed.
    ///
    /// Raised when there is no note list, or when note entries are not
    /// objects (which usually means the notes are still encoded).
    #[error("Format error: {0}")]
    Format(String),
}

impl SheetError {
    pub fn decode(message: impl Into<String>) -> Self {
        SheetError::Decode(message.into())
    }

    pub fn format(message: impl Into<String>) -> Self {
        SheetError::Format(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
