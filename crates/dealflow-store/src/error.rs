// SPDX-License-Identifier: Apache-2.0

use std::fmt;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// The store could not be reached or opened.
    Unavailable(String),
    Sql(rusqlite::Error),
    /// A stored value no longer parses into its model type.
    Decode {
        column: &'static str,
        message: String,
    },
}

impl StoreError {
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
            Self::Sql(err) => write!(f, "store query failed: {err}"),
            Self::Decode { column, message } => {
                write!(f, "stored column `{column}` is invalid: {message}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sql(err) => Some(err),
            Self::Unavailable(_) | Self::Decode { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}
