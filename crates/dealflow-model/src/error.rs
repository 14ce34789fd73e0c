// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    UnknownVariant {
        kind: &'static str,
        value: String,
        expected: &'static [&'static str],
    },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::UnknownVariant {
                kind,
                value,
                expected,
            } => write!(
                f,
                "unknown {kind} `{value}`; expected one of: {}",
                expected.join(", ")
            ),
        }
    }
}

impl std::error::Error for ParseError {}
