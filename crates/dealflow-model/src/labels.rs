// SPDX-License-Identifier: Apache-2.0

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sales pipeline stage of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DealStage {
    #[default]
    Discovery,
    Poc,
    Legal,
    ClosedWon,
}

impl DealStage {
    pub const LABELS: &'static [&'static str] = &["Discovery", "POC", "Legal", "Closed Won"];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "Discovery",
            Self::Poc => "POC",
            Self::Legal => "Legal",
            Self::ClosedWon => "Closed Won",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        if raw.is_empty() {
            return Err(ParseError::Empty("stage"));
        }
        [Self::Discovery, Self::Poc, Self::Legal, Self::ClosedWon]
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| ParseError::UnknownVariant {
                kind: "stage",
                value: raw.to_string(),
                expected: Self::LABELS,
            })
    }
}

/// Workflow status of an engineering ticket.
///
/// Parsing ignores ASCII case, so `closed`, `CLOSED` and `Closed` are the
/// same status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl TicketStatus {
    pub const LABELS: &'static [&'static str] = &["Open", "In Progress", "Closed"];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Closed => "Closed",
        }
    }

    /// The only status that counts towards engineering completion.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        if raw.is_empty() {
            return Err(ParseError::Empty("status"));
        }
        [Self::Open, Self::InProgress, Self::Closed]
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| ParseError::UnknownVariant {
                kind: "status",
                value: raw.to_string(),
                expected: Self::LABELS,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TicketPriority {
    pub const LABELS: &'static [&'static str] = &["Low", "Medium", "High", "Critical"];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        if raw.is_empty() {
            return Err(ParseError::Empty("priority"));
        }
        [Self::Low, Self::Medium, Self::High, Self::Critical]
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| ParseError::UnknownVariant {
                kind: "priority",
                value: raw.to_string(),
                expected: Self::LABELS,
            })
    }
}

macro_rules! impl_label_traits {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseError;

            fn try_from(value: String) -> Result<Self, ParseError> {
                Self::parse(&value)
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, ParseError> {
                Self::parse(s)
            }
        }
    };
}

impl_label_traits!(DealStage);
impl_label_traits!(TicketStatus);
impl_label_traits!(TicketPriority);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels_parse_back_to_themselves() {
        for label in DealStage::LABELS {
            let stage = DealStage::parse(label).expect("known stage");
            assert_eq!(stage.as_str(), *label);
        }
    }

    #[test]
    fn status_parse_ignores_case() {
        for raw in ["closed", "CLOSED", "Closed", "cLoSeD"] {
            assert_eq!(TicketStatus::parse(raw), Ok(TicketStatus::Closed));
        }
        assert_eq!(
            TicketStatus::parse("in progress"),
            Ok(TicketStatus::InProgress)
        );
    }

    #[test]
    fn unknown_labels_are_rejected_with_expected_list() {
        let err = DealStage::parse("Negotiation").expect_err("unknown stage");
        assert_eq!(
            err.to_string(),
            "unknown stage `Negotiation`; expected one of: Discovery, POC, Legal, Closed Won"
        );
        assert_eq!(TicketStatus::parse(""), Err(ParseError::Empty("status")));
        assert!(TicketPriority::parse("urgent").is_err());
    }
}
