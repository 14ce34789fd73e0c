// SPDX-License-Identifier: Apache-2.0

use crate::lenient;
use crate::{DealId, DealStage, RequirementId, TicketId, TicketPriority, TicketStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "GBP";
pub const DEFAULT_PROBABILITY: i32 = 20;

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

const fn default_probability() -> i32 {
    DEFAULT_PROBABILITY
}

/// A sales opportunity as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub title: String,
    pub client_name: Option<String>,
    pub revenue_impact: f64,
    pub currency: String,
    pub stage: DealStage,
    /// Percent; not bounds-checked.
    pub probability: i32,
    pub forecast_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealCreate {
    pub title: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub revenue_impact: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub stage: DealStage,
    #[serde(default = "default_probability", deserialize_with = "lenient::percent")]
    pub probability: i32,
    #[serde(default, deserialize_with = "lenient::optional_timestamp")]
    pub forecast_date: Option<DateTime<Utc>>,
}

impl DealCreate {
    /// A create payload with every optional field at its default.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            client_name: None,
            revenue_impact: 0.0,
            currency: default_currency(),
            stage: DealStage::default(),
            probability: DEFAULT_PROBABILITY,
            forecast_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: RequirementId,
    pub description: String,
    pub deal_id: DealId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementCreate {
    pub description: String,
    pub deal_id: DealId,
}

/// A requirement as returned to clients, with its completion recomputed on
/// every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementView {
    pub id: RequirementId,
    pub description: String,
    pub deal_id: DealId,
    pub confidence_score: u8,
}

impl RequirementView {
    #[must_use]
    pub fn new(requirement: Requirement, confidence_score: u8) -> Self {
        Self {
            id: requirement.id,
            description: requirement.description,
            deal_id: requirement.deal_id,
            confidence_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineeringTicket {
    pub id: TicketId,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub requirement_id: RequirementId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCreate {
    pub requirement_id: RequirementId,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(default)]
    pub status: TicketStatus,
}

/// A deal together with its requirements, as listed in the sales pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDeal {
    #[serde(flatten)]
    pub deal: Deal,
    pub requirements: Vec<RequirementView>,
}
