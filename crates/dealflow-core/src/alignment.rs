// SPDX-License-Identifier: Apache-2.0

use crate::money::format_business_value;
use dealflow_model::{Deal, DealStage};
use serde::{Deserialize, Serialize};

/// Deals below this average confidence are candidates for the risk flag.
pub const AT_RISK_CONFIDENCE_BELOW: f64 = 50.0;
/// Deals above this probability are candidates for the risk flag.
pub const AT_RISK_PROBABILITY_ABOVE: i32 = 70;

pub const MESSAGE_TRAILING: &str = "Engineering progress is trailing sales probability.";
pub const MESSAGE_ALIGNED: &str = "Aligned";

/// Engineering readiness of a deal set against its sales probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    /// Mean requirement confidence, untruncated.
    pub total_confidence: f64,
    pub probability: i32,
}

impl Alignment {
    #[must_use]
    pub fn from_confidences(confidences: &[u8], probability: i32) -> Self {
        let total_confidence = if confidences.is_empty() {
            0.0
        } else {
            let sum: u64 = confidences.iter().map(|c| u64::from(*c)).sum();
            sum as f64 / confidences.len() as f64
        };
        Self {
            total_confidence,
            probability,
        }
    }

    #[must_use]
    pub fn at_risk(&self) -> bool {
        self.total_confidence < AT_RISK_CONFIDENCE_BELOW
            && self.probability > AT_RISK_PROBABILITY_ABOVE
    }

    /// Whole percent used for display; truncation happens only here.
    #[must_use]
    pub fn tech_ready_percent(&self) -> u8 {
        self.total_confidence.floor() as u8
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        if self.at_risk() {
            MESSAGE_TRAILING
        } else {
            MESSAGE_ALIGNED
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ribbon {
    pub business_value: String,
    pub status_label: String,
    pub alignment_score: String,
    pub at_risk: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RibbonPayload {
    pub ribbon: Ribbon,
    pub message: String,
}

impl RibbonPayload {
    #[must_use]
    pub fn new(deal: &Deal, alignment: Alignment) -> Self {
        Self {
            ribbon: Ribbon {
                business_value: format_business_value(&deal.currency, deal.revenue_impact),
                status_label: status_label(deal.stage, deal.probability),
                alignment_score: format!("{}% Tech-Ready", alignment.tech_ready_percent()),
                at_risk: alignment.at_risk(),
            },
            message: alignment.message().to_string(),
        }
    }

    /// Builds the payload from per-requirement confidences.
    #[must_use]
    pub fn for_deal(deal: &Deal, confidences: &[u8]) -> Self {
        Self::new(deal, Alignment::from_confidences(confidences, deal.probability))
    }
}

fn status_label(stage: DealStage, probability: i32) -> String {
    format!("Stage: {stage} ({probability}% Probability)")
}
