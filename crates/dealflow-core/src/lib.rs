#![forbid(unsafe_code)]

mod alignment;
mod confidence;
mod money;

pub use alignment::{
    Alignment, Ribbon, RibbonPayload, AT_RISK_CONFIDENCE_BELOW, AT_RISK_PROBABILITY_ABOVE,
    MESSAGE_ALIGNED, MESSAGE_TRAILING,
};
pub use confidence::confidence_percent;
pub use money::{format_business_value, format_thousands};

pub const CRATE_NAME: &str = "dealflow-core";
