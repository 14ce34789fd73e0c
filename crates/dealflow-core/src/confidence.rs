// SPDX-License-Identifier: Apache-2.0

use dealflow_model::EngineeringTicket;

/// Share of `tickets` that are closed, as a truncated percentage.
///
/// No tickets means no tracked work, so the result is 0 rather than 100.
#[must_use]
pub fn confidence_percent(tickets: &[EngineeringTicket]) -> u8 {
    if tickets.is_empty() {
        return 0;
    }
    let closed = tickets.iter().filter(|t| t.status.is_closed()).count();
    // closed <= len, so the quotient is in 0..=100.
    (closed * 100 / tickets.len()) as u8
}
