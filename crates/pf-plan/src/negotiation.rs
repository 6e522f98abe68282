//! Deciding which carrier keeps its plan.

use std::fmt::Write as _;

use pf_core::CarrierId;

/// A carrier taking part in a negotiation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Contender {
    pub id:     CarrierId,
    pub waited: u32,
}

/// Pluggable arbitration between conflicting carriers.
///
/// `contenders` arrive in ascending id order.  `prioritized` is the subset
/// that already holds the contested cell, also in ascending id order.
/// Returning `None` means there is nothing to decide.
pub trait NegotiationPolicy {
    fn negotiate(&self, contenders: &[Contender], prioritized: &[CarrierId]) -> Option<CarrierId>;
}

/// The incumbent wins; otherwise the carrier that has stalled longest.
/// Ties go to the first contender.
#[derive(Copy, Clone, Debug, Default)]
pub struct LongestWait;

impl NegotiationPolicy for LongestWait {
    fn negotiate(&self, contenders: &[Contender], prioritized: &[CarrierId]) -> Option<CarrierId> {
        if contenders.len() <= 1 {
            return None;
        }
        if let Some(&first) = prioritized.first() {
            return Some(first);
        }
        let mut best = contenders[0];
        for &c in &contenders[1..] {
            if c.waited > best.waited {
                best = c;
            }
        }
        Some(best.id)
    }
}

/// One event-log line describing a negotiation and its result.
pub fn negotiation_line(contenders: &[Contender], winner: Option<CarrierId>) -> String {
    let mut line = String::from("Negotiating... [");
    for (i, c) in contenders.iter().enumerate() {
        if i > 0 {
            line.push_str(", ");
        }
        let _ = write!(line, "{}", c.id.0);
    }
    line.push_str("] Negotiating ended: ");
    match winner {
        Some(w) => {
            let _ = write!(line, "{} won.", w.0);
        }
        None => line.push_str("None."),
    }
    line
}
