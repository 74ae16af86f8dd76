//! Signal aggregation and the decision ladder.

use crate::signal::{EntityType, Signal, SignalCategory, SignalName};
use serde::{Deserialize, Serialize};

/// AI-signature signals weighted below this force an AI verdict.
const AI_SIGNAL_WEIGHT_BELOW: i32 = -30;

/// Reduction of a signal list to a score and two tie-break flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalTally {
    /// Sum of every signal weight
    pub total_weight: i32,
    /// Any strong AI-signature signal present
    pub has_ai_signal: bool,
    /// Automation User-Agent or missing User-Agent present
    pub has_automation_signal: bool,
}

impl SignalTally {
    pub fn from_signals(signals: &[Signal]) -> Self {
        Self {
            total_weight: signals.iter().map(Signal::weight).sum(),
            has_ai_signal: signals.iter().any(|s| {
                s.category() == SignalCategory::AiSignature && s.weight() < AI_SIGNAL_WEIGHT_BELOW
            }),
            has_automation_signal: signals.iter().any(|s| {
                matches!(
                    s.name(),
                    SignalName::AutomationUserAgent | SignalName::MissingUserAgent
                )
            }),
        }
    }
}

/// One step of the ladder: a predicate and the verdict it yields.
pub struct Rung {
    pub entity_type: EntityType,
    applies: fn(&SignalTally) -> bool,
    confidence: fn(&SignalTally) -> u8,
}

impl Rung {
    pub fn applies(&self, tally: &SignalTally) -> bool {
        (self.applies)(tally)
    }

    pub fn confidence(&self, tally: &SignalTally) -> u8 {
        (self.confidence)(tally)
    }
}

fn capped(base: i32, delta: i32, cap: i32) -> u8 {
    base.saturating_add(delta).clamp(0, cap) as u8
}

/// Ordered checks, evaluated top-down, first match wins.
///
/// AI evidence overrides everything, a single strong automation indicator is
/// not diluted by weak positive signals, and a human verdict needs a
/// comfortably positive total.
pub static DECISION_LADDER: [Rung; 4] = [
    Rung {
        entity_type: EntityType::AiAgent,
        applies: |t| t.has_ai_signal,
        confidence: |t| capped(70, t.total_weight.saturating_abs(), 95),
    },
    Rung {
        entity_type: EntityType::Automation,
        applies: |t| t.total_weight < -20 || t.has_automation_signal,
        confidence: |t| capped(50, t.total_weight.saturating_abs(), 90),
    },
    Rung {
        entity_type: EntityType::Human,
        applies: |t| t.total_weight > 30,
        confidence: |t| capped(50, t.total_weight, 85),
    },
    Rung {
        entity_type: EntityType::Unknown,
        applies: |_| true,
        confidence: |_| 30,
    },
];

/// Walk the ladder and return the first verdict whose predicate holds.
pub fn decide(tally: &SignalTally) -> (EntityType, u8) {
    // The last rung always applies.
    let [checks @ .., catch_all] = &DECISION_LADDER;
    let rung = checks
        .iter()
        .find(|rung| rung.applies(tally))
        .unwrap_or(catch_all);
    (rung.entity_type, rung.confidence(tally))
}
