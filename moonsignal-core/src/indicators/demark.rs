//! DeMark Sequential setup counting.
//!
//! Each close is compared with the close `DEMARK_LOOKBACK` bars earlier:
//! a lower close advances a sell setup, a higher close a buy setup, an equal
//! close resets to idle. Switching sides restarts the count at 1. Counts cap
//! at 9, where the setup is complete.
//!
//! `demark_scan` rescans the full history on every call; `DemarkTracker`
//! keeps the same state incrementally and must agree with the rescan on
//! every prefix.

use std::cmp::Ordering;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::domain::IndicatorReading;

/// Bars between the compared closes.
pub const DEMARK_LOOKBACK: usize = 4;
/// Count at which a setup is complete.
pub const SETUP_COMPLETE: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupKind {
    Sell,
    Buy,
    None,
}

/// Reversal a setup points to: sellers exhausted → bullish, buyers → bearish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reversal {
    Bullish,
    Bearish,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhaustionState {
    pub count: u8,
    pub setup_kind: SetupKind,
    pub expected_reversal: Reversal,
    pub completed: bool,
}

impl ExhaustionState {
    pub fn idle() -> Self {
        SetupState::Idle.into()
    }

    /// Contribution grows with the count; the sign follows the expected
    /// reversal.
    pub fn reading(&self) -> IndicatorReading {
        let magnitude = match self.count {
            0 => 0.0,
            1..=5 => 0.15,
            6..=7 => 0.35,
            8 => 0.55,
            _ => 0.75,
        };
        let strength = match self.expected_reversal {
            Reversal::Bullish => magnitude,
            Reversal::Bearish => -magnitude,
            Reversal::None => 0.0,
        };
        IndicatorReading::new(Some(f64::from(self.count)), strength)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetupState {
    Idle,
    CountingSell(u8),
    CountingBuy(u8),
}

impl SetupState {
    /// `ordering` is close[i] compared with close[i - 4].
    fn advance(self, ordering: Option<Ordering>) -> Self {
        match ordering {
            Some(Ordering::Less) => match self {
                SetupState::CountingSell(n) => SetupState::CountingSell((n + 1).min(SETUP_COMPLETE)),
                SetupState::Idle | SetupState::CountingBuy(_) => SetupState::CountingSell(1),
            },
            Some(Ordering::Greater) => match self {
                SetupState::CountingBuy(n) => SetupState::CountingBuy((n + 1).min(SETUP_COMPLETE)),
                SetupState::Idle | SetupState::CountingSell(_) => SetupState::CountingBuy(1),
            },
            // Equal closes and NaN comparisons reset.
            Some(Ordering::Equal) | None => SetupState::Idle,
        }
    }
}

impl From<SetupState> for ExhaustionState {
    fn from(state: SetupState) -> Self {
        match state {
            SetupState::Idle => ExhaustionState {
                count: 0,
                setup_kind: SetupKind::None,
                expected_reversal: Reversal::None,
                completed: false,
            },
            SetupState::CountingSell(n) => ExhaustionState {
                count: n,
                setup_kind: SetupKind::Sell,
                expected_reversal: Reversal::Bullish,
                completed: n == SETUP_COMPLETE,
            },
            SetupState::CountingBuy(n) => ExhaustionState {
                count: n,
                setup_kind: SetupKind::Buy,
                expected_reversal: Reversal::Bearish,
                completed: n == SETUP_COMPLETE,
            },
        }
    }
}

/// Setup state after a full left-to-right scan, `None` with fewer than
/// `DEMARK_LOOKBACK + 1` closes.
pub fn demark_scan(closes: &[f64]) -> Option<ExhaustionState> {
    if closes.len() <= DEMARK_LOOKBACK {
        return None;
    }

    let mut state = SetupState::Idle;
    for i in DEMARK_LOOKBACK..closes.len() {
        state = state.advance(closes[i].partial_cmp(&closes[i - DEMARK_LOOKBACK]));
    }
    Some(state.into())
}

/// Incremental setup counter fed one close at a time.
#[derive(Debug, Clone)]
pub struct DemarkTracker {
    window: VecDeque<f64>,
    state: SetupState,
}

impl Default for DemarkTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DemarkTracker {
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(DEMARK_LOOKBACK + 1),
            state: SetupState::Idle,
        }
    }

    pub fn push(&mut self, close: f64) {
        self.window.push_back(close);
        if self.window.len() > DEMARK_LOOKBACK + 1 {
            self.window.pop_front();
        }
        if self.window.len() == DEMARK_LOOKBACK + 1 {
            let ordering = self.window[DEMARK_LOOKBACK].partial_cmp(&self.window[0]);
            self.state = self.state.advance(ordering);
        }
    }

    /// Current state, `None` until `DEMARK_LOOKBACK + 1` closes were pushed.
    pub fn state(&self) -> Option<ExhaustionState> {
        (self.window.len() > DEMARK_LOOKBACK).then(|| self.state.into())
    }
}
