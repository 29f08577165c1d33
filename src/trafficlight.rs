/*
 * The signal state machine for the two-leg crossing.
 *
 * A single timer owns both heads, so there is no hand-over between legs: the
 * lookup table below never shows green on both legs, and the two both-red
 * phases clear the crossing before the other leg gets its green.
 */

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    Phase1Green,
    Phase1Yellow,
    Phase1Red,
    Phase2Green,
    Phase2Yellow,
    Phase2Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadColor {
    Red,
    Yellow,
    Green,
}

// Leg A carries head 1, leg B carries head 2.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Leg {
    A,
    B,
}

impl SignalState {
    pub const ALL: [SignalState; 6] = [
        SignalState::Phase1Green,
        SignalState::Phase1Yellow,
        SignalState::Phase1Red,
        SignalState::Phase2Green,
        SignalState::Phase2Yellow,
        SignalState::Phase2Red,
    ];

    pub fn next(self) -> SignalState {
        match self {
            SignalState::Phase1Green => SignalState::Phase1Yellow,
            SignalState::Phase1Yellow => SignalState::Phase1Red,
            SignalState::Phase1Red => SignalState::Phase2Green,
            SignalState::Phase2Green => SignalState::Phase2Yellow,
            SignalState::Phase2Yellow => SignalState::Phase2Red,
            SignalState::Phase2Red => SignalState::Phase1Green,
        }
    }

    /// Colors of (head 1, head 2).
    pub fn heads(self) -> (HeadColor, HeadColor) {
        match self {
            SignalState::Phase1Green => (HeadColor::Green, HeadColor::Red),
            SignalState::Phase1Yellow => (HeadColor::Yellow, HeadColor::Red),
            SignalState::Phase1Red => (HeadColor::Red, HeadColor::Red),
            SignalState::Phase2Green => (HeadColor::Red, HeadColor::Green),
            SignalState::Phase2Yellow => (HeadColor::Red, HeadColor::Yellow),
            SignalState::Phase2Red => (HeadColor::Red, HeadColor::Red),
        }
    }

    pub fn head(self, leg: Leg) -> HeadColor {
        let (head1, head2) = self.heads();
        match leg {
            Leg::A => head1,
            Leg::B => head2,
        }
    }

    pub fn duration_ms(self, config: &Config) -> u64 {
        match self {
            SignalState::Phase1Green | SignalState::Phase2Green => config.green_ms,
            SignalState::Phase1Yellow | SignalState::Phase2Yellow => config.yellow_ms,
            SignalState::Phase1Red | SignalState::Phase2Red => config.all_red_ms,
        }
    }
}

#[derive(Debug)]
pub struct SignalTimer {
    state: SignalState,
    state_entered_at_ms: u64,
    config: Config,
}

impl SignalTimer {
    pub fn new(config: &Config) -> Self {
        SignalTimer {
            state: SignalState::Phase1Green,
            state_entered_at_ms: 0,
            config: *config,
        }
    }

    /// Start over in `Phase1Green` as of `now_ms`.
    pub fn restart(&mut self, now_ms: u64) {
        self.state = SignalState::Phase1Green;
        self.state_entered_at_ms = now_ms;
    }

    pub fn state(&self) -> SignalState {
        self.state
    }

    pub fn state_entered_at_ms(&self) -> u64 {
        self.state_entered_at_ms
    }

    /*
     * Move to the next phase once the current one has run its course. Returns
     * the new state on a transition, so that the caller can update the heads.
     * A late call moves one phase only; the next phase is timed from this
     * call, not from when the old phase should have ended.
     */
    pub fn advance(&mut self, now_ms: u64) -> Option<SignalState> {
        let elapsed = now_ms.saturating_sub(self.state_entered_at_ms);
        if elapsed < self.state.duration_ms(&self.config) {
            return None;
        }

        self.state = self.state.next();
        self.state_entered_at_ms = now_ms;
        Some(self.state)
    }
}
