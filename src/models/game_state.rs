use serde::{Deserialize, Serialize};

use super::Side;

/// Clock state for a single board
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockState {
    pub white_time_ms: i64,
    pub black_time_ms: i64,
    pub active_side: Option<Side>,
    pub running: bool,
    /// Loser of the last game, mirrored in the `out_of_time` URL parameter
    pub result: Option<GameResult>,
}

/// Outcome of a game that ended on time
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub loser: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingStart,
    Running(Side),
}

impl ClockState {
    pub fn remaining_ms(&self, side: Side) -> i64 {
        match side {
            Side::White => self.white_time_ms,
            Side::Black => self.black_time_ms,
        }
    }

    pub fn remaining_ms_mut(&mut self, side: Side) -> &mut i64 {
        match side {
            Side::White => &mut self.white_time_ms,
            Side::Black => &mut self.black_time_ms,
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.running, self.active_side) {
            (true, Some(side)) => Phase::Running(side),
            _ => Phase::AwaitingStart,
        }
    }

    /// Drops everything but the recorded result
    pub fn reset(&mut self) {
        *self = ClockState {
            result: self.result,
            ..ClockState::default()
        };
    }
}
