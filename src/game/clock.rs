//! State transitions of the clock.
//!
//! Each event mutates the [`ClockState`] and returns the effects the page has
//! to apply, in order. Nothing here touches the DOM, the URL or a timer.

use crate::config::ClockConfig;
use crate::error::ClockError;
use crate::game::utils::{format_duration, minutes_to_ms};
use crate::models::{ClockEvent, ClockState, Effect, GameResult, Side};

impl ClockState {
    pub fn apply(
        &mut self,
        event: ClockEvent,
        config: &ClockConfig,
    ) -> Result<Vec<Effect>, ClockError> {
        let mut effects = Vec::new();
        match event {
            ClockEvent::PageLoaded => self.page_loaded(&mut effects),
            ClockEvent::StartGame { budget_minutes } => {
                self.start_game(budget_minutes, &mut effects)?
            }
            ClockEvent::SideClicked(side) => self.side_clicked(side, &mut effects),
            ClockEvent::Tick => self.tick(config, &mut effects),
            ClockEvent::TimeExpired(side) => self.time_expired(side, &mut effects),
            ClockEvent::Cancel => self.cancel(&mut effects),
        }
        Ok(effects)
    }

    fn page_loaded(&mut self, effects: &mut Vec<Effect>) {
        effects.push(Effect::ShowStartForm(true));
        if let Some(result) = self.result {
            effects.push(Effect::ShowResult(result.loser));
        }
        push_default_indicators(effects);
    }

    fn start_game(&mut self, budget_minutes: u32, effects: &mut Vec<Effect>) -> Result<(), ClockError> {
        if budget_minutes == 0 {
            return Err(ClockError::InvalidBudget(budget_minutes.to_string()));
        }
        if self.running {
            effects.push(Effect::CancelTick);
        }

        let budget_ms = minutes_to_ms(budget_minutes);
        self.white_time_ms = budget_ms;
        self.black_time_ms = budget_ms;
        for side in Side::ALL {
            effects.push(Effect::SetDisplay {
                side,
                text: format_duration(budget_ms),
            });
        }

        effects.push(Effect::ShowStartForm(false));
        if self.result.take().is_some() {
            effects.push(Effect::ClearResult);
            effects.push(Effect::ClearLoser);
        }

        push_default_indicators(effects);
        self.active_side = Some(Side::White);
        self.running = true;
        effects.push(Effect::ArmTick(Side::White));
        Ok(())
    }

    // Pressing a side's control ends that side's turn, whichever side was running.
    fn side_clicked(&mut self, side: Side, effects: &mut Vec<Effect>) {
        if !self.running {
            return;
        }
        let next = side.opposite();
        effects.push(Effect::CancelTick);
        effects.push(Effect::SetIndicator { side, active: false });
        effects.push(Effect::SetIndicator {
            side: next,
            active: true,
        });
        self.active_side = Some(next);
        effects.push(Effect::ArmTick(next));
    }

    fn tick(&mut self, config: &ClockConfig, effects: &mut Vec<Effect>) {
        let (true, Some(side)) = (self.running, self.active_side) else {
            return;
        };

        let remaining = self.remaining_ms_mut(side);
        *remaining -= i64::from(config.tick_interval_ms);
        if *remaining < 0 {
            *remaining = 0;
            effects.push(Effect::SetDisplay {
                side,
                text: format_duration(0),
            });
            self.time_expired(side, effects);
            return;
        }

        effects.push(Effect::SetDisplay {
            side,
            text: format_duration(*remaining),
        });
    }

    fn time_expired(&mut self, side: Side, effects: &mut Vec<Effect>) {
        if self.running {
            effects.push(Effect::CancelTick);
            self.running = false;
        }
        self.result = Some(GameResult { loser: side });
        effects.push(Effect::RecordLoser(side));
        self.cancel(effects);
    }

    fn cancel(&mut self, effects: &mut Vec<Effect>) {
        if self.running {
            effects.push(Effect::CancelTick);
        }
        effects.push(Effect::ShowStartForm(true));
        match self.result {
            Some(result) => effects.push(Effect::ShowResult(result.loser)),
            None => effects.push(Effect::ClearResult),
        }
        push_default_indicators(effects);
        self.reset();
    }
}

/// White active and enabled, Black inactive and disabled
fn push_default_indicators(effects: &mut Vec<Effect>) {
    effects.push(Effect::SetIndicator {
        side: Side::White,
        active: true,
    });
    effects.push(Effect::SetIndicator {
        side: Side::Black,
        active: false,
    });
}
