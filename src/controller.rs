use log::{debug, info, warn};
use serde::Serialize;

use crate::config::ClockConfig;
use crate::error::ClockError;
use crate::game::utils::{parse_budget, result_message};
use crate::models::{ClockEvent, ClockState, Effect, GameResult, Side};
use crate::ports::{History, Page, Scheduler, TimerHandle};

/// Owns the clock state and applies its effects to the page
pub struct ClockController<P, H, S> {
    state: ClockState,
    config: ClockConfig,
    page: P,
    history: H,
    scheduler: S,
    timer: Option<TimerHandle>,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    state: &'a ClockState,
    timer: Option<TimerHandle>,
}

impl<P: Page, H: History, S: Scheduler> ClockController<P, H, S> {
    pub fn new(page: P, history: H, scheduler: S, config: ClockConfig) -> Self {
        ClockController {
            state: ClockState::default(),
            config,
            page,
            history,
            scheduler,
            timer: None,
        }
    }

    /// Picks up a loss recorded in the URL by a previous page and shows it.
    pub fn on_page_loaded(&mut self) -> Result<(), ClockError> {
        self.reload_result()?;
        self.dispatch(ClockEvent::PageLoaded)
    }

    pub fn start_game(&mut self, budget_minutes: u32) -> Result<(), ClockError> {
        self.refresh_result();
        self.dispatch(ClockEvent::StartGame { budget_minutes })?;
        info!("Game started with {} minutes per side", budget_minutes);
        Ok(())
    }

    /// Starts a game from the raw value of the start form's `time` field.
    pub fn start_game_from_input(&mut self, raw: &str) -> Result<(), ClockError> {
        let budget_minutes = parse_budget(raw).map_err(|e| {
            warn!("Not starting a game: {}", e);
            e
        })?;
        self.start_game(budget_minutes)
    }

    pub fn on_side_clicked(&mut self, side: Side) -> Result<(), ClockError> {
        if !self.state.running {
            debug!("Ignoring click on {} before the game started", side);
            return Ok(());
        }
        debug!("{} pressed the clock, {} to move", side, side.opposite());
        self.dispatch(ClockEvent::SideClicked(side))
    }

    pub fn tick(&mut self) -> Result<(), ClockError> {
        self.dispatch(ClockEvent::Tick)
    }

    pub fn on_time_expired(&mut self, side: Side) -> Result<(), ClockError> {
        self.dispatch(ClockEvent::TimeExpired(side))
    }

    pub fn cancel_game(&mut self) -> Result<(), ClockError> {
        if self.state.running {
            info!("Game cancelled");
        }
        self.refresh_result();
        self.dispatch(ClockEvent::Cancel)
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// The controller state as JSON
    pub fn snapshot(&self) -> Result<String, ClockError> {
        let snapshot = Snapshot {
            state: &self.state,
            timer: self.timer,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    // The URL is the record of who lost; back/forward navigation changes it
    // without reloading the page.
    fn reload_result(&mut self) -> Result<(), ClockError> {
        self.state.result = match self.history.out_of_time()? {
            Some(value) => match value.parse::<Side>() {
                Ok(loser) => Some(GameResult { loser }),
                Err(e) => {
                    warn!("Ignoring out_of_time parameter: {}", e);
                    None
                }
            },
            None => None,
        };
        Ok(())
    }

    fn refresh_result(&mut self) {
        if let Err(e) = self.reload_result() {
            warn!("Keeping the last known result: {}", e);
        }
    }

    /// Applies every effect even when one fails, since the state has already
    /// moved on. Returns the first failure.
    fn dispatch(&mut self, event: ClockEvent) -> Result<(), ClockError> {
        let effects = self.state.apply(event, &self.config)?;
        let mut first_error = self.execute_all(effects);

        if self.state.running && self.timer.is_none() {
            warn!("Clock has no timer, returning to the start form");
            let effects = self.state.apply(ClockEvent::Cancel, &self.config)?;
            if let Some(e) = self.execute_all(effects) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn execute_all(&mut self, effects: Vec<Effect>) -> Option<ClockError> {
        let mut first_error = None;
        for effect in effects {
            if let Err(e) = self.execute(effect) {
                warn!("Page update failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        first_error
    }

    fn execute(&mut self, effect: Effect) -> Result<(), ClockError> {
        match effect {
            Effect::ArmTick(side) => {
                self.cancel_timer();
                let handle = self.scheduler.start_interval(self.config.tick_interval_ms)?;
                debug!("Clock running for {} ({:?})", side, handle);
                self.timer = Some(handle);
            }
            Effect::CancelTick => self.cancel_timer(),
            Effect::SetDisplay { side, text } => self.page.set_display_text(side, &text)?,
            Effect::SetIndicator { side, active } => self.page.set_indicator(side, active)?,
            Effect::ShowStartForm(visible) => self.page.set_start_form_visible(visible)?,
            Effect::ShowResult(loser) => self.page.show_result(&result_message(loser))?,
            Effect::ClearResult => self.page.clear_result()?,
            Effect::RecordLoser(side) => {
                info!("{} ran out of time", side);
                self.history.set_out_of_time(side)?;
            }
            Effect::ClearLoser => self.history.clear_out_of_time()?,
        }
        Ok(())
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            self.scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Phase;
    use crate::ports::testing::{FakeHistory, FakePage, FakeScheduler};

    type TestController = ClockController<FakePage, FakeHistory, FakeScheduler>;

    fn controller(history: FakeHistory) -> TestController {
        let mut controller = ClockController::new(
            FakePage::default(),
            history,
            FakeScheduler::default(),
            ClockConfig::default(),
        );
        controller.on_page_loaded().unwrap();
        controller
    }

    fn assert_single_active(controller: &TestController) {
        let indicators = &controller.page().indicators;
        assert_ne!(indicators.get(&Side::White), indicators.get(&Side::Black));
    }

    #[test]
    fn start_arms_a_single_timer_on_white() {
        let mut clock = controller(FakeHistory::default());
        clock.start_game(5).unwrap();

        assert_eq!(clock.state().white_time_ms, 300_000);
        assert_eq!(clock.state().black_time_ms, 300_000);
        assert_eq!(clock.state().phase(), Phase::Running(Side::White));
        assert_eq!(clock.scheduler().live.len(), 1);
        assert_eq!(clock.scheduler().last_interval_ms, Some(100));
        assert!(!clock.page().start_form_visible);
        assert_eq!(clock.page().displays[&Side::White], "05:00.0");
        assert_eq!(clock.page().indicators[&Side::White], true);
        assert_single_active(&clock);
    }

    #[test]
    fn invalid_input_keeps_awaiting_start() {
        let mut clock = controller(FakeHistory::default());
        for raw in ["", "ten", "0", "-1"] {
            assert!(matches!(
                clock.start_game_from_input(raw),
                Err(ClockError::InvalidBudget(_))
            ));
        }
        assert_eq!(clock.state().phase(), Phase::AwaitingStart);
        assert!(clock.page().start_form_visible);
        assert!(clock.scheduler().live.is_empty());

        clock.start_game_from_input(" 3 ").unwrap();
        assert_eq!(clock.state().white_time_ms, 180_000);
    }

    #[test]
    fn turn_switches_replace_the_timer() {
        let mut clock = controller(FakeHistory::default());
        clock.start_game(1).unwrap();

        clock.on_side_clicked(Side::White).unwrap();
        assert_eq!(clock.state().active_side, Some(Side::Black));
        assert_eq!(clock.scheduler().live.len(), 1);
        assert_eq!(clock.page().indicators[&Side::Black], true);
        assert_eq!(clock.page().indicators[&Side::White], false);

        clock.tick().unwrap();
        assert_eq!(clock.state().black_time_ms, 59_900);
        assert_eq!(clock.state().white_time_ms, 60_000);
        assert_eq!(clock.page().displays[&Side::Black], "00:59.9");

        clock.on_side_clicked(Side::Black).unwrap();
        assert_eq!(clock.state().active_side, Some(Side::White));
        assert_eq!(clock.scheduler().live.len(), 1);
        assert_eq!(clock.scheduler().started, 3);
        assert_eq!(clock.scheduler().cancelled, 2);
        assert_single_active(&clock);
    }

    #[test]
    fn fresh_game_black_click_runs_white() {
        let mut clock = controller(FakeHistory::default());
        clock.start_game(1).unwrap();
        clock.on_side_clicked(Side::Black).unwrap();
        clock.tick().unwrap();
        assert_eq!(clock.state().active_side, Some(Side::White));
        assert_eq!(clock.state().white_time_ms, 59_900);
    }

    #[test]
    fn clicks_before_start_do_nothing() {
        let mut clock = controller(FakeHistory::default());
        clock.on_side_clicked(Side::White).unwrap();
        assert_eq!(clock.scheduler().started, 0);
        assert_eq!(clock.state().phase(), Phase::AwaitingStart);
    }

    #[test]
    fn running_out_of_time_ends_the_game() {
        let mut clock = controller(FakeHistory::default());
        clock.start_game(1).unwrap();
        clock.on_side_clicked(Side::White).unwrap();

        // 600 ticks take Black to zero, the next one below it.
        for _ in 0..601 {
            clock.tick().unwrap();
        }

        assert_eq!(clock.state().phase(), Phase::AwaitingStart);
        assert!(clock.scheduler().live.is_empty());
        assert_eq!(clock.history().out_of_time.as_deref(), Some("Black"));
        assert_eq!(clock.history().pushes, 1);
        assert_eq!(clock.page().result.as_deref(), Some("Black run out of time!"));
        assert_eq!(clock.page().displays[&Side::Black], "00:00.0");
        assert!(clock.page().start_form_visible);
        assert_eq!(clock.page().indicators[&Side::White], true);
        assert_single_active(&clock);

        let cancelled = clock.scheduler().cancelled;
        for _ in 0..5 {
            clock.tick().unwrap();
        }
        assert_eq!(clock.scheduler().cancelled, cancelled);
        assert_eq!(clock.state().black_time_ms, 0);
        assert_eq!(clock.state().white_time_ms, 0);
    }

    #[test]
    fn expired_result_is_cleared_on_next_start() {
        let mut clock = controller(FakeHistory::with_out_of_time("Black"));
        assert_eq!(clock.page().result.as_deref(), Some("Black run out of time!"));

        clock.cancel_game().unwrap();
        assert_eq!(clock.page().result.as_deref(), Some("Black run out of time!"));

        clock.start_game(2).unwrap();
        assert_eq!(clock.page().result, None);
        assert_eq!(clock.history().out_of_time, None);
        assert_eq!(clock.state().result, None);
    }

    #[test]
    fn explicit_expiry_records_the_side() {
        let mut clock = controller(FakeHistory::default());
        clock.start_game(1).unwrap();
        clock.on_time_expired(Side::White).unwrap();
        assert_eq!(clock.history().out_of_time.as_deref(), Some("White"));
        assert!(clock.scheduler().live.is_empty());
        assert_eq!(clock.state().phase(), Phase::AwaitingStart);
    }

    #[test]
    fn unknown_url_value_is_ignored() {
        let clock = controller(FakeHistory::with_out_of_time("Purple"));
        assert_eq!(clock.state().result, None);
        assert_eq!(clock.page().result, None);
    }

    #[test]
    fn cancel_twice_is_harmless() {
        let mut clock = controller(FakeHistory::default());
        clock.start_game(10).unwrap();
        clock.cancel_game().unwrap();
        clock.cancel_game().unwrap();
        assert_eq!(clock.state().phase(), Phase::AwaitingStart);
        assert!(clock.scheduler().live.is_empty());
        assert_eq!(clock.scheduler().cancelled, 1);
        assert!(clock.page().start_form_visible);
        assert_eq!(clock.page().result, None);
    }

    #[test]
    fn restarting_while_running_keeps_one_timer() {
        let mut clock = controller(FakeHistory::default());
        clock.start_game(1).unwrap();
        clock.start_game(2).unwrap();
        assert_eq!(clock.scheduler().live.len(), 1);
        assert_eq!(clock.state().white_time_ms, 120_000);
    }

    #[test]
    fn failed_url_update_still_returns_to_the_start_form() {
        let mut clock = controller(FakeHistory {
            fail_pushes: true,
            ..FakeHistory::default()
        });
        clock.start_game(1).unwrap();
        clock.state.white_time_ms = 50;

        assert!(matches!(clock.tick(), Err(ClockError::Js(_))));
        assert_eq!(clock.state().phase(), Phase::AwaitingStart);
        assert!(clock.scheduler().live.is_empty());
        assert!(clock.page().start_form_visible);
        assert_eq!(clock.page().result.as_deref(), Some("White run out of time!"));
        assert_eq!(clock.page().indicators[&Side::White], true);
        assert_single_active(&clock);

        clock.history.fail_pushes = false;
        clock.start_game(1).unwrap();
        assert_eq!(clock.state().phase(), Phase::Running(Side::White));
        assert_eq!(clock.scheduler().live.len(), 1);
    }

    #[test]
    fn failed_timer_start_leaves_the_game_stopped() {
        let mut clock = controller(FakeHistory::default());
        clock.scheduler.fail_start = true;

        assert!(matches!(clock.start_game(1), Err(ClockError::Js(_))));
        assert_eq!(clock.state().phase(), Phase::AwaitingStart);
        assert!(clock.page().start_form_visible);
        assert!(clock.scheduler().live.is_empty());
        assert_single_active(&clock);

        clock.on_side_clicked(Side::White).unwrap();
        assert_eq!(clock.scheduler().started, 0);
    }

    #[test]
    fn navigating_back_past_a_loss_forgets_it() {
        let mut clock = controller(FakeHistory::with_out_of_time("Black"));
        assert_eq!(clock.page().result.as_deref(), Some("Black run out of time!"));

        // The browser restored an address without the parameter.
        clock.history.out_of_time = None;
        clock.cancel_game().unwrap();
        assert_eq!(clock.page().result, None);
        assert_eq!(clock.state().result, None);

        clock.start_game(1).unwrap();
        assert_eq!(clock.history().pushes, 0);
    }

    #[test]
    fn navigating_forward_to_a_loss_shows_it() {
        let mut clock = controller(FakeHistory::default());
        clock.history.out_of_time = Some("White".to_string());
        clock.cancel_game().unwrap();
        assert_eq!(clock.page().result.as_deref(), Some("White run out of time!"));
    }

    #[test]
    fn snapshot_is_json() {
        let mut clock = controller(FakeHistory::default());
        clock.start_game(1).unwrap();
        let value: serde_json::Value = serde_json::from_str(&clock.snapshot().unwrap()).unwrap();
        assert_eq!(value["state"]["white_time_ms"], 60_000);
        assert_eq!(value["state"]["active_side"], "White");
        assert_eq!(value["state"]["running"], true);
        assert_eq!(value["timer"], 1);
    }
}
