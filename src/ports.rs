//! Capabilities the controller needs from its host page.

use serde::{Deserialize, Serialize};

use crate::error::ClockError;
use crate::models::Side;

/// Name of the URL query parameter that records who lost on time
pub const OUT_OF_TIME_PARAM: &str = "out_of_time";

/// Handle of a live repeating timer
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(pub i32);

/// The parts of the DOM the clock drives
pub trait Page {
    /// Active means enabled with the `active` class; inactive means disabled without it.
    fn set_indicator(&mut self, side: Side, active: bool) -> Result<(), ClockError>;
    fn set_display_text(&mut self, side: Side, text: &str) -> Result<(), ClockError>;
    fn set_start_form_visible(&mut self, visible: bool) -> Result<(), ClockError>;
    /// Prepends the message to the start form, replacing any previous one.
    fn show_result(&mut self, message: &str) -> Result<(), ClockError>;
    fn clear_result(&mut self) -> Result<(), ClockError>;
}

/// Access to the page URL; mutations push a history entry without navigating.
pub trait History {
    fn out_of_time(&self) -> Result<Option<String>, ClockError>;
    fn set_out_of_time(&mut self, side: Side) -> Result<(), ClockError>;
    fn clear_out_of_time(&mut self) -> Result<(), ClockError>;
}

/// Source of the repeating tick.
///
/// The host calls back into the controller on every interval; the scheduler
/// only owns the registration.
pub trait Scheduler {
    fn start_interval(&mut self, interval_ms: u32) -> Result<TimerHandle, ClockError>;
    fn cancel(&mut self, handle: TimerHandle);
}
