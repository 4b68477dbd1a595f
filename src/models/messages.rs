use serde::{Deserialize, Serialize};

use super::Side;

/// Something that happened on the page and that the clock reacts to
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    PageLoaded,
    StartGame { budget_minutes: u32 },
    /// The control of the given side was pressed.
    SideClicked(Side),
    Tick,
    TimeExpired(Side),
    Cancel,
}

/// A side effect requested by a state transition, applied in order
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start the repeating tick that decrements the given side.
    ArmTick(Side),
    CancelTick,
    SetDisplay { side: Side, text: String },
    /// Make a side's control active and enabled, or inactive and disabled.
    SetIndicator { side: Side, active: bool },
    ShowStartForm(bool),
    ShowResult(Side),
    ClearResult,
    /// Push `out_of_time=<side>` into the page URL.
    RecordLoser(Side),
    ClearLoser,
}

/// Ids of the page elements the clock drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementId {
    WhiteButton,
    BlackButton,
    WhiteTime,
    BlackTime,
    StartWrapper,
    StartForm,
    BackButton,
    Result,
}

impl ElementId {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementId::WhiteButton => "white",
            ElementId::BlackButton => "black",
            ElementId::WhiteTime => "white_time",
            ElementId::BlackTime => "black_time",
            ElementId::StartWrapper => "start_wrapper",
            ElementId::StartForm => "start_form",
            ElementId::BackButton => "back_button",
            ElementId::Result => "result",
        }
    }

    pub fn button(side: Side) -> ElementId {
        match side {
            Side::White => ElementId::WhiteButton,
            Side::Black => ElementId::BlackButton,
        }
    }

    pub fn display(side: Side) -> ElementId {
        match side {
            Side::White => ElementId::WhiteTime,
            Side::Black => ElementId::BlackTime,
        }
    }
}
