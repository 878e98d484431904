//! Gesture-driven UI: selection, calibration and menu screens

pub mod calibration;
pub mod hold;
pub mod menu;
pub mod selection;

pub use calibration::Calibration;
pub use hold::HoldMeter;
pub use menu::{MenuAction, MenuButton, MenuScreen, ResultsButton, ResultsScreen};
pub use selection::{SelectionMachine, SelectionState, SelectionTarget};
