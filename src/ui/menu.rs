//! Gesture-driven screens outside gameplay: mode select and results
//!
//! Button rectangles come from whatever lays the screen out; the defaults here
//! match the stock 1280x720 layout.

use serde::{Deserialize, Serialize};

use super::selection::{SelectionMachine, SelectionTarget};
use crate::config::{DEFAULT_DURATION_SECS, DURATION_CHOICES, GameMode, RoundConfig};
use crate::geometry::Rect;
use crate::gesture::Pointer;

/// Buttons on the mode-select screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuButton {
    Mode(GameMode),
    Duration(u32),
}

/// What a confirmed menu hold asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Start a round with this setup
    Start(RoundConfig),
    /// Timed-mode duration changed (stays on the menu)
    DurationSelected(u32),
}

/// Mode-select screen
#[derive(Debug, Clone)]
pub struct MenuScreen {
    machine: SelectionMachine<MenuButton>,
    targets: Vec<SelectionTarget<MenuButton>>,
    selected_duration: u32,
}

impl MenuScreen {
    pub fn new(targets: Vec<SelectionTarget<MenuButton>>, hold_ms: f64) -> Self {
        Self {
            machine: SelectionMachine::new(hold_ms),
            targets,
            selected_duration: DEFAULT_DURATION_SECS,
        }
    }

    /// Three mode cards across the middle, duration chips under the timed card
    pub fn default_layout(width: f32, height: f32) -> Vec<SelectionTarget<MenuButton>> {
        let card_w = width * 0.25;
        let card_h = height * 0.3;
        let gap = (width - card_w * 3.0) / 4.0;
        let top = height * 0.4;

        let modes = [GameMode::Timed, GameMode::Survival, GameMode::Dodge];
        let mut targets: Vec<_> = modes
            .iter()
            .enumerate()
            .map(|(i, mode)| {
                let x = gap + i as f32 * (card_w + gap);
                SelectionTarget::new(MenuButton::Mode(*mode), Rect::new(x, top, card_w, card_h))
            })
            .collect();

        let chip_w = card_w / DURATION_CHOICES.len() as f32;
        let chip_y = top + card_h + 10.0;
        for (i, secs) in DURATION_CHOICES.iter().enumerate() {
            targets.push(SelectionTarget::new(
                MenuButton::Duration(*secs),
                Rect::new(gap + i as f32 * chip_w, chip_y, chip_w - 4.0, height * 0.08),
            ));
        }
        targets
    }

    /// Replace button rectangles (e.g. after a resize)
    pub fn set_targets(&mut self, targets: Vec<SelectionTarget<MenuButton>>) {
        self.targets = targets;
        self.machine.reset();
    }

    pub fn selected_duration(&self) -> u32 {
        self.selected_duration
    }

    pub fn hovered(&self) -> Option<MenuButton> {
        self.machine.hovered()
    }

    pub fn hold_progress(&self) -> f32 {
        self.machine.progress()
    }

    pub fn update(&mut self, pointer: Option<Pointer>, now_ms: f64) -> Option<MenuAction> {
        let button = self.machine.update(pointer, &self.targets, now_ms)?;
        let action = match button {
            MenuButton::Mode(GameMode::Timed) => {
                MenuAction::Start(RoundConfig::timed(self.selected_duration))
            }
            MenuButton::Mode(GameMode::Survival) => MenuAction::Start(RoundConfig::survival()),
            MenuButton::Mode(GameMode::Dodge) => MenuAction::Start(RoundConfig::dodge()),
            MenuButton::Duration(secs) => {
                self.selected_duration = secs;
                MenuAction::DurationSelected(secs)
            }
        };
        log::info!("Menu action: {:?}", action);
        Some(action)
    }
}

/// Buttons on the results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultsButton {
    Restart,
    Home,
}

/// Results screen: hold to play again or go back to the menu
#[derive(Debug, Clone)]
pub struct ResultsScreen {
    machine: SelectionMachine<ResultsButton>,
    targets: Vec<SelectionTarget<ResultsButton>>,
}

impl ResultsScreen {
    pub fn new(targets: Vec<SelectionTarget<ResultsButton>>, hold_ms: f64) -> Self {
        Self {
            machine: SelectionMachine::new(hold_ms),
            targets,
        }
    }

    pub fn default_layout(width: f32, height: f32) -> Vec<SelectionTarget<ResultsButton>> {
        let w = width * 0.3;
        let h = height * 0.15;
        let y = height * 0.75;
        vec![
            SelectionTarget::new(ResultsButton::Restart, Rect::new(width * 0.15, y, w, h)),
            SelectionTarget::new(ResultsButton::Home, Rect::new(width * 0.55, y, w, h)),
        ]
    }

    pub fn hovered(&self) -> Option<ResultsButton> {
        self.machine.hovered()
    }

    pub fn hold_progress(&self) -> f32 {
        self.machine.progress()
    }

    pub fn update(&mut self, pointer: Option<Pointer>, now_ms: f64) -> Option<ResultsButton> {
        self.machine.update(pointer, &self.targets, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    fn fist_at(rect: Rect) -> Option<Pointer> {
        Some(Pointer {
            pos: rect.center(),
            grabbing: true,
        })
    }

    fn rect_of(targets: &[SelectionTarget<MenuButton>], id: MenuButton) -> Rect {
        targets.iter().find(|t| t.id == id).map(|t| t.rect).unwrap()
    }

    #[test]
    fn test_default_layout_targets_do_not_overlap() {
        let targets = MenuScreen::default_layout(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT);
        assert_eq!(targets.len(), 6);
        for a in &targets {
            let hits = targets.iter().filter(|b| b.rect.contains(a.rect.center())).count();
            assert_eq!(hits, 1, "{:?} overlaps another button", a.id);
        }
    }

    #[test]
    fn test_pick_duration_then_start_timed() {
        let targets = MenuScreen::default_layout(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT);
        let chip = rect_of(&targets, MenuButton::Duration(120));
        let card = rect_of(&targets, MenuButton::Mode(GameMode::Timed));
        let mut menu = MenuScreen::new(targets, 1500.0);

        assert_eq!(menu.update(fist_at(chip), 0.0), None);
        assert_eq!(
            menu.update(fist_at(chip), 1500.0),
            Some(MenuAction::DurationSelected(120))
        );
        assert_eq!(menu.selected_duration(), 120);

        assert_eq!(menu.update(fist_at(card), 2000.0), None);
        assert_eq!(
            menu.update(fist_at(card), 3500.0),
            Some(MenuAction::Start(RoundConfig::timed(120)))
        );
    }

    #[test]
    fn test_results_screen() {
        let targets = ResultsScreen::default_layout(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT);
        let home = targets[1].rect;
        let mut screen = ResultsScreen::new(targets, 3000.0);
        assert_eq!(screen.update(fist_at(home), 0.0), None);
        assert_eq!(screen.hovered(), Some(ResultsButton::Home));
        assert_eq!(screen.update(fist_at(home), 3000.0), Some(ResultsButton::Home));
    }
}
