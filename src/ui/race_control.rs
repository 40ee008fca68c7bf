use imgui::{Condition, Ui};

use crate::config::RaceCatalog;
use crate::playback::{PlaybackState, VisibilityMap};
use crate::session::LoadStatus;

/// User requests raised by the race control window
#[derive(Debug, Clone, PartialEq)]
pub enum RaceControlAction {
    SwitchRace(String),
    Restart,
    SetVisible { car: String, visible: bool },
}

/// Race selector, car visibility toggles and lap restart
#[derive(Default)]
pub struct RaceControlWindow {
    selected: usize,
}

impl RaceControlWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the selector at a race without raising an action
    pub fn select(&mut self, catalog: &RaceCatalog, race_id: &str) {
        if let Some(index) = catalog.race_index(race_id) {
            self.selected = index;
        }
    }

    pub fn selected_race<'a>(&self, catalog: &'a RaceCatalog) -> Option<&'a str> {
        catalog.races.get(self.selected).map(|r| r.id.as_str())
    }

    pub fn render(
        &mut self,
        ui: &Ui,
        catalog: &RaceCatalog,
        visibility: &VisibilityMap,
        status: &LoadStatus,
        playback: PlaybackState,
        opened: &mut bool,
    ) -> Vec<RaceControlAction> {
        let mut actions = Vec::new();

        ui.window("Race Control")
            .size([320.0, 220.0], Condition::FirstUseEver)
            .position([20.0, 30.0], Condition::FirstUseEver)
            .opened(opened)
            .build(|| {
                let labels: Vec<&str> = catalog.races.iter().map(|r| r.label.as_str()).collect();
                if ui.combo_simple_string("Race", &mut self.selected, &labels) {
                    if let Some(race) = catalog.races.get(self.selected) {
                        actions.push(RaceControlAction::SwitchRace(race.id.clone()));
                    }
                }

                ui.separator();
                ui.text("Cars");
                if let Some(race_id) = self.selected_race(catalog) {
                    for car in catalog.cars_in(race_id) {
                        let mut visible = visibility.is_visible(&car.name);
                        if ui.checkbox(&car.name, &mut visible) {
                            actions.push(RaceControlAction::SetVisible {
                                car: car.name.clone(),
                                visible,
                            });
                        }
                    }
                }

                ui.separator();
                if ui.button("Restart Lap") {
                    actions.push(RaceControlAction::Restart);
                }
                ui.same_line();
                match playback {
                    PlaybackState::Running => ui.text_colored([0.3, 1.0, 0.3, 1.0], "Running"),
                    PlaybackState::Idle => ui.text_disabled("Idle"),
                }

                match status {
                    LoadStatus::NoSelection => ui.text_disabled("Select a race to begin"),
                    LoadStatus::Loading(race) => {
                        ui.text_colored([1.0, 0.8, 0.3, 1.0], format!("Loading {}...", race))
                    }
                    LoadStatus::Ready(race) => ui.text(format!("Loaded {}", race)),
                    LoadStatus::Failed(e) => ui.text_colored([1.0, 0.4, 0.4, 1.0], format!("Load failed: {}", e)),
                }
            });

        actions
    }
}
