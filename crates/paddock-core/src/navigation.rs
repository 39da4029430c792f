//! Navigation state machine over the catalogue
//!
//! `NavigationState` only knows which team and car are selected and whether
//! the info panel is open. Resetting extent and camera on a transition is the
//! session's job.

use std::fmt;

use crate::catalogue::{CarDescriptor, Catalogue, Team};

/// Monotonic counter identifying which transition a pipeline run belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    team_key: String,
    team_index: usize,
    car_index: usize,
    info_visible: bool,
}

impl NavigationState {
    /// First car of the first team, info panel closed
    pub fn initial(catalogue: &Catalogue) -> Self {
        Self {
            team_key: catalogue.first_team().key.clone(),
            team_index: 0,
            car_index: 0,
            info_visible: false,
        }
    }

    /// Switch to team `key` and its first car. Returns `false` for an
    /// unknown key, leaving the state untouched.
    pub fn select_team(&mut self, catalogue: &Catalogue, key: &str) -> bool {
        let Some(index) = catalogue.team_index(key) else {
            return false;
        };
        self.team_key = key.to_string();
        self.team_index = index;
        self.car_index = 0;
        self.info_visible = false;
        true
    }

    pub fn next(&mut self, catalogue: &Catalogue) {
        let count = self.team(catalogue).cars.len();
        self.car_index = (self.car_index + 1) % count;
        self.info_visible = false;
    }

    pub fn previous(&mut self, catalogue: &Catalogue) {
        let count = self.team(catalogue).cars.len();
        self.car_index = (self.car_index + count - 1) % count;
        self.info_visible = false;
    }

    pub fn toggle_info(&mut self) {
        self.info_visible = !self.info_visible;
    }

    pub fn team_key(&self) -> &str {
        &self.team_key
    }

    pub fn car_index(&self) -> usize {
        self.car_index
    }

    pub fn info_visible(&self) -> bool {
        self.info_visible
    }

    pub fn team<'a>(&self, catalogue: &'a Catalogue) -> &'a Team {
        catalogue.team_at(self.team_index)
    }

    pub fn car<'a>(&self, catalogue: &'a Catalogue) -> &'a CarDescriptor {
        &self.team(catalogue).cars[self.car_index]
    }
}
