//! Vehicle catalogue - teams and their cars
//!
//! The catalogue is an immutable value loaded from TOML and injected into the
//! viewing session. Specs and race statistics are inert display data; none
//! of the viewing pipeline reads them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Catalogue shipped with the viewer, used when no file is configured
const BUILTIN_CATALOGUE: &str = include_str!("../catalogue.toml");

#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("Failed to read catalogue: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse catalogue: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Catalogue contains no teams")]
    Empty,
    #[error("Team {0} has no cars")]
    EmptyTeam(String),
    #[error("Duplicate team key: {0}")]
    DuplicateTeam(String),
    #[error("Team {team} has invalid accent color {value:?} (expected #RRGGBB)")]
    InvalidAccentColor { team: String, value: String },
    #[error("Car {car} of team {team} has an empty model path")]
    EmptyPath { team: String, car: String },
}

/// Technical specifications, rendered verbatim in the info panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarSpecs {
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub top_speed: Option<String>,
    #[serde(default)]
    pub chassis: Option<String>,
}

impl CarSpecs {
    /// Labelled entries that are present, in display order
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("Engine", &self.engine),
            ("Power", &self.power),
            ("Weight", &self.weight),
            ("Top speed", &self.top_speed),
            ("Chassis", &self.chassis),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }
}

/// Season results, rendered verbatim in the info panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceStats {
    #[serde(default)]
    pub races: Option<u32>,
    #[serde(default)]
    pub wins: Option<u32>,
    #[serde(default)]
    pub podiums: Option<u32>,
    #[serde(default)]
    pub poles: Option<u32>,
    #[serde(default)]
    pub fastest_laps: Option<u32>,
    #[serde(default)]
    pub championships: Option<u32>,
}

impl RaceStats {
    /// Labelled entries that are present, in display order
    pub fn entries(&self) -> Vec<(&'static str, u32)> {
        [
            ("Races", self.races),
            ("Wins", self.wins),
            ("Podiums", self.podiums),
            ("Poles", self.poles),
            ("Fastest laps", self.fastest_laps),
            ("Championships", self.championships),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect()
    }
}

/// A single car in a team's lineup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarDescriptor {
    pub name: String,
    /// Model path, relative to the asset root
    pub path: String,
    pub year: u16,
    #[serde(default)]
    pub specs: Option<CarSpecs>,
    #[serde(default)]
    pub race_stats: Option<RaceStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Stable identifier used for navigation
    pub key: String,
    pub name: String,
    /// Hex color, `#RRGGBB`
    pub accent_color: String,
    #[serde(rename = "car", default)]
    pub cars: Vec<CarDescriptor>,
}

impl Team {
    /// Accent color as RGB bytes, `None` if malformed
    pub fn accent_rgb(&self) -> Option<[u8; 3]> {
        parse_hex_color(&self.accent_color)
    }
}

fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Ordered, validated list of teams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
    #[serde(rename = "team", default)]
    teams: Vec<Team>,
}

impl Catalogue {
    /// Build a catalogue from teams, validating it
    pub fn new(teams: Vec<Team>) -> Result<Self, CatalogueError> {
        let catalogue = Self { teams };
        catalogue.validate()?;
        Ok(catalogue)
    }

    /// Parse and validate a catalogue from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, CatalogueError> {
        let catalogue: Catalogue = toml::from_str(content)?;
        catalogue.validate()?;
        Ok(catalogue)
    }

    /// Load and validate a catalogue from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, CatalogueError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// The catalogue bundled with the crate
    pub fn builtin() -> Result<Self, CatalogueError> {
        Self::from_toml(BUILTIN_CATALOGUE)
    }

    fn validate(&self) -> Result<(), CatalogueError> {
        if self.teams.is_empty() {
            return Err(CatalogueError::Empty);
        }

        let mut keys = HashSet::new();
        for team in &self.teams {
            if !keys.insert(team.key.as_str()) {
                return Err(CatalogueError::DuplicateTeam(team.key.clone()));
            }
            if team.cars.is_empty() {
                return Err(CatalogueError::EmptyTeam(team.key.clone()));
            }
            if team.accent_rgb().is_none() {
                return Err(CatalogueError::InvalidAccentColor {
                    team: team.key.clone(),
                    value: team.accent_color.clone(),
                });
            }
            if let Some(car) = team.cars.iter().find(|c| c.path.trim().is_empty()) {
                return Err(CatalogueError::EmptyPath {
                    team: team.key.clone(),
                    car: car.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Position of the team with `key`
    pub fn team_index(&self, key: &str) -> Option<usize> {
        self.teams.iter().position(|t| t.key == key)
    }

    pub fn team(&self, key: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.key == key)
    }

    /// Team by position; panics on an index not obtained from this catalogue
    pub fn team_at(&self, index: usize) -> &Team {
        &self.teams[index]
    }

    pub fn first_team(&self) -> &Team {
        &self.teams[0]
    }

    /// Every model path, team by team, in catalogue order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.teams
            .iter()
            .flat_map(|t| t.cars.iter().map(|c| c.path.as_str()))
    }

    pub fn car_count(&self) -> usize {
        self.teams.iter().map(|t| t.cars.len()).sum()
    }
}
