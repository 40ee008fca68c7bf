use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const APP_DIR: &str = "race-replay";

/// A circuit that can be replayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSpec {
    pub id: String,
    pub label: String,
    /// Track geometry file, relative to the asset root
    pub track: String,
}

/// A driver and the files holding their data for each race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarSpec {
    pub name: String,
    pub image: String,
    #[serde(default = "default_livery")]
    pub color: [f32; 4],
    /// race id -> telemetry file
    pub telemetry: BTreeMap<String, String>,
}

fn default_livery() -> [f32; 4] {
    [0.9, 0.9, 0.9, 1.0]
}

/// Races and cars known to the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceCatalog {
    pub races: Vec<RaceSpec>,
    pub cars: Vec<CarSpec>,
}

impl RaceCatalog {
    /// Load a catalog from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read race catalog: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Invalid race catalog: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let catalog: RaceCatalog = serde_json::from_str(content)?;
        if catalog.races.is_empty() {
            anyhow::bail!("Catalog defines no races");
        }
        Ok(catalog)
    }

    pub fn race(&self, id: &str) -> Option<&RaceSpec> {
        self.races.iter().find(|r| r.id == id)
    }

    pub fn car(&self, name: &str) -> Option<&CarSpec> {
        self.cars.iter().find(|c| c.name == name)
    }

    pub fn race_index(&self, id: &str) -> Option<usize> {
        self.races.iter().position(|r| r.id == id)
    }

    /// Telemetry file for a car in a race
    pub fn telemetry_file(&self, car: &str, race: &str) -> Option<&str> {
        self.car(car)
            .and_then(|c| c.telemetry.get(race))
            .map(String::as_str)
    }

    /// Cars that have telemetry recorded for the given race
    pub fn cars_in(&self, race: &str) -> impl Iterator<Item = &CarSpec> + '_ {
        let race = race.to_string();
        self.cars
            .iter()
            .filter(move |c| c.telemetry.contains_key(&race))
    }
}

impl Default for RaceCatalog {
    fn default() -> Self {
        let race = |id: &str, label: &str, track: &str| RaceSpec {
            id: id.to_string(),
            label: label.to_string(),
            track: track.to_string(),
        };
        let car = |name: &str, image: &str, color: [f32; 4], files: [(&str, &str); 4]| CarSpec {
            name: name.to_string(),
            image: image.to_string(),
            color,
            telemetry: files
                .iter()
                .map(|(race, file)| (race.to_string(), file.to_string()))
                .collect(),
        };

        Self {
            races: vec![
                race("Monaco", "Monaco", "true_track_path.json"),
                race("Jeddah", "Jeddah", "Jeddah_path.json"),
                race("Canada", "Canada", "canada_track.json"),
                race("Miami", "Miami", "miami_track.json"),
            ],
            cars: vec![
                car(
                    "Leclerc",
                    "FerrariCar.png",
                    [0.86, 0.0, 0.0, 1.0],
                    [
                        ("Monaco", "telemetry_data.json"),
                        ("Jeddah", "telemetry_LEC_jeddah.json"),
                        ("Canada", "telemetry_LEC_canada.json"),
                        ("Miami", "telemetry_LEC_miami.json"),
                    ],
                ),
                car(
                    "Piastri",
                    "FerrariCar.png",
                    [1.0, 0.53, 0.0, 1.0],
                    [
                        ("Monaco", "telemetry_PIAdata.json"),
                        ("Jeddah", "telemetry_PIA_jeddah.json"),
                        ("Canada", "telemetry_PIA_canada.json"),
                        ("Miami", "telemetry_PIA_miami.json"),
                    ],
                ),
                car(
                    "Stroll",
                    "AstonMartinf1Car.png",
                    [0.0, 0.44, 0.38, 1.0],
                    [
                        ("Monaco", "telemetry_STRdata.json"),
                        ("Jeddah", "telemetry_STR_jeddah.json"),
                        ("Canada", "telemetry_STR_canada.json"),
                        ("Miami", "telemetry_STR_miami.json"),
                    ],
                ),
            ],
        }
    }
}

/// How world coordinates are painted onto the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// World units to canvas pixels
    pub scale: f32,
    pub car_width: f32,
    pub car_height: f32,
    pub track_color: [f32; 4],
    pub track_thickness: f32,
    pub background: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            car_width: 30.0,
            car_height: 15.0,
            track_color: [1.0, 0.0, 0.0, 1.0],
            track_thickness: 2.0,
            background: [0.08, 0.08, 0.08, 1.0],
        }
    }
}

/// Persistent application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub show_race_control: bool,
    pub show_circuit: bool,
    pub show_telemetry: bool,
    pub last_race: Option<String>,
    pub catalog_path: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            show_race_control: true,
            show_circuit: true,
            show_telemetry: true,
            last_race: None,
            catalog_path: None,
        }
    }
}

impl AppSettings {
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Read settings, falling back to defaults when the file is absent or unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|contents| serde_json::from_str(&contents).map_err(anyhow::Error::from))
        {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring unreadable settings {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Load the saved catalog and the directory its assets live in.
    ///
    /// A catalog that fails to load is forgotten, so the next save does not
    /// write the bad path back.
    pub fn load_catalog(&mut self) -> Result<Option<(RaceCatalog, PathBuf)>> {
        let Some(path) = self.catalog_path.clone() else {
            return Ok(None);
        };
        match RaceCatalog::load(&path) {
            Ok(catalog) => Ok(Some((catalog, catalog_root(&path)))),
            Err(e) => {
                self.catalog_path = None;
                Err(e)
            }
        }
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Err(e) = self.save_to(&path) {
                warn!("Failed to save settings: {:#}", e);
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Asset files are resolved next to the catalog that names them
pub fn catalog_root(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_covers_every_race() {
        let catalog = RaceCatalog::default();
        assert_eq!(catalog.races.len(), 4);
        for race in &catalog.races {
            assert_eq!(catalog.cars_in(&race.id).count(), 3, "race {}", race.id);
        }
        assert_eq!(
            catalog.telemetry_file("Stroll", "Miami"),
            Some("telemetry_STR_miami.json")
        );
        assert_eq!(catalog.telemetry_file("Stroll", "Imola"), None);
    }

    #[test]
    fn test_parse_catalog() {
        let json = r#"{
            "races": [{"id": "Spa", "label": "Belgium", "track": "spa.json"}],
            "cars": [{"name": "Norris", "image": "mclaren.png",
                      "telemetry": {"Spa": "nor_spa.json"}}]
        }"#;
        let catalog = RaceCatalog::parse(json).unwrap();
        assert_eq!(catalog.race("Spa").map(|r| r.label.as_str()), Some("Belgium"));
        assert_eq!(catalog.car("Norris").unwrap().color, default_livery());
    }

    #[test]
    fn test_catalog_without_races_is_rejected() {
        assert!(RaceCatalog::parse(r#"{"races": [], "cars": []}"#).is_err());
    }

    #[test]
    fn test_settings_roundtrip_through_file() {
        let dir = std::env::temp_dir().join(format!("race-replay-settings-{}", std::process::id()));
        let path = dir.join("settings.json");
        let settings = AppSettings {
            show_telemetry: false,
            last_race: Some("Jeddah".to_string()),
            ..AppSettings::default()
        };
        settings.save_to(&path).unwrap();

        let loaded = AppSettings::load_from(&path);
        assert!(!loaded.show_telemetry);
        assert_eq!(loaded.last_race.as_deref(), Some("Jeddah"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unloadable_catalog_path_is_forgotten() {
        let mut settings = AppSettings {
            catalog_path: Some(PathBuf::from("/nonexistent/race-replay/catalog.json")),
            ..AppSettings::default()
        };
        assert!(settings.load_catalog().is_err());
        assert_eq!(settings.catalog_path, None);
        assert!(matches!(settings.load_catalog(), Ok(None)));
    }

    #[test]
    fn test_saved_catalog_loads_with_its_root() {
        let dir = std::env::temp_dir().join(format!("race-replay-catalog-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.json");
        fs::write(&path, r#"{"races": [{"id": "Spa", "label": "Belgium", "track": "spa.json"}], "cars": []}"#).unwrap();

        let mut settings = AppSettings {
            catalog_path: Some(path.clone()),
            ..AppSettings::default()
        };
        let (catalog, root) = settings.load_catalog().unwrap().unwrap();
        assert!(catalog.race("Spa").is_some());
        assert_eq!(root, dir);
        assert_eq!(settings.catalog_path, Some(path));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_settings_fall_back_to_defaults() {
        let settings = AppSettings::load_from(Path::new("/nonexistent/race-replay/settings.json"));
        assert!(settings.show_circuit);
        assert_eq!(settings.last_race, None);
    }
}
