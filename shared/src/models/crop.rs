//! Crop and soil reference data

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_key;

/// Canonical key of the crop used when a name is not recognised
pub const DEFAULT_CROP: &str = "wheat";

/// Multiplier applied for soils missing from the table
pub const DEFAULT_SOIL_MULTIPLIER: f64 = 1.0;

/// Days between waterings for crops without an interval entry
pub const DEFAULT_IRRIGATION_INTERVAL_DAYS: u32 = 3;

/// Daily water need (L/m²) for crops without a base-need entry
pub const DEFAULT_BASE_WATER_NEED: f64 = 5.0;

/// Canonical soil key treated as sandy by the basic schedule
pub const SANDY_SOIL: &str = "sandy";

/// Canonical soil key treated as clay by the basic schedule
pub const CLAY_SOIL: &str = "clay";

/// Agronomic reference profile of a crop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    /// Lower daily water bound (L/m²/day)
    pub water_min: f64,
    /// Upper daily water bound (L/m²/day)
    pub water_max: f64,
    pub temp_optimal: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Optimal relative humidity (%)
    pub humidity_optimal: f64,
}

impl CropProfile {
    pub const fn new(
        water_min: f64,
        water_max: f64,
        temp_optimal: f64,
        temp_min: f64,
        temp_max: f64,
        humidity_optimal: f64,
    ) -> Self {
        Self {
            water_min,
            water_max,
            temp_optimal,
            temp_min,
            temp_max,
            humidity_optimal,
        }
    }

    /// Midpoint of the water bounds
    pub fn base_water(&self) -> f64 {
        (self.water_min + self.water_max) / 2.0
    }

    /// Copy of this profile with the water bounds replaced
    pub fn with_water_bounds(self, water_min: f64, water_max: f64) -> Self {
        Self {
            water_min,
            water_max,
            ..self
        }
    }
}

/// Per-crop table row: profile, watering interval and base daily need
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropReference {
    pub profile: CropProfile,
    pub interval_days: u32,
    pub base_water_need: f64,
}

/// Immutable crop and soil lookup tables.
///
/// All lookups normalize the given name and resolve aliases before
/// consulting the tables, and every lookup falls back to a documented
/// default instead of failing.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    crops: HashMap<String, CropProfile>,
    intervals: HashMap<String, u32>,
    base_water: HashMap<String, f64>,
    soils: HashMap<String, f64>,
    aliases: HashMap<String, String>,
    default_crop: CropProfile,
}

impl ReferenceTables {
    /// Empty tables that resolve every crop to `default_crop`
    pub fn new(default_crop: CropProfile) -> Self {
        Self {
            crops: HashMap::new(),
            intervals: HashMap::new(),
            base_water: HashMap::new(),
            soils: HashMap::new(),
            aliases: HashMap::new(),
            default_crop,
        }
    }

    pub fn with_crop(mut self, name: &str, reference: CropReference) -> Self {
        let key = normalize_key(name);
        self.crops.insert(key.clone(), reference.profile);
        self.intervals.insert(key.clone(), reference.interval_days);
        self.base_water.insert(key, reference.base_water_need);
        self
    }

    pub fn with_soil(mut self, name: &str, multiplier: f64) -> Self {
        self.soils.insert(normalize_key(name), multiplier);
        self
    }

    /// Register an alternative spelling (e.g. a localized name) for a key
    pub fn with_alias(mut self, alias: &str, canonical: &str) -> Self {
        self.aliases
            .insert(normalize_key(alias), normalize_key(canonical));
        self
    }

    /// Normalized, alias-resolved lookup key for a crop or soil name
    pub fn resolve(&self, name: &str) -> String {
        let key = normalize_key(name);
        match self.aliases.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }

    pub fn is_known_crop(&self, name: &str) -> bool {
        self.crops.contains_key(&self.resolve(name))
    }

    /// Crop profile, or the default crop's profile for unknown names
    pub fn crop_profile(&self, name: &str) -> CropProfile {
        self.crops
            .get(&self.resolve(name))
            .copied()
            .unwrap_or(self.default_crop)
    }

    /// Soil water-retention multiplier, 1.0 for unknown soils
    pub fn soil_multiplier(&self, name: &str) -> f64 {
        self.soils
            .get(&self.resolve(name))
            .copied()
            .unwrap_or(DEFAULT_SOIL_MULTIPLIER)
    }

    /// Days between waterings, 3 for unknown crops
    pub fn irrigation_interval(&self, name: &str) -> u32 {
        self.intervals
            .get(&self.resolve(name))
            .copied()
            .unwrap_or(DEFAULT_IRRIGATION_INTERVAL_DAYS)
    }

    /// Base daily water need (L/m²), 5.0 for unknown crops
    pub fn base_water_need(&self, name: &str) -> f64 {
        self.base_water
            .get(&self.resolve(name))
            .copied()
            .unwrap_or(DEFAULT_BASE_WATER_NEED)
    }

    /// Iterate over `(key, profile)` pairs of all known crops
    pub fn crops(&self) -> impl Iterator<Item = (&str, &CropProfile)> {
        self.crops.iter().map(|(key, profile)| (key.as_str(), profile))
    }

    /// Built-in tables for field crops and vegetables of the Anatolian
    /// growing regions, with Turkish aliases.
    pub fn builtin() -> Self {
        const WHEAT: CropProfile = CropProfile::new(3.0, 6.0, 20.0, 5.0, 30.0, 50.0);

        let crops: [(&str, &str, CropReference); 13] = [
            ("wheat", "buğday", crop(WHEAT, 4, 4.5)),
            ("barley", "arpa", crop(CropProfile::new(2.5, 5.0, 18.0, 4.0, 28.0, 50.0), 5, 4.0)),
            ("corn", "mısır", crop(CropProfile::new(5.0, 9.0, 27.0, 10.0, 35.0, 60.0), 3, 6.5)),
            ("cotton", "pamuk", crop(CropProfile::new(6.0, 10.0, 28.0, 15.0, 38.0, 55.0), 4, 7.0)),
            ("sunflower", "ayçiçeği", crop(CropProfile::new(4.0, 7.0, 24.0, 8.0, 34.0, 55.0), 5, 5.0)),
            ("potato", "patates", crop(CropProfile::new(4.0, 7.0, 18.0, 7.0, 28.0, 70.0), 3, 5.0)),
            ("sugar beet", "şeker pancarı", crop(CropProfile::new(5.0, 8.0, 22.0, 6.0, 32.0, 65.0), 4, 6.0)),
            ("tomato", "domates", crop(CropProfile::new(5.0, 8.0, 25.0, 10.0, 35.0, 60.0), 2, 6.0)),
            ("pepper", "biber", crop(CropProfile::new(4.0, 7.0, 24.0, 12.0, 33.0, 65.0), 2, 5.5)),
            ("cucumber", "salatalık", crop(CropProfile::new(5.0, 8.0, 24.0, 12.0, 32.0, 70.0), 2, 6.0)),
            ("watermelon", "karpuz", crop(CropProfile::new(5.0, 8.0, 27.0, 15.0, 35.0, 60.0), 3, 6.0)),
            ("grape", "üzüm", crop(CropProfile::new(3.0, 6.0, 25.0, 10.0, 35.0, 55.0), 7, 4.0)),
            ("olive", "zeytin", crop(CropProfile::new(2.0, 4.0, 22.0, 5.0, 38.0, 45.0), 10, 3.0)),
        ];

        let soils: [(&str, &str, f64); 8] = [
            (SANDY_SOIL, "kumlu", 1.3),
            ("loamy sand", "kumlu tın", 1.15),
            ("loam", "tınlı", 1.0),
            ("silt", "siltli", 0.95),
            ("clay loam", "killi tın", 0.9),
            (CLAY_SOIL, "killi", 0.8),
            ("peat", "turbalı", 0.85),
            ("calcareous", "kireçli", 1.1),
        ];

        let tables = crops.into_iter().fold(
            Self::new(WHEAT),
            |tables, (name, alias, reference)| {
                tables.with_crop(name, reference).with_alias(alias, name)
            },
        );

        soils
            .into_iter()
            .fold(tables, |tables, (name, alias, multiplier)| {
                tables.with_soil(name, multiplier).with_alias(alias, name)
            })
            .with_alias("maize", "corn")
            .with_alias("tın", "loam")
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::builtin()
    }
}

const fn crop(profile: CropProfile, interval_days: u32, base_water_need: f64) -> CropReference {
    CropReference {
        profile,
        interval_days,
        base_water_need,
    }
}
