//! # Classification
//!
//! Fixed affine transforms from extracted features to domain quantities, and
//! threshold bands / predicates from those quantities to a closed set of
//! categories. All internal values keep full precision; rounding happens when
//! results are reported.

use serde::Serialize;

use crate::features::{BodyFeatures, MealFeatures};

/// Inclusive upper bounds on body fat for each band, in ascending order.
const BODY_FAT_BANDS: [(f64, BodyCategory); 4] = [
    (13.5, BodyCategory::VeryAthletic),
    (17.0, BodyCategory::Athletic),
    (22.0, BodyCategory::Balanced),
    (26.0, BodyCategory::Full),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyCategory {
    VeryAthletic,
    Athletic,
    Balanced,
    Full,
    HighFat,
}

/// Advice texts are shared between the two athletic bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyAdvice {
    Athletic,
    Balanced,
    Full,
    HighFat,
}

impl BodyCategory {
    pub const ALL: [BodyCategory; 5] = [
        BodyCategory::VeryAthletic,
        BodyCategory::Athletic,
        BodyCategory::Balanced,
        BodyCategory::Full,
        BodyCategory::HighFat,
    ];

    /// Picks the band for a body-fat percentage.
    pub fn from_body_fat(body_fat_pct: f64) -> Self {
        BODY_FAT_BANDS
            .iter()
            .find(|(upper, _)| body_fat_pct <= *upper)
            .map(|(_, category)| *category)
            .unwrap_or(BodyCategory::HighFat)
    }

    pub fn advice(self) -> BodyAdvice {
        match self {
            BodyCategory::VeryAthletic | BodyCategory::Athletic => BodyAdvice::Athletic,
            BodyCategory::Balanced => BodyAdvice::Balanced,
            BodyCategory::Full => BodyAdvice::Full,
            BodyCategory::HighFat => BodyAdvice::HighFat,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BodyCategory::VeryAthletic => "very_athletic",
            BodyCategory::Athletic => "athletic",
            BodyCategory::Balanced => "balanced",
            BodyCategory::Full => "full",
            BodyCategory::HighFat => "high_fat",
        }
    }

    /// Catalog key of the display label.
    pub fn label_key(self) -> &'static str {
        match self {
            BodyCategory::VeryAthletic => "body-shape-very-athletic",
            BodyCategory::Athletic => "body-shape-athletic",
            BodyCategory::Balanced => "body-shape-balanced",
            BodyCategory::Full => "body-shape-full",
            BodyCategory::HighFat => "body-shape-high-fat",
        }
    }
}

impl BodyAdvice {
    pub const ALL: [BodyAdvice; 4] = [
        BodyAdvice::Athletic,
        BodyAdvice::Balanced,
        BodyAdvice::Full,
        BodyAdvice::HighFat,
    ];

    pub fn message_key(self) -> &'static str {
        match self {
            BodyAdvice::Athletic => "body-advice-athletic",
            BodyAdvice::Balanced => "body-advice-balanced",
            BodyAdvice::Full => "body-advice-full",
            BodyAdvice::HighFat => "body-advice-high-fat",
        }
    }
}

/// Physical estimates derived from the upper-half luminance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyEstimate {
    /// 12..=28
    pub body_fat_pct: f64,
    /// 30..=50
    pub muscle_mass_pct: f64,
    /// 20..=30
    pub bmi: f64,
    pub aspect_ratio: f64,
    pub category: BodyCategory,
}

impl BodyEstimate {
    pub fn from_features(features: &BodyFeatures) -> Self {
        let rel = features.relative_luminance;
        let body_fat_pct = 12.0 + rel * 16.0;
        let muscle_mass_pct = 30.0 + (1.0 - rel) * 20.0;
        let bmi = 20.0 + (body_fat_pct - 12.0) * (10.0 / 16.0);

        Self {
            body_fat_pct,
            muscle_mass_pct,
            bmi,
            aspect_ratio: features.aspect_ratio,
            category: BodyCategory::from_body_fat(body_fat_pct),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MealCategory {
    HighCal,
    Light,
    Moderate,
}

/// Fixed nutrition values attached to a meal category, in kcal and grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Macros {
    pub calories: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fats_g: u32,
}

impl MealCategory {
    pub const ALL: [MealCategory; 3] = [
        MealCategory::HighCal,
        MealCategory::Light,
        MealCategory::Moderate,
    ];

    /// Resolves the two predicates. When both or neither fire the meal is
    /// reported as moderate.
    pub fn resolve(is_high_cal: bool, is_light: bool) -> Self {
        match (is_high_cal, is_light) {
            (true, false) => MealCategory::HighCal,
            (false, true) => MealCategory::Light,
            _ => MealCategory::Moderate,
        }
    }

    pub fn macros(self) -> Macros {
        match self {
            MealCategory::HighCal => Macros {
                calories: 800,
                protein_g: 30,
                carbs_g: 95,
                fats_g: 40,
            },
            MealCategory::Light => Macros {
                calories: 280,
                protein_g: 10,
                carbs_g: 30,
                fats_g: 8,
            },
            MealCategory::Moderate => Macros {
                calories: 550,
                protein_g: 25,
                carbs_g: 60,
                fats_g: 18,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MealCategory::HighCal => "high_cal",
            MealCategory::Light => "light",
            MealCategory::Moderate => "moderate",
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            MealCategory::HighCal => "meal-name-high-cal",
            MealCategory::Light => "meal-name-light",
            MealCategory::Moderate => "meal-name-moderate",
        }
    }

    pub fn advice_key(self) -> &'static str {
        match self {
            MealCategory::HighCal => "meal-advice-high-cal",
            MealCategory::Light => "meal-advice-light",
            MealCategory::Moderate => "meal-advice-moderate",
        }
    }
}

/// `yellow_score >= 0.3 && brightness_norm > 0.25`
pub fn is_high_cal(features: &MealFeatures) -> bool {
    features.yellow_score >= 0.3 && features.brightness_norm > 0.25
}

/// `green_score >= 0.55 && yellow_score < 0.2`
pub fn is_light(features: &MealFeatures) -> bool {
    features.green_score >= 0.55 && features.yellow_score < 0.2
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MealEstimate {
    pub category: MealCategory,
    pub macros: Macros,
}

impl MealEstimate {
    pub fn from_features(features: &MealFeatures) -> Self {
        let category = MealCategory::resolve(is_high_cal(features), is_light(features));
        Self {
            category,
            macros: category.macros(),
        }
    }
}
