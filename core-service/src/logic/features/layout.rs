//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The classifier was trained on the eight clinical measurements in exactly
//! this order. Every artifact (model, scaler) is checked against it.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    "pregnancies",                // 0: Number of pregnancies
    "glucose",                    // 1: Plasma glucose concentration
    "blood_pressure",             // 2: Diastolic blood pressure (mm Hg)
    "skin_thickness",             // 3: Triceps skin fold thickness (mm)
    "insulin",                    // 4: 2-hour serum insulin (IU/ml)
    "bmi",                        // 5: Body mass index
    "diabetes_pedigree_function", // 6: Hereditary risk score
    "age",                        // 7: Age in years
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 8;

/// Accepted domain and form default for one field
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Whole numbers only (counts, years)
    pub integer: bool,
}

impl FieldSpec {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max && (!self.integer || value.fract() == 0.0)
    }
}

/// Domain of every field, same order as FEATURE_LAYOUT
pub const FIELD_SPECS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec { name: "pregnancies", label: "Number of Pregnancies", min: 0.0, max: 20.0, default: 0.0, integer: true },
    FieldSpec { name: "glucose", label: "Glucose Level", min: 0.0, max: 200.0, default: 120.0, integer: false },
    FieldSpec { name: "blood_pressure", label: "Blood Pressure (mm Hg)", min: 0.0, max: 150.0, default: 70.0, integer: false },
    FieldSpec { name: "skin_thickness", label: "Skin Thickness (mm)", min: 0.0, max: 100.0, default: 20.0, integer: false },
    FieldSpec { name: "insulin", label: "Insulin Level (IU/ml)", min: 0.0, max: 900.0, default: 79.0, integer: false },
    FieldSpec { name: "bmi", label: "BMI", min: 0.0, max: 70.0, default: 25.0, integer: false },
    FieldSpec { name: "diabetes_pedigree_function", label: "Diabetes Pedigree Function", min: 0.0, max: 3.0, default: 0.5, integer: false },
    FieldSpec { name: "age", label: "Age", min: 1.0, max: 120.0, default: 33.0, integer: true },
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

static LAYOUT_HASH: Lazy<u32> = Lazy::new(compute_layout_hash);

/// Compute CRC32 hash of the feature layout
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get layout hash (computed once)
pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Check a declared list of feature names against the layout.
///
/// Returns a human-readable reason on mismatch.
pub fn check_feature_names<S: AsRef<str>>(names: &[S]) -> Result<(), String> {
    if names.len() != FEATURE_COUNT {
        return Err(format!(
            "declares {} feature names, expected {}",
            names.len(),
            FEATURE_COUNT
        ));
    }

    for (i, (declared, expected)) in names.iter().zip(FEATURE_LAYOUT).enumerate() {
        if !same_feature(declared.as_ref(), expected) {
            return Err(format!(
                "feature {} is '{}', expected '{}'",
                i,
                declared.as_ref(),
                expected
            ));
        }
    }

    Ok(())
}

/// Names exported by training tools are often CamelCase (`BloodPressure`).
fn same_feature(declared: &str, expected: &str) -> bool {
    let normalize = |s: &str| -> String {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect()
    };
    normalize(declared) == normalize(expected)
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 8);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
        assert_eq!(FIELD_SPECS.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_field_specs_follow_layout() {
        for (spec, name) in FIELD_SPECS.iter().zip(FEATURE_LAYOUT) {
            assert_eq!(spec.name, *name);
            assert!(spec.contains(spec.default), "default of {} out of range", spec.name);
        }
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_check_feature_names_accepts_training_spelling() {
        let names = [
            "Pregnancies", "Glucose", "BloodPressure", "SkinThickness",
            "Insulin", "BMI", "DiabetesPedigreeFunction", "Age",
        ];
        assert!(check_feature_names(&names).is_ok());
    }

    #[test]
    fn test_check_feature_names_rejects_reordering() {
        let names = [
            "glucose", "pregnancies", "blood_pressure", "skin_thickness",
            "insulin", "bmi", "diabetes_pedigree_function", "age",
        ];
        let err = check_feature_names(&names).unwrap_err();
        assert!(err.contains("feature 0"));
    }

    #[test]
    fn test_check_feature_names_rejects_wrong_count() {
        assert!(check_feature_names(&FEATURE_LAYOUT[..7]).is_err());
    }

    #[test]
    fn test_integer_fields_reject_fractions() {
        let pregnancies = FIELD_SPECS[0];
        assert!(pregnancies.contains(3.0));
        assert!(!pregnancies.contains(2.5));
        assert!(!pregnancies.contains(21.0));
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("pregnancies"), Some(0));
        assert_eq!(feature_index("bmi"), Some(5));
        assert_eq!(feature_index("age"), Some(7));
        assert_eq!(feature_index("nonexistent"), None);
        assert_eq!(feature_name(6), Some("diabetes_pedigree_function"));
        assert_eq!(feature_name(8), None);
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
    }
}
