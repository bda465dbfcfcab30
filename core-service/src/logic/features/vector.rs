//! Feature Vector - Core data structure for ML input
//!
//! **Versioned feature vector with layout validation**
//!
//! Uses centralized layout from `layout.rs` for:
//! - Consistent feature ordering
//! - Version tracking
//! - Domain checks per field

use serde::{Deserialize, Serialize};

use super::layout::{
    feature_index, layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, FIELD_SPECS,
};
use crate::logic::error::InvalidInputError;

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned Feature Vector with layout metadata
///
/// The fixed array makes a wrong dimensionality unrepresentable once built;
/// untrusted input goes through [`FeatureVector::from_slice`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Vector holding the form defaults
    pub fn new() -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, spec) in values.iter_mut().zip(FIELD_SPECS.iter()) {
            *slot = spec.default;
        }
        Self::from_values(values)
    }

    /// Create from raw values with current version
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Create from an untrusted slice. Rejects wrong lengths and non-finite values.
    pub fn from_slice(values: &[f64]) -> Result<Self, InvalidInputError> {
        if values.len() != FEATURE_COUNT {
            return Err(InvalidInputError::Dimension {
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }

        let mut array = [0.0f64; FEATURE_COUNT];
        for (i, &v) in values.iter().enumerate() {
            if !v.is_finite() {
                return Err(InvalidInputError::NotFinite { field: FEATURE_LAYOUT[i] });
            }
            array[i] = v;
        }

        Ok(Self::from_values(array))
    }

    /// Get values as array reference
    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Get values as slice
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(name).and_then(|i| self.get(i))
    }

    /// Set feature by index
    pub fn set(&mut self, index: usize, value: f64) {
        if index < FEATURE_COUNT {
            self.values[index] = value;
        }
    }

    /// Set feature by name
    pub fn set_by_name(&mut self, name: &str, value: f64) -> bool {
        if let Some(index) = feature_index(name) {
            self.set(index, value);
            true
        } else {
            false
        }
    }

    /// Check every value against the field domains.
    ///
    /// The form collector calls this before handing the vector to the core.
    pub fn validate_ranges(&self) -> Result<(), InvalidInputError> {
        for (spec, &value) in FIELD_SPECS.iter().zip(self.values.iter()) {
            if !value.is_finite() {
                return Err(InvalidInputError::NotFinite { field: spec.name });
            }
            if value < spec.min || value > spec.max {
                return Err(InvalidInputError::OutOfRange {
                    field: spec.name,
                    value,
                    min: spec.min,
                    max: spec.max,
                });
            }
            if spec.integer && value.fract() != 0.0 {
                return Err(InvalidInputError::NotInteger { field: spec.name, value });
            }
        }
        Ok(())
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "values": self.values,
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

impl TryFrom<&[f64]> for FeatureVector {
    type Error = InvalidInputError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        Self::from_slice(values)
    }
}

// ============================================================================
// BUILDER PATTERN
// ============================================================================

/// Builder for creating FeatureVector with named setters.
///
/// Starts from the form defaults, so unset fields keep their default value.
pub struct FeatureVectorBuilder {
    vector: FeatureVector,
}

impl FeatureVectorBuilder {
    pub fn new() -> Self {
        Self { vector: FeatureVector::new() }
    }

    pub fn pregnancies(mut self, value: f64) -> Self {
        self.vector.set_by_name("pregnancies", value);
        self
    }

    pub fn glucose(mut self, value: f64) -> Self {
        self.vector.set_by_name("glucose", value);
        self
    }

    pub fn blood_pressure(mut self, value: f64) -> Self {
        self.vector.set_by_name("blood_pressure", value);
        self
    }

    pub fn skin_thickness(mut self, value: f64) -> Self {
        self.vector.set_by_name("skin_thickness", value);
        self
    }

    pub fn insulin(mut self, value: f64) -> Self {
        self.vector.set_by_name("insulin", value);
        self
    }

    pub fn bmi(mut self, value: f64) -> Self {
        self.vector.set_by_name("bmi", value);
        self
    }

    pub fn diabetes_pedigree_function(mut self, value: f64) -> Self {
        self.vector.set_by_name("diabetes_pedigree_function", value);
        self
    }

    pub fn age(mut self, value: f64) -> Self {
        self.vector.set_by_name("age", value);
        self
    }

    pub fn build(self) -> FeatureVector {
        self.vector
    }
}

impl Default for FeatureVectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
