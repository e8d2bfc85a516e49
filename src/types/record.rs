//! Patient measurement records

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};

/// Inclusive range accepted by the input surface for one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn clamp_u32(&self, value: u32) -> u32 {
        (value as f64).clamp(self.min, self.max) as u32
    }

    fn clamp_f64(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

/// Ranges applied by the collecting surface before submission.
pub mod ranges {
    use super::FieldRange;

    pub const PREGNANCIES: FieldRange = FieldRange::new(0.0, 17.0);
    pub const GLUCOSE: FieldRange = FieldRange::new(0.0, 200.0);
    pub const BLOOD_PRESSURE: FieldRange = FieldRange::new(0.0, 122.0);
    pub const SKIN_THICKNESS: FieldRange = FieldRange::new(0.0, 100.0);
    pub const INSULIN: FieldRange = FieldRange::new(0.0, 846.0);
    pub const BMI: FieldRange = FieldRange::new(0.0, 67.0);
    pub const DIABETES_PEDIGREE_FUNCTION: FieldRange = FieldRange::new(0.0, 2.4);
    pub const AGE: FieldRange = FieldRange::new(21.0, 88.0);
}

/// One patient's eight health measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Number of pregnancies
    pub pregnancies: u32,

    /// Plasma glucose concentration (mg/dL)
    pub glucose: u32,

    /// Diastolic blood pressure (mm Hg)
    pub blood_pressure: u32,

    /// Triceps skin fold thickness (mm)
    pub skin_thickness: u32,

    /// 2-hour serum insulin (IU/mL)
    pub insulin: u32,

    /// Body mass index
    pub bmi: f64,

    /// Diabetes pedigree function
    pub diabetes_pedigree_function: f64,

    /// Age in years
    pub age: u32,
}

impl FeatureRecord {
    /// Check the record against its numeric domain.
    ///
    /// Integer fields are unsigned, so only the float fields can fall
    /// outside it.
    pub fn validate(&self) -> PipelineResult<()> {
        check_non_negative("bmi", self.bmi)?;
        check_non_negative("diabetes_pedigree_function", self.diabetes_pedigree_function)?;
        Ok(())
    }

    /// Clamp every field into the range accepted by the input surface.
    ///
    /// Returns the clamped record and the names of the fields that changed.
    pub fn clamped(&self) -> (FeatureRecord, Vec<&'static str>) {
        let clamped = FeatureRecord {
            pregnancies: ranges::PREGNANCIES.clamp_u32(self.pregnancies),
            glucose: ranges::GLUCOSE.clamp_u32(self.glucose),
            blood_pressure: ranges::BLOOD_PRESSURE.clamp_u32(self.blood_pressure),
            skin_thickness: ranges::SKIN_THICKNESS.clamp_u32(self.skin_thickness),
            insulin: ranges::INSULIN.clamp_u32(self.insulin),
            bmi: ranges::BMI.clamp_f64(self.bmi),
            diabetes_pedigree_function: ranges::DIABETES_PEDIGREE_FUNCTION
                .clamp_f64(self.diabetes_pedigree_function),
            age: ranges::AGE.clamp_u32(self.age),
        };

        let mut adjusted = Vec::new();
        if clamped.pregnancies != self.pregnancies {
            adjusted.push("pregnancies");
        }
        if clamped.glucose != self.glucose {
            adjusted.push("glucose");
        }
        if clamped.blood_pressure != self.blood_pressure {
            adjusted.push("blood_pressure");
        }
        if clamped.skin_thickness != self.skin_thickness {
            adjusted.push("skin_thickness");
        }
        if clamped.insulin != self.insulin {
            adjusted.push("insulin");
        }
        if clamped.bmi.to_bits() != self.bmi.to_bits() {
            adjusted.push("bmi");
        }
        if clamped.diabetes_pedigree_function.to_bits()
            != self.diabetes_pedigree_function.to_bits()
        {
            adjusted.push("diabetes_pedigree_function");
        }
        if clamped.age != self.age {
            adjusted.push("age");
        }

        (clamped, adjusted)
    }
}

fn check_non_negative(field: &'static str, value: f64) -> PipelineResult<()> {
    if !value.is_finite() {
        return Err(PipelineError::invalid(field, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(PipelineError::invalid(field, format!("must be >= 0, got {value}")));
    }
    Ok(())
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self {
            pregnancies: 3,
            glucose: 120,
            blood_pressure: 70,
            skin_thickness: 20,
            insulin: 79,
            bmi: 20.0,
            diabetes_pedigree_function: 0.47,
            age: 33,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record() {
        let record = FeatureRecord::default();
        assert_eq!(record.pregnancies, 3);
        assert_eq!(record.glucose, 120);
        assert_eq!(record.insulin, 79);
        assert_eq!(record.diabetes_pedigree_function, 0.47);
        assert_eq!(record.age, 33);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_bmi() {
        let record = FeatureRecord {
            bmi: -1.0,
            ..Default::default()
        };

        match record.validate() {
            Err(PipelineError::InvalidInput { field, .. }) => assert_eq!(field, "bmi"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_nan_pedigree() {
        let record = FeatureRecord {
            diabetes_pedigree_function: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            record.validate(),
            Err(PipelineError::InvalidInput {
                field: "diabetes_pedigree_function",
                ..
            })
        ));
    }

    #[test]
    fn test_clamping() {
        let record = FeatureRecord {
            glucose: 250,
            age: 5,
            bmi: 80.0,
            ..Default::default()
        };

        let (clamped, adjusted) = record.clamped();

        assert_eq!(clamped.glucose, 200);
        assert_eq!(clamped.age, 21);
        assert_eq!(clamped.bmi, 67.0);
        assert_eq!(adjusted, vec!["glucose", "bmi", "age"]);
    }

    #[test]
    fn test_clamping_leaves_defaults_untouched() {
        let (clamped, adjusted) = FeatureRecord::default().clamped();
        assert_eq!(clamped, FeatureRecord::default());
        assert!(adjusted.is_empty());
    }
}
