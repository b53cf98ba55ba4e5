// ABOUTME: Deterministic biometric calculations backing the diet-plan request builder
// ABOUTME: Computes BMI with category, Mifflin-St Jeor BMR, TDEE, and the calorie target
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

//! # Derived Metrics
//!
//! Pure calculations over [`BiometricInput`]: BMI and its category, basal
//! metabolic rate via the Mifflin-St Jeor equation, total daily energy
//! expenditure at a fixed moderate-activity multiplier, and the
//! goal-adjusted calorie target. No independent lifecycle; recomputed on
//! every diet-plan request.

use serde::{Deserialize, Serialize};

use crate::errors::AppResult;
use crate::models::{BiometricInput, Gender, Goal};

/// Activity multiplier applied to BMR (moderate exercise 3-5 days/week)
pub const ACTIVITY_MULTIPLIER: f64 = 1.55;

/// Calorie adjustment applied to TDEE for a weight-loss goal
const WEIGHT_LOSS_FACTOR: f64 = 0.85;

/// Calorie adjustment applied to TDEE for a weight-gain goal
const WEIGHT_GAIN_FACTOR: f64 = 1.15;

/// BMI classification buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    /// BMI below 18.5
    Underweight,
    /// BMI in [18.5, 25)
    Normal,
    /// BMI in [25, 30)
    Overweight,
    /// BMI of 30 or above
    Obese,
}

impl BmiCategory {
    /// Classify a BMI value
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    /// Human-readable label used in prompts
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }
}

/// Metrics derived from one biometric snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Body mass index, rounded to one decimal place
    pub bmi: f64,
    /// BMI classification
    pub bmi_category: BmiCategory,
    /// Basal metabolic rate in kcal/day (Mifflin-St Jeor)
    pub bmr: f64,
    /// Total daily energy expenditure in kcal/day
    pub tdee: f64,
    /// Goal-adjusted daily calorie target in kcal
    pub target_calories: u32,
}

impl DerivedMetrics {
    /// Compute all derived values from validated biometric input
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the input fails validation; the BMI
    /// division requires a positive height.
    pub fn from_biometrics(input: &BiometricInput) -> AppResult<Self> {
        input.validate()?;

        let height_m = input.height_cm / 100.0;
        let bmi = round_to_one_decimal(input.weight_kg / (height_m * height_m));

        let bmr = match input.gender {
            Gender::Male => {
                10.0 * input.weight_kg + 6.25 * input.height_cm - 5.0 * f64::from(input.age) + 5.0
            }
            Gender::Other => {
                10.0 * input.weight_kg + 6.25 * input.height_cm - 5.0 * f64::from(input.age) - 161.0
            }
        };

        let tdee = bmr * ACTIVITY_MULTIPLIER;

        let target = match input.goal {
            Goal::WeightLoss => tdee * WEIGHT_LOSS_FACTOR,
            Goal::WeightGain => tdee * WEIGHT_GAIN_FACTOR,
        };

        Ok(Self {
            bmi,
            bmi_category: BmiCategory::from_bmi(bmi),
            bmr,
            tdee,
            target_calories: target.round() as u32,
        })
    }
}

fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn biometrics(gender: Gender, goal: Goal) -> BiometricInput {
        BiometricInput {
            age: 30,
            gender,
            weight_kg: 70.0,
            height_cm: 175.0,
            goal,
            medical_conditions: None,
        }
    }

    #[test]
    fn test_reference_scenario_weight_loss() {
        // age 30, male, 70 kg, 175 cm
        // bmr = 10*70 + 6.25*175 - 5*30 + 5 = 1648.75
        let metrics =
            DerivedMetrics::from_biometrics(&biometrics(Gender::Male, Goal::WeightLoss)).unwrap();
        assert!((metrics.bmr - 1648.75).abs() < f64::EPSILON);
        assert!((metrics.tdee - 2555.5625).abs() < f64::EPSILON);
        assert_eq!(metrics.target_calories, 2172);
        assert!((metrics.bmi - 22.9).abs() < f64::EPSILON);
        assert_eq!(metrics.bmi_category, BmiCategory::Normal);
    }

    #[test]
    fn test_weight_gain_surplus() {
        // 2555.5625 * 1.15 = 2938.896...
        let metrics =
            DerivedMetrics::from_biometrics(&biometrics(Gender::Male, Goal::WeightGain)).unwrap();
        assert_eq!(metrics.target_calories, 2939);
    }

    #[test]
    fn test_non_male_bmr_constant() {
        // same inputs, -161 instead of +5
        let metrics =
            DerivedMetrics::from_biometrics(&biometrics(Gender::Other, Goal::WeightLoss)).unwrap();
        assert!((metrics.bmr - 1482.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bmi_category_boundaries() {
        assert_eq!(BmiCategory::from_bmi(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(24.9), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(29.9), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_zero_height_rejected() {
        let mut input = biometrics(Gender::Male, Goal::WeightLoss);
        input.height_cm = 0.0;
        assert!(DerivedMetrics::from_biometrics(&input).is_err());
    }
}
