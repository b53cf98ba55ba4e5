// ABOUTME: Prompt construction from compile-time templates and derived biometric values
// ABOUTME: Pure functions from structured intent to the single outbound prompt string
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

//! # Prompt Builder
//!
//! Converts a structured intent (free-text chat, a diet-plan request with
//! biometric parameters, or an injury description) into the single
//! natural-language prompt sent to the generation service. Templates are
//! loaded at compile time from markdown files; the diet template gets the
//! derived metrics interpolated.
//!
//! Pure functions of their inputs: no I/O, deterministic.

use crate::errors::AppResult;
use crate::metrics::DerivedMetrics;
use crate::models::{BiometricInput, Gender, Goal};

/// Fixed assistant preamble prepended to every free-text chat turn
pub const CHAT_SYSTEM_PREAMBLE: &str = include_str!("chat_system.md");

/// Diet-plan template with `{placeholder}` slots for profile and metrics
const DIET_PLAN_TEMPLATE: &str = include_str!("diet_plan.md");

/// Injury-analysis template with a `{description}` slot
const INJURY_ANALYSIS_TEMPLATE: &str = include_str!("injury_analysis.md");

/// Wrap raw user text in the fixed chat preamble
#[must_use]
pub fn build_chat_prompt(user_text: &str) -> String {
    format!("{CHAT_SYSTEM_PREAMBLE}\nUser: {}", user_text.trim())
}

/// Render the diet-plan template with metrics derived from `input`
///
/// # Errors
///
/// Returns `InvalidInput` when the biometrics fail validation.
pub fn build_diet_prompt(input: &BiometricInput) -> AppResult<String> {
    let metrics = DerivedMetrics::from_biometrics(input)?;

    let gender = match input.gender {
        Gender::Male => "male",
        Gender::Other => "other",
    };
    let goal = match input.goal {
        Goal::WeightLoss => "weight loss",
        Goal::WeightGain => "weight gain",
    };
    let conditions = input
        .medical_conditions
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("none reported");

    Ok(DIET_PLAN_TEMPLATE
        .replace("{age}", &input.age.to_string())
        .replace("{gender}", gender)
        .replace("{weight_kg}", &format!("{:.1}", input.weight_kg))
        .replace("{height_cm}", &format!("{:.1}", input.height_cm))
        .replace("{goal}", goal)
        .replace("{medical_conditions}", conditions)
        .replace("{bmi}", &format!("{:.1}", metrics.bmi))
        .replace("{bmi_category}", metrics.bmi_category.as_str())
        .replace("{bmr}", &format!("{:.0}", metrics.bmr))
        .replace("{tdee}", &format!("{:.0}", metrics.tdee))
        .replace("{target_calories}", &metrics.target_calories.to_string()))
}

/// Render the injury-analysis template around the user's description
#[must_use]
pub fn build_injury_prompt(description: &str) -> String {
    INJURY_ANALYSIS_TEMPLATE.replace("{description}", description.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> BiometricInput {
        BiometricInput {
            age: 30,
            gender: Gender::Male,
            weight_kg: 70.0,
            height_cm: 175.0,
            goal: Goal::WeightLoss,
            medical_conditions: Some("lactose intolerance".to_owned()),
        }
    }

    #[test]
    fn test_chat_prompt_wraps_user_text() {
        let prompt = build_chat_prompt("  how often should I deload?  ");
        assert!(prompt.starts_with(CHAT_SYSTEM_PREAMBLE));
        assert!(prompt.ends_with("User: how often should I deload?"));
    }

    #[test]
    fn test_diet_prompt_interpolates_metrics() {
        let prompt = build_diet_prompt(&sample_input()).unwrap();
        assert!(prompt.contains("Age: 30"));
        assert!(prompt.contains("BMI: 22.9 (Normal)"));
        assert!(prompt.contains("BMR: 1649 kcal/day"));
        assert!(prompt.contains("Daily calorie target: 2172 kcal"));
        assert!(prompt.contains("lactose intolerance"));
        assert!(!prompt.contains('{'), "unreplaced placeholder in prompt");
    }

    #[test]
    fn test_diet_prompt_defaults_missing_conditions() {
        let mut input = sample_input();
        input.medical_conditions = None;
        let prompt = build_diet_prompt(&input).unwrap();
        assert!(prompt.contains("Medical conditions: none reported"));
    }

    #[test]
    fn test_diet_prompt_is_deterministic() {
        let a = build_diet_prompt(&sample_input()).unwrap();
        let b = build_diet_prompt(&sample_input()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_injury_prompt_embeds_description() {
        let prompt = build_injury_prompt("sharp pain in left knee when squatting");
        assert!(prompt.contains("Reported issue: sharp pain in left knee when squatting"));
        assert!(prompt.contains("## Recovery Timeline"));
    }

    #[test]
    fn test_diet_prompt_rejects_invalid_input() {
        let mut input = sample_input();
        input.height_cm = 0.0;
        assert!(build_diet_prompt(&input).is_err());
    }
}
