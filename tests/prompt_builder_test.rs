// ABOUTME: Integration tests for prompt construction
// ABOUTME: Covers preamble wrapping, metric interpolation, and section heading alignment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use fitcoach_assistant::llm::prompts::{
    build_chat_prompt, build_diet_prompt, build_injury_prompt, CHAT_SYSTEM_PREAMBLE,
};
use fitcoach_assistant::models::{BiometricInput, Gender, Goal};
use fitcoach_assistant::plans::{DIET_PLAN_SECTIONS, INJURY_REPORT_SECTIONS};

fn sample_input() -> BiometricInput {
    BiometricInput {
        age: 42,
        gender: Gender::Other,
        weight_kg: 82.5,
        height_cm: 168.0,
        goal: Goal::WeightGain,
        medical_conditions: Some("type 2 diabetes".to_owned()),
    }
}

#[test]
fn test_chat_prompt_shape() {
    let prompt = build_chat_prompt("what should I eat after a run?");
    assert!(prompt.starts_with(CHAT_SYSTEM_PREAMBLE));
    assert!(prompt.ends_with("User: what should I eat after a run?"));
}

#[test]
fn test_diet_prompt_contains_profile_and_conditions() {
    let prompt = build_diet_prompt(&sample_input()).unwrap();
    assert!(prompt.contains("Age: 42"));
    assert!(prompt.contains("Weight: 82.5 kg"));
    assert!(prompt.contains("Height: 168.0 cm"));
    assert!(prompt.contains("Goal: weight gain"));
    assert!(prompt.contains("type 2 diabetes"));
}

#[test]
fn test_diet_prompt_requests_the_sections_the_parser_expects() {
    let prompt = build_diet_prompt(&sample_input()).unwrap();
    for section in DIET_PLAN_SECTIONS {
        assert!(
            prompt.contains(&format!("## {section}")),
            "prompt does not pin section {section}"
        );
    }
}

#[test]
fn test_injury_prompt_requests_the_sections_the_parser_expects() {
    let prompt = build_injury_prompt("elbow pain during pull-ups");
    for section in INJURY_REPORT_SECTIONS {
        assert!(
            prompt.contains(&format!("## {section}")),
            "prompt does not pin section {section}"
        );
    }
}

#[test]
fn test_no_placeholder_survives_rendering() {
    let prompt = build_diet_prompt(&sample_input()).unwrap();
    assert!(!prompt.contains('{'));
    assert!(!prompt.contains('}'));
}
