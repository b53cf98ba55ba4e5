// ABOUTME: Strict section parser for model-generated diet plans and injury analyses
// ABOUTME: Buckets bulleted lines under expected headings and fails loudly on missing ones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Intelligence

//! # Plan Parser
//!
//! The generation service answers in free-form markdown; the prompt pins
//! the section headings, and this parser holds it to that. A heading line
//! (`## Heading`, `**Heading**`, or `Heading:` forms, case-insensitive)
//! switches the current section; bulleted or numbered lines are collected
//! under it; other prose is ignored. A reply missing any expected heading
//! is rejected with `MalformedResponse` naming the absent sections, rather
//! than silently yielding empty ones.

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Section headings a diet plan must carry
pub const DIET_PLAN_SECTIONS: [&str; 4] = ["Daily Targets", "7-Day Meal Plan", "Grocery List", "Tips"];

/// Section headings an injury analysis must carry
pub const INJURY_REPORT_SECTIONS: [&str; 4] = [
    "Assessment",
    "Immediate Care",
    "Exercises To Avoid",
    "Recovery Timeline",
];

/// A parsed seven-day diet plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietPlan {
    /// Daily calorie and macronutrient targets
    pub daily_targets: Vec<String>,
    /// Meal lines for the week
    pub meal_plan: Vec<String>,
    /// Groceries needed for the week
    pub grocery_list: Vec<String>,
    /// Adherence tips
    pub tips: Vec<String>,
}

impl DietPlan {
    /// Parse a model reply into a diet plan
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` when any expected heading is absent.
    pub fn parse(text: &str) -> AppResult<Self> {
        let mut sections = scan_sections(text, &DIET_PLAN_SECTIONS)?;
        let tips = sections.pop().unwrap_or_default();
        let grocery_list = sections.pop().unwrap_or_default();
        let meal_plan = sections.pop().unwrap_or_default();
        let daily_targets = sections.pop().unwrap_or_default();
        Ok(Self {
            daily_targets,
            meal_plan,
            grocery_list,
            tips,
        })
    }
}

/// A parsed injury analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryReport {
    /// Likely explanations for the complaint
    pub assessment: Vec<String>,
    /// Immediate self-care steps
    pub immediate_care: Vec<String>,
    /// Movements to avoid while symptomatic
    pub exercises_to_avoid: Vec<String>,
    /// Typical recovery progression
    pub recovery_timeline: Vec<String>,
}

impl InjuryReport {
    /// Parse a model reply into an injury report
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` when any expected heading is absent.
    pub fn parse(text: &str) -> AppResult<Self> {
        let mut sections = scan_sections(text, &INJURY_REPORT_SECTIONS)?;
        let recovery_timeline = sections.pop().unwrap_or_default();
        let exercises_to_avoid = sections.pop().unwrap_or_default();
        let immediate_care = sections.pop().unwrap_or_default();
        let assessment = sections.pop().unwrap_or_default();
        Ok(Self {
            assessment,
            immediate_care,
            exercises_to_avoid,
            recovery_timeline,
        })
    }
}

/// Scan `text` line by line, bucketing bullets under the outline's headings
///
/// Returns one list per outline entry, in outline order. Bullets that
/// appear before the first recognized heading, or under an unexpected
/// heading, are discarded.
fn scan_sections(text: &str, outline: &[&str]) -> AppResult<Vec<Vec<String>>> {
    let mut sections: Vec<Option<Vec<String>>> = vec![None; outline.len()];
    let mut current: Option<usize> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some((heading, emphatic)) = heading_text(trimmed) {
            if let Some(index) = outline
                .iter()
                .position(|expected| expected.eq_ignore_ascii_case(&heading))
            {
                current = Some(index);
                sections[index].get_or_insert_with(Vec::new);
                continue;
            }
            // An emphatic heading we did not ask for closes the current
            // section; a plain "Foo:" line is just prose.
            if emphatic {
                current = None;
                continue;
            }
        }

        if let (Some(index), Some(item)) = (current, bullet_text(trimmed)) {
            if let Some(items) = sections[index].as_mut() {
                items.push(item.to_owned());
            }
        }
    }

    let missing: Vec<&str> = outline
        .iter()
        .zip(&sections)
        .filter_map(|(name, section)| section.is_none().then_some(*name))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::malformed_response(format!(
            "reply is missing expected sections: {}",
            missing.join(", ")
        )));
    }

    Ok(sections.into_iter().flatten().collect())
}

/// Extract the heading text of a line, if it is shaped like a heading
///
/// Recognized forms: `## Heading`, `**Heading**` (optionally with a
/// trailing colon inside or outside the stars), and `Heading:`. The flag
/// marks the emphatic markdown forms; plain trailing-colon lines also show
/// up mid-prose ("Day 1:") and only count when they match the outline.
fn heading_text(line: &str) -> Option<(String, bool)> {
    let (text, emphatic) = if let Some(stripped) = line.strip_prefix('#') {
        (stripped.trim_start_matches('#').trim(), true)
    } else if line.starts_with("**") {
        (line.trim_matches('*').trim(), true)
    } else if let Some(stripped) = line.strip_suffix(':') {
        if bullet_text(line).is_some() {
            return None;
        }
        (stripped.trim(), false)
    } else {
        return None;
    };

    let text = text.trim_end_matches(':').trim();
    (!text.is_empty()).then(|| (text.to_owned(), emphatic))
}

/// Extract the content of a bulleted or numbered line
fn bullet_text(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim());
        }
    }

    // Numbered forms: "1. item" or "1) item"
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(item) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            let item = item.trim();
            if !item.is_empty() {
                return Some(item);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    const DIET_REPLY: &str = "\
Here is your plan.

## Daily Targets
- 2172 kcal per day
- 160 g protein

## 7-Day Meal Plan
Day 1:
1. Breakfast: oats with berries
2. Lunch: chicken and rice
3. Dinner: salmon with vegetables

## Grocery List
* Oats
* Chicken breast
* Salmon

## Tips
- Meal prep on Sundays
- Drink water before meals
";

    #[test]
    fn test_parses_all_diet_sections() {
        let plan = DietPlan::parse(DIET_REPLY).unwrap();
        assert_eq!(plan.daily_targets.len(), 2);
        assert_eq!(plan.meal_plan[0], "Breakfast: oats with berries");
        assert_eq!(plan.grocery_list, ["Oats", "Chicken breast", "Salmon"]);
        assert_eq!(plan.tips.len(), 2);
    }

    #[test]
    fn test_prose_between_bullets_is_ignored() {
        let plan = DietPlan::parse(DIET_REPLY).unwrap();
        // "Day 1:" is prose shaped like a heading, not a bullet
        assert!(!plan.meal_plan.iter().any(|l| l.contains("Day 1")));
    }

    #[test]
    fn test_missing_section_fails_loudly() {
        let reply = "## Daily Targets\n- 2000 kcal\n\n## Tips\n- sleep more\n";
        let err = DietPlan::parse(reply).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedResponse);
        assert!(err.message.contains("7-Day Meal Plan"));
        assert!(err.message.contains("Grocery List"));
        assert!(!err.message.contains("Tips"));
    }

    #[test]
    fn test_bold_and_colon_heading_forms() {
        let reply = "\
**Daily Targets**
- 1800 kcal
7-Day Meal Plan:
- Monday: soup
**Grocery List:**
- Lentils
Tips:
- Keep it simple
";
        let plan = DietPlan::parse(reply).unwrap();
        assert_eq!(plan.daily_targets, ["1800 kcal"]);
        assert_eq!(plan.meal_plan, ["Monday: soup"]);
        assert_eq!(plan.grocery_list, ["Lentils"]);
        assert_eq!(plan.tips, ["Keep it simple"]);
    }

    #[test]
    fn test_heading_match_is_case_insensitive() {
        let reply = "\
## daily targets
- 1900 kcal
## 7-DAY MEAL PLAN
- Monday: eggs
## grocery list
- Eggs
## TIPS
- Rest well
";
        assert!(DietPlan::parse(reply).is_ok());
    }

    #[test]
    fn test_bullets_under_unexpected_heading_are_discarded() {
        let reply = "\
## Daily Targets
- 2000 kcal
## Supplements
- creatine
## 7-Day Meal Plan
- Monday: eggs
## Grocery List
- Eggs
## Tips
- Rest
";
        let plan = DietPlan::parse(reply).unwrap();
        assert!(!plan.daily_targets.iter().any(|l| l.contains("creatine")));
        assert!(!plan.meal_plan.iter().any(|l| l.contains("creatine")));
    }

    #[test]
    fn test_injury_report_sections() {
        let reply = "\
## Assessment
- Likely patellar tendinopathy
## Immediate Care
- Rest and ice for 48 hours
## Exercises To Avoid
- Deep squats
- Jump rope
## Recovery Timeline
- Week 1-2: reduce load
- See a physiotherapist if pain persists past two weeks
";
        let report = InjuryReport::parse(reply).unwrap();
        assert_eq!(report.assessment.len(), 1);
        assert_eq!(report.exercises_to_avoid.len(), 2);
        assert_eq!(report.recovery_timeline.len(), 2);
    }
}
