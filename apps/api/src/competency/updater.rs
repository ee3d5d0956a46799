//! Rating delta derivation and application.
//!
//! A completed profile adjusts five tracked competencies: a global penalty
//! from the overall-score band, plus per-flag penalties from the behavior
//! classifier. Deltas for a competency are summed first and applied in a
//! single clamped write, so a pile-up of triggers cannot drive a rating
//! below zero through repeated clamps.

use chrono::Utc;

use crate::competency::classifier::{BehaviorClassifier, BehaviorFlag};
use crate::models::rating::CompetencyRating;

/// The five competencies every assessment touches, in application order.
pub const TRACKED_COMPETENCIES: [&str; 5] = [
    "communication",
    "leadership",
    "productivity",
    "reliability",
    "initiative",
];

const RATING_MIN: f64 = 0.0;
const RATING_MAX: f64 = 5.0;
/// New ratings seed from the scale midpoint before the delta is applied.
const SEED_BASE: f64 = 3.0;
/// Seeds clamp to a floor of 1, updates to a floor of 0. The asymmetry is
/// inherited product behavior; `seed_floor_is_one_not_zero` pins it.
const SEED_MIN: f64 = 1.0;

/// Fixed category lookup for newly created ratings.
pub fn competency_category(competency_id: &str) -> &'static str {
    match competency_id {
        "communication" => "soft",
        "leadership" => "leadership",
        "productivity" => "business",
        "reliability" => "soft",
        "initiative" => "soft",
        _ => "soft",
    }
}

/// Global penalty applied to all five tracked competencies, by score band.
pub fn band_penalty(overall_score: u32) -> f64 {
    if overall_score < 30 {
        -1.0
    } else if overall_score < 50 {
        -0.5
    } else {
        0.0
    }
}

/// Sums the band penalty and all flag penalties per competency.
/// Returns `(competency_id, delta)` pairs in [`TRACKED_COMPETENCIES`] order,
/// omitting competencies with a zero net delta.
pub fn derive_deltas(overall_score: u32, flags: &[BehaviorFlag]) -> Vec<(&'static str, f64)> {
    let mut totals = [0.0_f64; TRACKED_COMPETENCIES.len()];

    let band = band_penalty(overall_score);
    if band != 0.0 {
        for total in totals.iter_mut() {
            *total += band;
        }
    }

    for flag in flags {
        for (competency_id, delta) in flag_penalties(*flag) {
            let idx = TRACKED_COMPETENCIES
                .iter()
                .position(|c| c == competency_id)
                .expect("flag penalties only name tracked competencies");
            totals[idx] += delta;
        }
    }

    TRACKED_COMPETENCIES
        .iter()
        .zip(totals)
        .filter(|(_, delta)| *delta != 0.0)
        .map(|(id, delta)| (*id, delta))
        .collect()
}

fn flag_penalties(flag: BehaviorFlag) -> &'static [(&'static str, f64)] {
    match flag {
        BehaviorFlag::Unprofessional => &[
            ("communication", -0.8),
            ("leadership", -0.8),
            ("reliability", -0.6),
        ],
        BehaviorFlag::Unmotivated => &[("initiative", -0.7), ("productivity", -0.5)],
        BehaviorFlag::PoorCommunication => &[("communication", -0.6)],
    }
}

/// Applies one net delta to a competency in the rating list.
///
/// Existing rating: `current = clamp(current + delta, 0, 5)`.
/// Absent rating: seeded at `clamp(3.0 + delta, 1, 5)`.
/// Either way `target = min(5, current + 1)` and `last_assessed` is bumped.
pub fn apply_delta(ratings: &mut Vec<CompetencyRating>, competency_id: &str, delta: f64) {
    let now = Utc::now();

    if let Some(rating) = ratings.iter_mut().find(|r| r.competency_id == competency_id) {
        let new_value = (rating.current_value + delta).clamp(RATING_MIN, RATING_MAX);
        rating.current_value = new_value;
        rating.target_value = (new_value + 1.0).min(RATING_MAX);
        rating.last_assessed = now;
    } else {
        let start_value = (SEED_BASE + delta).clamp(SEED_MIN, RATING_MAX);
        ratings.push(CompetencyRating {
            competency_id: competency_id.to_string(),
            current_value: start_value,
            target_value: (start_value + 1.0).min(RATING_MAX),
            category: competency_category(competency_id).to_string(),
            last_assessed: now,
            improvement_plan: Vec::new(),
        });
    }
}

/// Full assessment pass: classify the summary, derive per-competency net
/// deltas and apply each one to the rating list in place.
pub fn apply_assessment(
    ratings: &mut Vec<CompetencyRating>,
    classifier: &dyn BehaviorClassifier,
    summary: &str,
    overall_score: u32,
) {
    let flags = classifier.classify(summary);
    for (competency_id, delta) in derive_deltas(overall_score, &flags) {
        apply_delta(ratings, competency_id, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competency::classifier::KeywordClassifier;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn rating(competency_id: &str, current: f64) -> CompetencyRating {
        CompetencyRating {
            competency_id: competency_id.to_string(),
            current_value: current,
            target_value: (current + 1.0).min(5.0),
            category: competency_category(competency_id).to_string(),
            last_assessed: Utc::now(),
            improvement_plan: Vec::new(),
        }
    }

    fn value_of(ratings: &[CompetencyRating], competency_id: &str) -> f64 {
        ratings
            .iter()
            .find(|r| r.competency_id == competency_id)
            .unwrap_or_else(|| panic!("no rating for {competency_id}"))
            .current_value
    }

    #[test]
    fn band_below_30_penalizes_all_five_by_one() {
        let deltas = derive_deltas(25, &[]);
        assert_eq!(deltas.len(), 5);
        for (id, delta) in &deltas {
            assert!(TRACKED_COMPETENCIES.contains(id));
            assert_close(*delta, -1.0);
        }
    }

    #[test]
    fn band_30_to_49_penalizes_all_five_by_half() {
        for score in [30, 42, 49] {
            let deltas = derive_deltas(score, &[]);
            assert_eq!(deltas.len(), 5);
            for (_, delta) in &deltas {
                assert_close(*delta, -0.5);
            }
        }
    }

    #[test]
    fn band_50_and_up_has_no_global_penalty() {
        assert!(derive_deltas(50, &[]).is_empty());
        assert!(derive_deltas(100, &[]).is_empty());
    }

    #[test]
    fn flag_penalties_stack_on_top_of_band() {
        let deltas = derive_deltas(25, &[BehaviorFlag::Unprofessional]);
        let lookup = |id: &str| deltas.iter().find(|(c, _)| *c == id).unwrap().1;
        assert_close(lookup("communication"), -1.8);
        assert_close(lookup("leadership"), -1.8);
        assert_close(lookup("reliability"), -1.6);
        assert_close(lookup("productivity"), -1.0);
        assert_close(lookup("initiative"), -1.0);
    }

    #[test]
    fn deltas_come_out_in_tracked_order() {
        let deltas = derive_deltas(25, &[]);
        let ids: Vec<&str> = deltas.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, TRACKED_COMPETENCIES.to_vec());
    }

    #[test]
    fn update_clamps_to_zero_floor() {
        let mut ratings = vec![rating("communication", 0.5)];
        apply_delta(&mut ratings, "communication", -2.4);
        assert_close(value_of(&ratings, "communication"), 0.0);
    }

    #[test]
    fn update_clamps_to_five_ceiling() {
        let mut ratings = vec![rating("communication", 4.8)];
        apply_delta(&mut ratings, "communication", 1.0);
        assert_close(value_of(&ratings, "communication"), 5.0);
        assert_close(ratings[0].target_value, 5.0);
    }

    #[test]
    fn seed_floor_is_one_not_zero() {
        // An existing rating can be driven to 0.0; a freshly seeded one
        // bottoms out at 1.0. Asymmetric on purpose (inherited behavior).
        let mut ratings = Vec::new();
        apply_delta(&mut ratings, "communication", -2.4);
        assert_close(value_of(&ratings, "communication"), 1.0);

        let mut existing = vec![rating("communication", 1.0)];
        apply_delta(&mut existing, "communication", -2.4);
        assert_close(value_of(&existing, "communication"), 0.0);
    }

    #[test]
    fn seed_uses_category_lookup_and_empty_plan() {
        let mut ratings = Vec::new();
        apply_delta(&mut ratings, "productivity", -0.5);
        apply_delta(&mut ratings, "leadership", -0.5);
        let productivity = &ratings[0];
        assert_close(productivity.current_value, 2.5);
        assert_eq!(productivity.category, "business");
        assert!(productivity.improvement_plan.is_empty());
        assert_eq!(ratings[1].category, "leadership");
    }

    #[test]
    fn target_tracks_current_plus_one_after_every_write() {
        let mut ratings = vec![rating("initiative", 2.0)];
        apply_delta(&mut ratings, "initiative", -0.7);
        assert_close(ratings[0].target_value, ratings[0].current_value + 1.0);

        apply_delta(&mut ratings, "initiative", 3.5);
        assert_close(ratings[0].current_value, 4.8);
        assert_close(ratings[0].target_value, 5.0);
    }

    #[test]
    fn double_application_never_goes_negative() {
        let classifier = KeywordClassifier;
        let summary = "Кандидат был груб, немотивирован, слабая коммуникация.";
        let mut ratings = Vec::new();

        apply_assessment(&mut ratings, &classifier, summary, 10);
        apply_assessment(&mut ratings, &classifier, summary, 10);

        for rating in &ratings {
            assert!(rating.current_value >= 0.0, "{rating:?} went negative");
            assert!(rating.target_value <= 5.0);
        }
        assert_close(value_of(&ratings, "communication"), 0.0);
    }

    #[test]
    fn refusal_scenario_with_low_score() {
        // "отказался" hits the unprofessional marker "отказ"; the
        // poor-communication phrase "отказ от сотрудничества" does not
        // match this conjugation, so communication nets -1.0 - 0.8.
        let classifier = KeywordClassifier;
        let mut ratings = TRACKED_COMPETENCIES
            .iter()
            .map(|id| rating(id, 3.0))
            .collect::<Vec<_>>();

        apply_assessment(
            &mut ratings,
            &classifier,
            "Клиент отказался от сотрудничества.",
            25,
        );

        assert_close(value_of(&ratings, "communication"), 1.2);
        assert_close(value_of(&ratings, "leadership"), 1.2);
        assert_close(value_of(&ratings, "reliability"), 1.4);
        assert_close(value_of(&ratings, "productivity"), 2.0);
        assert_close(value_of(&ratings, "initiative"), 2.0);
    }

    #[test]
    fn triple_trigger_sums_before_the_single_clamp() {
        // Unprofessional + poor communication + the low band: communication
        // nets -1.0 - 0.8 - 0.6 = -2.4 applied once, not three clamped steps.
        let classifier = KeywordClassifier;
        let summary = "Грубость и отказ от сотрудничества, слабая коммуникация.";

        let mut from_three = vec![rating("communication", 3.0)];
        apply_assessment(&mut from_three, &classifier, summary, 25);
        assert_close(value_of(&from_three, "communication"), 0.6);

        let mut from_one = vec![rating("communication", 1.0)];
        apply_assessment(&mut from_one, &classifier, summary, 25);
        assert_close(value_of(&from_one, "communication"), 0.0);
    }

    #[test]
    fn unmotivated_flag_hits_initiative_and_productivity() {
        let classifier = KeywordClassifier;
        let mut ratings = TRACKED_COMPETENCIES
            .iter()
            .map(|id| rating(id, 3.0))
            .collect::<Vec<_>>();

        apply_assessment(
            &mut ratings,
            &classifier,
            "Давал односложные ответы без деталей.",
            60,
        );

        assert_close(value_of(&ratings, "initiative"), 2.3);
        assert_close(value_of(&ratings, "productivity"), 2.5);
        assert_close(value_of(&ratings, "communication"), 3.0);
    }
}
