//! Rule-based student analysis.
//!
//! Everything here is a pure function of stored data: learning style from
//! the saved preferences, prediction and risks from the result history.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use crate::api::{
    Activity, AiAnalysis, ClassAnalysis, GameState, LeaderboardEntry, LearningPreferences,
    LearningStyleAnalysis, PerformancePrediction, RiskFlag, RiskSeverity, RiskType,
    StudentSummary, TestResult, User, UserId,
};
use crate::services::generation::rank_activities;

pub const VISUAL: &str = "visual";
pub const AUDITORY: &str = "auditory";
pub const KINESTHETIC: &str = "kinesthetic";
pub const READING_WRITING: &str = "readingWriting";

/// Results considered "recent" for risk detection.
const RECENT_WINDOW: usize = 3;
/// Days without a result before engagement is flagged.
const INACTIVITY_DAYS: i64 = 14;
const LONG_INACTIVITY_DAYS: i64 = 30;
/// Average seconds per answer below which answers look rushed.
const RUSHED_ANSWER_SECS: f64 = 5.0;
const MAX_RECOMMENDED_ACTIVITIES: usize = 3;

fn style_weights(preferences: &LearningPreferences) -> [(&'static str, f64); 4] {
    [
        (VISUAL, preferences.visual_learning.max(0.0)),
        (AUDITORY, preferences.auditory_learning.max(0.0)),
        (KINESTHETIC, preferences.kinesthetic_learning.max(0.0)),
        (READING_WRITING, preferences.reading_writing_learning.max(0.0)),
    ]
}

/// The style with the highest weight; ties go to the first in
/// visual, auditory, kinesthetic, reading/writing order.
pub fn dominant_style(preferences: &LearningPreferences) -> &'static str {
    let mut best = (VISUAL, f64::MIN);
    for (style, weight) in style_weights(preferences) {
        if weight > best.1 {
            best = (style, weight);
        }
    }
    best.0
}

pub fn learning_style(
    preferences: &LearningPreferences,
    now: DateTime<Utc>,
) -> LearningStyleAnalysis {
    let weights = style_weights(preferences);
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    let style_distribution: BTreeMap<String, f64> = weights
        .iter()
        .map(|(style, w)| {
            let share = if total > 0.0 { w / total } else { 0.25 };
            (style.to_string(), share)
        })
        .collect();

    let dominant = dominant_style(preferences);
    let mut shares: Vec<f64> = style_distribution.values().copied().collect();
    shares.sort_by(|a, b| b.total_cmp(a));
    // Margin of the leader over the runner-up, relative to the leader.
    let confidence = if shares[0] > 0.0 {
        (shares[0] - shares[1]) / shares[0]
    } else {
        0.0
    };

    LearningStyleAnalysis {
        dominant_style: dominant.to_string(),
        style_distribution,
        confidence,
        last_updated: now,
    }
}

fn average_percentage(results: &[TestResult]) -> Option<f64> {
    if results.is_empty() {
        return None;
    }
    Some(results.iter().map(TestResult::percentage).sum::<f64>() / results.len() as f64)
}

fn recent(results: &[TestResult]) -> &[TestResult] {
    &results[results.len().saturating_sub(RECENT_WINDOW)..]
}

fn sorted_by_completion(results: &[TestResult]) -> Vec<TestResult> {
    let mut sorted = results.to_vec();
    sorted.sort_by_key(|r| r.completed_at);
    sorted
}

/// Predict the next score as a recency-weighted mean of past percentages.
pub fn predict_performance(results: &[TestResult]) -> PerformancePrediction {
    let results = sorted_by_completion(results);
    if results.is_empty() {
        return PerformancePrediction {
            expected_score: 50.0,
            confidence: 0.0,
            risk_factors: vec!["No completed tests yet".to_string()],
            recommendations: vec!["Complete a first test to calibrate predictions".to_string()],
        };
    }

    let (weighted, weights) = results
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sum, total), (i, r)| {
            let w = (i + 1) as f64;
            (sum + r.percentage() * w, total + w)
        });
    let expected_score = (weighted / weights).clamp(0.0, 100.0);
    let confidence = (results.len() as f64 / 10.0).min(1.0);

    let mut risk_factors = Vec::new();
    let mut recommendations = Vec::new();
    if expected_score < 50.0 {
        risk_factors.push("Low average score".to_string());
        recommendations.push("Revisit the block activities before the next test".to_string());
    }
    if results.len() >= 2 {
        let first = results[0].percentage();
        let last = results[results.len() - 1].percentage();
        if last + 10.0 < first {
            risk_factors.push("Declining results".to_string());
            recommendations.push("Schedule a review session with the teacher".to_string());
        }
    }
    if recommendations.is_empty() {
        recommendations.push("Keep the current pace and try harder blocks".to_string());
    }

    PerformancePrediction {
        expected_score,
        confidence,
        risk_factors,
        recommendations,
    }
}

/// Flag learning difficulty, engagement drop and rushed answering.
pub fn detect_risks(
    results: &[TestResult],
    game_state: Option<&GameState>,
    now: DateTime<Utc>,
) -> Vec<RiskFlag> {
    let results = sorted_by_completion(results);
    let mut flags = Vec::new();

    if let Some(avg) = average_percentage(recent(&results)) {
        let severity = match avg {
            a if a < 20.0 => Some(RiskSeverity::Critical),
            a if a < 35.0 => Some(RiskSeverity::High),
            a if a < 50.0 => Some(RiskSeverity::Medium),
            _ => None,
        };
        if let Some(severity) = severity {
            flags.push(RiskFlag {
                kind: RiskType::LearningDifficulty,
                severity,
                description: format!("Recent test average is {:.0}%", avg),
                recommendations: vec![
                    "Offer easier practice activities".to_string(),
                    "Discuss the topic individually".to_string(),
                ],
                detected_at: now,
            });
        }
    }

    if let Some(last) = results.last() {
        let idle = now - last.completed_at;
        let severity = if idle > Duration::days(LONG_INACTIVITY_DAYS) {
            Some(RiskSeverity::High)
        } else if idle > Duration::days(INACTIVITY_DAYS) {
            Some(RiskSeverity::Medium)
        } else if game_state.is_some_and(|s| s.stats.streak == 0) {
            Some(RiskSeverity::Low)
        } else {
            None
        };
        if let Some(severity) = severity {
            flags.push(RiskFlag {
                kind: RiskType::EngagementDrop,
                severity,
                description: format!("No test completed for {} days", idle.num_days()),
                recommendations: vec!["Reach out to the student and their parents".to_string()],
                detected_at: now,
            });
        }
    }

    let answers: Vec<_> = results.iter().flat_map(|r| r.answers.iter()).collect();
    if answers.len() >= RECENT_WINDOW {
        let avg_secs =
            answers.iter().map(|a| a.time_spent as f64).sum::<f64>() / answers.len() as f64;
        if avg_secs < RUSHED_ANSWER_SECS {
            flags.push(RiskFlag {
                kind: RiskType::BehavioralConcern,
                severity: RiskSeverity::Low,
                description: format!("Answers take {:.1} s on average", avg_secs),
                recommendations: vec!["Check whether the student reads the questions".to_string()],
                detected_at: now,
            });
        }
    }

    flags
}

/// Highest severity among the flags, `Low` when there are none.
pub fn risk_level(flags: &[RiskFlag]) -> RiskSeverity {
    flags
        .iter()
        .map(|f| f.severity)
        .max()
        .unwrap_or(RiskSeverity::Low)
}

fn personalized_feedback(name: &str, prediction: &PerformancePrediction, style: &str) -> String {
    let outlook = if prediction.confidence == 0.0 {
        "Let's find out where you stand with a first test.".to_string()
    } else if prediction.expected_score >= 70.0 {
        format!(
            "You are on track for about {:.0}% on your next test.",
            prediction.expected_score
        )
    } else {
        format!(
            "Your next test is trending towards {:.0}%; a bit more practice will lift it.",
            prediction.expected_score
        )
    };
    format!("{}, {} You learn best with {} activities.", name, outlook, style)
}

/// Full analysis for one student.
pub fn analyze_student(
    student: &User,
    preferences: &LearningPreferences,
    results: &[TestResult],
    game_state: Option<&GameState>,
    available_activities: &[Activity],
    now: DateTime<Utc>,
) -> AiAnalysis {
    let learning_style_analysis = learning_style(preferences, now);
    let performance_prediction = predict_performance(results);
    let risk_flags = detect_risks(results, game_state, now);
    let mut recommended_activities =
        rank_activities(available_activities, &learning_style_analysis.dominant_style);
    recommended_activities.truncate(MAX_RECOMMENDED_ACTIVITIES);
    let personalized_feedback = personalized_feedback(
        &student.name,
        &performance_prediction,
        &learning_style_analysis.dominant_style,
    );

    AiAnalysis {
        learning_style_analysis,
        performance_prediction,
        recommended_activities,
        personalized_feedback,
        risk_flags,
    }
}

/// Input row for class analysis.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub user: User,
    pub results: Vec<TestResult>,
    pub game_state: Option<GameState>,
}

pub fn class_analysis(
    class_id: &str,
    students: &[StudentRecord],
    now: DateTime<Utc>,
) -> ClassAnalysis {
    let summaries: Vec<StudentSummary> = students
        .iter()
        .map(|s| {
            let preferences = s
                .game_state
                .as_ref()
                .map(|g| g.preferences.clone())
                .unwrap_or_default();
            let flags = detect_risks(&s.results, s.game_state.as_ref(), now);
            StudentSummary {
                student_id: s.user.id.clone(),
                name: s.user.name.clone(),
                overall_progress: average_percentage(&s.results).unwrap_or(0.0),
                risk_level: risk_level(&flags),
                preferred_learning_style: dominant_style(&preferences).to_string(),
            }
        })
        .collect();

    let average_score = if summaries.is_empty() {
        0.0
    } else {
        summaries.iter().map(|s| s.overall_progress).sum::<f64>() / summaries.len() as f64
    };
    let at_risk_students = summaries
        .iter()
        .filter(|s| s.risk_level >= RiskSeverity::High)
        .map(|s| s.student_id.clone())
        .collect();

    ClassAnalysis {
        class_id: class_id.to_string(),
        student_count: summaries.len(),
        average_score,
        students: summaries,
        at_risk_students,
    }
}

/// Rank students by XP, highest first.
///
/// Equal XP shares a rank ("1, 1, 3"); ties are listed by name. When
/// `only` is given, students outside that set are left out.
pub fn leaderboard(
    states: &[GameState],
    students: &[User],
    only: Option<&HashSet<UserId>>,
) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<(&User, &GameState)> = students
        .iter()
        .filter(|u| only.map_or(true, |set| set.contains(&u.id)))
        .filter_map(|u| {
            states
                .iter()
                .find(|s| s.student_id == u.id)
                .map(|s| (u, s))
        })
        .collect();
    rows.sort_by(|(ua, sa), (ub, sb)| {
        sb.stats
            .total_xp
            .cmp(&sa.stats.total_xp)
            .then_with(|| ua.name.cmp(&ub.name))
    });

    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(rows.len());
    for (i, (user, state)) in rows.into_iter().enumerate() {
        let rank = match entries.last() {
            Some(prev) if prev.total_xp == state.stats.total_xp => prev.rank,
            _ => i as u32 + 1,
        };
        entries.push(LeaderboardEntry {
            rank,
            student_id: user.id.clone(),
            name: user.name.clone(),
            total_xp: state.stats.total_xp,
            level: state.stats.level,
        });
    }
    entries
}
