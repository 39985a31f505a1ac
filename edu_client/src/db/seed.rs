//! Demo data for local development.
//!
//! Every account uses the password `demo`.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Map, Value};

use crate::api::{
    Activity, ActivityId, ActivityType, BlockId, DifficultyLevel, GameInventory, GameState,
    GameStats, LearningBlock, LearningPreferences, QuestionId, Subject, SubjectId, TestAnswer,
    TestResult, TestResultId, User, UserId, UserRole,
};

pub const DEMO_PASSWORD: &str = "demo";

/// Everything the local repository is seeded with.
#[derive(Debug, Clone)]
pub struct DemoData {
    pub users: Vec<User>,
    pub subjects: Vec<Subject>,
    pub blocks: Vec<LearningBlock>,
    pub game_states: Vec<GameState>,
    pub results: Vec<TestResult>,
}

fn user(id: &str, email: &str, name: &str, role: UserRole, now: DateTime<Utc>) -> User {
    User {
        id: UserId::new(id),
        email: email.to_string(),
        name: name.to_string(),
        role,
        created_at: now,
        updated_at: now,
    }
}

fn subject(id: &str, name: &str, now: DateTime<Utc>) -> Subject {
    Subject {
        id: SubjectId::new(id),
        name: name.to_string(),
        grade: 8,
        teacher_id: UserId::new("demo-teacher"),
        created_at: now,
        updated_at: now,
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn quiz(id: &str, title: &str, question: &str, options: &[&str], correct: &str) -> Activity {
    Activity {
        id: ActivityId::new(id),
        kind: ActivityType::Quiz,
        title: title.to_string(),
        description: String::new(),
        content: object(json!({
            "question": question,
            "options": options,
            "correctAnswer": correct,
        })),
        points: 50,
        time_limit: Some(120),
        difficulty: None,
        learning_objectives: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn block(
    id: &str,
    subject_id: &str,
    title: &str,
    minutes: u32,
    difficulty: DifficultyLevel,
    objectives: &[&str],
    activities: Vec<Activity>,
    order: u32,
) -> LearningBlock {
    LearningBlock {
        id: BlockId::new(id),
        subject_id: SubjectId::new(subject_id),
        title: title.to_string(),
        description: String::new(),
        estimated_duration: minutes,
        difficulty,
        learning_objectives: objectives.iter().map(|s| s.to_string()).collect(),
        materials: Vec::new(),
        activities,
        order,
    }
}

fn game_state(student: &str, xp: u64, streak: u32, preferences: LearningPreferences) -> GameState {
    let mut stats = GameStats {
        streak,
        ..GameStats::default()
    };
    stats.award_xp(xp);
    GameState {
        student_id: UserId::new(student),
        current_block_id: BlockId::new("physics-gravity"),
        current_activity_id: ActivityId::new("gravity-quiz"),
        progress: Map::new(),
        inventory: GameInventory::default(),
        stats,
        preferences,
    }
}

fn result(
    id: &str,
    student: &str,
    block_id: &str,
    score: f64,
    completed_at: DateTime<Utc>,
) -> TestResult {
    TestResult {
        id: TestResultId::new(id),
        student_id: UserId::new(student),
        block_id: BlockId::new(block_id),
        score,
        max_score: 100.0,
        time_spent: 600,
        answers: vec![TestAnswer {
            question_id: QuestionId::new(format!("{id}-q1")),
            user_answer: json!("9.81 N/kg"),
            correct_answer: json!("9.81 N/kg"),
            is_correct: score >= 50.0,
            time_spent: 600,
        }],
        feedback: String::new(),
        completed_at,
    }
}

/// Build the demo data set relative to `now`.
pub fn demo_data(now: DateTime<Utc>) -> DemoData {
    let users = vec![
        user("demo-student", "student@demo.cz", "Demo Student", UserRole::Student, now),
        user("demo-teacher", "ucitel@demo.cz", "Demo Učitel", UserRole::Teacher, now),
        user("demo-parent", "rodic@demo.cz", "Demo Rodič", UserRole::Parent, now),
        user("demo-psychologist", "psycholog@demo.cz", "Demo Psycholog", UserRole::Psychologist, now),
        user("demo-admin", "admin@demo.cz", "Demo Admin", UserRole::Admin, now),
        user("s1", "anna@school.cz", "Anna Nováková", UserRole::Student, now),
        user("s2", "tomas@school.cz", "Tomáš Svoboda", UserRole::Student, now),
        user("s3", "marie@school.cz", "Marie Procházková", UserRole::Student, now),
    ];

    let subjects = vec![
        subject("physics", "Fyzika", now),
        subject("math", "Matematika", now),
        subject("chemistry", "Chemie", now),
        subject("biology", "Biologie", now),
    ];

    let blocks = vec![
        block(
            "physics-gravity",
            "physics",
            "Gravitace a tíhová síla",
            180,
            DifficultyLevel::Medium,
            &["Porozumět gravitaci", "Vypočítat tíhovou sílu", "Aplikovat v příkladech"],
            vec![quiz(
                "gravity-quiz",
                "Tíhové zrychlení",
                "Jaká je přibližná hodnota tíhového zrychlení na Zemi?",
                &["1 N/kg", "9.81 N/kg", "98 N/kg"],
                "9.81 N/kg",
            )],
            1,
        ),
        block(
            "physics-newton",
            "physics",
            "Newtonovy zákony pohybu",
            270,
            DifficultyLevel::Hard,
            &["Znát všechny 3 zákony", "Řešit příklady", "Chápat aplikace"],
            vec![quiz(
                "newton-quiz",
                "Zákon setrvačnosti",
                "Který Newtonův zákon popisuje setrvačnost?",
                &["První", "Druhý", "Třetí"],
                "První",
            )],
            2,
        ),
        block(
            "physics-energy",
            "physics",
            "Energie a práce",
            225,
            DifficultyLevel::Medium,
            &["Definovat energii", "Pochopit zachování energie", "Vypočítat práci"],
            vec![quiz(
                "energy-quiz",
                "Jednotka práce",
                "V jakých jednotkách měříme práci?",
                &["Joule", "Watt", "Newton"],
                "Joule",
            )],
            3,
        ),
    ];

    let kinesthetic = LearningPreferences {
        visual_learning: 0.2,
        auditory_learning: 0.15,
        kinesthetic_learning: 0.5,
        reading_writing_learning: 0.15,
        ..LearningPreferences::default()
    };
    let visual = LearningPreferences {
        visual_learning: 0.55,
        auditory_learning: 0.15,
        kinesthetic_learning: 0.15,
        reading_writing_learning: 0.15,
        ..LearningPreferences::default()
    };
    let auditory = LearningPreferences {
        visual_learning: 0.2,
        auditory_learning: 0.45,
        kinesthetic_learning: 0.15,
        reading_writing_learning: 0.2,
        ..LearningPreferences::default()
    };

    let game_states = vec![
        game_state("demo-student", 2540, 7, LearningPreferences::default()),
        game_state("s1", 3100, 12, visual),
        game_state("s2", 900, 0, kinesthetic),
        game_state("s3", 1800, 4, auditory),
    ];

    let days_ago = |days: i64| now - Duration::days(days);
    let results = vec![
        result("seed-r1", "s1", "physics-gravity", 85.0, days_ago(6)),
        result("seed-r2", "s2", "physics-gravity", 45.0, days_ago(20)),
        result("seed-r3", "s3", "physics-gravity", 72.0, days_ago(3)),
        result("seed-r4", "demo-student", "physics-gravity", 65.0, days_ago(2)),
    ];

    DemoData {
        users,
        subjects,
        blocks,
        game_states,
        results,
    }
}
