//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to one client operation and delegates to the
//! repository and the service layer. Handlers that take an [`AuthSession`]
//! require a valid bearer token.

use std::collections::{BTreeMap, HashSet};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Map};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::auth::AuthSession;
use super::dto::HealthResponse;
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    Achievement, Acknowledgement, AiAnalysis, AnswerOutcome, AnswerSubmission, AuthResponse,
    BlockId, ClassAnalysis, ForgotPasswordRequest, GameState, GenerateTestRequest,
    GeneratedScenario, GeneratedTest, LeaderboardEntry, LeaderboardQuery, LearningBlock,
    LearningBlockUpdate, LearningStyleAnalysis, LoginRequest, Material, MaterialId, MaterialType,
    NewLearningBlock, NewSubject, PerformancePrediction, RegisterRequest, ResetPasswordRequest,
    RiskFlag, ScenarioRequest, Subject, SubjectId, SubjectUpdate, SubmitTestRequest, TestId,
    TestResult, TestResultsQuery, TokenResponse, User, UserId, UserRole,
};
use crate::client::upload::FILE_FIELD;
use crate::db::repository::{
    AssessmentRepository, AuthRepository, CurriculumRepository, FullRepository, GameRepository,
};
use crate::services::{self, StudentRecord};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for handlers that create a resource.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

fn created<T>(value: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(value)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let repository = match state.repository.health_check().await {
        Ok(true) => "ok".to_string(),
        Ok(false) => "unavailable".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        repository,
    }))
}

// =============================================================================
// Auth
// =============================================================================

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> HandlerResult<AuthResponse> {
    let user = state
        .repository
        .verify_credentials(&request.email, &request.password)
        .await?;
    let token = state.repository.issue_token(&user.id).await?;
    info!(user_id = %user.id, role = %user.role, "User logged in");
    Ok(Json(AuthResponse { user, token }))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> CreatedResult<AuthResponse> {
    let user = state.repository.create_user(request).await?;
    let token = state.repository.issue_token(&user.id).await?;
    info!(user_id = %user.id, role = %user.role, "User registered");
    created(AuthResponse { user, token })
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    session: AuthSession,
) -> HandlerResult<Acknowledgement> {
    state.repository.revoke_token(&session.token).await?;
    Ok(Json(Acknowledgement::new("Logged out")))
}

/// POST /api/auth/refresh
///
/// Issues a new token and revokes the one used for the request.
pub async fn refresh_token(
    State(state): State<AppState>,
    session: AuthSession,
) -> HandlerResult<TokenResponse> {
    let token = state.repository.issue_token(&session.user.id).await?;
    state.repository.revoke_token(&session.token).await?;
    Ok(Json(TokenResponse { token }))
}

/// POST /api/auth/forgot-password
///
/// Answers the same way whether or not the account exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> HandlerResult<Acknowledgement> {
    if let Some(reset_token) = state.repository.create_reset_token(&request.email).await? {
        // No mail transport here; the token goes to the log instead.
        info!(email = %request.email, %reset_token, "Password reset requested");
    }
    Ok(Json(Acknowledgement::new(
        "If the account exists, password reset instructions have been sent",
    )))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> HandlerResult<Acknowledgement> {
    state
        .repository
        .reset_password(&request.token, &request.password)
        .await?;
    Ok(Json(Acknowledgement::new("Password has been reset")))
}

// =============================================================================
// Subjects
// =============================================================================

/// GET /api/subjects
pub async fn list_subjects(
    State(state): State<AppState>,
    _session: AuthSession,
) -> HandlerResult<Vec<Subject>> {
    Ok(Json(state.repository.list_subjects().await?))
}

/// GET /api/subjects/{id}
pub async fn get_subject(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<SubjectId>,
) -> HandlerResult<Subject> {
    Ok(Json(state.repository.get_subject(&id).await?))
}

/// POST /api/subjects
///
/// The teacher defaults to the caller.
pub async fn create_subject(
    State(state): State<AppState>,
    session: AuthSession,
    Json(request): Json<NewSubject>,
) -> CreatedResult<Subject> {
    let teacher_id = request.teacher_id.unwrap_or(session.user.id);
    let subject = state
        .repository
        .create_subject(request.name, request.grade, teacher_id)
        .await?;
    created(subject)
}

/// PUT /api/subjects/{id}
pub async fn update_subject(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<SubjectId>,
    Json(update): Json<SubjectUpdate>,
) -> HandlerResult<Subject> {
    Ok(Json(state.repository.update_subject(&id, update).await?))
}

/// DELETE /api/subjects/{id}
pub async fn delete_subject(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<SubjectId>,
) -> HandlerResult<Acknowledgement> {
    state.repository.delete_subject(&id).await?;
    Ok(Json(Acknowledgement::new(format!("Subject {} deleted", id))))
}

/// POST /api/subjects/{id}/materials (multipart, single `file` part)
pub async fn upload_material(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<SubjectId>,
    mut multipart: Multipart,
) -> CreatedResult<Material> {
    // Fail fast on unknown subjects before reading the body.
    state.repository.get_subject(&id).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("File part has no file name".into()))?;
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        let mut metadata = Map::new();
        metadata.insert("size".into(), json!(data.len()));
        metadata.insert("sha256".into(), json!(hex::encode(Sha256::digest(&data))));
        if let Some(content_type) = content_type {
            metadata.insert("contentType".into(), json!(content_type));
        }

        let material_id = MaterialId::new(uuid::Uuid::new_v4().to_string());
        let material = Material {
            url: format!("/uploads/{}/{}", id, material_id),
            id: material_id,
            kind: MaterialType::from_file_name(&file_name),
            name: file_name,
            metadata,
        };
        let material = state.repository.add_material(&id, material).await?;
        info!(subject_id = %id, material_id = %material.id, size = data.len(), "Material uploaded");
        return created(material);
    }

    Err(AppError::BadRequest(format!(
        "Multipart body has no `{}` part",
        FILE_FIELD
    )))
}

// =============================================================================
// Learning blocks
// =============================================================================

/// GET /api/subjects/{id}/blocks
pub async fn list_blocks(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(subject_id): Path<SubjectId>,
) -> HandlerResult<Vec<LearningBlock>> {
    Ok(Json(state.repository.list_blocks(&subject_id).await?))
}

/// GET /api/blocks/{id}
pub async fn get_block(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<BlockId>,
) -> HandlerResult<LearningBlock> {
    Ok(Json(state.repository.get_block(&id).await?))
}

/// POST /api/blocks
pub async fn create_block(
    State(state): State<AppState>,
    _session: AuthSession,
    Json(request): Json<NewLearningBlock>,
) -> CreatedResult<LearningBlock> {
    created(state.repository.create_block(request).await?)
}

/// PUT /api/blocks/{id}
pub async fn update_block(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<BlockId>,
    Json(update): Json<LearningBlockUpdate>,
) -> HandlerResult<LearningBlock> {
    Ok(Json(state.repository.update_block(&id, update).await?))
}

/// DELETE /api/blocks/{id}
pub async fn delete_block(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<BlockId>,
) -> HandlerResult<Acknowledgement> {
    state.repository.delete_block(&id).await?;
    Ok(Json(Acknowledgement::new(format!("Learning block {} deleted", id))))
}

/// Load a user and make sure it is a student.
async fn student(repo: &dyn FullRepository, id: &UserId) -> Result<User, AppError> {
    let user = repo.get_user(id).await?;
    if user.role != UserRole::Student {
        return Err(AppError::BadRequest(format!("User {} is not a student", id)));
    }
    Ok(user)
}

/// POST /api/blocks/{id}/generate-scenario
pub async fn generate_scenario(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(block_id): Path<BlockId>,
    Json(request): Json<ScenarioRequest>,
) -> HandlerResult<GeneratedScenario> {
    let repo = state.repository.as_ref();
    let block = repo.get_block(&block_id).await?;
    let student = student(repo, &request.student_id).await?;
    let preferences = repo
        .get_game_state(&student.id)
        .await?
        .map(|s| s.preferences)
        .unwrap_or_default();
    Ok(Json(services::generate_scenario(
        &block,
        &student,
        &preferences,
        Utc::now(),
    )))
}

// =============================================================================
// Game
// =============================================================================

/// First block of the first subject, used as the starting point.
async fn first_block(repo: &dyn FullRepository) -> Result<Option<LearningBlock>, AppError> {
    for subject in repo.list_subjects().await? {
        if let Some(block) = repo.list_blocks(&subject.id).await?.into_iter().next() {
            return Ok(Some(block));
        }
    }
    Ok(None)
}

/// GET /api/game/state/{student_id}
///
/// Students who never saved a state get a fresh one; it is not stored.
pub async fn get_game_state(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(student_id): Path<UserId>,
) -> HandlerResult<GameState> {
    let repo = state.repository.as_ref();
    let student = student(repo, &student_id).await?;
    if let Some(game_state) = repo.get_game_state(&student.id).await? {
        return Ok(Json(game_state));
    }
    let first = first_block(repo).await?;
    Ok(Json(services::initial_game_state(student.id, first.as_ref())))
}

/// PUT /api/game/state/{student_id}
pub async fn update_game_state(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(student_id): Path<UserId>,
    Json(game_state): Json<GameState>,
) -> HandlerResult<GameState> {
    if game_state.student_id != student_id {
        return Err(AppError::BadRequest(format!(
            "Body is for student {} but the path names {}",
            game_state.student_id, student_id
        )));
    }
    let repo = state.repository.as_ref();
    student(repo, &student_id).await?;
    debug!(student_id = %student_id, xp = game_state.stats.total_xp, "Saving game state");
    Ok(Json(repo.put_game_state(game_state).await?))
}

/// POST /api/game/activities/{id}/answer
pub async fn submit_answer(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(activity_id): Path<crate::api::ActivityId>,
    Json(submission): Json<AnswerSubmission>,
) -> HandlerResult<AnswerOutcome> {
    let (_, activity) = state.repository.find_activity(&activity_id).await?;
    Ok(Json(services::check_activity_answer(
        &activity,
        &submission.answer,
    )))
}

/// GET /api/game/achievements/{student_id}
pub async fn get_achievements(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(student_id): Path<UserId>,
) -> HandlerResult<Vec<Achievement>> {
    let repo = state.repository.as_ref();
    student(repo, &student_id).await?;
    let achievements = repo
        .get_game_state(&student_id)
        .await?
        .map(|s| s.inventory.achievements)
        .unwrap_or_default();
    Ok(Json(achievements))
}

/// Students with at least one result in a block of `subject_id`.
async fn students_in_subject(
    repo: &dyn FullRepository,
    subject_id: &SubjectId,
) -> Result<HashSet<UserId>, AppError> {
    let blocks: HashSet<BlockId> = repo
        .list_blocks(subject_id)
        .await?
        .into_iter()
        .map(|b| b.id)
        .collect();
    Ok(repo
        .list_all_results()
        .await?
        .into_iter()
        .filter(|r| blocks.contains(&r.block_id))
        .map(|r| r.student_id)
        .collect())
}

/// GET /api/game/leaderboard?subjectId=
pub async fn get_leaderboard(
    State(state): State<AppState>,
    _session: AuthSession,
    Query(query): Query<LeaderboardQuery>,
) -> HandlerResult<Vec<LeaderboardEntry>> {
    let repo = state.repository.as_ref();
    let only = match &query.subject_id {
        Some(subject_id) => Some(students_in_subject(repo, subject_id).await?),
        None => None,
    };
    let students = repo.list_users(Some(UserRole::Student)).await?;
    let states = repo.list_game_states().await?;
    Ok(Json(services::leaderboard(&states, &students, only.as_ref())))
}

// =============================================================================
// Analytics
// =============================================================================

async fn student_record(
    repo: &dyn FullRepository,
    student_id: &UserId,
) -> Result<StudentRecord, AppError> {
    let user = student(repo, student_id).await?;
    let results = repo.list_results(&user.id, None).await?;
    let game_state = repo.get_game_state(&user.id).await?;
    Ok(StudentRecord {
        user,
        results,
        game_state,
    })
}

fn preferences_of(record: &StudentRecord) -> crate::api::LearningPreferences {
    record
        .game_state
        .as_ref()
        .map(|s| s.preferences.clone())
        .unwrap_or_default()
}

/// GET /api/analytics/student/{id}
pub async fn get_student_analysis(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(student_id): Path<UserId>,
) -> HandlerResult<AiAnalysis> {
    let repo = state.repository.as_ref();
    let record = student_record(repo, &student_id).await?;

    let mut activities = Vec::new();
    for subject in repo.list_subjects().await? {
        for block in repo.list_blocks(&subject.id).await? {
            activities.extend(block.activities);
        }
    }

    Ok(Json(services::analyze_student(
        &record.user,
        &preferences_of(&record),
        &record.results,
        record.game_state.as_ref(),
        &activities,
        Utc::now(),
    )))
}

/// GET /api/analytics/class/{id}
///
/// A class is the set of students with results in the subject `id`.
pub async fn get_class_analysis(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(class_id): Path<SubjectId>,
) -> HandlerResult<ClassAnalysis> {
    let repo = state.repository.as_ref();
    let blocks: HashSet<BlockId> = repo
        .list_blocks(&class_id)
        .await?
        .into_iter()
        .map(|b| b.id)
        .collect();

    let mut by_student: BTreeMap<UserId, Vec<TestResult>> = BTreeMap::new();
    for result in repo.list_all_results().await? {
        if blocks.contains(&result.block_id) {
            by_student
                .entry(result.student_id.clone())
                .or_default()
                .push(result);
        }
    }

    let mut records = Vec::with_capacity(by_student.len());
    for (student_id, results) in by_student {
        let user = repo.get_user(&student_id).await?;
        let game_state = repo.get_game_state(&student_id).await?;
        records.push(StudentRecord {
            user,
            results,
            game_state,
        });
    }
    records.sort_by(|a, b| a.user.name.cmp(&b.user.name));

    Ok(Json(services::class_analysis(
        class_id.as_str(),
        &records,
        Utc::now(),
    )))
}

/// GET /api/analytics/learning-style/{id}
pub async fn get_learning_style(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(student_id): Path<UserId>,
) -> HandlerResult<LearningStyleAnalysis> {
    let record = student_record(state.repository.as_ref(), &student_id).await?;
    Ok(Json(services::analysis::learning_style(
        &preferences_of(&record),
        Utc::now(),
    )))
}

/// GET /api/analytics/prediction/{id}
pub async fn get_performance_prediction(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(student_id): Path<UserId>,
) -> HandlerResult<PerformancePrediction> {
    let record = student_record(state.repository.as_ref(), &student_id).await?;
    Ok(Json(services::analysis::predict_performance(&record.results)))
}

/// GET /api/analytics/risks/{id}
pub async fn get_risk_analysis(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(student_id): Path<UserId>,
) -> HandlerResult<Vec<RiskFlag>> {
    let record = student_record(state.repository.as_ref(), &student_id).await?;
    Ok(Json(services::analysis::detect_risks(
        &record.results,
        record.game_state.as_ref(),
        Utc::now(),
    )))
}

// =============================================================================
// Tests
// =============================================================================

/// POST /api/tests/generate
pub async fn generate_test(
    State(state): State<AppState>,
    _session: AuthSession,
    Json(request): Json<GenerateTestRequest>,
) -> CreatedResult<GeneratedTest> {
    let repo = state.repository.as_ref();
    let block = repo.get_block(&request.block_id).await?;
    let student = student(repo, &request.student_id).await?;
    let stored = services::generate_test(&block, &student, &request.options, Utc::now())?;
    let test = stored.test.clone();
    repo.store_test(stored).await?;
    info!(test_id = %test.id, block_id = %test.block_id, questions = test.questions.len(), "Test generated");
    created(test)
}

/// POST /api/tests/{id}/submit
///
/// Every submission records a new result.
pub async fn submit_test(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(test_id): Path<TestId>,
    Json(request): Json<SubmitTestRequest>,
) -> CreatedResult<TestResult> {
    let repo = state.repository.as_ref();
    let stored = repo.get_test(&test_id).await?;
    let result = services::score_submission(
        &stored,
        stored.test.student_id.clone(),
        request.answers,
        Utc::now(),
    )?;
    let result = repo.append_result(result).await?;
    info!(test_id = %test_id, result_id = %result.id, score = result.score, max_score = result.max_score, "Test submitted");
    created(result)
}

/// GET /api/tests/results/{student_id}?blockId=
pub async fn get_test_results(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(student_id): Path<UserId>,
    Query(query): Query<TestResultsQuery>,
) -> HandlerResult<Vec<TestResult>> {
    Ok(Json(
        state
            .repository
            .list_results(&student_id, query.block_id.as_ref())
            .await?,
    ))
}

/// GET /api/tests/{id}
pub async fn get_test(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(test_id): Path<TestId>,
) -> HandlerResult<GeneratedTest> {
    Ok(Json(state.repository.get_test(&test_id).await?.test))
}
