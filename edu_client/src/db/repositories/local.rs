//! In-memory repository for local development and tests.
//!
//! All data lives behind a single `parking_lot::RwLock`; every trait method
//! takes the lock once, so each operation is atomic with respect to the
//! others.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::api::{
    Activity, ActivityId, BlockId, GameState, LearningBlock, LearningBlockUpdate, Material,
    MaterialId, NewLearningBlock, RegisterRequest, Subject, SubjectId, SubjectUpdate, TestId,
    TestResult, User, UserId, UserRole,
};
use crate::db::models::StoredTest;
use crate::db::password::{hash_password, verify_password};
use crate::db::repository::{
    AssessmentRepository, AuthRepository, CurriculumRepository, ErrorContext, FullRepository,
    GameRepository, RepositoryError, RepositoryResult,
};
use crate::db::seed::{demo_data, DEMO_PASSWORD};

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    password_hash: String,
}

#[derive(Debug, Default)]
struct Store {
    users: HashMap<UserId, UserRecord>,
    tokens: HashMap<String, UserId>,
    reset_tokens: HashMap<String, UserId>,
    subjects: BTreeMap<SubjectId, Subject>,
    materials: HashMap<SubjectId, Vec<Material>>,
    blocks: BTreeMap<BlockId, LearningBlock>,
    game_states: HashMap<UserId, GameState>,
    tests: HashMap<TestId, StoredTest>,
    results: Vec<TestResult>,
}

impl Store {
    fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.users
            .values()
            .find(|r| r.user.email.eq_ignore_ascii_case(email))
    }

    fn subject(&self, id: &SubjectId) -> RepositoryResult<&Subject> {
        self.subjects.get(id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Subject {} not found", id),
                ErrorContext::default().with_entity("subject").with_entity_id(id),
            )
        })
    }

    fn block(&self, id: &BlockId) -> RepositoryResult<&LearningBlock> {
        self.blocks.get(id).ok_or_else(|| block_not_found(id))
    }

    fn block_mut(&mut self, id: &BlockId) -> RepositoryResult<&mut LearningBlock> {
        self.blocks.get_mut(id).ok_or_else(|| block_not_found(id))
    }

    /// Fails if another block of `subject_id` already uses `order`.
    fn ensure_order_free(
        &self,
        subject_id: &SubjectId,
        order: u32,
        except: Option<&BlockId>,
    ) -> RepositoryResult<()> {
        let taken = self.blocks.values().any(|b| {
            &b.subject_id == subject_id && b.order == order && Some(&b.id) != except
        });
        if taken {
            return Err(RepositoryError::conflict_with_context(
                format!("Order {} is already used in subject {}", order, subject_id),
                ErrorContext::default()
                    .with_entity("block")
                    .with_details(format!("subject={}, order={}", subject_id, order)),
            ));
        }
        Ok(())
    }
}

fn block_not_found(id: &BlockId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Learning block {} not found", id),
        ErrorContext::default().with_entity("block").with_entity_id(id),
    )
}

/// Activities arriving without an id get a fresh one.
fn assign_activity_ids(activities: &mut [Activity]) {
    for activity in activities {
        if activity.id.as_str().is_empty() {
            activity.id = ActivityId::new(new_id());
        }
    }
}

/// In-memory implementation of [`FullRepository`].
#[derive(Debug, Default)]
pub struct LocalRepository {
    store: RwLock<Store>,
}

impl LocalRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository seeded with the demo accounts, subjects and history.
    pub fn with_demo_data() -> Self {
        let data = demo_data(Utc::now());
        let mut store = Store::default();
        let password_hash = hash_password(DEMO_PASSWORD);
        for user in data.users {
            store.users.insert(
                user.id.clone(),
                UserRecord {
                    user,
                    password_hash: password_hash.clone(),
                },
            );
        }
        for subject in data.subjects {
            store.subjects.insert(subject.id.clone(), subject);
        }
        for block in data.blocks {
            store.blocks.insert(block.id.clone(), block);
        }
        for state in data.game_states {
            store.game_states.insert(state.student_id.clone(), state);
        }
        store.results = data.results;
        debug!(
            users = store.users.len(),
            subjects = store.subjects.len(),
            blocks = store.blocks.len(),
            "Seeded local repository"
        );
        Self {
            store: RwLock::new(store),
        }
    }
}

#[async_trait]
impl AuthRepository for LocalRepository {
    async fn create_user(&self, request: RegisterRequest) -> RepositoryResult<User> {
        let email = request.email.trim();
        if !email.contains('@') {
            return Err(RepositoryError::validation(format!("Invalid email: {}", email)));
        }
        if request.password.is_empty() {
            return Err(RepositoryError::validation("Password must not be empty"));
        }
        if request.name.trim().is_empty() {
            return Err(RepositoryError::validation("Name must not be empty"));
        }

        let mut store = self.store.write();
        if store.user_by_email(email).is_some() {
            return Err(RepositoryError::conflict_with_context(
                format!("Email {} is already registered", email),
                ErrorContext::new("create_user").with_entity("user"),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(new_id()),
            email: email.to_string(),
            name: request.name.trim().to_string(),
            role: request.role,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(
            user.id.clone(),
            UserRecord {
                user: user.clone(),
                password_hash: hash_password(&request.password),
            },
        );
        Ok(user)
    }

    async fn verify_credentials(&self, email: &str, password: &str) -> RepositoryResult<User> {
        let store = self.store.read();
        store
            .user_by_email(email.trim())
            .filter(|r| verify_password(password, &r.password_hash))
            .map(|r| r.user.clone())
            .ok_or_else(|| RepositoryError::unauthorized("Invalid email or password"))
    }

    async fn get_user(&self, id: &UserId) -> RepositoryResult<User> {
        let store = self.store.read();
        store
            .users
            .get(id)
            .map(|r| r.user.clone())
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("User {} not found", id),
                    ErrorContext::default().with_entity("user").with_entity_id(id),
                )
            })
    }

    async fn list_users(&self, role: Option<UserRole>) -> RepositoryResult<Vec<User>> {
        let store = self.store.read();
        let mut users: Vec<User> = store
            .users
            .values()
            .filter(|r| role.map_or(true, |role| r.user.role == role))
            .map(|r| r.user.clone())
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn issue_token(&self, user_id: &UserId) -> RepositoryResult<String> {
        let mut store = self.store.write();
        if !store.users.contains_key(user_id) {
            return Err(RepositoryError::not_found(format!("User {} not found", user_id)));
        }
        let token = Uuid::new_v4().simple().to_string();
        store.tokens.insert(token.clone(), user_id.clone());
        Ok(token)
    }

    async fn resolve_token(&self, token: &str) -> RepositoryResult<User> {
        let store = self.store.read();
        store
            .tokens
            .get(token)
            .and_then(|id| store.users.get(id))
            .map(|r| r.user.clone())
            .ok_or_else(|| RepositoryError::unauthorized("Invalid or expired token"))
    }

    async fn revoke_token(&self, token: &str) -> RepositoryResult<()> {
        self.store.write().tokens.remove(token);
        Ok(())
    }

    async fn create_reset_token(&self, email: &str) -> RepositoryResult<Option<String>> {
        let mut store = self.store.write();
        let Some(user_id) = store.user_by_email(email.trim()).map(|r| r.user.id.clone()) else {
            return Ok(None);
        };
        let token = Uuid::new_v4().simple().to_string();
        store.reset_tokens.insert(token.clone(), user_id);
        Ok(Some(token))
    }

    async fn reset_password(&self, reset_token: &str, password: &str) -> RepositoryResult<()> {
        if password.is_empty() {
            return Err(RepositoryError::validation("Password must not be empty"));
        }
        let mut store = self.store.write();
        let user_id = store
            .reset_tokens
            .remove(reset_token)
            .ok_or_else(|| RepositoryError::validation("Invalid or used reset token"))?;
        let record = store
            .users
            .get_mut(&user_id)
            .ok_or_else(|| RepositoryError::not_found(format!("User {} not found", user_id)))?;
        record.password_hash = hash_password(password);
        record.user.updated_at = Utc::now();
        // Existing sessions of this user are no longer valid.
        store.tokens.retain(|_, owner| owner != &user_id);
        Ok(())
    }
}

#[async_trait]
impl CurriculumRepository for LocalRepository {
    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>> {
        Ok(self.store.read().subjects.values().cloned().collect())
    }

    async fn get_subject(&self, id: &SubjectId) -> RepositoryResult<Subject> {
        self.store.read().subject(id).cloned()
    }

    async fn create_subject(
        &self,
        name: String,
        grade: u8,
        teacher_id: UserId,
    ) -> RepositoryResult<Subject> {
        if name.trim().is_empty() {
            return Err(RepositoryError::validation("Subject name must not be empty"));
        }
        let now = Utc::now();
        let subject = Subject {
            id: SubjectId::new(new_id()),
            name: name.trim().to_string(),
            grade,
            teacher_id,
            created_at: now,
            updated_at: now,
        };
        self.store
            .write()
            .subjects
            .insert(subject.id.clone(), subject.clone());
        Ok(subject)
    }

    async fn update_subject(
        &self,
        id: &SubjectId,
        update: SubjectUpdate,
    ) -> RepositoryResult<Subject> {
        let mut store = self.store.write();
        let subject = store.subjects.get_mut(id).ok_or_else(|| {
            RepositoryError::not_found(format!("Subject {} not found", id))
                .with_operation("update_subject")
        })?;
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(RepositoryError::validation("Subject name must not be empty"));
            }
            subject.name = name.trim().to_string();
        }
        if let Some(grade) = update.grade {
            subject.grade = grade;
        }
        if let Some(teacher_id) = update.teacher_id {
            subject.teacher_id = teacher_id;
        }
        subject.updated_at = Utc::now();
        Ok(subject.clone())
    }

    async fn delete_subject(&self, id: &SubjectId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        if store.subjects.remove(id).is_none() {
            return Err(RepositoryError::not_found(format!("Subject {} not found", id))
                .with_operation("delete_subject"));
        }
        store.blocks.retain(|_, b| &b.subject_id != id);
        store.materials.remove(id);
        Ok(())
    }

    async fn add_material(
        &self,
        subject_id: &SubjectId,
        mut material: Material,
    ) -> RepositoryResult<Material> {
        let mut store = self.store.write();
        store.subject(subject_id)?;
        if material.id.as_str().is_empty() {
            material.id = MaterialId::new(new_id());
        }
        store
            .materials
            .entry(subject_id.clone())
            .or_default()
            .push(material.clone());
        Ok(material)
    }

    async fn list_materials(&self, subject_id: &SubjectId) -> RepositoryResult<Vec<Material>> {
        let store = self.store.read();
        store.subject(subject_id)?;
        Ok(store.materials.get(subject_id).cloned().unwrap_or_default())
    }

    async fn list_blocks(&self, subject_id: &SubjectId) -> RepositoryResult<Vec<LearningBlock>> {
        let store = self.store.read();
        store.subject(subject_id)?;
        let mut blocks: Vec<LearningBlock> = store
            .blocks
            .values()
            .filter(|b| &b.subject_id == subject_id)
            .cloned()
            .collect();
        blocks.sort_by_key(|b| b.order);
        Ok(blocks)
    }

    async fn get_block(&self, id: &BlockId) -> RepositoryResult<LearningBlock> {
        self.store.read().block(id).cloned()
    }

    async fn create_block(&self, new: NewLearningBlock) -> RepositoryResult<LearningBlock> {
        if new.title.trim().is_empty() {
            return Err(RepositoryError::validation("Block title must not be empty"));
        }
        let mut store = self.store.write();
        store.subject(&new.subject_id)?;
        store
            .ensure_order_free(&new.subject_id, new.order, None)
            .map_err(|e| e.with_operation("create_block"))?;

        let mut activities = new.activities;
        assign_activity_ids(&mut activities);
        let block = LearningBlock {
            id: BlockId::new(new_id()),
            subject_id: new.subject_id,
            title: new.title.trim().to_string(),
            description: new.description,
            estimated_duration: new.estimated_duration,
            difficulty: new.difficulty,
            learning_objectives: new.learning_objectives,
            materials: Vec::new(),
            activities,
            order: new.order,
        };
        store.blocks.insert(block.id.clone(), block.clone());
        Ok(block)
    }

    async fn update_block(
        &self,
        id: &BlockId,
        update: LearningBlockUpdate,
    ) -> RepositoryResult<LearningBlock> {
        let mut store = self.store.write();
        let subject_id = store.block(id)?.subject_id.clone();
        if let Some(order) = update.order {
            store
                .ensure_order_free(&subject_id, order, Some(id))
                .map_err(|e| e.with_operation("update_block"))?;
        }

        let block = store.block_mut(id)?;
        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(RepositoryError::validation("Block title must not be empty"));
            }
            block.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            block.description = description;
        }
        if let Some(minutes) = update.estimated_duration {
            block.estimated_duration = minutes;
        }
        if let Some(difficulty) = update.difficulty {
            block.difficulty = difficulty;
        }
        if let Some(objectives) = update.learning_objectives {
            block.learning_objectives = objectives;
        }
        if let Some(mut activities) = update.activities {
            assign_activity_ids(&mut activities);
            block.activities = activities;
        }
        if let Some(order) = update.order {
            block.order = order;
        }
        Ok(block.clone())
    }

    async fn delete_block(&self, id: &BlockId) -> RepositoryResult<()> {
        match self.store.write().blocks.remove(id) {
            Some(_) => Ok(()),
            None => Err(block_not_found(id).with_operation("delete_block")),
        }
    }

    async fn find_activity(&self, id: &ActivityId) -> RepositoryResult<(LearningBlock, Activity)> {
        let store = self.store.read();
        store
            .blocks
            .values()
            .find_map(|b| {
                b.activities
                    .iter()
                    .find(|a| &a.id == id)
                    .map(|a| (b.clone(), a.clone()))
            })
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Activity {} not found", id),
                    ErrorContext::default().with_entity("activity").with_entity_id(id),
                )
            })
    }
}

#[async_trait]
impl GameRepository for LocalRepository {
    async fn get_game_state(&self, student_id: &UserId) -> RepositoryResult<Option<GameState>> {
        Ok(self.store.read().game_states.get(student_id).cloned())
    }

    async fn put_game_state(&self, state: GameState) -> RepositoryResult<GameState> {
        self.store
            .write()
            .game_states
            .insert(state.student_id.clone(), state.clone());
        Ok(state)
    }

    async fn list_game_states(&self) -> RepositoryResult<Vec<GameState>> {
        Ok(self.store.read().game_states.values().cloned().collect())
    }
}

#[async_trait]
impl AssessmentRepository for LocalRepository {
    async fn store_test(&self, test: StoredTest) -> RepositoryResult<()> {
        self.store
            .write()
            .tests
            .insert(test.test.id.clone(), test);
        Ok(())
    }

    async fn get_test(&self, id: &TestId) -> RepositoryResult<StoredTest> {
        self.store.read().tests.get(id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Test {} not found", id),
                ErrorContext::default().with_entity("test").with_entity_id(id),
            )
        })
    }

    async fn append_result(&self, result: TestResult) -> RepositoryResult<TestResult> {
        let mut store = self.store.write();
        if store.results.iter().any(|r| r.id == result.id) {
            return Err(RepositoryError::conflict(format!(
                "Test result {} already recorded",
                result.id
            )));
        }
        store.results.push(result.clone());
        Ok(result)
    }

    async fn list_results(
        &self,
        student_id: &UserId,
        block_id: Option<&BlockId>,
    ) -> RepositoryResult<Vec<TestResult>> {
        let store = self.store.read();
        Ok(store
            .results
            .iter()
            .filter(|r| &r.student_id == student_id)
            .filter(|r| block_id.map_or(true, |b| &r.block_id == b))
            .cloned()
            .collect())
    }

    async fn list_all_results(&self) -> RepositoryResult<Vec<TestResult>> {
        Ok(self.store.read().results.clone())
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
