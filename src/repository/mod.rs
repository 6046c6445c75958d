// src/repository/mod.rs

//! Persistence seams. Each entity gets its own async trait so the core can run
//! against Postgres in production and against any other implementation in tests.

pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        answer::{Answer, CreateAnswer},
        question::{CreateQuestionWithAnswers, Question, QuestionWithAnswers},
        result::{ResultView, TestResult},
        test::{CreateTestRequest, Test, TestWithQuestions},
        token::Token,
        user::{NewUser, User},
    },
};

pub use postgres::PgStore;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email or username is taken.
    async fn create(&self, user: NewUser) -> AppResult<User>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn exists_by_email_or_username(&self, email: &str, username: &str) -> AppResult<bool>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn create(&self, token: Token) -> AppResult<Token>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Token>>;
    /// Returns `false` when no token with this id existed.
    async fn delete(&self, id: &str) -> AppResult<bool>;
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

#[async_trait]
pub trait TestRepository: Send + Sync {
    /// Inserts the test, its questions and their answers atomically.
    async fn create_with_questions(
        &self,
        author_id: Uuid,
        request: CreateTestRequest,
    ) -> AppResult<TestWithQuestions>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Test>>;
    async fn find_with_questions(&self, id: Uuid) -> AppResult<Option<TestWithQuestions>>;
    async fn list_with_questions(&self) -> AppResult<Vec<TestWithQuestions>>;
    async fn update_title(&self, id: Uuid, title: &str) -> AppResult<Test>;
    /// Removes the test together with its questions and answers.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Inserts the question and its answers atomically.
    async fn create_with_answers(
        &self,
        test_id: Uuid,
        question: CreateQuestionWithAnswers,
    ) -> AppResult<QuestionWithAnswers>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Question>>;
    async fn find_with_answers(&self, id: Uuid) -> AppResult<Option<QuestionWithAnswers>>;
    /// Bulk lookup; ids that do not exist are simply absent from the result.
    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Question>>;
    async fn update_text(&self, id: Uuid, text: &str) -> AppResult<Question>;
    /// Removes the question together with its answers.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait AnswerRepository: Send + Sync {
    async fn create(&self, question_id: Uuid, answer: CreateAnswer) -> AppResult<Answer>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Answer>>;
    /// Bulk lookup; ids that do not exist are simply absent from the result.
    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Answer>>;
    async fn update(
        &self,
        id: Uuid,
        text: Option<&str>,
        is_correct: Option<bool>,
    ) -> AppResult<Answer>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait ResultRepository: Send + Sync {
    async fn create(&self, student_id: Uuid, test_id: Uuid, score: i32) -> AppResult<TestResult>;
    /// Joined with the test title.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ResultView>>;
    /// Joined with test titles; `student_id = None` lists everyone's results.
    async fn list(&self, student_id: Option<Uuid>) -> AppResult<Vec<ResultView>>;
}

/// Bundle of repository handles shared by every request.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub tests: Arc<dyn TestRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub answers: Arc<dyn AnswerRepository>,
    pub results: Arc<dyn ResultRepository>,
}

impl Store {
    /// Uses one implementation for every repository.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserRepository
            + TokenRepository
            + TestRepository
            + QuestionRepository
            + AnswerRepository
            + ResultRepository
            + 'static,
    {
        Self {
            users: backend.clone(),
            tokens: backend.clone(),
            tests: backend.clone(),
            questions: backend.clone(),
            answers: backend.clone(),
            results: backend,
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::from_backend(Arc::new(PgStore::new(pool)))
    }
}
