// tests/common/mod.rs

#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use uuid::Uuid;

use testhub::{
    auth::credentials::HashScheme,
    config::Config,
    error::{AppError, AppResult},
    handlers::auth::{AccountFields, create_account},
    models::{
        answer::{Answer, CreateAnswer},
        question::{CreateQuestionWithAnswers, Question, QuestionWithAnswers},
        result::{ResultView, TestResult},
        test::{CreateTestRequest, Test, TestWithQuestions},
        token::Token,
        user::{NewUser, Role, User},
    },
    repository::{
        AnswerRepository, QuestionRepository, ResultRepository, Store, TestRepository,
        TokenRepository, UserRepository,
    },
    routes,
    state::AppState,
};

pub const PASSWORD: &str = "correct horse battery";

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tokens: HashMap<String, Token>,
    tests: Vec<Test>,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    results: Vec<TestResult>,
}

impl Tables {
    fn answers_of(&self, question_id: Uuid) -> Vec<Answer> {
        self.answers
            .iter()
            .filter(|a| a.question_id == question_id)
            .cloned()
            .collect()
    }

    fn question_with_answers(&self, question: &Question) -> QuestionWithAnswers {
        QuestionWithAnswers {
            question: question.clone(),
            answers: self.answers_of(question.id),
        }
    }

    fn test_with_questions(&self, test: &Test) -> TestWithQuestions {
        TestWithQuestions {
            test: test.clone(),
            questions: self
                .questions
                .iter()
                .filter(|q| q.test_id == test.id)
                .map(|q| self.question_with_answers(q))
                .collect(),
        }
    }

    fn insert_question(
        &mut self,
        test_id: Uuid,
        request: CreateQuestionWithAnswers,
    ) -> QuestionWithAnswers {
        let question = Question {
            id: Uuid::new_v4(),
            test_id,
            text: request.text,
        };
        self.questions.push(question.clone());

        let answers = request
            .answers
            .into_iter()
            .map(|a| self.insert_answer(question.id, a))
            .collect();

        QuestionWithAnswers { question, answers }
    }

    fn insert_answer(&mut self, question_id: Uuid, request: CreateAnswer) -> Answer {
        let answer = Answer {
            id: Uuid::new_v4(),
            question_id,
            text: request.text,
            is_correct: request.is_correct,
        };
        self.answers.push(answer.clone());
        answer
    }

    fn remove_question(&mut self, id: Uuid) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q.id != id);
        self.answers.retain(|a| a.question_id != id);
        before != self.questions.len()
    }

    fn result_view(&self, result: &TestResult) -> ResultView {
        let mut view = ResultView::from(result.clone());
        view.test_title = self
            .tests
            .iter()
            .find(|t| t.id == result.test_id)
            .map(|t| t.title.clone());
        view
    }
}

/// In-memory stand-in for Postgres with the same uniqueness and cascade rules.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            middle_name: user.middle_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            role: user.role,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn exists_by_email_or_username(&self, email: &str, username: &str) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .any(|u| u.email == email || u.username == username))
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn create(&self, token: Token) -> AppResult<Token> {
        let mut tables = self.tables.write().await;
        if tables.tokens.contains_key(&token.id) {
            return Err(AppError::Conflict("Token already exists".to_string()));
        }
        tables.tokens.insert(token.id.clone(), token.clone());
        Ok(token)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Token>> {
        let tables = self.tables.read().await;
        Ok(tables.tokens.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.tokens.remove(id).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.tokens.len();
        tables.tokens.retain(|_, t| !t.is_expired_at(now));
        Ok((before - tables.tokens.len()) as u64)
    }
}

#[async_trait]
impl TestRepository for MemoryStore {
    async fn create_with_questions(
        &self,
        author_id: Uuid,
        request: CreateTestRequest,
    ) -> AppResult<TestWithQuestions> {
        let mut tables = self.tables.write().await;
        let test = Test {
            id: Uuid::new_v4(),
            title: request.title,
            author_id,
        };
        tables.tests.push(test.clone());

        let questions = request
            .questions
            .into_iter()
            .map(|q| tables.insert_question(test.id, q))
            .collect();

        Ok(TestWithQuestions { test, questions })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Test>> {
        let tables = self.tables.read().await;
        Ok(tables.tests.iter().find(|t| t.id == id).cloned())
    }

    async fn find_with_questions(&self, id: Uuid) -> AppResult<Option<TestWithQuestions>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tests
            .iter()
            .find(|t| t.id == id)
            .map(|t| tables.test_with_questions(t)))
    }

    async fn list_with_questions(&self) -> AppResult<Vec<TestWithQuestions>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tests
            .iter()
            .map(|t| tables.test_with_questions(t))
            .collect())
    }

    async fn update_title(&self, id: Uuid, title: &str) -> AppResult<Test> {
        let mut tables = self.tables.write().await;
        let test = tables
            .tests
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(AppError::NotFound("Test not found".to_string()))?;
        test.title = title.to_string();
        Ok(test.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.tests.len();
        tables.tests.retain(|t| t.id != id);
        if before == tables.tests.len() {
            return Ok(false);
        }

        let question_ids: Vec<Uuid> = tables
            .questions
            .iter()
            .filter(|q| q.test_id == id)
            .map(|q| q.id)
            .collect();
        for question_id in question_ids {
            tables.remove_question(question_id);
        }
        tables.results.retain(|r| r.test_id != id);
        Ok(true)
    }
}

#[async_trait]
impl QuestionRepository for MemoryStore {
    async fn create_with_answers(
        &self,
        test_id: Uuid,
        question: CreateQuestionWithAnswers,
    ) -> AppResult<QuestionWithAnswers> {
        let mut tables = self.tables.write().await;
        if !tables.tests.iter().any(|t| t.id == test_id) {
            return Err(AppError::NotFound("Test not found".to_string()));
        }
        Ok(tables.insert_question(test_id, question))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Question>> {
        let tables = self.tables.read().await;
        Ok(tables.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn find_with_answers(&self, id: Uuid) -> AppResult<Option<QuestionWithAnswers>> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .iter()
            .find(|q| q.id == id)
            .map(|q| tables.question_with_answers(q)))
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Question>> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .iter()
            .filter(|q| ids.contains(&q.id))
            .cloned()
            .collect())
    }

    async fn update_text(&self, id: Uuid, text: &str) -> AppResult<Question> {
        let mut tables = self.tables.write().await;
        let question = tables
            .questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(AppError::NotFound("Question not found".to_string()))?;
        question.text = text.to_string();
        Ok(question.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.remove_question(id))
    }
}

#[async_trait]
impl AnswerRepository for MemoryStore {
    async fn create(&self, question_id: Uuid, answer: CreateAnswer) -> AppResult<Answer> {
        let mut tables = self.tables.write().await;
        if !tables.questions.iter().any(|q| q.id == question_id) {
            return Err(AppError::NotFound("Question not found".to_string()));
        }
        Ok(tables.insert_answer(question_id, answer))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Answer>> {
        let tables = self.tables.read().await;
        Ok(tables.answers.iter().find(|a| a.id == id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Answer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .answers
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: Uuid,
        text: Option<&str>,
        is_correct: Option<bool>,
    ) -> AppResult<Answer> {
        let mut tables = self.tables.write().await;
        let answer = tables
            .answers
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AppError::NotFound("Answer not found".to_string()))?;
        if let Some(text) = text {
            answer.text = text.to_string();
        }
        if let Some(is_correct) = is_correct {
            answer.is_correct = is_correct;
        }
        Ok(answer.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.answers.len();
        tables.answers.retain(|a| a.id != id);
        Ok(before != tables.answers.len())
    }
}

#[async_trait]
impl ResultRepository for MemoryStore {
    async fn create(&self, student_id: Uuid, test_id: Uuid, score: i32) -> AppResult<TestResult> {
        let mut tables = self.tables.write().await;
        let result = TestResult {
            id: Uuid::new_v4(),
            student_id,
            test_id,
            score,
        };
        tables.results.push(result.clone());
        Ok(result)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ResultView>> {
        let tables = self.tables.read().await;
        Ok(tables
            .results
            .iter()
            .find(|r| r.id == id)
            .map(|r| tables.result_view(r)))
    }

    async fn list(&self, student_id: Option<Uuid>) -> AppResult<Vec<ResultView>> {
        let tables = self.tables.read().await;
        Ok(tables
            .results
            .iter()
            .rev()
            .filter(|r| student_id.is_none_or(|id| r.student_id == id))
            .map(|r| tables.result_view(r))
            .collect())
    }
}

pub struct TestApp {
    pub address: String,
    pub store: Store,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port backed by a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    let store = Store::from_backend(Arc::new(MemoryStore::default()));

    let state = AppState {
        store: store.clone(),
        config: Config::for_tests(),
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        store,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Inserts a user straight into the store, bypassing registration rules.
    pub async fn create_user(&self, role: Role, first_name: &str, last_name: &str) -> User {
        create_account(
            &self.store,
            HashScheme::default(),
            AccountFields {
                email: &format!("{}.{}@example.com", first_name, last_name).to_lowercase(),
                first_name,
                middle_name: None,
                last_name,
                password: PASSWORD,
                role,
            },
        )
        .await
        .expect("Failed to create user")
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates a user of `role` and returns it together with a fresh access token.
    pub async fn user_with_token(
        &self,
        role: Role,
        first_name: &str,
        last_name: &str,
    ) -> (User, String) {
        let user = self.create_user(role, first_name, last_name).await;
        let response = self.login(&user.username, PASSWORD).await;
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        let token = body["access_token"].as_str().unwrap().to_string();
        (user, token)
    }

    /// Creates a test with `n` questions, each with a correct and a wrong answer.
    pub async fn create_test(&self, token: &str, title: &str, n: usize) -> Value {
        let questions: Vec<Value> = (0..n)
            .map(|i| {
                json!({
                    "text": format!("Question {}", i),
                    "answers": [
                        { "text": "right", "is_correct": true },
                        { "text": "wrong", "is_correct": false },
                    ]
                })
            })
            .collect();

        let response = self
            .client
            .post(self.url("/api/tests"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "questions": questions }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.unwrap()
    }
}

/// Finds the id of the answer with the given correctness in a revealed test view.
pub fn pick_answer(question: &Value, correct: bool) -> String {
    question["answers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["is_correct"] == correct)
        .map(|a| a["id"].as_str().unwrap().to_string())
        .unwrap()
}
