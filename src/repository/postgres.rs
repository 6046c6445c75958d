// src/repository/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        answer::{Answer, CreateAnswer},
        question::{CreateQuestionWithAnswers, Question, QuestionWithAnswers},
        result::{ResultView, TestResult},
        test::{CreateTestRequest, Test, TestWithQuestions},
        token::Token,
        user::{NewUser, User},
    },
    repository::{
        AnswerRepository, QuestionRepository, ResultRepository, TestRepository, TokenRepository,
        UserRepository,
    },
};

/// Postgres implementation of every repository trait.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_question_tx(
        tx: &mut Transaction<'_, Postgres>,
        test_id: Uuid,
        question: CreateQuestionWithAnswers,
    ) -> AppResult<QuestionWithAnswers> {
        let inserted = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (id, test_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, test_id, text
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(test_id)
        .bind(&question.text)
        .fetch_one(&mut **tx)
        .await?;

        let mut answers = Vec::with_capacity(question.answers.len());
        for answer in question.answers {
            answers.push(Self::insert_answer(&mut **tx, inserted.id, answer).await?);
        }

        Ok(QuestionWithAnswers {
            question: inserted,
            answers,
        })
    }

    async fn insert_answer<'e, E>(
        executor: E,
        question_id: Uuid,
        answer: CreateAnswer,
    ) -> AppResult<Answer>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let answer = sqlx::query_as::<_, Answer>(
            r#"
            INSERT INTO answers (id, question_id, text, is_correct)
            VALUES ($1, $2, $3, $4)
            RETURNING id, question_id, text, is_correct
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(question_id)
        .bind(&answer.text)
        .bind(answer.is_correct)
        .fetch_one(executor)
        .await?;

        Ok(answer)
    }

    /// Loads the questions of the given tests with their answers, in creation order.
    async fn load_questions(&self, test_ids: &[Uuid]) -> AppResult<Vec<QuestionWithAnswers>> {
        if test_ids.is_empty() {
            return Ok(Vec::new());
        }

        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, test_id, text FROM questions WHERE test_id = ANY($1) ORDER BY seq",
        )
        .bind(test_ids)
        .fetch_all(&self.pool)
        .await?;

        let question_ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
        let mut answers_by_question = self.load_answers(&question_ids).await?;

        Ok(questions
            .into_iter()
            .map(|question| {
                let answers = answers_by_question.remove(&question.id).unwrap_or_default();
                QuestionWithAnswers { question, answers }
            })
            .collect())
    }

    async fn load_answers(&self, question_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<Answer>>> {
        if question_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let answers = sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, question_id, text, is_correct
            FROM answers
            WHERE question_id = ANY($1)
            ORDER BY seq
            "#,
        )
        .bind(question_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Answer>> = HashMap::new();
        for answer in answers {
            grouped.entry(answer.question_id).or_default().push(answer);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (id, email, username, first_name, middle_name, last_name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, email, username, first_name, middle_name, last_name, password_hash, role
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.middle_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "User '{}' or '{}' already exists",
                        user.username, user.email
                    ));
                }
            }
            tracing::error!("Failed to create user: {:?}", e);
            AppError::from(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, first_name, middle_name, last_name, password_hash, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, first_name, middle_name, last_name, password_hash, role
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn exists_by_email_or_username(&self, email: &str, username: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 OR username = $2)",
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[async_trait]
impl TokenRepository for PgStore {
    async fn create(&self, token: Token) -> AppResult<Token> {
        sqlx::query(
            "INSERT INTO tokens (id, user_id, created_at, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&token.id)
        .bind(token.user_id)
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Token>> {
        let token = sqlx::query_as::<_, Token>(
            "SELECT id, user_id, created_at, expires_at FROM tokens WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM tokens WHERE expires_at IS NOT NULL AND expires_at <= $1")
                .bind(now)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TestRepository for PgStore {
    async fn create_with_questions(
        &self,
        author_id: Uuid,
        request: CreateTestRequest,
    ) -> AppResult<TestWithQuestions> {
        // Transaction: test + questions + answers land together or not at all
        let mut tx = self.pool.begin().await?;

        let test = sqlx::query_as::<_, Test>(
            r#"
            INSERT INTO tests (id, title, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, author_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.title)
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut questions = Vec::with_capacity(request.questions.len());
        for question in request.questions {
            questions.push(Self::insert_question_tx(&mut tx, test.id, question).await?);
        }

        tx.commit().await?;

        Ok(TestWithQuestions { test, questions })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Test>> {
        let test = sqlx::query_as::<_, Test>("SELECT id, title, author_id FROM tests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(test)
    }

    async fn find_with_questions(&self, id: Uuid) -> AppResult<Option<TestWithQuestions>> {
        let Some(test) = TestRepository::find_by_id(self, id).await? else {
            return Ok(None);
        };

        let questions = self.load_questions(&[test.id]).await?;
        Ok(Some(TestWithQuestions { test, questions }))
    }

    async fn list_with_questions(&self) -> AppResult<Vec<TestWithQuestions>> {
        let tests =
            sqlx::query_as::<_, Test>("SELECT id, title, author_id FROM tests ORDER BY seq")
                .fetch_all(&self.pool)
                .await?;

        let test_ids: Vec<Uuid> = tests.iter().map(|t| t.id).collect();
        let mut questions_by_test: HashMap<Uuid, Vec<QuestionWithAnswers>> = HashMap::new();
        for question in self.load_questions(&test_ids).await? {
            questions_by_test
                .entry(question.question.test_id)
                .or_default()
                .push(question);
        }

        Ok(tests
            .into_iter()
            .map(|test| {
                let questions = questions_by_test.remove(&test.id).unwrap_or_default();
                TestWithQuestions { test, questions }
            })
            .collect())
    }

    async fn update_title(&self, id: Uuid, title: &str) -> AppResult<Test> {
        sqlx::query_as::<_, Test>(
            "UPDATE tests SET title = $1 WHERE id = $2 RETURNING id, title, author_id",
        )
        .bind(title)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        // questions, answers and results go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM tests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl QuestionRepository for PgStore {
    async fn create_with_answers(
        &self,
        test_id: Uuid,
        question: CreateQuestionWithAnswers,
    ) -> AppResult<QuestionWithAnswers> {
        let mut tx = self.pool.begin().await?;
        let created = Self::insert_question_tx(&mut tx, test_id, question).await?;
        tx.commit().await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Question>> {
        let question =
            sqlx::query_as::<_, Question>("SELECT id, test_id, text FROM questions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(question)
    }

    async fn find_with_answers(&self, id: Uuid) -> AppResult<Option<QuestionWithAnswers>> {
        let Some(question) = QuestionRepository::find_by_id(self, id).await? else {
            return Ok(None);
        };

        let answers = self
            .load_answers(&[question.id])
            .await?
            .remove(&question.id)
            .unwrap_or_default();

        Ok(Some(QuestionWithAnswers { question, answers }))
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Question>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, test_id, text FROM questions WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn update_text(&self, id: Uuid, text: &str) -> AppResult<Question> {
        sqlx::query_as::<_, Question>(
            "UPDATE questions SET text = $1 WHERE id = $2 RETURNING id, test_id, text",
        )
        .bind(text)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AnswerRepository for PgStore {
    async fn create(&self, question_id: Uuid, answer: CreateAnswer) -> AppResult<Answer> {
        Self::insert_answer(&self.pool, question_id, answer).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Answer>> {
        let answer = sqlx::query_as::<_, Answer>(
            "SELECT id, question_id, text, is_correct FROM answers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(answer)
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Answer>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let answers = sqlx::query_as::<_, Answer>(
            "SELECT id, question_id, text, is_correct FROM answers WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }

    async fn update(
        &self,
        id: Uuid,
        text: Option<&str>,
        is_correct: Option<bool>,
    ) -> AppResult<Answer> {
        sqlx::query_as::<_, Answer>(
            r#"
            UPDATE answers
            SET text = COALESCE($1, text),
                is_correct = COALESCE($2, is_correct)
            WHERE id = $3
            RETURNING id, question_id, text, is_correct
            "#,
        )
        .bind(text)
        .bind(is_correct)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Answer not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM answers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ResultRepository for PgStore {
    async fn create(&self, student_id: Uuid, test_id: Uuid, score: i32) -> AppResult<TestResult> {
        let result = sqlx::query_as::<_, TestResult>(
            r#"
            INSERT INTO results (id, student_id, test_id, score)
            VALUES ($1, $2, $3, $4)
            RETURNING id, student_id, test_id, score
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(test_id)
        .bind(score)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert result: {:?}", e);
            AppError::from(e)
        })?;

        Ok(result)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ResultView>> {
        let result = sqlx::query_as::<_, ResultView>(
            r#"
            SELECT r.id, r.student_id, r.test_id, r.score, t.title AS test_title
            FROM results r
            JOIN tests t ON t.id = r.test_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    async fn list(&self, student_id: Option<Uuid>) -> AppResult<Vec<ResultView>> {
        let results = sqlx::query_as::<_, ResultView>(
            r#"
            SELECT r.id, r.student_id, r.test_id, r.score, t.title AS test_title
            FROM results r
            JOIN tests t ON t.id = r.test_id
            WHERE ($1::UUID IS NULL OR r.student_id = $1)
            ORDER BY r.seq DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }
}
