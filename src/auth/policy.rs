// src/auth/policy.rs

//! Role and ownership rules. Pure functions: no I/O, no side effects.

use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        test::Test,
        user::{Role, User},
    },
};

fn forbidden(message: &str) -> AppError {
    AppError::Forbidden(message.to_string())
}

/// Whether `actor` may register accounts at all, before the request body is read.
pub fn authorize_registrar(actor: &User) -> Result<(), AppError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Teacher | Role::Student => Err(forbidden("Only administrators can register users")),
    }
}

/// Only admins register accounts, and never another admin.
pub fn authorize_register(actor: &User, new_role: Role) -> Result<(), AppError> {
    authorize_registrar(actor)?;

    match new_role {
        Role::Admin => Err(forbidden("Administrator accounts cannot be registered")),
        Role::Teacher | Role::Student => Ok(()),
    }
}

pub fn authorize_create_test(actor: &User) -> Result<(), AppError> {
    match actor.role {
        Role::Admin | Role::Teacher => Ok(()),
        Role::Student => Err(forbidden("Only teachers and administrators can create tests")),
    }
}

/// Governs changes to a test and to every question and answer it owns.
pub fn authorize_modify_test(actor: &User, test: &Test) -> Result<(), AppError> {
    let allowed = match actor.role {
        Role::Admin => true,
        Role::Teacher => actor.id == test.author_id,
        Role::Student => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(forbidden("Not enough permissions to modify this test"))
    }
}

/// Whether answer correctness flags may be shown to `actor` when reading `test`.
pub fn can_see_answer_key(actor: &User, test: &Test) -> bool {
    authorize_modify_test(actor, test).is_ok()
}

pub fn authorize_read_result(actor: &User, student_id: Uuid) -> Result<(), AppError> {
    match actor.role {
        Role::Admin | Role::Teacher => Ok(()),
        Role::Student if actor.id == student_id => Ok(()),
        Role::Student => Err(forbidden("Not enough permissions to view this result")),
    }
}

/// Filter applied when listing results: `None` means every result is visible.
pub fn result_scope(actor: &User) -> Option<Uuid> {
    match actor.role {
        Role::Admin | Role::Teacher => None,
        Role::Student => Some(actor.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", role.as_str()),
            username: role.as_str().to_string(),
            first_name: "Test".into(),
            middle_name: None,
            last_name: "User".into(),
            password_hash: String::new(),
            role,
        }
    }

    fn test_by(author: &User) -> Test {
        Test {
            id: Uuid::new_v4(),
            title: "Algebra".into(),
            author_id: author.id,
        }
    }

    #[test]
    fn only_admin_registers_and_never_admins() {
        let admin = user(Role::Admin);
        assert!(authorize_register(&admin, Role::Teacher).is_ok());
        assert!(authorize_register(&admin, Role::Student).is_ok());
        assert_eq!(
            authorize_register(&admin, Role::Admin).unwrap_err().kind(),
            "FORBIDDEN"
        );
        assert!(authorize_register(&user(Role::Teacher), Role::Student).is_err());
        assert!(authorize_register(&user(Role::Student), Role::Student).is_err());
    }

    #[test]
    fn registrar_check_needs_no_payload() {
        assert!(authorize_registrar(&user(Role::Admin)).is_ok());
        assert_eq!(
            authorize_registrar(&user(Role::Teacher)).unwrap_err().kind(),
            "FORBIDDEN"
        );
        assert!(authorize_registrar(&user(Role::Student)).is_err());
    }

    #[test]
    fn students_cannot_create_tests() {
        assert!(authorize_create_test(&user(Role::Admin)).is_ok());
        assert!(authorize_create_test(&user(Role::Teacher)).is_ok());
        assert!(authorize_create_test(&user(Role::Student)).is_err());
    }

    #[test]
    fn author_and_admin_modify_other_teachers_do_not() {
        let author = user(Role::Teacher);
        let test = test_by(&author);

        assert!(authorize_modify_test(&author, &test).is_ok());
        assert!(authorize_modify_test(&user(Role::Admin), &test).is_ok());
        assert!(authorize_modify_test(&user(Role::Teacher), &test).is_err());
        assert!(authorize_modify_test(&user(Role::Student), &test).is_err());
    }

    #[test]
    fn student_author_id_match_does_not_grant_edit() {
        let student = user(Role::Student);
        let test = test_by(&student);
        assert!(authorize_modify_test(&student, &test).is_err());
    }

    #[test]
    fn answer_key_follows_edit_rights() {
        let author = user(Role::Teacher);
        let test = test_by(&author);
        assert!(can_see_answer_key(&author, &test));
        assert!(!can_see_answer_key(&user(Role::Student), &test));
    }

    #[test]
    fn students_read_only_their_own_results() {
        let student = user(Role::Student);
        assert!(authorize_read_result(&student, student.id).is_ok());
        assert!(authorize_read_result(&student, Uuid::new_v4()).is_err());
        assert!(authorize_read_result(&user(Role::Teacher), student.id).is_ok());
        assert!(authorize_read_result(&user(Role::Admin), student.id).is_ok());
    }

    #[test]
    fn result_scope_limits_students() {
        let student = user(Role::Student);
        assert_eq!(result_scope(&student), Some(student.id));
        assert_eq!(result_scope(&user(Role::Teacher)), None);
        assert_eq!(result_scope(&user(Role::Admin)), None);
    }
}
