use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

use crate::error::{AppError, ConstraintParser};

/// Converts Diesel errors into structured `AppError` variants.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// `operation` is a short description ("insert user") kept on
    /// `AppError::Database` for the log line.
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    /// True when the error is a unique or primary key violation.
    pub fn is_unique_violation(error: &DieselError) -> bool {
        matches!(
            error,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
        )
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let message = info.message();
        let details = info.details();
        let constraint = info.constraint_name();
        let table = info.table_name();

        let fallback = |label: &str| AppError::Database {
            operation: operation.to_string(),
            source: anyhow::Error::msg(format!("{}: {}", label, message)),
        };

        match kind {
            DatabaseErrorKind::UniqueViolation => {
                match ConstraintParser::parse_unique_violation(message, details, constraint, table) {
                    Some((entity, field, value)) => AppError::Duplicate {
                        entity,
                        field,
                        value,
                    },
                    None => fallback("Unique constraint violation"),
                }
            }
            DatabaseErrorKind::NotNullViolation => {
                match ConstraintParser::parse_not_null_violation(message, table, info.column_name()) {
                    Some((entity, field)) => AppError::Validation {
                        field,
                        reason: format!("Field is required for {}", entity),
                    },
                    None => fallback("Not null constraint violation"),
                }
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                match ConstraintParser::parse_foreign_key_violation(message, details, constraint, table)
                {
                    Some((entity, field, value)) => AppError::Validation {
                        field,
                        reason: format!("Invalid reference from {} with value '{}'", entity, value),
                    },
                    None => fallback("Foreign key constraint violation"),
                }
            }
            DatabaseErrorKind::CheckViolation => {
                match constraint.and_then(|c| ConstraintParser::split_constraint_name(c, table)) {
                    Some((entity, field)) => AppError::Validation {
                        field,
                        reason: format!("Check constraint failed for {} field", entity),
                    },
                    None => fallback("Check constraint violation"),
                }
            }
            DatabaseErrorKind::ClosedConnection => AppError::ConnectionPool {
                source: anyhow::Error::msg(message.to_string()),
            },
            _ => fallback("Database error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDatabaseErrorInfo {
        message: String,
        details: Option<String>,
        table_name: Option<String>,
        constraint_name: Option<String>,
    }

    impl MockDatabaseErrorInfo {
        fn new(message: &str) -> Self {
            Self {
                message: message.to_string(),
                details: None,
                table_name: None,
                constraint_name: None,
            }
        }

        fn details(mut self, details: &str) -> Self {
            self.details = Some(details.to_string());
            self
        }

        fn table(mut self, table: &str) -> Self {
            self.table_name = Some(table.to_string());
            self
        }

        fn constraint(mut self, constraint: &str) -> Self {
            self.constraint_name = Some(constraint.to_string());
            self
        }

        fn into_error(self, kind: DatabaseErrorKind) -> DieselError {
            DieselError::DatabaseError(kind, Box::new(self))
        }
    }

    impl DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }

        fn details(&self) -> Option<&str> {
            self.details.as_deref()
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            self.table_name.as_deref()
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint_name.as_deref()
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[test]
    fn test_convert_not_found_error() {
        let result = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "find user");
        assert!(matches!(result, AppError::NotFound { ref entity, .. } if entity == "resource"));
    }

    #[test]
    fn test_convert_duplicate_username() {
        let error = MockDatabaseErrorInfo::new(
            "duplicate key value violates unique constraint \"users_username_key\"",
        )
        .details("Key (username)=(koala) already exists.")
        .table("users")
        .constraint("users_username_key")
        .into_error(DatabaseErrorKind::UniqueViolation);

        match DatabaseErrorConverter::convert_diesel_error(error, "insert user") {
            AppError::Duplicate {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "users");
                assert_eq!(field, "username");
                assert_eq!(value, "koala");
            }
            other => panic!("Expected Duplicate error, got: {:?}", other),
        }
    }

    #[test]
    fn test_is_unique_violation() {
        let error = MockDatabaseErrorInfo::new("duplicate key")
            .constraint("course_students_pkey")
            .into_error(DatabaseErrorKind::UniqueViolation);
        assert!(DatabaseErrorConverter::is_unique_violation(&error));
        assert!(!DatabaseErrorConverter::is_unique_violation(&DieselError::NotFound));
    }

    #[test]
    fn test_convert_foreign_key_violation() {
        let error = MockDatabaseErrorInfo::new(
            "insert or update on table \"course_students\" violates foreign key constraint \"course_students_user_id_fkey\"",
        )
        .details("Key (user_id)=(999) is not present in table \"users\".")
        .table("course_students")
        .constraint("course_students_user_id_fkey")
        .into_error(DatabaseErrorKind::ForeignKeyViolation);

        match DatabaseErrorConverter::convert_diesel_error(error, "enroll") {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "user_id");
                assert!(reason.contains("999"));
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_not_null_violation() {
        let error = MockDatabaseErrorInfo::new(
            "null value in column \"email\" of relation \"users\" violates not-null constraint",
        )
        .into_error(DatabaseErrorKind::NotNullViolation);

        match DatabaseErrorConverter::convert_diesel_error(error, "insert user") {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "email");
                assert!(reason.contains("required"));
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_unique_violation_falls_back_to_database_error() {
        let error = MockDatabaseErrorInfo::new("duplicate key value")
            .into_error(DatabaseErrorKind::UniqueViolation);
        assert!(matches!(
            DatabaseErrorConverter::convert_diesel_error(error, "insert"),
            AppError::Database { .. }
        ));
    }
}
