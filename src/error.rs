use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("City `{0}` could not be confirmed to exist")]
    InvalidCity(String),

    #[error("City id:{0} not found")]
    UnknownCity(i32),

    #[error("User id:{0} not found")]
    UnknownUser(i32),

    #[error("Picnic id:{0} not found")]
    UnknownPicnic(i32),

    #[error("User id:{user_id} is already registered for picnic id:{picnic_id}")]
    DuplicateRegistration { user_id: i32, picnic_id: i32 },

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The machine readable kind reported in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidCity(_) => "invalid_city",
            AppError::UnknownCity(_) => "unknown_city",
            AppError::UnknownUser(_) => "unknown_user",
            AppError::UnknownPicnic(_) => "unknown_picnic",
            AppError::DuplicateRegistration { .. } => "duplicate_registration",
            AppError::Validation(_) => "validation_error",
            AppError::Database(_) | AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = if status.is_server_error() {
            error!("{self}");
            "Something went wrong".to_string()
        } else {
            self.to_string()
        };

        response::error(status, self.kind(), &details)
    }
}

mod response {
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };

    pub fn error(code: StatusCode, error: &str, details: &str) -> Response {
        (
            code,
            Json(api::ErrorResponse {
                error: error.into(),
                details: details.into(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_bad_requests() {
        let errors = [
            AppError::InvalidCity("Atlantis".into()),
            AppError::UnknownCity(1),
            AppError::UnknownUser(1),
            AppError::UnknownPicnic(1),
            AppError::DuplicateRegistration {
                user_id: 1,
                picnic_id: 2,
            },
            AppError::Validation("age".into()),
        ];
        for error in errors {
            assert_eq!(error.status(), StatusCode::BAD_REQUEST, "{error}");
        }
    }

    #[test]
    fn storage_failures_are_server_errors() {
        let error = AppError::from(DbErr::Custom("connection reset".into()));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.kind(), "internal_error");
    }

    #[test]
    fn duplicate_message_names_both_ids() {
        let error = AppError::DuplicateRegistration {
            user_id: 3,
            picnic_id: 7,
        };
        assert_eq!(
            error.to_string(),
            "User id:3 is already registered for picnic id:7"
        );
    }
}
