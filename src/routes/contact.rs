/**
 * Contact Routes
 * Legacy /submit form endpoint from the first revision of the site
 */
use axum::{extract::State, http::StatusCode, Form, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

const THANK_YOU: &str = "Obrigado! Seu guia será enviado em breve. Agradeço sua visita!";

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    pub name: Option<String>,
    pub email: Option<String>,
    // The form's 'source' field maps to the 'local' column.
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

/// SQLSTATE-based check (23505); the rendered message is localized by
/// the server's lc_messages and cannot be matched reliably.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

/// POST /submit - persist a name/email/source triple into the legacy
/// `portfolio` table.
///
/// A duplicate e-mail is deliberately reported as success: the landing
/// page must not show a harmless repeat submission as a failure.
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<SubmitForm>,
) -> (StatusCode, Json<SubmitResponse>) {
    let nome = form.name.as_deref().unwrap_or("").trim();
    let email = form.email.as_deref().unwrap_or("").trim();

    if nome.is_empty() || email.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(SubmitResponse {
                success: false,
                message: "Nome e E-mail são obrigatórios.".to_string(),
            }),
        );
    }

    let pool = match state.db.as_ref() {
        Some(p) => p,
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubmitResponse {
                    success: false,
                    message: "Ocorreu um erro interno no servidor ao salvar os dados."
                        .to_string(),
                }),
            );
        }
    };

    match sqlx::query("INSERT INTO portfolio (nome, email, local) VALUES ($1, $2, $3)")
        .bind(nome)
        .bind(email)
        .bind(&form.source)
        .execute(pool)
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(SubmitResponse {
                success: true,
                message: THANK_YOU.to_string(),
            }),
        ),
        Err(e) if is_unique_violation(&e) => {
            tracing::warn!(
                "Duplicate contact submission ignored for {}: {}",
                email,
                e
            );
            (
                StatusCode::OK,
                Json(SubmitResponse {
                    success: true,
                    message: THANK_YOU.to_string(),
                }),
            )
        }
        Err(e) => {
            tracing::error!("Failed to save contact submission: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubmitResponse {
                    success: false,
                    message: "Ocorreu um erro interno no servidor ao salvar os dados."
                        .to_string(),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    /// Stand-in database error with a server-localized message, the way
    /// a Postgres with non-English lc_messages reports a duplicate key.
    #[derive(Debug)]
    struct LocalizedDbError {
        unique: bool,
    }

    impl std::fmt::Display for LocalizedDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(
                f,
                "llave duplicada viola restricción de unicidad «portfolio_email_key»"
            )
        }
    }

    impl std::error::Error for LocalizedDbError {}

    impl sqlx::error::DatabaseError for LocalizedDbError {
        fn message(&self) -> &str {
            "llave duplicada viola restricción de unicidad «portfolio_email_key»"
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.unique {
                sqlx::error::ErrorKind::UniqueViolation
            } else {
                sqlx::error::ErrorKind::ForeignKeyViolation
            }
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn test_unique_violation_detected_despite_localized_message() {
        // The rendered message carries no English "duplicate key"
        // substring; classification must come from the error kind.
        let err = sqlx::Error::Database(Box::new(LocalizedDbError { unique: true }));
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn test_other_errors_are_not_unique_violations() {
        let fk = sqlx::Error::Database(Box::new(LocalizedDbError { unique: false }));
        assert!(!is_unique_violation(&fk));
        assert!(!is_unique_violation(&sqlx::Error::PoolClosed));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected() {
        let (status, body) = submit(
            State(AppState::empty()),
            Form(SubmitForm {
                name: Some("Ana".to_string()),
                email: None,
                source: None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_blank_fields_are_rejected() {
        let (status, body) = submit(
            State(AppState::empty()),
            Form(SubmitForm {
                name: Some("   ".to_string()),
                email: Some("ana@exemplo.com".to_string()),
                source: Some("instagram".to_string()),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
    }
}
