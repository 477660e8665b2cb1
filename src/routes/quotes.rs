/**
 * Quote Routes
 * Quote creation (with lead synthesis) and allow-listed field updates
 */
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Columns a client may overwrite through /api/orcar/update. Anything
/// else, `status_orcamento` and `lead_id` included, is rejected with a
/// 403 before any SQL is built.
const CAMPOS_EDITAVEIS: &[&str] = &[
    "nome_contato",
    "email_ou_whatsapp",
    "interesse",
    "detalhes_projeto",
    "orcamento_estimado",
    "perfil_lead",
    "tem_site",
];

/// Placeholder URL recorded on leads synthesized without a diagnostic.
const URL_NAO_INFORMADA: &str = "nao_informado";

fn is_campo_editavel(campo: &str) -> bool {
    CAMPOS_EDITAVEIS.contains(&campo)
}

#[derive(Debug, Deserialize)]
pub struct OrcamentoRequest {
    pub lead_id: Option<i32>,
    pub nome_contato: String,
    pub email_ou_whatsapp: String,
    pub interesse: Option<String>,
    pub detalhes_projeto: String,
    pub orcamento_estimado: Option<String>,
    pub perfil_lead: Option<String>,
    pub tem_site: Option<String>,
    pub url_analisada: Option<String>,
    pub seo_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct OrcamentoResponse {
    pub success: bool,
    pub orcamento_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrcamentoRequest {
    pub orcamento_id: i32,
    pub campo: String,
    pub valor: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

fn validate_orcamento(payload: &OrcamentoRequest) -> Result<(), ApiError> {
    if payload.nome_contato.trim().is_empty() {
        return Err(ApiError::Validation(
            "nome_contato é obrigatório".to_string(),
        ));
    }
    if payload.email_ou_whatsapp.trim().is_empty() {
        return Err(ApiError::Validation(
            "email_ou_whatsapp é obrigatório".to_string(),
        ));
    }
    if payload.detalhes_projeto.trim().is_empty() {
        return Err(ApiError::Validation(
            "detalhes_projeto é obrigatório".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/orcar - create a quote, synthesizing a lead when the
/// caller arrives without one (manual chatbot start).
pub async fn create_quote(
    State(state): State<AppState>,
    Json(payload): Json<OrcamentoRequest>,
) -> Result<(StatusCode, Json<OrcamentoResponse>), ApiError> {
    validate_orcamento(&payload)?;
    let pool = state.pool()?;

    let lead_id = match payload.lead_id {
        Some(id) => id,
        None => {
            sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO leads (url_analisada, seo_score, origem, status_lead)
                VALUES ($1, $2, 'chatbot_manual', 'PENDENTE')
                RETURNING id
                "#,
            )
            .bind(
                payload
                    .url_analisada
                    .as_deref()
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or(URL_NAO_INFORMADA),
            )
            .bind(payload.seo_score.unwrap_or(0.0))
            .fetch_one(pool)
            .await?
        }
    };

    let orcamento_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO orcamentos
            (lead_id, nome_contato, email_ou_whatsapp, interesse,
             detalhes_projeto, orcamento_estimado, perfil_lead, tem_site)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(lead_id)
    .bind(payload.nome_contato.trim())
    .bind(payload.email_ou_whatsapp.trim())
    .bind(&payload.interesse)
    .bind(payload.detalhes_projeto.trim())
    .bind(&payload.orcamento_estimado)
    .bind(&payload.perfil_lead)
    .bind(&payload.tem_site)
    .fetch_one(pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrcamentoResponse {
            success: true,
            orcamento_id,
        }),
    ))
}

/// POST /api/orcar/update - overwrite one allow-listed column.
///
/// The column name is composed as a quoted identifier taken from the
/// allow-list constant; the value is always a bound parameter, so the
/// field-name parameter cannot smuggle SQL.
pub async fn update_quote_field(
    State(state): State<AppState>,
    Json(payload): Json<UpdateOrcamentoRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !is_campo_editavel(&payload.campo) {
        return Err(ApiError::ForbiddenField(payload.campo));
    }
    let pool = state.pool()?;

    let sql = format!(
        r#"UPDATE orcamentos SET "{}" = $1 WHERE id = $2"#,
        payload.campo
    );
    // No row-count check: repeated or no-op updates succeed silently.
    sqlx::query(&sql)
        .bind(&payload.valor)
        .bind(payload.orcamento_id)
        .execute(pool)
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn orcamento_base() -> OrcamentoRequest {
        OrcamentoRequest {
            lead_id: None,
            nome_contato: "Maria".to_string(),
            email_ou_whatsapp: "maria@exemplo.com".to_string(),
            interesse: None,
            detalhes_projeto: "Loja virtual".to_string(),
            orcamento_estimado: None,
            perfil_lead: None,
            tem_site: None,
            url_analisada: None,
            seo_score: None,
        }
    }

    #[test]
    fn test_allow_list_accepts_editable_columns() {
        for campo in CAMPOS_EDITAVEIS {
            assert!(is_campo_editavel(campo));
        }
    }

    #[test]
    fn test_allow_list_rejects_everything_else() {
        assert!(!is_campo_editavel("status_orcamento"));
        assert!(!is_campo_editavel("lead_id"));
        assert!(!is_campo_editavel("id"));
        assert!(!is_campo_editavel("nome_contato; DROP TABLE orcamentos"));
        assert!(!is_campo_editavel(""));
    }

    #[test]
    fn test_validate_requires_contact_fields() {
        assert!(validate_orcamento(&orcamento_base()).is_ok());

        let mut sem_nome = orcamento_base();
        sem_nome.nome_contato = "  ".to_string();
        assert!(validate_orcamento(&sem_nome).is_err());

        let mut sem_contato = orcamento_base();
        sem_contato.email_ou_whatsapp = String::new();
        assert!(validate_orcamento(&sem_contato).is_err());

        let mut sem_detalhes = orcamento_base();
        sem_detalhes.detalhes_projeto = String::new();
        assert!(validate_orcamento(&sem_detalhes).is_err());
    }

    #[tokio::test]
    async fn test_disallowed_field_is_forbidden_before_any_sql() {
        // No database in the state: the 403 must fire before the pool
        // is ever touched.
        let err = update_quote_field(
            State(AppState::empty()),
            Json(UpdateOrcamentoRequest {
                orcamento_id: 1,
                campo: "status_orcamento".to_string(),
                valor: "APROVADO".to_string(),
            }),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, ApiError::ForbiddenField(_)));
    }

    #[tokio::test]
    async fn test_invalid_quote_is_rejected_before_any_sql() {
        let mut payload = orcamento_base();
        payload.nome_contato = String::new();
        let err = create_quote(State(AppState::empty()), Json(payload))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
