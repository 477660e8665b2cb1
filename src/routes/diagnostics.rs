/**
 * Diagnostic Routes
 * SEO diagnostic intake: page analysis, lead insert, AI teaser
 */
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::clients::gemini::{GeminiReply, Turn, DEFAULT_TEMPERATURE};
use crate::error::ApiError;
use crate::state::AppState;

/// Fixed terminator the frontend looks for to cut the teaser off and
/// attach its call-to-action. Appended when the model omits it.
pub const DIAGNOSIS_SENTINEL: &str = "[FALE_CONOSCO]";

#[derive(Debug, Deserialize)]
pub struct DiagnosticoRequest {
    pub url_analisada: String,
}

#[derive(Debug, Serialize)]
pub struct DiagnosticoResponse {
    pub success: bool,
    pub lead_id: i32,
    pub diagnosis: String,
    pub seo_score: f64,
}

fn diagnosis_prompt(url: &str, score: f64, failing_audits: usize) -> String {
    format!(
        "Você é um consultor de marketing digital da Leanttro. O site {url} \
         acabou de passar por um diagnóstico de SEO e obteve nota {score:.0} \
         de 100, com {failing_audits} pontos de melhoria identificados. \
         Escreva um parágrafo curto, direto e persuasivo (máximo 3 frases) \
         convidando o dono do site a corrigir esses pontos com a Leanttro. \
         Não liste os problemas. Termine exatamente com o marcador \
         {DIAGNOSIS_SENTINEL}."
    )
}

fn ensure_sentinel(mut teaser: String) -> String {
    let trimmed = teaser.trim_end();
    if !trimmed.ends_with(DIAGNOSIS_SENTINEL) {
        teaser = format!("{} {}", trimmed, DIAGNOSIS_SENTINEL);
    } else {
        teaser = trimmed.to_string();
    }
    teaser
}

/// POST /api/diagnostico_seo
///
/// The lead row is committed before the teaser call. A teaser failure
/// therefore leaves the lead behind while the caller only sees a 502;
/// the original system accepts this orphan and so do we.
pub async fn diagnose(
    State(state): State<AppState>,
    Json(payload): Json<DiagnosticoRequest>,
) -> Result<Json<DiagnosticoResponse>, ApiError> {
    let url = payload.url_analisada.trim();
    if url.is_empty() {
        return Err(ApiError::Validation(
            "url_analisada é obrigatória".to_string(),
        ));
    }

    let pagespeed = state.pagespeed.as_ref().ok_or_else(|| {
        ApiError::Unavailable("análise de páginas não configurada".to_string())
    })?;
    let gemini = state.gemini.as_ref().ok_or_else(|| {
        ApiError::Unavailable("geração de texto não configurada".to_string())
    })?;
    let pool = state.pool()?;

    // 1-2. Analyze the page. Nothing is persisted on failure.
    let report = pagespeed.analyze(url).await.map_err(|e| {
        tracing::warn!("PageSpeed analysis failed for {}: {}", url, e);
        ApiError::Upstream("análise de páginas".to_string())
    })?;
    let seo_score = report.seo_score();

    // 3. The lead is committed here, before the teaser call.
    let lead_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO leads (url_analisada, seo_score, origem, status_lead)
        VALUES ($1, $2, 'diagnostico_seo', 'DIAGNOSTICADO')
        RETURNING id
        "#,
    )
    .bind(url)
    .bind(seo_score)
    .fetch_one(pool)
    .await?;

    // 4-5. Only the failing-audit count feeds the prompt, not the
    // audit details themselves.
    let failing_audits = report.failing_audit_count();
    let prompt = diagnosis_prompt(url, seo_score, failing_audits);

    let reply = gemini
        .generate(None, &[Turn::user(prompt)], DEFAULT_TEMPERATURE)
        .await
        .map_err(|e| {
            tracing::warn!("Teaser generation failed for lead {}: {}", lead_id, e);
            ApiError::Upstream("geração de texto".to_string())
        })?;

    let diagnosis = match reply {
        GeminiReply::Text(text) => ensure_sentinel(text),
        GeminiReply::SafetyBlocked => {
            tracing::warn!("Teaser generation blocked for lead {}", lead_id);
            return Err(ApiError::Upstream("geração de texto".to_string()));
        }
    };

    Ok(Json(DiagnosticoResponse {
        success: true,
        lead_id,
        diagnosis,
        seo_score,
    }))
}
