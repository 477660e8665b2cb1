/**
 * Project Routes
 * Read-only endpoints for published portfolio projects
 */
use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};

use crate::db::models::Projeto;
use crate::error::ApiError;
use crate::routes::escape_html;
use crate::state::AppState;

/// GET /api/leanttro_projetos - published projects in manual order.
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Projeto>>, ApiError> {
    let pool = state.pool()?;

    let projetos = sqlx::query_as::<_, Projeto>(
        r#"
        SELECT id, ordem, titulo, subtitulo, descricao, skills,
               link_projeto, link_github, imagem_url, publicado
        FROM projetos
        WHERE publicado = TRUE
        ORDER BY ordem
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(Json(projetos))
}

/// GET /projeto/:id - rendered project page.
pub async fn project_page(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, ApiError> {
    let pool = state.pool()?;

    let projeto = sqlx::query_as::<_, Projeto>(
        r#"
        SELECT id, ordem, titulo, subtitulo, descricao, skills,
               link_projeto, link_github, imagem_url, publicado
        FROM projetos
        WHERE id = $1 AND publicado = TRUE
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::NotFound("Projeto não encontrado".to_string()))?;

    Ok(Html(render_project_page(&projeto)))
}

fn render_project_page(projeto: &Projeto) -> String {
    let subtitulo = projeto
        .subtitulo
        .as_deref()
        .map(|s| format!("<h2>{}</h2>", escape_html(s)))
        .unwrap_or_default();
    let descricao = projeto
        .descricao
        .as_deref()
        .map(|d| format!("<p>{}</p>", escape_html(d)))
        .unwrap_or_default();
    let skills = projeto
        .skills
        .as_deref()
        .map(|s| format!("<p class=\"skills\">{}</p>", escape_html(s)))
        .unwrap_or_default();
    let link = projeto
        .link_projeto
        .as_deref()
        .map(|l| {
            format!(
                "<a href=\"{0}\" rel=\"noopener\">Ver projeto</a>",
                escape_html(l)
            )
        })
        .unwrap_or_default();

    format!(
        "<!doctype html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{titulo} | Leanttro</title>\n</head>\n<body>\n\
         <article>\n<h1>{titulo}</h1>\n{subtitulo}\n{descricao}\n{skills}\n{link}\n</article>\n\
         </body>\n</html>",
        titulo = escape_html(&projeto.titulo),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_project_page_escapes_fields() {
        let projeto = Projeto {
            id: 7,
            ordem: 1,
            titulo: "Loja <Virtual>".to_string(),
            subtitulo: None,
            descricao: Some("E-commerce & CMS".to_string()),
            skills: Some("Rust, SQL".to_string()),
            link_projeto: Some("https://exemplo.com".to_string()),
            link_github: None,
            imagem_url: None,
            publicado: true,
        };
        let html = render_project_page(&projeto);
        assert!(html.contains("Loja &lt;Virtual&gt;"));
        assert!(html.contains("E-commerce &amp; CMS"));
        assert!(html.contains("https://exemplo.com"));
    }

    #[tokio::test]
    async fn test_list_projects_without_pool_is_unavailable() {
        let err = list_projects(State(crate::state::AppState::empty()))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::Unavailable(_)));
    }
}
