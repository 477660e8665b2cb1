/**
 * Blog Routes
 * Read-only endpoints for published blog posts
 */
use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::db::models::BlogPost;
use crate::error::ApiError;
use crate::routes::escape_html;
use crate::state::AppState;

/// Listing is capped: the homepage shows the five newest posts.
const LIST_LIMIT: i64 = 5;

/// Post summary (for the listing endpoint; no body).
#[derive(Debug, Serialize)]
pub struct BlogPostSummary {
    pub id: i32,
    pub titulo: String,
    pub subtitulo: Option<String>,
    pub imagem_url: Option<String>,
    pub autor: Option<String>,
    pub data_publicacao: Option<NaiveDate>,
    pub slug: String,
}

lazy_static::lazy_static! {
    /// Valid slug pattern: lowercase letters, numbers, and hyphens
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

pub(crate) fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

/// GET /api/leanttro_blog - newest published posts, capped.
pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<BlogPostSummary>>, ApiError> {
    let pool = state.pool()?;

    let posts = sqlx::query_as::<_, BlogPost>(
        r#"
        SELECT id, titulo, subtitulo, imagem_url, conteudo_html, autor,
               data_publicacao, slug, publicado
        FROM blog_posts
        WHERE publicado = TRUE
        ORDER BY data_publicacao DESC
        LIMIT $1
        "#,
    )
    .bind(LIST_LIMIT)
    .fetch_all(pool)
    .await?;

    let items = posts
        .into_iter()
        .map(|p| BlogPostSummary {
            id: p.id,
            titulo: p.titulo,
            subtitulo: p.subtitulo,
            imagem_url: p.imagem_url,
            autor: p.autor,
            data_publicacao: p.data_publicacao,
            slug: p.slug,
        })
        .collect();

    Ok(Json(items))
}

/// Fetch a single published post, or 404.
async fn fetch_published_post(state: &AppState, slug: &str) -> Result<BlogPost, ApiError> {
    let pool = state.pool()?;

    sqlx::query_as::<_, BlogPost>(
        r#"
        SELECT id, titulo, subtitulo, imagem_url, conteudo_html, autor,
               data_publicacao, slug, publicado
        FROM blog_posts
        WHERE slug = $1 AND publicado = TRUE
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::NotFound("Post não encontrado".to_string()))
}

/// GET /blog/:slug - rendered post page.
pub async fn post_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, ApiError> {
    if !is_valid_slug(&slug) {
        return Err(ApiError::NotFound("Post não encontrado".to_string()));
    }

    let post = fetch_published_post(&state, &slug).await?;
    Ok(Html(render_post_page(&post)))
}

fn render_post_page(post: &BlogPost) -> String {
    let subtitulo = post
        .subtitulo
        .as_deref()
        .map(|s| format!("<h2>{}</h2>", escape_html(s)))
        .unwrap_or_default();
    let autor = post
        .autor
        .as_deref()
        .map(|a| format!("<p class=\"autor\">{}</p>", escape_html(a)))
        .unwrap_or_default();
    let data = post
        .data_publicacao
        .map(|d| format!("<time datetime=\"{d}\">{d}</time>"))
        .unwrap_or_default();

    format!(
        "<!doctype html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{titulo} | Leanttro</title>\n</head>\n<body>\n\
         <article>\n<h1>{titulo}</h1>\n{subtitulo}\n{autor}\n{data}\n{conteudo}\n</article>\n\
         </body>\n</html>",
        titulo = escape_html(&post.titulo),
        conteudo = post.conteudo_html.as_deref().unwrap_or(""),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert!(is_valid_slug("valid-slug"));
        assert!(is_valid_slug("post123"));
        assert!(is_valid_slug("a-b-c-1"));
    }

    #[test]
    fn test_invalid_slugs() {
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("UPPER"));
        assert!(!is_valid_slug("com espaço"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("a--b"));
        assert!(!is_valid_slug("../etc"));
    }

    #[test]
    fn test_render_post_page_escapes_title_keeps_body() {
        let post = BlogPost {
            id: 1,
            titulo: "Título <script>".to_string(),
            subtitulo: None,
            imagem_url: None,
            conteudo_html: Some("<p>corpo</p>".to_string()),
            autor: Some("Leanttro".to_string()),
            data_publicacao: None,
            slug: "titulo".to_string(),
            publicado: true,
        };
        let html = render_post_page(&post);
        assert!(html.contains("Título &lt;script&gt;"));
        assert!(html.contains("<p>corpo</p>"));
        assert!(html.contains("Leanttro"));
    }

    #[tokio::test]
    async fn test_list_posts_without_pool_is_unavailable() {
        let err = list_posts(State(crate::state::AppState::empty()))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_post_page_bad_slug_is_not_found() {
        let err = post_page(
            State(crate::state::AppState::empty()),
            Path("NOT A SLUG".to_string()),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
