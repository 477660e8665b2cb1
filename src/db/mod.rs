pub mod models;

use sqlx::{postgres::PgPoolOptions, PgPool};

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/leanttro".to_string()),
            max_connections: std::env::var("DB_POOL_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            min_connections: std::env::var("DB_POOL_MIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            idle_timeout_secs: std::env::var("DB_IDLE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
        }
    }
}

pub async fn init_pool(config: Option<DbConfig>) -> Result<PgPool, sqlx::Error> {
    let config = config.unwrap_or_default();

    tracing::info!("Initializing database connection pool...");
    tracing::debug!(
        "Database URL: {}",
        config.url.replace(
            |c: char| !c.is_ascii_alphanumeric() && c != ':' && c != '/' && c != '@' && c != '.',
            "*"
        )
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(3))
        .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(std::time::Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    tracing::info!("Database connection pool initialized successfully");

    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> Result<std::time::Duration, sqlx::Error> {
    let start = std::time::Instant::now();
    sqlx::query("SELECT 1").fetch_one(pool).await?;

    Ok(start.elapsed())
}

/// Idempotently create every table the service uses.
///
/// The first failing statement aborts the remaining creations for this
/// run; the caller logs and swallows the error, so missing tables show
/// up later as per-request errors rather than a startup abort.
pub async fn bootstrap_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Ensuring database schema...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leads (
            id SERIAL PRIMARY KEY,
            data_criacao TIMESTAMPTZ NOT NULL DEFAULT now(),
            url_analisada TEXT NOT NULL,
            seo_score DOUBLE PRECISION NOT NULL DEFAULT 0,
            origem TEXT,
            status_lead TEXT NOT NULL DEFAULT 'PENDENTE'
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orcamentos (
            id SERIAL PRIMARY KEY,
            lead_id INTEGER REFERENCES leads(id),
            nome_contato TEXT NOT NULL,
            email_ou_whatsapp TEXT NOT NULL,
            interesse TEXT,
            detalhes_projeto TEXT NOT NULL,
            orcamento_estimado TEXT,
            perfil_lead TEXT,
            tem_site TEXT,
            status_orcamento TEXT NOT NULL DEFAULT 'PENDENTE',
            data_criacao TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blog_posts (
            id SERIAL PRIMARY KEY,
            titulo TEXT NOT NULL,
            subtitulo TEXT,
            imagem_url TEXT,
            conteudo_html TEXT,
            autor TEXT,
            data_publicacao DATE,
            slug TEXT UNIQUE NOT NULL,
            publicado BOOLEAN NOT NULL DEFAULT false
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projetos (
            id SERIAL PRIMARY KEY,
            ordem INTEGER NOT NULL DEFAULT 0,
            titulo TEXT NOT NULL,
            subtitulo TEXT,
            descricao TEXT,
            skills TEXT,
            link_projeto TEXT,
            link_github TEXT,
            imagem_url TEXT,
            publicado BOOLEAN NOT NULL DEFAULT false
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_blog_posts_pub_data
            ON blog_posts(publicado, data_publicacao DESC)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_projetos_pub_ordem
            ON projetos(publicado, ordem)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_orcamentos_lead_id
            ON orcamentos(lead_id)
        "#,
    )
    .execute(pool)
    .await?;

    // Legacy contact table from the first revision of the site; kept
    // for the /submit form, never reconciled with the tables above.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS portfolio (
            id SERIAL PRIMARY KEY,
            nome TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            local TEXT
        )
    "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database schema ensured");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_default_uses_env_or_fallback() {
        let config = DbConfig::default();
        assert!(config.max_connections >= 1);
        assert!(config.connect_timeout_secs >= 1);
        assert!(config.idle_timeout_secs >= 1);
        assert!(!config.url.is_empty());
    }
}
