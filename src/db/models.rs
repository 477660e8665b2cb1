//! Database models - structs representing database tables (used by sqlx/serde).
//!
//! Field names double as wire names: the public site consumes the same
//! Portuguese column names the database uses.
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row per analyzed URL or manually-started inquiry. Never updated
/// after creation; `status_lead` is descriptive only.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lead {
    pub id: i32,
    pub data_criacao: DateTime<Utc>,
    pub url_analisada: String,
    pub seo_score: f64,
    pub origem: Option<String>,
    pub status_lead: String,
}

/// One row per quote request, optionally referencing a lead.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Orcamento {
    pub id: i32,
    pub lead_id: Option<i32>,
    pub nome_contato: String,
    pub email_ou_whatsapp: String,
    pub interesse: Option<String>,
    pub detalhes_projeto: String,
    pub orcamento_estimado: Option<String>,
    pub perfil_lead: Option<String>,
    pub tem_site: Option<String>,
    pub status_orcamento: String,
    pub data_criacao: DateTime<Utc>,
}

/// Blog content entity, read-only from the API surface.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i32,
    pub titulo: String,
    pub subtitulo: Option<String>,
    pub imagem_url: Option<String>,
    pub conteudo_html: Option<String>,
    pub autor: Option<String>,
    pub data_publicacao: Option<NaiveDate>,
    pub slug: String,
    pub publicado: bool,
}

/// Portfolio entry, ordered by the manual `ordem` column.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Projeto {
    pub id: i32,
    pub ordem: i32,
    pub titulo: String,
    pub subtitulo: Option<String>,
    pub descricao: Option<String>,
    pub skills: Option<String>,
    pub link_projeto: Option<String>,
    pub link_github: Option<String>,
    pub imagem_url: Option<String>,
    pub publicado: bool,
}

/// Legacy name/email/source triple persisted by the /submit form.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PortfolioContact {
    pub id: i32,
    pub nome: String,
    pub email: String,
    pub local: Option<String>,
}
