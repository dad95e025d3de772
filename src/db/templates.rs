use sqlx::{FromRow, PgExecutor};

pub const FALLBACK_LANGUAGE: &str = "en";

#[derive(Debug, Clone, FromRow)]
pub struct EmailTemplate {
    pub subject: String,
    pub template: String,
}

/// Template in the requested language, or the English one.
pub async fn load(
    executor: impl PgExecutor<'_>,
    context: &str,
    lang: &str,
) -> Result<Option<EmailTemplate>, sqlx::Error> {
    sqlx::query_as::<_, EmailTemplate>(
        "SELECT subject, template FROM system_email_template \
         WHERE context = $1 AND iso_639_1 IN ($2, $3) \
         ORDER BY (iso_639_1 = $2) DESC \
         LIMIT 1",
    )
    .bind(context)
    .bind(lang)
    .bind(FALLBACK_LANGUAGE)
    .fetch_optional(executor)
    .await
}
