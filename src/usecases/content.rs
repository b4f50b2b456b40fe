use crate::{
    error::AppError,
    services::{config::ConfigCache, content_filter::ContentFilter},
};

const MIN_COMMENT_LENGTH: usize = 1;
pub(crate) const MAX_COMMENT_LENGTH: usize = 5000;

/// Validates content and runs it through the abuse filter. Returns the text
/// to persist.
pub async fn filter_content(
    filter: &dyn ContentFilter,
    config: &ConfigCache,
    content: &str,
) -> Result<String, AppError> {
    let content = normalize_comment_content(content)?;
    if !config.bad_words_enabled() {
        return Ok(content);
    }

    let verdict = filter.check(&content).await?;
    if verdict.flagged {
        return Err(AppError::ValidationError(
            "Bad language used! Please polite your comment...".to_string(),
        ));
    }
    Ok(verdict.cleaned)
}

pub(crate) fn normalize_comment_content(content: &str) -> Result<String, AppError> {
    let trimmed = content.trim();
    let len = trimmed.chars().count();
    if len < MIN_COMMENT_LENGTH {
        return Err(AppError::ValidationError(
            "Comment content is required".to_string(),
        ));
    }
    if len > MAX_COMMENT_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Comment content exceeds {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}
