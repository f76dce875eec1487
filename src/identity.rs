use crate::error::{Error, Result};

/// Who is filling in a questionnaire.
pub trait IdentityProvider: Send + Sync {
    fn current_user_id(&self) -> Result<String>;
}

/// Fixed identity, for tooling and tests.
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub String);

impl StaticIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(user_id.into())
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Result<String> {
        non_blank_user_id(&self.0)
    }
}

pub(crate) fn non_blank_user_id(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Unauthorized("No user identity available".to_string()));
    }
    Ok(trimmed.to_string())
}
