use std::sync::Arc;

use crate::domain::Tag;
use crate::error::DomainError;
use crate::ports::TagRepository;

/// Tag vocabulary management.
pub struct TagService {
    tags: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    /// Create a tag. Names are compared exactly, so `Rust` and `rust` are distinct.
    pub async fn create(&self, name: &str) -> Result<Tag, DomainError> {
        let name = name.trim();
        super::require_non_blank("tag name", name)?;

        if self.tags.find_by_name(name).await?.is_some() {
            return Err(DomainError::conflict(format!("tag '{name}' already exists")));
        }

        let tag = self.tags.create(name).await?;
        tracing::debug!(tag_id = tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Tag, DomainError> {
        self.tags
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("tag", id))
    }

    /// All tags, alphabetical.
    pub async fn list(&self) -> Result<Vec<Tag>, DomainError> {
        Ok(self.tags.list().await?)
    }

    /// Delete a tag. Post associations are dropped by the store, not here.
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.tags
            .delete(id)
            .await
            .map_err(|e| super::delete_error(e, "tag", id))
    }
}
