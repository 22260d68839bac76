//! Category import service.

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Category, CategoryFields, CategoryPatch, NewCategory};
use crate::domain::repositories::CategoryRepository;
use crate::error::AppError;

pub const MSG_CATEGORY_CREATED: &str = "Category created";
pub const MSG_CATEGORY_UPDATED: &str = "Category updated";
pub const MSG_NOT_UPDATED: &str = "Did not update category";

/// Service creating and updating categories from cleaned import payloads.
pub struct CategoryService {
    repository: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repository: Arc<dyn CategoryRepository>) -> Self {
        Self { repository }
    }

    /// Creates a new category with a fresh UUID.
    ///
    /// Every call creates a new record; payloads are not deduplicated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the title is missing.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn create_category(&self, fields: CategoryFields) -> Result<Category, AppError> {
        let new_category = NewCategory::from_fields(fields).ok_or_else(|| {
            AppError::bad_request(
                "Validation did not pass",
                json!({ "fields": { "title": ["Title is required"] } }),
            )
        })?;

        let category = self.repository.create(new_category).await?;

        metrics::counter!("import_categories_created_total").increment(1);
        tracing::info!(uuid = %category.uuid, "Category created");

        Ok(category)
    }

    /// Applies the non-empty fields of a payload to the category with the
    /// given external identifier.
    ///
    /// The identifier must resolve to exactly one record. A malformed
    /// identifier, no match or several matches leave the store untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the identifier does not resolve to
    /// exactly one category.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn update_category(
        &self,
        identifier: &str,
        fields: CategoryFields,
    ) -> Result<Category, AppError> {
        let uuid = Uuid::parse_str(identifier.trim()).map_err(|_| {
            AppError::not_found(
                MSG_NOT_UPDATED,
                json!({ "uuid": identifier, "reason": "malformed identifier" }),
            )
        })?;

        let mut matches = self.repository.find_by_uuid(uuid).await?;

        let target = match matches.len() {
            1 => matches.remove(0),
            n => {
                return Err(AppError::not_found(
                    MSG_NOT_UPDATED,
                    json!({ "uuid": uuid, "matches": n }),
                ));
            }
        };

        let patch = CategoryPatch::from(fields);
        if patch.is_empty() {
            return Ok(target);
        }

        let category = self.repository.update_fields(target.id, patch).await?;

        metrics::counter!("import_categories_updated_total").increment(1);
        tracing::info!(uuid = %category.uuid, "Category updated");

        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockCategoryRepository;
    use chrono::Utc;

    fn category(id: i64, uuid: Uuid, title: &str) -> Category {
        Category {
            id,
            uuid,
            title: title.to_string(),
            body: Some("Old body".to_string()),
            summary: None,
            weight: 0,
            published: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn title_only(title: &str) -> CategoryFields {
        CategoryFields {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_category_assigns_defaults() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_create()
            .withf(|c| c.title == "Garden" && c.weight == 0 && c.published)
            .times(1)
            .returning(|c| Ok(category(1, c.uuid, &c.title)));

        let service = CategoryService::new(Arc::new(repo));
        let created = service.create_category(title_only("Garden")).await.unwrap();

        assert_eq!(created.title, "Garden");
        assert_eq!(created.uuid.get_version_num(), 4);
    }

    #[tokio::test]
    async fn test_create_category_requires_title() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_create().times(0);

        let service = CategoryService::new(Arc::new(repo));
        let err = service
            .create_category(CategoryFields::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_category_applies_only_present_fields() {
        let uuid = Uuid::new_v4();
        let mut repo = MockCategoryRepository::new();

        repo.expect_find_by_uuid()
            .times(1)
            .returning(move |u| Ok(vec![category(7, u, "Old")]));
        repo.expect_update_fields()
            .withf(|id, patch| {
                *id == 7
                    && patch.title.as_deref() == Some("New Title")
                    && patch.body.is_none()
                    && patch.weight.is_none()
            })
            .times(1)
            .returning(move |id, patch| {
                let mut updated = category(id, uuid, "Old");
                updated.title = patch.title.unwrap_or(updated.title);
                Ok(updated)
            });

        let service = CategoryService::new(Arc::new(repo));
        let updated = service
            .update_category(&uuid.to_string(), title_only("New Title"))
            .await
            .unwrap();

        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.body.as_deref(), Some("Old body"));
    }

    #[tokio::test]
    async fn test_update_category_unknown_uuid() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_find_by_uuid().returning(|_| Ok(vec![]));
        repo.expect_update_fields().times(0);

        let service = CategoryService::new(Arc::new(repo));
        let err = service
            .update_category(&Uuid::new_v4().to_string(), title_only("T"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.message(), MSG_NOT_UPDATED);
    }

    #[tokio::test]
    async fn test_update_category_ambiguous_uuid() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_find_by_uuid()
            .returning(|u| Ok(vec![category(1, u, "A"), category(2, u, "B")]));
        repo.expect_update_fields().times(0);

        let service = CategoryService::new(Arc::new(repo));
        let err = service
            .update_category(&Uuid::new_v4().to_string(), title_only("T"))
            .await
            .unwrap_err();

        assert_eq!(err.message(), MSG_NOT_UPDATED);
    }

    #[tokio::test]
    async fn test_update_category_malformed_uuid() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_find_by_uuid().times(0);

        let service = CategoryService::new(Arc::new(repo));
        let err = service
            .update_category("not-a-uuid", title_only("T"))
            .await
            .unwrap_err();

        assert_eq!(err.message(), MSG_NOT_UPDATED);
    }
}
