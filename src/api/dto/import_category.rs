//! DTO for the category import endpoints.

use serde::Deserialize;
use serde_with::{NoneAsEmptyString, PickFirst, serde_as};
use validator::Validate;

use crate::domain::entities::CategoryFields;
use crate::utils::sanitize::{strip_tags, strip_unsafe_markup};

/// Request body for `POST /api/v1/import-category` and
/// `PATCH /api/v1/import-category/{uuid}`.
///
/// Unknown fields are dropped. Empty strings deserialize to `None`, so on
/// PATCH an empty value leaves the stored field unchanged.
///
/// ```json
/// {
///   "title": "Gardening",
///   "body": "<p>Everything about plants</p>",
///   "summary": "Plants",
///   "weight": 5,
///   "published": true
/// }
/// ```
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ImportCategoryRequest {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(
        required(message = "Title is required"),
        length(min = 1, max = 255, message = "Title must be 1-255 characters")
    )]
    pub title: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub body: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(length(max = 1024, message = "Summary must be at most 1024 characters"))]
    pub summary: Option<String>,

    #[serde_as(as = "PickFirst<(Option<_>, NoneAsEmptyString)>")]
    #[serde(default)]
    #[validate(range(min = -1000, max = 1000, message = "Weight must be between -1000 and 1000"))]
    pub weight: Option<i32>,

    #[serde_as(as = "PickFirst<(Option<_>, NoneAsEmptyString)>")]
    #[serde(default)]
    pub published: Option<bool>,
}

impl ImportCategoryRequest {
    /// Normalizes the payload: trims text, strips markup and turns values
    /// that end up empty into `None`.
    pub fn cleaned(self) -> Self {
        Self {
            title: non_empty(self.title.map(|t| strip_tags(&t))),
            body: non_empty(self.body.map(|b| strip_unsafe_markup(&b))),
            summary: non_empty(self.summary.map(|s| strip_tags(&s))),
            weight: self.weight,
            published: self.published,
        }
    }

    pub fn into_fields(self) -> CategoryFields {
        CategoryFields {
            title: self.title,
            body: self.body,
            summary: self.summary,
            weight: self.weight,
            published: self.published,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
