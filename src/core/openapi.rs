use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        categories_handlers::list_categories,
        categories_handlers::create_categories,
        categories_handlers::update_category,
        categories_handlers::delete_category,
    ),
    components(
        schemas(
            categories_dtos::CategoryDetailDto,
            categories_dtos::CreateCategoriesDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::CategoryTreeDto,
            ApiResponse<Vec<categories_dtos::CategoryTreeDto>>,
        )
    ),
    tags(
        (name = "categories", description = "Two-level category catalog"),
    ),
    info(
        title = "MS Category API",
        version = "0.1.0",
        description = "Two-level category catalog with cached tree listing",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_category_paths() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/v1/categories"));
        assert!(doc.paths.paths.contains_key("/v1/categories/{id}"));
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Catalog".to_string(),
            version: "9.9.9".to_string(),
            description: "custom".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Catalog");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
