use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::categories::models::{Category, CategoryStatus, CreateCategory};

/// One category to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetailDto {
    #[validate(custom(
        function = "crate::shared::validation::validate_not_blank",
        message = "Category name cannot be blank"
    ))]
    pub name: String,

    /// Parent base category; omit to create a base category
    pub base_id: Option<i64>,

    #[validate(custom(
        function = "crate::shared::validation::validate_not_blank",
        message = "Category picture cannot be blank"
    ))]
    pub picture: String,
}

/// Request DTO for creating a batch of categories
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoriesDto {
    #[validate(required(message = "Categories list cannot be null"), nested)]
    pub categories: Option<Vec<CategoryDetailDto>>,
}

/// Request DTO for updating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryDto {
    #[validate(custom(
        function = "crate::shared::validation::validate_not_blank",
        message = "Category name cannot be blank"
    ))]
    pub name: String,

    /// New parent base category; omit to make this a base category
    pub base_id: Option<i64>,

    #[validate(custom(
        function = "crate::shared::validation::validate_not_blank",
        message = "Category picture cannot be blank"
    ))]
    pub picture: String,
}

/// Create inputs split by whether they name a parent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySeparation {
    pub base_categories: Vec<CategoryDetailDto>,
    pub sub_categories: Vec<CategoryDetailDto>,
}

impl CategorySeparation {
    /// Split into base (no parent) and sub (parent given) groups, keeping input order.
    /// Nothing is validated here.
    pub fn partition(details: Vec<CategoryDetailDto>) -> Self {
        let (sub_categories, base_categories) =
            details.into_iter().partition(|d| d.base_id.is_some());

        Self {
            base_categories,
            sub_categories,
        }
    }

    /// New active records, base categories first so a sub may reference a base from the
    /// same batch
    pub fn into_create_categories(self) -> Vec<CreateCategory> {
        self.base_categories
            .into_iter()
            .chain(self.sub_categories)
            .map(|d| CreateCategory {
                name: d.name,
                base_id: d.base_id,
                picture: d.picture,
                status: CategoryStatus::Active,
            })
            .collect()
    }
}

/// Response DTO for category tree (base categories with their sub-categories)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: i64,
    pub name: String,
    pub base_id: Option<i64>,
    pub picture: String,
    /// Always present; empty when the base has no sub-categories
    pub sub_categories: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Build the two-level tree from a flat list of categories.
    ///
    /// Base categories keep their input order and each carries the sub-categories whose
    /// `base_id` is its id, also in input order. Sub-categories pointing at an id that is
    /// not a base in `categories` are dropped. No status filtering happens here.
    pub fn build_tree(categories: &[Category]) -> Vec<CategoryTreeDto> {
        let mut children: HashMap<i64, Vec<CategoryTreeDto>> = HashMap::new();
        for category in categories {
            if let Some(base_id) = category.base_id {
                children
                    .entry(base_id)
                    .or_default()
                    .push(Self::leaf(category));
            }
        }

        categories
            .iter()
            .filter(|c| c.is_base())
            .map(|base| CategoryTreeDto {
                sub_categories: children.remove(&base.id).unwrap_or_default(),
                ..Self::leaf(base)
            })
            .collect()
    }

    fn leaf(category: &Category) -> CategoryTreeDto {
        CategoryTreeDto {
            id: category.id,
            name: category.name.clone(),
            base_id: category.base_id,
            picture: category.picture.clone(),
            sub_categories: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fake::faker::lorem::en::Word;
    use fake::Fake;

    fn detail(name: &str, base_id: Option<i64>) -> CategoryDetailDto {
        CategoryDetailDto {
            name: name.to_string(),
            base_id,
            picture: format!("{}.png", name),
        }
    }

    fn category(id: i64, name: &str, base_id: Option<i64>) -> Category {
        let now = Utc::now();
        Category {
            id,
            name: name.to_string(),
            base_id,
            picture: format!("{}.png", name),
            status: CategoryStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn names(nodes: &[CategoryTreeDto]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_partition_splits_by_parent_and_keeps_order() {
        let input = vec![
            detail("a", None),
            detail("b", Some(1)),
            detail("c", None),
            detail("d", Some(3)),
            detail("e", Some(1)),
        ];

        let separation = CategorySeparation::partition(input.clone());

        assert_eq!(
            separation.base_categories,
            vec![input[0].clone(), input[2].clone()]
        );
        assert_eq!(
            separation.sub_categories,
            vec![input[1].clone(), input[3].clone(), input[4].clone()]
        );
    }

    #[test]
    fn test_partition_is_a_permutation_of_random_input() {
        let input: Vec<CategoryDetailDto> = (0..40)
            .map(|i| {
                let name: String = Word().fake();
                let base_id = if (0..3).fake::<u8>() == 0 {
                    None
                } else {
                    Some(i)
                };
                detail(&name, base_id)
            })
            .collect();

        let separation = CategorySeparation::partition(input.clone());

        assert!(separation.base_categories.iter().all(|d| d.base_id.is_none()));
        assert!(separation.sub_categories.iter().all(|d| d.base_id.is_some()));
        assert_eq!(
            separation.base_categories.len() + separation.sub_categories.len(),
            input.len()
        );
        for item in &input {
            let in_input = input.iter().filter(|d| *d == item).count();
            let in_output = separation
                .base_categories
                .iter()
                .chain(&separation.sub_categories)
                .filter(|d| *d == item)
                .count();
            assert_eq!(in_input, in_output);
        }
    }

    #[test]
    fn test_partition_of_empty_input() {
        let separation = CategorySeparation::partition(Vec::new());
        assert_eq!(separation, CategorySeparation::default());
    }

    #[test]
    fn test_create_categories_put_bases_first_and_are_active() {
        let separation = CategorySeparation::partition(vec![
            detail("Phones", Some(1)),
            detail("Electronics", None),
        ]);

        let records = separation.into_create_categories();

        assert_eq!(records[0].name, "Electronics");
        assert_eq!(records[0].base_id, None);
        assert_eq!(records[1].name, "Phones");
        assert_eq!(records[1].base_id, Some(1));
        assert!(records.iter().all(|r| r.status == CategoryStatus::Active));
    }

    #[test]
    fn test_build_tree_attaches_children_in_order() {
        let categories = vec![
            category(1, "Electronics", None),
            category(2, "Phones", Some(1)),
            category(3, "Books", None),
            category(4, "Laptops", Some(1)),
            category(5, "Novels", Some(3)),
        ];

        let tree = CategoryTreeDto::build_tree(&categories);

        assert_eq!(names(&tree), vec!["Electronics", "Books"]);
        assert_eq!(names(&tree[0].sub_categories), vec!["Phones", "Laptops"]);
        assert_eq!(names(&tree[1].sub_categories), vec!["Novels"]);
        assert_eq!(tree[0].sub_categories[0].base_id, Some(1));
        assert_eq!(tree[0].picture, "Electronics.png");
    }

    #[test]
    fn test_build_tree_gives_childless_base_an_empty_list() {
        let tree = CategoryTreeDto::build_tree(&[category(1, "Solo", None)]);

        assert_eq!(tree.len(), 1);
        assert!(tree[0].sub_categories.is_empty());
    }

    #[test]
    fn test_build_tree_drops_orphans() {
        let categories = vec![
            category(1, "Electronics", None),
            category(2, "Orphan", Some(99)),
            // parent is itself a sub-category, so it never becomes a node
            category(3, "Phones", Some(1)),
            category(4, "Grandchild", Some(3)),
        ];

        let tree = CategoryTreeDto::build_tree(&categories);

        assert_eq!(tree.len(), 1);
        assert_eq!(names(&tree[0].sub_categories), vec!["Phones"]);
        assert!(tree[0].sub_categories[0].sub_categories.is_empty());
    }

    #[test]
    fn test_build_tree_ignores_status() {
        let mut deleted = category(1, "Gone", None);
        deleted.status = CategoryStatus::Deleted;

        let tree = CategoryTreeDto::build_tree(&[deleted]);

        assert_eq!(names(&tree), vec!["Gone"]);
    }

    #[test]
    fn test_build_tree_child_may_precede_parent() {
        let categories = vec![category(2, "Phones", Some(1)), category(1, "Electronics", None)];

        let tree = CategoryTreeDto::build_tree(&categories);

        assert_eq!(names(&tree), vec!["Electronics"]);
        assert_eq!(names(&tree[0].sub_categories), vec!["Phones"]);
    }

    #[test]
    fn test_tree_serializes_camel_case() {
        let tree = CategoryTreeDto::build_tree(&[
            category(1, "Electronics", None),
            category(2, "Phones", Some(1)),
        ]);

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json[0]["subCategories"][0]["baseId"], 1);
        assert!(json[0]["baseId"].is_null());
    }

    #[test]
    fn test_create_request_requires_categories_list() {
        let dto: CreateCategoriesDto = serde_json::from_str("{}").unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("categories"));
    }

    #[test]
    fn test_create_request_rejects_blank_fields() {
        let dto = CreateCategoriesDto {
            categories: Some(vec![CategoryDetailDto {
                name: "  ".to_string(),
                base_id: None,
                picture: "p".to_string(),
            }]),
        };
        assert!(dto.validate().is_err());

        let dto = CreateCategoriesDto {
            categories: Some(vec![detail("Electronics", None)]),
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_request_rejects_blank_picture() {
        let dto = UpdateCategoryDto {
            name: "Phones".to_string(),
            base_id: None,
            picture: String::new(),
        };
        assert!(dto.validate().is_err());
    }
}
