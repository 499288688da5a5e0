//! Public news categories and their upstream type filters.

use crate::error::{AppError, Result};
use crate::models::{ArticleRow, Config};

/// Upstream type value meaning "no filter".
pub const WILDCARD_TYPE: &str = "latest";

/// A public news bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub news_type: String,
}

impl Category {
    pub fn is_wildcard(&self) -> bool {
        self.news_type.is_empty() || self.news_type.eq_ignore_ascii_case(WILDCARD_TYPE)
    }

    /// Whether a row belongs in this category.
    pub fn matches(&self, row: &ArticleRow) -> bool {
        if self.is_wildcard() {
            return true;
        }
        row.news_type()
            .is_some_and(|t| t.eq_ignore_ascii_case(&self.news_type))
    }

    /// Keep only rows of this category's type, preserving order.
    pub fn filter_rows(&self, rows: Vec<ArticleRow>) -> Vec<ArticleRow> {
        if self.is_wildcard() {
            return rows;
        }
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

/// Known categories in configuration order.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    categories: Vec<Category>,
}

impl CategoryMap {
    pub fn from_config(config: &Config) -> Self {
        let categories = config
            .categories
            .iter()
            .map(|info| Category {
                name: info.name.trim().to_lowercase(),
                news_type: info.news_type.trim().to_string(),
            })
            .collect();
        Self { categories }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Resolve a public category name.
    pub fn resolve(&self, name: &str) -> Result<&Category> {
        let name = name.trim().to_lowercase();
        self.categories
            .iter()
            .find(|c| c.name == name)
            .ok_or(AppError::UnknownCategory(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<ArticleRow> {
        vec![
            ArticleRow::from(json!({"id": 1, "type": "notice"})),
            ArticleRow::from(json!({"id": 2, "type": "activity"})),
            ArticleRow::from(json!({"id": 3, "type": "NOTICE"})),
            ArticleRow::from(json!({"id": 4})),
        ]
    }

    #[test]
    fn resolves_known_categories() {
        let map = CategoryMap::from_config(&Config::default());
        assert_eq!(map.resolve("notices").unwrap().news_type, "notice");
        assert_eq!(map.resolve(" Events ").unwrap().news_type, "activity");
    }

    #[test]
    fn rejects_unknown_category() {
        let map = CategoryMap::from_config(&Config::default());
        assert!(matches!(
            map.resolve("misc"),
            Err(AppError::UnknownCategory(name)) if name == "misc"
        ));
    }

    #[test]
    fn filters_case_insensitively() {
        let map = CategoryMap::from_config(&Config::default());
        let notices = map.resolve("notices").unwrap();
        let ids: Vec<_> = notices
            .filter_rows(rows())
            .iter()
            .filter_map(ArticleRow::id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn wildcard_keeps_everything() {
        let map = CategoryMap::from_config(&Config::default());
        let updates = map.resolve("updates").unwrap();
        assert!(updates.is_wildcard());
        assert_eq!(updates.filter_rows(rows()).len(), 4);
    }
}
