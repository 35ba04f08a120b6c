//! Catalog records supplied by the catalog collaborator

use std::path::Path;

use serde::{Deserialize, Serialize};

const BUNDLED_CATALOG: &str = include_str!("../../assets/catalog.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog has no items")]
    Empty,
}

/// How an item is played
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Native,
    Embed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    /// Name of the category this item belongs to
    pub category: String,
    pub media_kind: MediaKind,
    pub media_url: String,
    #[serde(default)]
    pub playback_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: String,
    pub duration_seconds: f64,
}

impl CatalogItem {
    /// Source handed to the native backend: the playback URL when present,
    /// otherwise the media URL.
    pub fn native_source(&self) -> &str {
        self.playback_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.media_url)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: Category,
    pub items: Vec<CatalogItem>,
}

/// Ordered category groups, never mutated after loading
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    groups: Vec<CategoryGroup>,
}

impl Catalog {
    pub fn new(groups: Vec<CategoryGroup>) -> Self {
        Self { groups }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        if catalog.items().next().is_none() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.groups.iter().flat_map(|g| g.items.iter())
    }

    /// Every item sharing `item`'s category, in catalog order, `item` included.
    pub fn related(&self, item: &CatalogItem) -> Vec<&CatalogItem> {
        self.items()
            .filter(|candidate| candidate.category == item.category)
            .collect()
    }

    /// The item following `item` in its related set, wrapping around.
    /// `None` when the related set has fewer than two members.
    pub fn next_related(&self, item: &CatalogItem) -> Option<&CatalogItem> {
        let related = self.related(item);
        if related.len() < 2 {
            return None;
        }
        let next = related
            .iter()
            .position(|candidate| candidate.id == item.id)
            .map(|index| (index + 1) % related.len())
            .unwrap_or(0);
        Some(related[next])
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_bundled_catalog_parses() {
        let catalog = Catalog::bundled().unwrap();
        assert!(catalog.group_count() >= 3);
        assert!(catalog.items().any(|i| i.media_kind == MediaKind::Native));
        assert!(catalog.items().any(|i| i.media_kind == MediaKind::Embed));
    }

    #[test]
    fn test_from_json_uses_camel_case_fields() {
        let json = r#"[{"category":{"name":"surf","icon":"wave"},"items":[
            {"id":"1","title":"Dawn","category":"surf","mediaKind":"native",
             "mediaUrl":"https://cdn/x.mp4","playbackUrl":"media/x.mp4",
             "thumbnailUrl":"t.jpg","durationSeconds":12.5}]}]"#;
        let catalog = Catalog::from_json(json).unwrap();
        let item = catalog.items().next().unwrap();
        assert_eq!(item.media_kind, MediaKind::Native);
        assert_eq!(item.native_source(), "media/x.mp4");
        assert_eq!(item.duration_seconds, 12.5);
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        assert!(matches!(Catalog::from_json("[]"), Err(CatalogError::Empty)));
    }

    #[test]
    fn test_related_keeps_catalog_order() {
        let catalog = catalog();
        let related: Vec<_> = catalog
            .related(&item("b", "surf", MediaKind::Native))
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(related, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_next_related_wraps_and_requires_two() {
        let catalog = catalog();
        let next = |id: &str, cat: &str| {
            catalog
                .next_related(&item(id, cat, MediaKind::Native))
                .map(|i| i.id.clone())
        };
        assert_eq!(next("a", "surf").as_deref(), Some("b"));
        assert_eq!(next("c", "surf").as_deref(), Some("a"));
        assert_eq!(next("d", "city"), None);
    }
}
