use crate::entities::resources;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Closed set of catalog categories. Each search endpoint pins one of these;
/// the wire form is the SCREAMING name ("MODS", "PLUGINS", "SOFTWARE").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ECategory {
    Mods,
    Plugins,
    Software,
}

impl ECategory {
    pub const ALL: [ECategory; 3] = [ECategory::Mods, ECategory::Plugins, ECategory::Software];

    pub fn as_str(&self) -> &'static str {
        match self {
            ECategory::Mods => "MODS",
            ECategory::Plugins => "PLUGINS",
            ECategory::Software => "SOFTWARE",
        }
    }
}

/// Supported game-version labels, newest first. `GET /api/archive/versions`
/// exposes these in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EVersions {
    V1_20,
    V1_19,
    V1_18,
    V1_17,
    V1_16,
    V1_12,
    V1_8,
}

impl EVersions {
    pub const ALL: [EVersions; 7] = [
        EVersions::V1_20,
        EVersions::V1_19,
        EVersions::V1_18,
        EVersions::V1_17,
        EVersions::V1_16,
        EVersions::V1_12,
        EVersions::V1_8,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EVersions::V1_20 => "1.20",
            EVersions::V1_19 => "1.19",
            EVersions::V1_18 => "1.18",
            EVersions::V1_17 => "1.17",
            EVersions::V1_16 => "1.16",
            EVersions::V1_12 => "1.12",
            EVersions::V1_8 => "1.8",
        }
    }

    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|v| v.label().to_string()).collect()
    }

    pub fn is_known(label: &str) -> bool {
        Self::ALL.iter().any(|v| v.label() == label)
    }
}

/// Projection used in paged listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimpleResourceDto {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub category: String,
    pub author: i32,
    pub tagline: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SimpleResourceDto {
    pub fn from_model(resource: &resources::Model) -> Self {
        Self {
            id: resource.id,
            slug: resource.slug.clone(),
            name: resource.name.clone(),
            category: resource.category.clone(),
            author: resource.author,
            tagline: resource.tagline.clone(),
            updated_at: resource.updated_at,
        }
    }
}

/// Full single-resource view, including the download total summed across the
/// resource's updates (0 when it has none).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDto {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub category: String,
    pub author: i32,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub total_downloads: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ResourceDto {
    pub fn create(resource: resources::Model, total_downloads: i64) -> Self {
        Self {
            id: resource.id,
            slug: resource.slug,
            name: resource.name,
            category: resource.category,
            author: resource.author,
            tagline: resource.tagline,
            description: resource.description,
            status: resource.status,
            total_downloads,
            created_at: resource.created_at,
            updated_at: resource.updated_at,
        }
    }
}

/// Flat list of game-version labels.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VersionsDto {
    pub versions: Vec<String>,
}

impl VersionsDto {
    pub fn create(versions: Vec<String>) -> Self {
        Self { versions }
    }
}

/// Wire shape for every error payload: symbolic code, human message,
/// HTTP status echoed into the body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorDto {
    pub code: String,
    pub message: String,
    pub status: u16,
}

/// Page envelope for paged listings. Listings only ever page the simple
/// projection, so the envelope stays concrete.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageDto {
    pub content: Vec<SimpleResourceDto>,
    /// Zero-indexed page number.
    pub number: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub name: String,
    pub slug: String,
    pub category: ECategory,
    pub tagline: Option<String>,
    pub description: Option<String>,
}

/// Mutable subset of resource attributes. Slug and category are fixed at
/// creation and cannot be edited.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditResourceRequest {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
}

/// JSON descriptor sent as the `data` part of a multipart upload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUpdateRequest {
    pub resource_id: i32,
    pub title: Option<String>,
    pub versions: Vec<String>,
    pub changelog: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        assert_eq!(serde_json::to_string(&ECategory::Mods).unwrap(), "\"MODS\"");
        assert_eq!(
            serde_json::from_str::<ECategory>("\"SOFTWARE\"").unwrap(),
            ECategory::Software
        );
    }

    #[test]
    fn test_categories_in_declaration_order() {
        let names: Vec<&str> = ECategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["MODS", "PLUGINS", "SOFTWARE"]);
    }

    #[test]
    fn test_version_labels_in_declaration_order() {
        let labels = EVersions::labels();
        assert_eq!(labels.first().map(String::as_str), Some("1.20"));
        assert_eq!(labels.last().map(String::as_str), Some("1.8"));
        assert_eq!(labels.len(), EVersions::ALL.len());
    }

    #[test]
    fn test_version_membership() {
        assert!(EVersions::is_known("1.20"));
        assert!(!EVersions::is_known("0.0"));
    }

    #[test]
    fn test_create_update_request_parses_minimal_body() {
        let req: CreateUpdateRequest =
            serde_json::from_str(r#"{"resourceId":42,"versions":["1.20"]}"#).unwrap();
        assert_eq!(req.resource_id, 42);
        assert_eq!(req.versions, vec!["1.20"]);
        assert!(req.changelog.is_none());
    }

    #[test]
    fn test_page_envelope_field_casing() {
        let page = PageDto {
            content: vec![SimpleResourceDto {
                id: 1,
                slug: "worldedit".into(),
                name: "WorldEdit".into(),
                category: "PLUGINS".into(),
                author: 7,
                tagline: None,
                updated_at: None,
            }],
            number: 0,
            size: 25,
            total_elements: 1,
            total_pages: 1,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalElements"], 1);
        assert_eq!(json["content"][0]["slug"], "worldedit");
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["number"], 0);
    }
}
