use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type CardId = u64;
pub type LinkId = u64;

/// What a card link points at.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CardLinkType {
    Website,
    Instagram,
    Linkedin,
    Facebook,
    X,
    Tiktok,
    Snapchat,
    Youtube,
    Whatsapp,
    Phone,
    Address,
    Link,
}

impl CardLinkType {
    pub const ALL: [CardLinkType; 12] = [
        CardLinkType::Website,
        CardLinkType::Instagram,
        CardLinkType::Linkedin,
        CardLinkType::Facebook,
        CardLinkType::X,
        CardLinkType::Tiktok,
        CardLinkType::Snapchat,
        CardLinkType::Youtube,
        CardLinkType::Whatsapp,
        CardLinkType::Phone,
        CardLinkType::Address,
        CardLinkType::Link,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CardLinkType::Website => "website",
            CardLinkType::Instagram => "instagram",
            CardLinkType::Linkedin => "linkedin",
            CardLinkType::Facebook => "facebook",
            CardLinkType::X => "x",
            CardLinkType::Tiktok => "tiktok",
            CardLinkType::Snapchat => "snapchat",
            CardLinkType::Youtube => "youtube",
            CardLinkType::Whatsapp => "whatsapp",
            CardLinkType::Phone => "phone",
            CardLinkType::Address => "address",
            CardLinkType::Link => "link",
        }
    }
}

impl fmt::Display for CardLinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardLinkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        CardLinkType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("unknown link type '{}'", s))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardLink {
    pub id: LinkId,
    #[serde(rename = "type")]
    pub link_type: CardLinkType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Theme settings. Keys the client does not model are kept in `extra`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardAppearanceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardAppearance {
    pub theme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<CardAppearanceConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accreditation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub links: Vec<CardLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<CardAppearance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Links sorted by position. Unpositioned links go last, ties keep server order.
    pub fn ordered_links(&self) -> Vec<&CardLink> {
        let mut links: Vec<&CardLink> = self.links.iter().collect();
        links.sort_by_key(|link| (link.position.is_none(), link.position));
        links
    }
}

/// Body for `POST /cards`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardPayload {
    pub display_name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accreditation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Body for `PATCH /cards/{id}`. Only fields that are set are sent.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accreditation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl CardFilters {
    pub fn search(term: impl Into<String>) -> Self {
        CardFilters {
            search: Some(term.into()),
        }
    }

    /// Query pairs for `GET /cards`; blank values are left out.
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| vec![("search".to_string(), s.to_string())])
            .unwrap_or_default()
    }
}

/// Body for adding a link, and one entry of a full replace.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LinkId>,
    #[serde(rename = "type")]
    pub link_type: CardLinkType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl LinkPayload {
    pub fn new(link_type: CardLinkType, value: impl Into<String>) -> Self {
        LinkPayload {
            id: None,
            link_type,
            label: None,
            value: value.into(),
            position: None,
        }
    }
}

/// Body for `PATCH /cards/{id}/links/{linkId}`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkUpdate {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<CardLinkType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

#[derive(Serialize, Debug)]
pub(crate) struct ReplaceLinksBody<'a> {
    pub links: &'a [LinkPayload],
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReorderLinksBody<'a> {
    pub ordered_link_ids: &'a [LinkId],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_card_with_links_and_appearance() {
        let card: Card = serde_json::from_value(json!({
            "id": 3,
            "displayName": "Ada Lovelace",
            "slug": "ada",
            "links": [
                {"id": 1, "type": "website", "value": "https://ada.dev", "position": 1},
                {"id": 2, "type": "x", "label": "X", "value": "@ada", "position": 0}
            ],
            "appearance": {
                "theme": "classic",
                "config": {"accentColor": "#ff0000", "radius": 12}
            },
            "createdAt": "2025-01-15T10:00:00Z"
        }))
        .expect("card should decode");

        assert_eq!(card.links.len(), 2);
        assert_eq!(card.links[1].link_type, CardLinkType::X);
        let config = card.appearance.as_ref().and_then(|a| a.config.as_ref()).expect("config");
        assert_eq!(config.accent_color.as_deref(), Some("#ff0000"));
        assert_eq!(config.extra.get("radius"), Some(&json!(12)));
        assert!(card.created_at.is_some());
    }

    #[test]
    fn ordered_links_put_unpositioned_last() {
        let link = |id, position| CardLink {
            id,
            link_type: CardLinkType::Link,
            label: None,
            value: format!("v{}", id),
            position,
            is_active: None,
        };
        let card = Card {
            id: 1,
            display_name: "n".into(),
            title: None,
            company: None,
            prefix: None,
            suffix: None,
            accreditation: None,
            department: None,
            headline: None,
            slug: "n".into(),
            links: vec![link(1, None), link(2, Some(5)), link(3, Some(0)), link(4, None)],
            appearance: None,
            is_public: None,
            is_active: None,
            created_at: None,
            updated_at: None,
        };
        let ids: Vec<LinkId> = card.ordered_links().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[test]
    fn update_serializes_only_set_fields() {
        let update = CardUpdate {
            headline: Some("Engineer".into()),
            is_public: Some(true),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).expect("encode"),
            json!({"headline": "Engineer", "isPublic": true})
        );
    }

    #[test]
    fn link_type_parses_case_insensitively() {
        assert_eq!("LinkedIn".parse::<CardLinkType>(), Ok(CardLinkType::Linkedin));
        assert!("myspace".parse::<CardLinkType>().is_err());
    }

    #[test]
    fn filters_skip_blank_search() {
        assert!(CardFilters::search("  ").to_query().is_empty());
        assert_eq!(
            CardFilters::search("ada").to_query(),
            vec![("search".to_string(), "ada".to_string())]
        );
    }
}
