use serde::Deserialize;
use serde_json::Map;

use super::{check_length, trimmed_optional, ValidationErrors};
use crate::models::{
    CardAppearance, CardAppearanceConfig, CardLinkType, CardPayload, LinkId, LinkPayload,
};

/// Raw card editor input: basic info, links, and customization.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct CardForm {
    pub basic: BasicInfo,
    #[serde(default)]
    pub links: Vec<LinkInput>,
    pub customization: Customization,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct BasicInfo {
    pub name: String,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub accreditation: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub company: Option<String>,
    pub headline: Option<String>,
}

/// Links not yet saved carry a client-side string id.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum LinkInputId {
    Persisted(i64),
    Local(String),
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct LinkInput {
    pub id: Option<LinkInputId>,
    #[serde(rename = "type")]
    pub link_type: String,
    pub label: Option<String>,
    pub value: String,
    pub position: Option<i64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    pub template: String,
    pub color: Option<String>,
    pub logo: Option<String>,
    pub profile_image: Option<String>,
}

/// A card form that passed validation, ready to be turned into request bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDraft {
    pub display_name: String,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub accreditation: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub company: Option<String>,
    pub headline: Option<String>,
    pub links: Vec<DraftLink>,
    pub template: String,
    pub accent_color: Option<String>,
    pub logo_url: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftLink {
    pub id: Option<LinkId>,
    pub link_type: CardLinkType,
    pub label: Option<String>,
    pub value: String,
    pub position: Option<u32>,
}

impl CardForm {
    pub fn validate(&self) -> Result<CardDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let display_name = self.basic.name.trim().to_string();
        if display_name.is_empty() {
            errors.push("basic.name", "Name is required");
        }

        let links: Vec<DraftLink> = self
            .links
            .iter()
            .enumerate()
            .filter_map(|(index, link)| validate_link(&mut errors, index, link))
            .collect();

        let template = self.customization.template.trim().to_string();
        if template.is_empty() {
            errors.push("customization.template", "Template is required");
        }

        let basic = &self.basic;
        errors.into_result(CardDraft {
            display_name,
            prefix: trimmed_optional(basic.prefix.as_deref()),
            suffix: trimmed_optional(basic.suffix.as_deref()),
            accreditation: trimmed_optional(basic.accreditation.as_deref()),
            title: trimmed_optional(basic.title.as_deref()),
            department: trimmed_optional(basic.department.as_deref()),
            company: trimmed_optional(basic.company.as_deref()),
            headline: trimmed_optional(basic.headline.as_deref()),
            links,
            template,
            accent_color: trimmed_optional(self.customization.color.as_deref()),
            logo_url: trimmed_optional(self.customization.logo.as_deref()),
            profile_image: trimmed_optional(self.customization.profile_image.as_deref()),
        })
    }
}

fn validate_link(errors: &mut ValidationErrors, index: usize, link: &LinkInput) -> Option<DraftLink> {
    let field = |name: &str| format!("links.{}.{}", index, name);
    let before = errors.len();

    let id = match &link.id {
        None => None,
        Some(LinkInputId::Persisted(id)) => match LinkId::try_from(*id) {
            Ok(id) if id > 0 => Some(id),
            _ => {
                errors.push(field("id"), "Link id must be a positive number");
                None
            }
        },
        Some(LinkInputId::Local(local)) => {
            if local.is_empty() {
                errors.push(field("id"), "Link id must not be empty");
            }
            None
        }
    };

    let raw_type = link.link_type.trim();
    check_length(errors, &field("type"), raw_type, None, Some((30, "Type must be at most 30 characters")));
    let link_type = raw_type.parse::<CardLinkType>();
    if link_type.is_err() && raw_type.chars().count() <= 30 {
        errors.push(field("type"), "Unsupported link type");
    }

    let label = trimmed_optional(link.label.as_deref());
    if let Some(label) = &label {
        check_length(errors, &field("label"), label, None, Some((50, "Label must be at most 50 characters")));
    }

    let value = link.value.trim().to_string();
    check_length(errors, &field("value"), &value, None, Some((255, "Value must be at most 255 characters")));

    let position = match link.position {
        None => None,
        Some(p) => match u32::try_from(p) {
            Ok(p) => Some(p),
            Err(_) => {
                errors.push(field("position"), "Position must be zero or greater");
                None
            }
        },
    };

    if errors.len() > before {
        return None;
    }
    Some(DraftLink {
        id,
        link_type: link_type.ok()?,
        label,
        value,
        position,
    })
}

impl CardDraft {
    pub fn card_payload(&self, slug: impl Into<String>) -> CardPayload {
        CardPayload {
            display_name: self.display_name.clone(),
            slug: slug.into(),
            title: self.title.clone(),
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
            accreditation: self.accreditation.clone(),
            department: self.department.clone(),
            company: self.company.clone(),
            headline: self.headline.clone(),
            is_public: None,
            is_active: None,
        }
    }

    /// Links in form order; a missing position becomes the link's index.
    pub fn link_payloads(&self) -> Vec<LinkPayload> {
        self.links
            .iter()
            .enumerate()
            .map(|(index, link)| LinkPayload {
                id: link.id,
                link_type: link.link_type,
                label: link.label.clone(),
                value: link.value.clone(),
                position: link
                    .position
                    .or_else(|| u32::try_from(index).ok()),
            })
            .collect()
    }

    pub fn appearance(&self) -> CardAppearance {
        let mut extra = Map::new();
        if let Some(image) = &self.profile_image {
            extra.insert("profileImage".to_string(), image.clone().into());
        }
        CardAppearance {
            theme: self.template.clone(),
            logo_url: self.logo_url.clone(),
            config: Some(CardAppearanceConfig {
                accent_color: self.accent_color.clone(),
                template_id: Some(self.template.clone()),
                extra,
                ..Default::default()
            }),
        }
    }
}

/// Lowercase ASCII slug: alphanumerics kept, everything else collapsed to single dashes.
pub fn suggest_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: serde_json::Value) -> CardForm {
        serde_json::from_value(value).expect("form should decode")
    }

    #[test]
    fn valid_form_builds_payloads() {
        let draft = form(json!({
            "basic": {"name": "  Ada Lovelace ", "title": "Analyst", "company": " "},
            "links": [
                {"id": "tmp-1", "type": "website", "value": " https://ada.dev "},
                {"id": 12, "type": "LinkedIn", "label": "Profile", "value": "ada", "position": 5}
            ],
            "customization": {"template": "classic", "color": "#aa0000", "profileImage": "https://x/p.png"}
        }))
        .validate()
        .unwrap();

        assert_eq!(draft.display_name, "Ada Lovelace");
        assert_eq!(draft.company, None);

        let payload = draft.card_payload(suggest_slug(&draft.display_name));
        assert_eq!(payload.slug, "ada-lovelace");
        assert_eq!(payload.title.as_deref(), Some("Analyst"));

        let links = draft.link_payloads();
        assert_eq!(links[0].id, None);
        assert_eq!(links[0].value, "https://ada.dev");
        assert_eq!(links[0].position, Some(0));
        assert_eq!(links[1].id, Some(12));
        assert_eq!(links[1].link_type, CardLinkType::Linkedin);
        assert_eq!(links[1].position, Some(5));

        let appearance = draft.appearance();
        assert_eq!(appearance.theme, "classic");
        let config = appearance.config.unwrap();
        assert_eq!(config.accent_color.as_deref(), Some("#aa0000"));
        assert_eq!(config.extra.get("profileImage"), Some(&json!("https://x/p.png")));
    }

    #[test]
    fn reports_field_paths() {
        let errors = form(json!({
            "basic": {"name": "   "},
            "links": [
                {"type": "fax", "value": "123"},
                {"id": 0, "type": "x", "label": "l".repeat(51), "value": "v".repeat(256), "position": -1}
            ],
            "customization": {"template": ""}
        }))
        .validate()
        .unwrap_err();

        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "basic.name",
                "links.0.type",
                "links.1.id",
                "links.1.label",
                "links.1.value",
                "links.1.position",
                "customization.template",
            ]
        );
    }

    #[test]
    fn overlong_type_reports_length_only() {
        let errors = form(json!({
            "basic": {"name": "Ada"},
            "links": [{"type": "t".repeat(31), "value": "v"}],
            "customization": {"template": "bold"}
        }))
        .validate()
        .unwrap_err();
        assert_eq!(
            errors.messages_for("links.0.type").collect::<Vec<_>>(),
            vec!["Type must be at most 30 characters"]
        );
    }

    #[test]
    fn slug_suggestions() {
        assert_eq!(suggest_slug("  Dr. Ada  Lovelace, FRS "), "dr-ada-lovelace-frs");
        assert_eq!(suggest_slug("Zoë"), "zo");
        assert_eq!(suggest_slug("!!!"), "");
    }
}
