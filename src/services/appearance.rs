use crate::client::{ApiClient, RequestOptions};
use crate::error::Result;
use crate::models::{CardAppearance, CardId};

#[derive(Clone, Debug)]
pub struct CardAppearanceService {
    client: ApiClient,
}

impl CardAppearanceService {
    pub fn new(client: ApiClient) -> Self {
        CardAppearanceService { client }
    }

    pub async fn update_card_appearance(
        &self,
        card_id: CardId,
        appearance: &CardAppearance,
    ) -> Result<CardAppearance> {
        self.client
            .request(
                &format!("/cards/{}/appearance", card_id),
                RequestOptions::put(appearance)?,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::models::CardAppearanceConfig;
    use crate::navigation::NoopNavigator;
    use crate::session::{CookieAttributes, MemoryTokenStorage, SessionHandle};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn puts_theme_and_free_form_config() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("PUT", "/cards/4/appearance")
            .match_header("authorization", "Bearer abc")
            .match_body(Matcher::Json(json!({
                "theme": "bold",
                "config": {"accentColor": "#112233", "templateId": "bold", "radius": 8}
            })))
            .with_status(200)
            .with_body(r##"{"theme": "bold", "config": {"accentColor": "#112233"}}"##)
            .create_async()
            .await;

        let storage = MemoryTokenStorage::with_token(CookieAttributes::default(), "abc");
        let session = SessionHandle::hydrate(Arc::new(storage)).unwrap();
        let config = ApiConfig {
            base_url: Some(server.url()),
        };
        let client = ApiClient::new(&config, session, Arc::new(NoopNavigator), "/auth/login").unwrap();

        let mut extra = serde_json::Map::new();
        extra.insert("radius".into(), json!(8));
        let appearance = CardAppearance {
            theme: "bold".into(),
            logo_url: None,
            config: Some(CardAppearanceConfig {
                accent_color: Some("#112233".into()),
                template_id: Some("bold".into()),
                extra,
                ..Default::default()
            }),
        };

        let saved = CardAppearanceService::new(client)
            .update_card_appearance(4, &appearance)
            .await
            .unwrap();
        m.assert_async().await;
        assert_eq!(saved.theme, "bold");
    }
}
