use crate::client::{ApiClient, RequestOptions};
use crate::error::{ClientError, Result};
use crate::models::{Card, CardFilters, CardId, CardPayload, CardUpdate};

/// The signed-in user's cards, plus the public lookup by slug.
#[derive(Clone, Debug)]
pub struct CardsService {
    client: ApiClient,
}

impl CardsService {
    pub fn new(client: ApiClient) -> Self {
        CardsService { client }
    }

    pub async fn list_my_cards(&self, filters: &CardFilters) -> Result<Vec<Card>> {
        self.client
            .request("/cards", RequestOptions::get().query(filters.to_query()))
            .await
    }

    pub async fn get_my_card(&self, id: CardId) -> Result<Card> {
        self.client
            .request(&format!("/cards/{}", id), RequestOptions::get())
            .await
    }

    pub async fn create_card(&self, payload: &CardPayload) -> Result<Card> {
        self.client
            .request("/cards", RequestOptions::post(payload)?)
            .await
    }

    pub async fn update_card(&self, id: CardId, update: &CardUpdate) -> Result<Card> {
        self.client
            .request(&format!("/cards/{}", id), RequestOptions::patch(update)?)
            .await
    }

    pub async fn delete_card(&self, id: CardId) -> Result<()> {
        self.client
            .request(&format!("/cards/{}", id), RequestOptions::delete())
            .await
    }

    /// Published card lookup. Never sends the bearer token.
    pub async fn get_public_card(&self, slug: &str) -> Result<Card> {
        let slug = slug.trim();
        if slug.is_empty() || slug.contains('/') {
            return Err(ClientError::InvalidRequest(format!(
                "'{}' is not a valid card slug",
                slug
            )));
        }
        self.client
            .request(
                &format!("/cards/public/{}", slug),
                RequestOptions::get().without_auth(),
            )
            .await
    }
}
