use crate::client::{ApiClient, RequestOptions};
use crate::error::Result;
use crate::models::card::{ReorderLinksBody, ReplaceLinksBody};
use crate::models::{CardId, CardLink, LinkId, LinkPayload, LinkUpdate};

/// CRUD and ordering for the links of one card.
#[derive(Clone, Debug)]
pub struct CardLinksService {
    client: ApiClient,
}

impl CardLinksService {
    pub fn new(client: ApiClient) -> Self {
        CardLinksService { client }
    }

    pub async fn add_link(&self, card_id: CardId, payload: &LinkPayload) -> Result<CardLink> {
        self.client
            .request(&links_path(card_id), RequestOptions::post(payload)?)
            .await
    }

    /// Replace the whole link list in one call.
    pub async fn replace_links(&self, card_id: CardId, links: &[LinkPayload]) -> Result<Vec<CardLink>> {
        self.client
            .request(
                &links_path(card_id),
                RequestOptions::put(&ReplaceLinksBody { links })?,
            )
            .await
    }

    pub async fn update_link(&self, card_id: CardId, link_id: LinkId, update: &LinkUpdate) -> Result<CardLink> {
        self.client
            .request(
                &format!("{}/{}", links_path(card_id), link_id),
                RequestOptions::patch(update)?,
            )
            .await
    }

    pub async fn remove_link(&self, card_id: CardId, link_id: LinkId) -> Result<()> {
        self.client
            .request(
                &format!("{}/{}", links_path(card_id), link_id),
                RequestOptions::delete(),
            )
            .await
    }

    /// The server assigns positions from the order of `ordered_link_ids`.
    pub async fn reorder_links(&self, card_id: CardId, ordered_link_ids: &[LinkId]) -> Result<Vec<CardLink>> {
        self.client
            .request(
                &format!("{}/reorder", links_path(card_id)),
                RequestOptions::patch(&ReorderLinksBody { ordered_link_ids })?,
            )
            .await
    }
}

fn links_path(card_id: CardId) -> String {
    format!("/cards/{}/links", card_id)
}
