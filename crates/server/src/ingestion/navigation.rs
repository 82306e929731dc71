use std::sync::Arc;

use composer::{AnimeRecord, MessageRef, PaginatedComposer};
use metadata::MetadataProvider;

use super::traits::{AnimeStore, Messenger, Result};
use crate::models::ChatTarget;

/// Keeps each show's navigation card and continuation pages current
pub struct NavPublisher {
    store: Arc<dyn AnimeStore>,
    metadata: Arc<dyn MetadataProvider>,
    messenger: Arc<dyn Messenger>,
    composer: PaginatedComposer,
    target: ChatTarget,
}

impl NavPublisher {
    pub fn new(
        store: Arc<dyn AnimeStore>,
        metadata: Arc<dyn MetadataProvider>,
        messenger: Arc<dyn Messenger>,
        composer: PaginatedComposer,
        target: ChatTarget,
    ) -> Self {
        Self {
            store,
            metadata,
            messenger,
            composer,
            target,
        }
    }

    /// Re-render the card of `anime_id` after its episode index changed.
    pub async fn refresh(&self, anime_id: i64) -> Result<()> {
        let Some(mut anime) = self.store.get_anime(anime_id).await? else {
            tracing::warn!("[nav] Anime {} not found, skipping refresh", anime_id);
            return Ok(());
        };
        self.refresh_score(&mut anime).await;

        let pages = self.composer.compose(self.messenger.as_ref(), &anime).await?;
        let Some((card_text, rest)) = pages.split_first() else {
            return Ok(());
        };

        let card = match &anime.nav_message {
            Some(card) => {
                self.edit_card(&anime, card, card_text).await?;
                card.clone()
            }
            None => {
                let card = self.send_card(&anime, card_text).await?;
                self.store.set_nav_message(anime_id, card.clone()).await?;
                card
            }
        };

        let added = self.sync_pages(&anime, &card, rest).await?;
        if added {
            // New pages got links; the card's navigation line must point at them
            if let Some(anime) = self.store.get_anime(anime_id).await? {
                let pages = self.composer.compose(self.messenger.as_ref(), &anime).await?;
                if let Some(card_text) = pages.first() {
                    self.edit_card(&anime, &card, card_text).await?;
                }
            }
        }

        tracing::debug!("[nav] Refreshed anime {} ({} pages)", anime_id, pages.len());
        Ok(())
    }

    /// Pull the current rating from the metadata provider. Failures keep the stored score.
    async fn refresh_score(&self, anime: &mut AnimeRecord) {
        let score = match self.metadata.subject(anime.id).await {
            Ok(subject) => subject.rating.map(|r| r.score).filter(|s| *s > 0.0),
            Err(e) => {
                tracing::warn!("[nav] Failed to fetch subject {}: {}", anime.id, e);
                return;
            }
        };
        let Some(score) = score else {
            return;
        };
        if anime.score == Some(score) {
            return;
        }

        match self.store.update_score(anime.id, score).await {
            Ok(()) => anime.score = Some(score),
            Err(e) => tracing::warn!("[nav] Failed to save score of {}: {}", anime.id, e),
        }
    }

    async fn send_card(&self, anime: &AnimeRecord, text: &str) -> Result<MessageRef> {
        let mut card = match anime.image.as_deref() {
            Some(image) => self.messenger.send_photo(&self.target, image, text).await?,
            None => self.messenger.send_text(&self.target, text, None).await?,
        };
        card.link = Some(self.messenger.message_link(&card).await?);
        Ok(card)
    }

    async fn edit_card(&self, anime: &AnimeRecord, card: &MessageRef, text: &str) -> Result<()> {
        if anime.image.is_some() {
            self.messenger.edit_caption(card, text).await
        } else {
            self.messenger.edit_text(card, text).await
        }
    }

    /// Edit recorded pages, send missing ones. Returns whether pages were added.
    async fn sync_pages(&self, anime: &AnimeRecord, card: &MessageRef, pages: &[String]) -> Result<bool> {
        let mut added = false;
        for (index, text) in pages.iter().enumerate() {
            let page = index + 1;
            match anime.nav_pages.get(&page) {
                Some(existing) => {
                    if let Err(e) = self.messenger.edit_text(existing, text).await {
                        tracing::warn!("[nav] Failed to edit page {} of {}: {}", page, anime.id, e);
                    }
                }
                None => match self.send_page(card, text).await {
                    Ok(message) => {
                        self.store.record_nav_page(anime.id, page, message).await?;
                        added = true;
                    }
                    Err(e) => {
                        tracing::warn!("[nav] Failed to send page {} of {}: {}", page, anime.id, e);
                    }
                },
            }
        }
        Ok(added)
    }

    async fn send_page(&self, card: &MessageRef, text: &str) -> Result<MessageRef> {
        let mut message = self
            .messenger
            .send_text(&self.target, text, Some(card.message_id))
            .await?;
        message.link = Some(self.messenger.message_link(&message).await?);
        Ok(message)
    }
}
