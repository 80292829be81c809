use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use up_core::{Article, ArticleStore, ArticleUpdate, Error, Result};

#[derive(Debug, Default)]
struct MemoryStore {
    articles: Vec<Article>,
    updates: Vec<(u64, ArticleUpdate)>,
}

impl MemoryStore {
    fn list(&self) -> Vec<Article> {
        let mut articles = self.articles.clone();
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        articles
    }

    fn apply(&mut self, id: u64, update: &ArticleUpdate) -> Result<Article> {
        let article = self
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::Rejected { status: 404, body: format!("article {} not found", id) })?;

        if let Some(title) = &update.title {
            article.title = title.clone();
        }
        if let Some(content) = &update.enhanced_content {
            article.enhanced_content = Some(content.clone());
        }
        let updated = article.clone();
        self.updates.push((id, update.clone()));
        Ok(updated)
    }
}

/// Article store kept in process memory, with a log of every update it
/// received.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore { articles, updates: Vec::new() })),
        }
    }

    /// Every update payload received so far, in arrival order.
    pub async fn updates(&self) -> Vec<(u64, ArticleUpdate)> {
        self.store.read().await.updates.clone()
    }
}

#[async_trait]
impl ArticleStore for InMemoryStorage {
    async fn list_articles(&self) -> Result<Vec<Article>> {
        Ok(self.store.read().await.list())
    }

    async fn get_article(&self, id: u64) -> Result<Article> {
        self.store
            .read()
            .await
            .articles
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| Error::Rejected { status: 404, body: format!("article {} not found", id) })
    }

    async fn update_article(&self, id: u64, update: &ArticleUpdate) -> Result<Article> {
        self.store.write().await.apply(id, update)
    }
}
