use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::ProfileStore,
    error::AppResult,
    models::{ListKind, Rating},
};

#[derive(Default)]
struct MemoryInner {
    /// user id → movie id → rating
    ratings: BTreeMap<String, BTreeMap<String, Rating>>,
    lists: HashMap<(String, ListKind), Vec<String>>,
}

/// Process-local profile store
///
/// Used when no database is configured and throughout the tests. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryProfileStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with the given ratings
    pub async fn with_ratings(ratings: impl IntoIterator<Item = Rating>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write().await;
            for rating in ratings {
                inner
                    .ratings
                    .entry(rating.user_id.clone())
                    .or_default()
                    .insert(rating.movie_id.clone(), rating);
            }
        }
        store
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn list_ratings(&self, user_id: &str) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .get(user_id)
            .map(|by_movie| by_movie.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_user_ids(&self) -> AppResult<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .iter()
            .filter(|(_, by_movie)| !by_movie.is_empty())
            .map(|(user_id, _)| user_id.clone())
            .collect())
    }

    async fn put_rating(&self, rating: &Rating) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .ratings
            .entry(rating.user_id.clone())
            .or_default()
            .insert(rating.movie_id.clone(), rating.clone());
        Ok(())
    }

    async fn remove_rating(&self, user_id: &str, movie_id: &str) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .ratings
            .get_mut(user_id)
            .and_then(|by_movie| by_movie.remove(movie_id))
            .is_some())
    }

    async fn add_to_list(&self, user_id: &str, kind: ListKind, movie_id: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let list = inner.lists.entry((user_id.to_string(), kind)).or_default();
        if !list.iter().any(|id| id == movie_id) {
            list.push(movie_id.to_string());
        }
        Ok(())
    }

    async fn remove_from_list(
        &self,
        user_id: &str,
        kind: ListKind,
        movie_id: &str,
    ) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(list) = inner.lists.get_mut(&(user_id.to_string(), kind)) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|id| id != movie_id);
        Ok(list.len() != before)
    }

    async fn get_list(&self, user_id: &str, kind: ListKind) -> AppResult<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner
            .lists
            .get(&(user_id.to_string(), kind))
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
