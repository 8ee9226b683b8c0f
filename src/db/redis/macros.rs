/// Read-through caching over an optional [`Cache`](crate::db::Cache).
///
/// With a cache present, a hit is returned as-is; on a miss the block runs and
/// its value is queued for a background write with the given TTL in seconds.
/// A failed cache read counts as a miss. With no cache configured the block
/// simply runs.
///
/// ```rust,ignore
/// let movie: MovieDetails = cached!(self.cache, CacheKey::MovieDetails(id), TTL, async move {
///     fetch_from_tmdb(id).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match &$cache {
            Some(cache) => {
                let cached = match cache.get_from_cache(&key).await {
                    Ok(cached) => cached,
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Cache read failed, bypassing cache");
                        None
                    }
                };
                match cached {
                    Some(hit) => {
                        tracing::debug!(key = %key, "Cache hit");
                        Ok(hit)
                    }
                    None => {
                        let value = $block.await?;
                        cache.set_in_background(&key, &value, $ttl);
                        Ok(value)
                    }
                }
            }
            None => $block.await,
        }
    }};
}
