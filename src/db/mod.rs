pub mod memory;
pub mod postgres;
pub mod profile_store;
pub mod redis;

pub use memory::MemoryProfileStore;
pub use postgres::{create_pool, PgProfileStore};
pub use profile_store::ProfileStore;
pub use redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};

#[cfg(test)]
pub use profile_store::MockProfileStore;
