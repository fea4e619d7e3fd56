pub mod catalog;
pub mod redis;

pub use catalog::{Catalog, TitleRow};
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use self::redis::CacheWriterHandle;
