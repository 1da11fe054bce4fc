// best effort: redis failures are logged and callers fall back to the database

use std::ops::DerefMut;
use std::time::Duration;

use r2d2_redis::r2d2;
use r2d2_redis::redis::{Commands, RedisResult};
use r2d2_redis::RedisConnectionManager;

use crate::models::Ingredient;

pub type RedisPool = r2d2::Pool<RedisConnectionManager>;

const CACHE_POOL_MAX_OPEN: u32 = 16;
const CACHE_POOL_MIN_IDLE: u32 = 8;
const CACHE_POOL_EXPIRE_SECONDS: u64 = 60;
const CACHE_ENTRY_TTL_SECONDS: usize = 300;

const ALL_INGREDIENTS_KEY: &str = "ingredients:all";

pub fn build_pool(redis_url: &str) -> Result<RedisPool, Box<dyn std::error::Error + Send + Sync>> {
    let manager = RedisConnectionManager::new(redis_url)?;
    let pool = r2d2::Pool::builder()
        .max_size(CACHE_POOL_MAX_OPEN)
        .max_lifetime(Some(Duration::from_secs(CACHE_POOL_EXPIRE_SECONDS)))
        .min_idle(Some(CACHE_POOL_MIN_IDLE))
        .build(manager)?;
    Ok(pool)
}

#[derive(Clone, Default)]
pub struct IngredientCache {
    pool: Option<RedisPool>,
}

impl IngredientCache {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool: Some(pool) }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// The cached catalogue, or `None` on a miss or any cache failure.
    pub fn get_all(&self) -> Option<Vec<Ingredient>> {
        let pool = self.pool.as_ref()?;
        let mut conn = pool
            .get()
            .map_err(|e| log::warn!("redis pool unavailable: {}", e))
            .ok()?;
        let cached: RedisResult<Option<Vec<u8>>> = conn.deref_mut().get(ALL_INGREDIENTS_KEY);
        match cached {
            Ok(Some(bytes)) if !bytes.is_empty() => match Ingredient::list_from_u8(&bytes) {
                Ok(list) => Some(list),
                Err(e) => {
                    log::warn!("discarding undecodable ingredient cache entry: {}", e);
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                log::warn!("redis read failed: {}", e);
                None
            }
        }
    }

    pub fn put_all(&self, list: &[Ingredient]) {
        let Some(pool) = self.pool.as_ref() else {
            return;
        };
        let bytes = match Ingredient::list_to_u8(list) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("failed to encode ingredient catalogue: {}", e);
                return;
            }
        };
        match pool.get() {
            Ok(mut conn) => {
                let stored: RedisResult<()> =
                    conn.deref_mut()
                        .set_ex(ALL_INGREDIENTS_KEY, bytes, CACHE_ENTRY_TTL_SECONDS);
                if let Err(e) = stored {
                    log::warn!("redis write failed: {}", e);
                }
            }
            Err(e) => log::warn!("redis pool unavailable: {}", e),
        }
    }

    /// Drops the cached catalogue so the next read goes to the database.
    pub fn invalidate(&self) {
        let Some(pool) = self.pool.as_ref() else {
            return;
        };
        match pool.get() {
            Ok(mut conn) => {
                let removed: RedisResult<()> = conn.deref_mut().del(ALL_INGREDIENTS_KEY);
                if let Err(e) = removed {
                    log::warn!("redis delete failed: {}", e);
                }
            }
            Err(e) => log::warn!("redis pool unavailable: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_cache_always_misses() {
        let cache = IngredientCache::disabled();
        cache.put_all(&[Ingredient {
            id: 1,
            name: "salt".to_string(),
            measurement_unit: "g".to_string(),
        }]);

        assert_eq!(cache.get_all(), None);
    }

    #[test]
    fn catalogue_survives_encoding() {
        let list = vec![Ingredient {
            id: 3,
            name: "ёжевика".to_string(),
            measurement_unit: "g".to_string(),
        }];
        let bytes = Ingredient::list_to_u8(&list).unwrap();

        assert_eq!(Ingredient::list_from_u8(&bytes).unwrap(), list);
    }
}
