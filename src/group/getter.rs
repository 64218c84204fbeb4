//! Loader capability
//!
//! The application-supplied source of truth consulted on a cache miss.

use async_trait::async_trait;

use crate::error::Result;

// == Getter ==
/// Loads the bytes for a key from the backing source.
///
/// Return [`CacheError::NotFound`](crate::error::CacheError::NotFound) when
/// the source has no such key.
#[async_trait]
pub trait Getter: Send + Sync {
    /// Loads the value for `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
}

/// Adapts a plain function or closure into a [`Getter`].
#[derive(Debug, Clone)]
pub struct GetterFn<F>(F);

/// Wraps a synchronous closure as a [`Getter`].
///
/// # Example
/// ```ignore
/// let getter = getter_fn(|key: &str| Ok(key.as_bytes().to_vec()));
/// ```
pub fn getter_fn<F>(f: F) -> GetterFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync,
{
    GetterFn(f)
}

#[async_trait]
impl<F> Getter for GetterFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync,
{
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        (self.0)(key)
    }
}
