use async_trait::async_trait;

use crate::domain::errors::CacheResult;
use crate::domain::models::User;

/// Read access to user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch the user with `uid`.
    ///
    /// Returns `CacheError::InvalidKey` when `uid` is outside the accepted range.
    async fn get_user(&self, uid: u64) -> CacheResult<User>;
}
