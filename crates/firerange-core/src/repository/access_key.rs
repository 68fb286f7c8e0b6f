//! Access key repository trait definition.

use firerange_types::access::AccessKey;
use firerange_types::error::RepositoryError;
use uuid::Uuid;

pub trait AccessKeyRepository: Send + Sync {
    fn create(
        &self,
        key: &AccessKey,
    ) -> impl std::future::Future<Output = Result<AccessKey, RepositoryError>> + Send;

    /// Look a key up by the hash of its plaintext.
    fn get_by_hash(
        &self,
        key_hash: &str,
    ) -> impl std::future::Future<Output = Result<Option<AccessKey>, RepositoryError>> + Send;

    /// Record a successful authentication.
    fn touch(&self, id: &Uuid) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
