//! Common trait implemented by all synchronized domain records.

use uuid::Uuid;

/// A record belonging to one of the synchronized domain collections.
///
/// The tenant filter and the collection store are generic over this trait:
/// every record exposes its unique id plus the two scoping fields the
/// visibility rules compare against.
pub trait DomainRecord: Clone + Send + Sync + 'static {
    /// Unique record identifier.
    fn id(&self) -> Uuid;

    /// Tenant the record belongs to, when tenant-scoped.
    fn tenant_id(&self) -> Option<Uuid>;

    /// Profile that owns the record.
    fn owner_id(&self) -> Option<Uuid>;
}
