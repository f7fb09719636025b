mod error;
mod keys;
mod plan;
mod serialization;
mod traits;
mod ttl;

pub use error::{CacheError, Result};
pub use keys::{KeyBuilder, PRIMARY_MAP, RELATIONSHIP_MAP};
pub use plan::CachePlan;
pub use serialization::{
    deserialize_entity, deserialize_id, deserialize_ids, serialize_entity, serialize_id,
    serialize_ids, SerializationError,
};
pub use traits::Cache;
pub use ttl::{TtlClass, TtlPolicy};
