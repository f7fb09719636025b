mod error;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use traits::Store;
pub use types::{Change, Page, PageRequest, Predicate, Written, ID_FIELD};
