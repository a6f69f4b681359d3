//! Read-only node/property view over a [`crate::tree::TreeSnapshot`].
//!
//! Nodes and properties are materialized per lookup from the cached
//! descriptors; nothing here mutates the snapshot or talks to the remote
//! store, except binary values fetching their payload on first read.

pub mod mount;
pub mod node;
pub mod property;
pub mod provider;
pub mod query;
pub mod session;
pub mod value;

pub use mount::Mount;
pub use node::ProjectedNode;
pub use property::ProjectedProperty;
pub use provider::{Children, NodeProvider};
pub use query::{
    MountRoot, Query, QueryIntent, QueryManager, QueryResult, Row, classify, listing_statement,
};
pub use session::{Item, Session};
pub use value::{BinaryValue, PropertyType, Value};
