//! Tree model engine: path-addressed nodes flattened into an index-stable
//! render list, with cascading visibility filters and state-preserving
//! reconciliation.

pub mod event;
pub mod filter;
pub mod list;
pub mod model;
pub mod node;
pub mod reconcile;

pub use event::{Emitter, Subscription};
pub use filter::{IdentityProvider, TreeFilter, TreeVisibility};
pub use list::{ListHost, SelectionList};
pub use model::{ListPosition, SpliceObserver, TreeModel, TreeModelOptions};
pub use node::{Location, NodeId, TreeElement, TreeNode};
pub use reconcile::{Tree, TreeOptions};
