//! Tree widget over a native outline host.
//!
//! Host ids are the identity ids themselves. A container's children are
//! handed to the host while the container is open (the root always is);
//! closing it takes them back and gives up ids that were only reserved.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use outline::prelude::*;
//!
//! let host = Rc::new(RecordingHost::new());
//! let tree = Tree::with_config(host.clone(), WidgetConfig::on_demand());
//! tree.add_listener(EventKind::Expand, |tree: &Tree, event: &TreeEvent| {
//!     if let TreeEvent::Expand { item } = *event {
//!         tree.set_item_count(Some(item), 3).unwrap();
//!     }
//! });
//! tree.set_item_count(None, 2).unwrap();
//!
//! let folder = tree.item(None, 0).unwrap();
//! tree.item_notification(folder.get(), Notification::ContainerOpening);
//! tree.item_notification(folder.get(), Notification::ContainerOpened);
//! assert_eq!(host.visible(Some(folder)).len(), 3);
//! ```

mod events;
mod state;

pub use state::{Tree, TreeId};
