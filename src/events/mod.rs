//! Tree change notification.
//!
//! Mutations broadcast a "before" event, mutate, then broadcast an "after"
//! event. Pairing is best effort: a commit coalesces everything into one
//! [`TreeChange::BeforeChildrenChange`] / [`TreeChange::ChildrenChanged`]
//! pair on the root, and listeners must tolerate missing or extra events.

mod bus;
mod change;

pub use bus::{EventBus, Subscription, TreeChangeListener};
pub use change::{Property, TreeChange, TreeChangeEvent};
