//! Identity shared by everything the store keys on.

use core::fmt::Debug;
use core::hash::Hash;

/// A value whose identity survives changes to its other fields.
pub trait Entity {
    type Id: Clone + Eq + Hash + Debug;

    fn id(&self) -> &Self::Id;

    fn has_id(&self, id: &Self::Id) -> bool {
        self.id() == id
    }
}
