use serde::{Deserialize, Serialize};

/// Generational handle: `(index, generation)`.
///
/// Handles are issued by whoever owns the underlying object; holders use them
/// only to address it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }
}
