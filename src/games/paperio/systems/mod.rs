pub mod claim;
pub mod clock;
pub mod enclosure;
pub mod input;
pub mod movement;
pub mod respawn;

pub use claim::{ClaimOutcome, on_cell_entered};
pub use input::{direction_from_proto, direction_to_proto};
