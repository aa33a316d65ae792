pub mod hash;

pub use hash::{digest, flight_index, pseudo_random_index};
