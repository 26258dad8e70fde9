pub mod actor;

use rand::distributions::{Alphanumeric, DistString};

/// Connection ids are server-assigned and never leave the process, they only
/// have to be unique among the connections of one room.
pub fn generate_connection_id() -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), 12)
}
