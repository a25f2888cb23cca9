mod portpicker;
mod socket;
mod stream;

// re-export
pub use socket::{next_addr, next_addr_for_ip};
pub use stream::*;
