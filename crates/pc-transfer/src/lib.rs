//! File-drop transmitter and receiver, and the receiver-side spool (§4.5).

pub mod receiver;
pub mod record;
pub mod spool;
pub mod transmitter;

pub use receiver::receive_file_drop;
pub use spool::{recreate_spool, spool_root, SPOOL_DIR_NAME};
pub use transmitter::send_file_drop_list;
