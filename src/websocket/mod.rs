pub mod handler;
pub mod msg_update_handler;
