pub mod health;
pub mod error;
pub mod messages;
pub mod root;
pub mod status;
pub mod text;
pub mod timestamp;

pub use health::*;
pub use error::*;
pub use messages::*;
pub use root::*;
pub use status::*;
pub use text::*;
