pub mod health;
pub mod root;
pub mod status;
pub mod text;

pub use health::*;
pub use root::*;
pub use status::*;
pub use text::*;
