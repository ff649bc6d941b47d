pub mod description;
pub mod errors;
pub mod items;
pub mod models;
pub mod traits;

pub use description::*;
pub use errors::*;
pub use items::*;
pub use models::*;
pub use traits::*;
