#[macro_use]
pub mod macros;

pub mod analysis;
pub mod assessment;
pub mod curriculum;
pub mod game;
pub mod user;

pub use analysis::*;
pub use assessment::*;
pub use curriculum::*;
pub use game::*;
pub use user::*;
