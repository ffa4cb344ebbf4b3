mod board;
mod card;
mod command;
mod list;
mod reorganize;
mod user;

pub use board::*;
pub use card::*;
pub use command::*;
pub use list::*;
pub use reorganize::*;
pub use user::*;
