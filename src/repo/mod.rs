pub mod board;
pub mod card;
pub mod list;
pub mod session;
pub mod user;

pub use board::BoardRepository;
pub use card::CardRepository;
pub use list::ListRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
