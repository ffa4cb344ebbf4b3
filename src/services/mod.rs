pub mod clustering;
pub mod export;
pub mod journal;
pub mod reorganize;
pub mod undo;
