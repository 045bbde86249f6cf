//! Local character repository.

mod repository;

pub use repository::LocalCharacterRepository;
