pub mod inspect;
pub mod matcher;
pub mod resolve;
