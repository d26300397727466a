mod profile;
mod session;

pub use profile::{Group, UserProfile};
pub use session::TokenPair;
