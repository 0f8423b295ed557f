pub mod activation;
pub mod classify;
pub mod controller;
pub mod errors;
pub mod state;

pub use activation::*;
pub use classify::*;
pub use controller::*;
pub use errors::*;
pub use state::*;
