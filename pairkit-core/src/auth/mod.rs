//! In-memory authentication state and the facade that owns it.

pub mod session;
pub mod state;

pub use session::AuthSession;
pub use state::AuthState;
