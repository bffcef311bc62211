//! Data access layer (Repository pattern)

pub mod membership;
pub mod session;

pub use membership::MembershipRepository;
pub use session::SessionRepository;
