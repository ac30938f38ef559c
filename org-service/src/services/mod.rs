pub mod email;
pub mod invitation;
pub mod jwt;
pub mod organization;
pub mod policy;
pub mod store;

pub use email::{EmailNotifier, MockNotifier, Notifier};
pub use invitation::InvitationService;
pub use jwt::{AccessClaims, JwtVerifier};
pub use store::{IdentityStore, MockIdentityStore, RestIdentityStore};
