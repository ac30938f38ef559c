pub mod group;
pub mod invitation;
pub mod organization;
pub mod principal;
pub mod role;
pub mod user;

pub use group::Group;
pub use invitation::{InvitationOutcome, InvitationRequest};
pub use organization::Organization;
pub use principal::Principal;
pub use role::{RealmRole, Role};
pub use user::StoreUser;
