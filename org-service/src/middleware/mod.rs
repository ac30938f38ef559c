pub mod auth;
pub mod realm;

pub use auth::{auth_middleware, optional_auth_middleware, AuthPrincipal, MaybePrincipal};
pub use realm::{realm_scope_middleware, RealmContext};
