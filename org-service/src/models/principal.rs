/// Authenticated caller identity for the current request.
///
/// Built once per request from verified token claims and carried in request
/// extensions; immutable and discarded at request end. Roles and organization
/// memberships are deliberately not held here — every policy check re-reads
/// them from the identity store.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: String,
    pub username: String,
}
