//! Ownership-scoped query policy
//!
//! Every read and write path over task records goes through [`scope`]:
//! handlers build their base filter, the policy narrows it to what the
//! requesting identity may touch, and the stores apply it verbatim.

use super::TodoFilter;
use crate::auth::AuthUser;

/// Restrict `filter` to records the identity may access.
///
/// Admins see the base filter unchanged (server-wide view); everyone
/// else has the owner clause forced to their own id, regardless of what
/// the base filter carried.
pub fn scope(auth: &AuthUser, mut filter: TodoFilter) -> TodoFilter {
    if !auth.is_admin() {
        filter.owner = Some(auth.id.clone());
    }
    filter
}
