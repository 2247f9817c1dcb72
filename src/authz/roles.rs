//! Role predicates used by the role checking guards.
//!
//! Both functions accept an absent holder: a guard that needs a holder has
//! already logged its absence, here it simply fails the check.

use super::holder::PermissionHolder;

/// Returns `true` if the holder has at least one of `names`.
///
/// An empty `names` never matches.
pub fn has_any_role<S: AsRef<str>>(holder: Option<&dyn PermissionHolder>, names: &[S]) -> bool {
    match holder {
        Some(holder) => names.iter().any(|name| holder.has_role(name.as_ref())),
        None => false,
    }
}

/// Returns `true` if the holder has every one of `names`.
///
/// An empty `names` is satisfied by any present holder.
pub fn has_all_roles<S: AsRef<str>>(holder: Option<&dyn PermissionHolder>, names: &[S]) -> bool {
    match holder {
        Some(holder) => names.iter().all(|name| holder.has_role(name.as_ref())),
        None => false,
    }
}
