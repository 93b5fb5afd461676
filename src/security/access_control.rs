//! Role-based authorization.

use crate::security::claims::ClaimSet;

/// Allow only when `claims` carries exactly `required_role`.
///
/// Fails closed: no claim set (the gate ran before verification) is a denial.
/// Comparison is case-sensitive with no wildcards.
pub fn authorize(claims: Option<&ClaimSet>, required_role: &str) -> bool {
    match claims {
        Some(claims) => claims.role == required_role,
        None => false,
    }
}
