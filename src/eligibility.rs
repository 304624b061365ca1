//! Eligibility filtering of scope rows.

use crate::models::ScopeRow;

/// Identifiers of rows eligible for both bounty and submission, in input order.
pub fn eligible_identifiers<'a, I>(rows: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a ScopeRow>,
{
    rows.into_iter()
        .filter(|row| row.is_eligible())
        .map(|row| row.identifier.clone())
        .collect()
}

/// Identifiers of eligible `URL` assets: the active view of a fresh snapshot.
pub fn active_url_identifiers<'a, I>(rows: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a ScopeRow>,
{
    rows.into_iter()
        .filter(|row| row.is_url() && row.is_eligible())
        .map(|row| row.identifier.clone())
        .collect()
}
