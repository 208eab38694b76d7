//! Regional service URLs

use crate::error::{Error, Result};

/// `(region, base URL)` pairs with a published regional endpoint
static REGIONAL_URLS: &[(&str, &str)] = &[];

/// Base URL of the service in `region`
///
/// # Errors
///
/// [`Error::UnknownRegion`] when the region has no published endpoint.
pub fn service_url_for_region(region: &str) -> Result<&'static str> {
    REGIONAL_URLS
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, url)| *url)
        .ok_or_else(|| Error::UnknownRegion(region.to_string()))
}
