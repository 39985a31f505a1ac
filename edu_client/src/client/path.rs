//! Resource paths relative to the API base URL.

use reqwest::Url;
use std::fmt;

use super::error::{ClientError, ClientResult};

/// A resource path as a list of raw (unencoded) segments.
///
/// Segments are percent-encoded only when the path is joined onto the base
/// URL, so identifiers containing `/`, `?` or spaces stay a single segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    /// Fill a route template such as `/subjects/{id}/materials`.
    ///
    /// Placeholders are replaced positionally by `params`.
    pub fn expand(template: &str, params: &[&str]) -> Self {
        let mut params = params.iter();
        let segments = template
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                if is_placeholder(segment) {
                    match params.next() {
                        Some(value) => value.to_string(),
                        None => {
                            debug_assert!(false, "missing parameter for {} in {}", segment, template);
                            segment.to_string()
                        }
                    }
                } else {
                    segment.to_string()
                }
            })
            .collect();
        debug_assert!(params.next().is_none(), "too many parameters for {}", template);
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Append this path to `base`, keeping whatever path `base` already has.
    pub fn to_url(&self, base: &Url) -> ClientResult<Url> {
        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(format!("{} cannot be a base", base)))?;
            segments.pop_if_empty();
            segments.extend(&self.segments);
        }
        Ok(url)
    }
}

fn is_placeholder(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl From<&str> for ApiPath {
    fn from(path: &str) -> Self {
        Self::expand(path, &[])
    }
}

impl From<String> for ApiPath {
    fn from(path: String) -> Self {
        Self::from(path.as_str())
    }
}

impl From<&ApiPath> for ApiPath {
    fn from(path: &ApiPath) -> Self {
        path.clone()
    }
}
