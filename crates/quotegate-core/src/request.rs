//! Request descriptors handed to the gateway.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;

/// What a client asked for: an upstream endpoint and its query parameters.
///
/// Parameters are held sorted by name, so the order in which a caller
/// inserted them never leaks into cache keys or upstream URLs.
///
/// # Examples
///
/// ```
/// use quotegate_core::RequestDescriptor;
///
/// let request = RequestDescriptor::new("cryptocurrency/quotes/latest")
///     .with_param("symbol", "BTC")
///     .with_param("convert", "INR");
///
/// assert_eq!(request.endpoint_path(), "/cryptocurrency/quotes/latest");
/// assert_eq!(request.canonical_query(), "convert=INR&symbol=BTC");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    endpoint_path: String,
    query: BTreeMap<String, String>,
}

impl RequestDescriptor {
    /// Creates a descriptor without query parameters.
    ///
    /// A missing leading `/` is added.
    pub fn new(endpoint_path: impl Into<String>) -> Self {
        let endpoint_path = endpoint_path.into();
        let endpoint_path = if endpoint_path.starts_with('/') {
            endpoint_path
        } else {
            format!("/{}", endpoint_path)
        };

        Self {
            endpoint_path,
            query: BTreeMap::new(),
        }
    }

    /// Creates a descriptor from a path and any iterator of parameters.
    ///
    /// When a name repeats, the last value wins.
    pub fn from_parts<I, K, V>(endpoint_path: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut request = Self::new(endpoint_path);
        for (name, value) in params {
            request.query.insert(name.into(), value.into());
        }
        request
    }

    /// Adds or replaces a query parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Upstream endpoint path, always starting with `/`.
    ///
    /// Percent-escapes are kept as the client sent them.
    pub fn endpoint_path(&self) -> &str {
        &self.endpoint_path
    }

    /// Path segments after the leading `/`, percent-decoded one by one.
    ///
    /// An escaped `/` stays inside its segment. Segments that do not decode to
    /// UTF-8 are returned raw.
    pub fn decoded_segments(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.endpoint_path[1..]
            .split('/')
            .map(|raw| urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw)))
    }

    /// True when any segment decodes to `.` or `..`.
    pub fn has_dot_segments(&self) -> bool {
        self.decoded_segments()
            .any(|segment| segment == "." || segment == "..")
    }

    /// Query parameters sorted by name.
    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Query parameters URL-encoded as `name=value` pairs joined by `&`,
    /// sorted by name.
    pub fn canonical_query(&self) -> String {
        self.query
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
