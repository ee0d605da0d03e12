//! Path templates such as `/api/products/{id}` and URL resolution

use super::param::{Param, ParamKind};
use super::{RestError, RestResult};
use std::fmt;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PathToken {
    Literal(String),
    Variable(String),
}

/// One `/`-separated element of a template, e.g. `{id}` or `v{version}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PathSegment {
    tokens: Vec<PathToken>,
}

impl PathSegment {
    fn parse(text: &str, template: &str) -> RestResult<Self> {
        let mut tokens = Vec::new();
        let mut rest = text;
        while !rest.is_empty() {
            match rest.find('{') {
                Some(0) => {
                    let end = rest
                        .find('}')
                        .ok_or_else(|| RestError::InvalidPath(template.to_string()))?;
                    let name = &rest[1..end];
                    if name.is_empty() || name.contains('{') {
                        return Err(RestError::InvalidPath(template.to_string()));
                    }
                    tokens.push(PathToken::Variable(name.to_string()));
                    rest = &rest[end + 1..];
                }
                Some(start) => {
                    tokens.push(PathToken::Literal(rest[..start].to_string()));
                    rest = &rest[start..];
                }
                None => {
                    if rest.contains('}') {
                        return Err(RestError::InvalidPath(template.to_string()));
                    }
                    tokens.push(PathToken::Literal(rest.to_string()));
                    rest = "";
                }
            }
        }
        Ok(Self { tokens })
    }

    fn resolve(&self, parameters: &[Param]) -> RestResult<String> {
        let mut resolved = String::new();
        for token in &self.tokens {
            match token {
                PathToken::Literal(text) => resolved.push_str(text),
                PathToken::Variable(name) => {
                    let param = parameters
                        .iter()
                        .find(|p| p.kind() == ParamKind::Path && p.name() == name)
                        .ok_or_else(|| RestError::MissingPathParameter(name.clone()))?;
                    resolved.push_str(&param.gene().raw_value());
                }
            }
        }
        Ok(resolved)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            match token {
                PathToken::Literal(text) => write!(f, "{}", text)?,
                PathToken::Variable(name) => write!(f, "{{{}}}", name)?,
            }
        }
        Ok(())
    }
}

/// Parsed path template of an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RestPath {
    segments: Vec<PathSegment>,
}

impl RestPath {
    /// Parse a template. Empty segments (duplicate or trailing `/`) are ignored.
    pub fn parse(template: &str) -> RestResult<Self> {
        let segments = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| PathSegment::parse(s, template))
            .collect::<RestResult<Vec<_>>>()?;
        Ok(Self { segments })
    }

    /// Names of all `{variables}` in order of appearance
    pub fn variables(&self) -> Vec<&str> {
        self.segments
            .iter()
            .flat_map(|s| s.tokens.iter())
            .filter_map(|t| match t {
                PathToken::Variable(name) => Some(name.as_str()),
                PathToken::Literal(_) => None,
            })
            .collect()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Text of the last segment, e.g. `products` for `/api/products`
    pub fn last_element(&self) -> String {
        self.segments
            .last()
            .map(|s| s.to_string())
            .unwrap_or_default()
    }

    /// Whether `other` starts with every segment of this path
    pub fn is_prefix_of(&self, other: &RestPath) -> bool {
        other.segments.len() >= self.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| a == b)
    }

    /// Whether the segment following this path inside `other` is a single
    /// variable, i.e. `other` addresses one element of this collection
    pub fn is_collection_of(&self, other: &RestPath) -> bool {
        self.is_prefix_of(other)
            && other
                .segments
                .get(self.segments.len())
                .map(|s| matches!(s.tokens.as_slice(), [PathToken::Variable(_)]))
                .unwrap_or(false)
    }

    /// Build the full URL for this path on top of `base`.
    ///
    /// Path parameters are percent-encoded as single segments and query
    /// parameters are appended form-encoded, so no parameter value can alter
    /// the structure of the URL.
    pub fn resolve_url(&self, base: &Url, parameters: &[Param]) -> RestResult<Url> {
        let segments = self
            .segments
            .iter()
            .map(|s| s.resolve(parameters))
            .collect::<RestResult<Vec<_>>>()?;

        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| RestError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend(segments.iter());

        let query: Vec<(String, String)> = parameters
            .iter()
            .filter(|p| p.kind() == ParamKind::Query)
            .map(|p| (p.name().to_string(), p.gene().raw_value()))
            .collect();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

impl fmt::Display for RestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// Resolve a chained `location` header into the URL an action should call.
///
/// The location is resolved against `base` (absolute locations win). When
/// the action's own URL `expected` has more path segments than the location,
/// the extra trailing segments are appended, so `POST /items` followed by
/// `PUT /items/{id}/tags` calls `<location>/tags`. An empty location falls
/// back to `expected`.
pub fn resolve_location(location: &str, base: &Url, expected: &Url) -> RestResult<Url> {
    let location = location.trim();
    if location.is_empty() {
        return Ok(expected.clone());
    }
    let mut target = base
        .join(location)
        .map_err(|e| RestError::InvalidUrl(format!("{}: {}", location, e)))?;

    let location_segments = non_empty_segments(&target);
    let expected_segments = non_empty_segments(expected);
    if expected_segments.len() > location_segments.len() {
        let suffix = expected_segments[location_segments.len()..].join("/");
        let path = format!("{}/{}", target.path().trim_end_matches('/'), suffix);
        target.set_path(&path);
    }
    if target.query().is_none() {
        target.set_query(expected.query());
    }
    Ok(target)
}

fn non_empty_segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::{Gene, IntegerGene, StringGene};

    fn base() -> Url {
        Url::parse("http://localhost:8080/").unwrap()
    }

    fn string_param(kind: fn(Gene) -> Param, name: &str, value: &str) -> Param {
        let mut gene: Gene = StringGene::new(name, 0, 100).into();
        gene.set_value_from_string(value).unwrap();
        kind(gene)
    }

    #[test]
    fn test_parse_and_display() {
        let path = RestPath::parse("/api/products/{id}/").unwrap();
        assert_eq!(path.to_string(), "/api/products/{id}");
        assert_eq!(path.variables(), vec!["id"]);
        assert_eq!(path.last_element(), "{id}");
        assert_eq!(RestPath::parse("/").unwrap().to_string(), "/");
    }

    #[test]
    fn test_parse_rejects_unbalanced_braces() {
        assert!(RestPath::parse("/api/{id").is_err());
        assert!(RestPath::parse("/api/id}").is_err());
        assert!(RestPath::parse("/api/{}").is_err());
    }

    #[test]
    fn test_mixed_segment() {
        let path = RestPath::parse("/files/{name}.json").unwrap();
        let params = vec![string_param(Param::path, "name", "report")];
        let url = path.resolve_url(&base(), &params).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/files/report.json");
    }

    #[test]
    fn test_resolve_encodes_path_and_query() {
        let path = RestPath::parse("/api/items/{id}").unwrap();
        let params = vec![
            string_param(Param::path, "id", "a/\"b\" c"),
            string_param(Param::query, "q", "x&y=z"),
        ];
        let url = path.resolve_url(&base(), &params).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/items/a%2F%22b%22%20c?q=x%26y%3Dz"
        );
    }

    #[test]
    fn test_resolve_keeps_base_path_prefix() {
        let base = Url::parse("http://localhost:8080/app/").unwrap();
        let path = RestPath::parse("/items").unwrap();
        let url = path.resolve_url(&base, &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/app/items");
    }

    #[test]
    fn test_missing_path_parameter() {
        let path = RestPath::parse("/api/items/{id}").unwrap();
        let err = path.resolve_url(&base(), &[]).unwrap_err();
        assert!(matches!(err, RestError::MissingPathParameter(name) if name == "id"));
    }

    #[test]
    fn test_collection_relationship() {
        let items = RestPath::parse("/api/items").unwrap();
        let item = RestPath::parse("/api/items/{id}").unwrap();
        let tags = RestPath::parse("/api/items/{id}/tags").unwrap();
        let other = RestPath::parse("/api/users/{id}").unwrap();
        assert!(items.is_collection_of(&item));
        assert!(items.is_collection_of(&tags));
        assert!(!items.is_collection_of(&other));
        assert!(!items.is_collection_of(&items));
    }

    #[test]
    fn test_resolve_location_relative() {
        let path = RestPath::parse("/api/items/{id}").unwrap();
        let expected = path
            .resolve_url(&base(), &[Param::path(IntegerGene::new("id", 0, 10).into())])
            .unwrap();
        let url = resolve_location("/api/items/42", &base(), &expected).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/items/42");
    }

    #[test]
    fn test_resolve_location_appends_extra_segments() {
        let path = RestPath::parse("/api/items/{id}/tags").unwrap();
        let expected = path
            .resolve_url(&base(), &[Param::path(IntegerGene::new("id", 0, 10).into())])
            .unwrap();
        let url = resolve_location("http://localhost:8080/api/items/42", &base(), &expected).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/items/42/tags");
    }

    #[test]
    fn test_resolve_empty_location_falls_back() {
        let expected = Url::parse("http://localhost:8080/api/items/0").unwrap();
        let url = resolve_location("", &base(), &expected).unwrap();
        assert_eq!(url, expected);
    }
}
