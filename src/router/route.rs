//! Routes and reverse path generation.
//!
//! A [`Route`] is the terminal record bound to one tree position and one HTTP
//! method. Its middleware list is the only part that changes after creation,
//! and only while the owning [`crate::RouterBuilder`] is still registering.
//!
//! [`Route::path`] turns captured values back into a concrete path. Feeding the
//! parameters of a successful dispatch into `path` on the same route yields
//! the dispatched path again; trailing optional captures that matched nothing
//! are simply omitted.

use http::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;

use super::pattern::{Pattern, Segment};
use crate::error::PathError;

/// Stable handle to a route inside one router.
///
/// Groups and the name registry hold these instead of the route itself, so a
/// middleware change made through any group is seen by every holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub(crate) usize);

/// A registered route.
#[derive(Debug, Clone)]
pub struct Route<H> {
    method: Method,
    pattern: Pattern,
    handler: H,
    name: Option<String>,
    middleware: Vec<String>,
}

impl<H> Route<H> {
    pub(crate) fn new(method: Method, pattern: Pattern, handler: H, name: Option<String>) -> Self {
        Self {
            method,
            pattern,
            handler,
            name,
            middleware: Vec::new(),
        }
    }

    /// HTTP method this route answers
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Registered pattern text, including every group prefix
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Classified pattern segments
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        self.pattern.segments()
    }

    /// Opaque handler reference supplied at registration
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Unique route name, if one was given
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Route middleware, outermost group first, route-specific names last.
    ///
    /// The router's global middleware is not included; see
    /// [`crate::Dispatch::middleware`] for the resolved order.
    #[must_use]
    pub fn middleware(&self) -> &[String] {
        &self.middleware
    }

    pub(crate) fn append_middleware<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(names.into_iter().map(Into::into));
    }

    pub(crate) fn prepend_middleware(&mut self, names: &[String]) {
        self.middleware.splice(0..0, names.iter().cloned());
    }

    /// Build a concrete path from `data`.
    ///
    /// `data` is positional when it is an array (or an object whose keys are
    /// all canonical decimal indices) and name-keyed otherwise. Each dynamic
    /// segment reads the next index; a wildcard consumes every index left.
    /// Optional segments whose value is absent, null or empty are omitted.
    ///
    /// ```
    /// use serde_json::json;
    /// use trellis::RouterBuilder;
    ///
    /// let mut builder = RouterBuilder::new();
    /// builder.get("calendar/:year/?month/?day", "calendar", Some("calendar")).unwrap();
    /// let router = builder.build();
    /// let route = router.route_named("calendar").unwrap();
    ///
    /// assert_eq!(route.path(&json!([2020, 12])).unwrap(), "calendar/2020/12");
    /// assert_eq!(route.path(&json!({"year": 2020})).unwrap(), "calendar/2020");
    /// ```
    pub fn path(&self, data: &Value) -> Result<String, PathError> {
        let data = PathData::new(data);
        let mut index = 0;
        let mut parts: Vec<Cow<'_, str>> = Vec::with_capacity(self.segments().len());

        for segment in self.segments() {
            match segment {
                Segment::Literal(text) => parts.push(Cow::Borrowed(text)),
                Segment::Named(name) => match scalar_text(name, data.lookup(name, &mut index))? {
                    Some(text) => parts.push(Cow::Owned(text)),
                    None => return Err(PathError::MissingParameterValue(name.clone())),
                },
                Segment::Optional(name) => {
                    let text = scalar_text(name, data.lookup(name, &mut index))?;
                    if let Some(text) = text.filter(|t| !t.is_empty()) {
                        parts.push(Cow::Owned(text));
                    }
                }
                Segment::Wildcard(name) => {
                    let joined = data.wildcard(name, &mut index)?;
                    if let Some(text) = joined.filter(|t| !t.is_empty()) {
                        parts.push(Cow::Owned(text));
                    }
                }
            }
        }

        Ok(parts.join("/"))
    }

    /// [`Route::path`] for any serializable value, including plain structs.
    pub fn path_with<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, PathError> {
        let value = serde_json::to_value(data)?;
        self.path(&value)
    }
}

/// Route data viewed either by position or by parameter name.
///
/// Positional data is keyed by index so that objects with sparse numeric keys
/// leave gaps instead of shifting later values forward.
enum PathData<'a> {
    Positional(BTreeMap<usize, &'a Value>),
    Named(&'a Map<String, Value>),
}

/// Canonical decimal index: `"0"`, `"12"`. Keys such as `"01"` or `"+1"`
/// are ordinary names.
fn positional_key(key: &str) -> Option<usize> {
    key.parse::<usize>()
        .ok()
        .filter(|index| index.to_string() == key)
}

impl<'a> PathData<'a> {
    fn new(data: &'a Value) -> Self {
        match data {
            Value::Null => PathData::Positional(BTreeMap::new()),
            Value::Array(items) => PathData::Positional(items.iter().enumerate().collect()),
            Value::Object(map) if map.keys().any(|k| positional_key(k).is_none()) => {
                PathData::Named(map)
            }
            Value::Object(map) => PathData::Positional(
                map.iter()
                    .filter_map(|(k, v)| positional_key(k).map(|i| (i, v)))
                    .collect(),
            ),
            scalar => PathData::Positional(BTreeMap::from([(0, scalar)])),
        }
    }

    /// Value for a single-segment parameter. The positional counter advances
    /// whether or not a value was found.
    fn lookup(&self, name: &str, index: &mut usize) -> Option<&'a Value> {
        match self {
            PathData::Named(map) => map.get(name),
            PathData::Positional(values) => {
                let value = values.get(&*index).copied();
                *index += 1;
                value
            }
        }
    }

    fn wildcard(&self, name: &str, index: &mut usize) -> Result<Option<String>, PathError> {
        match self {
            PathData::Named(map) => {
                if name.is_empty() {
                    return Err(PathError::MissingWildcardName);
                }
                match map.get(name) {
                    None | Some(Value::Null) => Ok(None),
                    Some(Value::Array(items)) => join_values(items.iter()).map(Some),
                    Some(_) => Err(PathError::InvalidWildcardValue),
                }
            }
            PathData::Positional(values) => {
                let rest = values.range(*index..).map(|(_, value)| *value);
                let joined = join_values(rest)?;
                *index = values.keys().next_back().map_or(*index, |last| (*last + 1).max(*index));
                Ok(Some(joined))
            }
        }
    }
}

fn scalar_text(name: &str, value: Option<&Value>) -> Result<Option<String>, PathError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(Value::Array(_) | Value::Object(_)) => {
            Err(PathError::InvalidParameterValue(name.to_string()))
        }
    }
}

fn join_values<'a, I>(values: I) -> Result<String, PathError>
where
    I: Iterator<Item = &'a Value>,
{
    let mut parts = Vec::new();
    collect_values(values, &mut parts)?;
    Ok(parts.join("/"))
}

fn collect_values<'a, I>(values: I, out: &mut Vec<String>) -> Result<(), PathError>
where
    I: Iterator<Item = &'a Value>,
{
    for value in values {
        match value {
            Value::Null => {}
            Value::Array(items) => collect_values(items.iter(), out)?,
            Value::Object(_) => return Err(PathError::InvalidWildcardValue),
            Value::String(s) => out.push(s.clone()),
            Value::Number(n) => out.push(n.to_string()),
            Value::Bool(b) => out.push(b.to_string()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn route(pattern: &str) -> Route<()> {
        Route::new(Method::GET, Pattern::parse(pattern).unwrap(), (), None)
    }

    #[test]
    fn literals_pass_through() {
        assert_eq!(route("").path(&json!([])).unwrap(), "");
        assert_eq!(route("pages/about").path(&Value::Null).unwrap(), "pages/about");
    }

    #[test]
    fn positional_values_fill_in_order() {
        let r = route("pages/:id/edit");
        assert_eq!(r.path(&json!([0])).unwrap(), "pages/0/edit");
        assert_eq!(r.path(&json!("foo")).unwrap(), "pages/foo/edit");
        assert!(matches!(
            r.path(&json!([])),
            Err(PathError::MissingParameterValue(name)) if name == "id"
        ));
    }

    #[test]
    fn name_keyed_values_ignore_order() {
        let r = route("users/:user/posts/:post");
        let path = r.path(&json!({"post": 7, "user": "ann"})).unwrap();
        assert_eq!(path, "users/ann/posts/7");
    }

    #[test]
    fn numeric_keys_are_positional() {
        let r = route("users/:user/posts/:post");
        assert_eq!(r.path(&json!({"1": 7, "0": "ann"})).unwrap(), "users/ann/posts/7");
    }

    #[test]
    fn sparse_numeric_keys_leave_gaps() {
        let r = route("x/:a/:b");
        assert!(matches!(
            r.path(&json!({"0": "a", "5": "b"})),
            Err(PathError::MissingParameterValue(name)) if name == "b"
        ));
        assert_eq!(r.path(&json!({"0": "a", "1": "b", "7": "c"})).unwrap(), "x/a/b");

        let r = route("x/:a/*");
        assert_eq!(r.path(&json!({"0": "a", "3": "c", "2": "b"})).unwrap(), "x/a/b/c");
    }

    #[test]
    fn non_canonical_numeric_keys_are_names() {
        let r = route("x/:a/:b");
        assert!(matches!(
            r.path(&json!({"+0": "a", "+1": "b"})),
            Err(PathError::MissingParameterValue(name)) if name == "a"
        ));
        assert!(matches!(
            r.path(&json!({"1": "b", "01": "zz", "0": "a"})),
            Err(PathError::MissingParameterValue(name)) if name == "a"
        ));
        assert_eq!(r.path(&json!({"a": 1, "b": 2, "01": "zz"})).unwrap(), "x/1/2");
    }

    #[test]
    fn empty_optional_values_are_omitted() {
        let r = route("calendar/:year/?month/?day");
        assert_eq!(r.path(&json!({"year": 2020, "month": ""})).unwrap(), "calendar/2020");
        assert_eq!(r.path(&json!([2020, "", 31])).unwrap(), "calendar/2020/31");
    }

    #[test]
    fn optional_segments_are_omitted_when_absent() {
        let r = route("calendar/:year/?month/?day");
        assert_eq!(r.path(&json!([2020])).unwrap(), "calendar/2020");
        assert_eq!(r.path(&json!([2020, 12, 31])).unwrap(), "calendar/2020/12/31");
        assert_eq!(r.path(&json!([2020, null, null])).unwrap(), "calendar/2020");
        assert_eq!(r.path(&json!({"year": 2020, "day": 31})).unwrap(), "calendar/2020/31");
    }

    #[test]
    fn positional_wildcard_takes_the_rest() {
        let r = route("any/*");
        assert_eq!(r.path(&json!([])).unwrap(), "any");
        assert_eq!(r.path(&json!(["foo"])).unwrap(), "any/foo");
        assert_eq!(r.path(&json!([3, 4, 5])).unwrap(), "any/3/4/5");
        assert_eq!(r.path(&json!([["a", "b"], "c"])).unwrap(), "any/a/b/c");

        let r = route("files/:bucket/*key");
        assert_eq!(r.path(&json!(["b", "x", "y.txt"])).unwrap(), "files/b/x/y.txt");
    }

    #[test]
    fn named_wildcard_needs_a_name_and_a_sequence() {
        let r = route("files/*key");
        assert_eq!(r.path(&json!({"key": ["x", "y"]})).unwrap(), "files/x/y");
        assert_eq!(r.path(&json!({"other": 1})).unwrap(), "files");
        assert!(matches!(
            r.path(&json!({"key": "x"})),
            Err(PathError::InvalidWildcardValue)
        ));
        assert!(matches!(
            route("files/*").path(&json!({"key": ["x"]})),
            Err(PathError::MissingWildcardName)
        ));
    }

    #[test]
    fn rejects_compound_values_for_single_segments() {
        assert!(matches!(
            route("pages/:id").path(&json!({"id": [1, 2]})),
            Err(PathError::InvalidParameterValue(name)) if name == "id"
        ));
    }

    #[test]
    fn structs_are_name_keyed() {
        #[derive(Serialize)]
        struct Post<'a> {
            user: &'a str,
            post: u32,
        }
        let r = route("users/:user/posts/:post");
        let path = r.path_with(&Post { user: "ann", post: 7 }).unwrap();
        assert_eq!(path, "users/ann/posts/7");
    }

    #[test]
    fn group_prefixes_go_in_front() {
        let mut r = route("pages");
        r.append_middleware(["own"]);
        r.prepend_middleware(&["inner".to_string()]);
        r.prepend_middleware(&["outer".to_string(), "outer2".to_string()]);
        assert_eq!(r.middleware(), ["outer", "outer2", "inner", "own"]);
    }
}
