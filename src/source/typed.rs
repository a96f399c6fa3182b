//! Typed views over raw JSON content.

use std::marker::PhantomData;
use std::sync::Arc;

use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::LoadError;
use crate::source::{Loadable, StateStream};
use crate::state::LoadableState;

/// A strongly typed view over a source of raw [`serde_json::Value`] content.
///
/// Data layers that deal in dynamic JSON can be presented to consumers as
/// `Loadable`s of concrete types. When raw content is present but cannot be
/// deserialized to `T`, the derived state reports
/// [`LoadError::WrongContentType`], unless the upstream already carried an
/// error of its own, which takes precedence.
///
/// Several differently-typed views may share one upstream without
/// re-fetching; reload operations delegate to the upstream.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use serde::Deserialize;
/// use serde_json::json;
/// use statuswatch::{JsonSource, Loadable, SourceCell};
///
/// #[derive(Clone, Debug, Deserialize, PartialEq)]
/// struct User {
///     login: String,
/// }
///
/// let raw = Arc::new(SourceCell::with_content(json!({ "login": "octocat" })));
/// let users: JsonSource<_, User> = JsonSource::new(Arc::clone(&raw));
/// assert_eq!(users.state().content.unwrap().login, "octocat");
/// ```
pub struct JsonSource<S, T>
where
    S: Loadable<Content = Value>,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    upstream: Arc<S>,
    _content: PhantomData<fn() -> T>,
}

impl<S, T> JsonSource<S, T>
where
    S: Loadable<Content = Value>,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Present `upstream`'s JSON content as values of type `T`.
    pub fn new(upstream: Arc<S>) -> Self {
        JsonSource {
            upstream,
            _content: PhantomData,
        }
    }

    fn decode(upstream: LoadableState<Value>) -> LoadableState<T> {
        let LoadableState {
            is_loading,
            content,
            latest_error,
        } = upstream;

        let raw_present = content.is_some();
        let typed = content.and_then(|value| serde_json::from_value(value).ok());
        let latest_error = match latest_error {
            Some(error) => Some(error),
            None if raw_present && typed.is_none() => Some(LoadError::WrongContentType),
            None => None,
        };

        LoadableState {
            is_loading,
            content: typed,
            latest_error,
        }
    }
}

impl<S, T> Loadable for JsonSource<S, T>
where
    S: Loadable<Content = Value>,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Content = T;

    fn state(&self) -> LoadableState<T> {
        Self::decode(self.upstream.state())
    }

    fn state_stream(&self) -> StateStream<T> {
        StateStream::from_stream(self.upstream.state_stream().map(Self::decode))
    }

    fn load_if_needed(&self) {
        self.upstream.load_if_needed();
    }

    fn load(&self) {
        self.upstream.load();
    }

    fn is_reloadable(&self) -> bool {
        self.upstream.is_reloadable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceCell;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Clone, Debug, Deserialize, PartialEq)]
    struct Post {
        id: u64,
        title: String,
    }

    #[test]
    fn decodes_matching_content() {
        let raw = Arc::new(SourceCell::with_content(
            json!({ "id": 1, "title": "hello" }),
        ));
        let posts: JsonSource<_, Post> = JsonSource::new(raw);

        let state = posts.state();
        assert_eq!(
            state.content,
            Some(Post {
                id: 1,
                title: "hello".into()
            })
        );
        assert!(state.latest_error.is_none());
    }

    #[test]
    fn mismatched_content_reports_wrong_content_type() {
        let raw = Arc::new(SourceCell::with_content(json!("not a post")));
        let posts: JsonSource<_, Post> = JsonSource::new(raw);

        let state = posts.state();
        assert!(state.content.is_none());
        assert_eq!(state.latest_error, Some(LoadError::WrongContentType));
    }

    #[test]
    fn upstream_error_takes_precedence_over_decode_failure() {
        let raw = Arc::new(SourceCell::with_content(json!("not a post")));
        raw.fail(LoadError::source("HTTP 500"));
        let posts: JsonSource<_, Post> = JsonSource::new(raw);

        let state = posts.state();
        assert_eq!(state.latest_error, Some(LoadError::source("HTTP 500")));
    }

    #[test]
    fn absent_content_is_not_a_type_error() {
        let raw = Arc::new(SourceCell::<Value>::new());
        raw.begin_load();
        let posts: JsonSource<_, Post> = JsonSource::new(raw);

        let state = posts.state();
        assert!(state.is_loading);
        assert!(state.content.is_none());
        assert!(state.latest_error.is_none());
    }

    #[test]
    fn two_views_share_one_upstream() {
        let raw = Arc::new(SourceCell::with_content(json!({ "id": 7, "title": "t" })));
        let posts: JsonSource<_, Post> = JsonSource::new(Arc::clone(&raw));
        let dynamic: JsonSource<_, Value> = JsonSource::new(Arc::clone(&raw));

        assert!(posts.state().content.is_some());
        assert!(dynamic.state().content.is_some());
    }
}
