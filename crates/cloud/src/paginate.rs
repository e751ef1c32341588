//! Token-driven pagination

use crate::{ObjectStore, StackSource};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use stackgc_errors::Error;
use stackgc_types::{ListingKind, StackStatus, StackSummary, StoredObject};
use std::future::Future;

/// One response of a paginated call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T, Tok> {
    pub items: Vec<T>,
    /// Continuation token; `None` on the last page
    pub next: Option<Tok>,
}

impl<T, Tok> Page<T, Tok> {
    #[must_use]
    pub fn new(items: Vec<T>, next: Option<Tok>) -> Self {
        Self { items, next }
    }

    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

enum Cursor<Tok> {
    Start,
    Next(Tok),
    Done,
}

/// Flatten a paginated call into a lazy stream of items.
///
/// `fetch` is called with `None` first and then with each returned token
/// until a page comes back without one. Pages are requested only as the
/// consumer pulls, one at a time.
pub fn paginate<'a, T, Tok, F, Fut>(fetch: F) -> BoxStream<'a, Result<T, Error>>
where
    T: Send + 'a,
    Tok: Send + 'a,
    F: FnMut(Option<Tok>) -> Fut + Send + 'a,
    Fut: Future<Output = Result<Page<T, Tok>, Error>> + Send + 'a,
{
    stream::try_unfold((fetch, Cursor::Start), |(mut fetch, cursor)| async move {
        let token = match cursor {
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
            Cursor::Done => return Ok::<_, Error>(None),
        };
        let page = fetch(token).await?;
        let cursor = page.next.map_or(Cursor::Done, Cursor::Next);
        let items = stream::iter(page.items.into_iter().map(Ok::<T, Error>));
        Ok(Some((items, (fetch, cursor))))
    })
    .try_flatten()
    .boxed()
}

/// Every stack whose status is in `statuses`
pub fn list_stacks<'a>(
    source: &'a dyn StackSource,
    statuses: &'a [StackStatus],
) -> BoxStream<'a, Result<StackSummary, Error>> {
    paginate(move |token| source.list_stacks(statuses, token))
}

/// Every entry of `bucket` in the requested listing
pub fn list_bucket<'a>(
    store: &'a dyn ObjectStore,
    bucket: &'a str,
    kind: ListingKind,
) -> BoxStream<'a, Result<StoredObject, Error>> {
    match kind {
        ListingKind::Current => paginate(move |token| store.list_objects(bucket, token)),
        ListingKind::AllVersions => {
            paginate(move |marker| store.list_object_versions(bucket, marker))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackgc_errors::CloudError;

    #[tokio::test]
    async fn follows_tokens_until_exhausted() {
        let pages = vec![vec![1, 2], vec![3], vec![], vec![4, 5]];
        let mut calls = Vec::new();
        let items: Vec<i32> = paginate(|token: Option<usize>| {
            let index = token.unwrap_or(0);
            calls.push(index);
            let page = pages[index].clone();
            let next = (index + 1 < pages.len()).then_some(index + 1);
            async move { Ok(Page::new(page, next)) }
        })
        .try_collect()
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(calls, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn stops_at_first_error() {
        let result: Result<Vec<i32>, Error> = paginate(|token: Option<u8>| async move {
            match token {
                None => Ok(Page::new(vec![1], Some(1))),
                Some(_) => Err(CloudError::ListStacksFailed {
                    message: "throttled".to_string(),
                }
                .into()),
            }
        })
        .try_collect()
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn is_lazy() {
        let mut stream = paginate(|token: Option<u8>| async move {
            match token {
                None => Ok(Page::new(vec!["a"], Some(1))),
                Some(_) => Err(CloudError::ListStacksFailed {
                    message: "second page must not be fetched".to_string(),
                }
                .into()),
            }
        });
        assert_eq!(stream.try_next().await.unwrap(), Some("a"));
    }
}
