//! Drain a paged listing into one ordered collection.

use std::future::Future;

use fleetmetric_remote::{FleetMetricClient, Page, RemoteError, RemoteTag};
use futures::{stream, TryStreamExt};
use tracing::debug;

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Fold every page produced by `fetch` into a single vector, in response order.
///
/// The first call receives `None`; each later call receives the previous
/// page's continuation token. An absent or empty token ends the listing.
/// Errors from `fetch` are returned as-is and stop the listing.
pub async fn collect_pages<T, F, Fut>(fetch: F) -> Result<Vec<T>, RemoteError>
where
    T: Send,
    F: FnMut(Option<String>) -> Fut + Send,
    Fut: Future<Output = Result<Page<T>, RemoteError>> + Send,
{
    let pages = stream::try_unfold((fetch, Cursor::Start), |(mut fetch, cursor)| async move {
        let token = match cursor {
            Cursor::Done => return Ok::<_, RemoteError>(None),
            Cursor::Start => None,
            Cursor::Next(t) => Some(t),
        };
        let page = fetch(token).await?;
        let next = match page.continuation() {
            Some(t) => Cursor::Next(t.to_string()),
            None => Cursor::Done,
        };
        Ok(Some((page.items, (fetch, next))))
    });
    pages
        .try_fold(Vec::new(), |mut acc, items| async move {
            acc.extend(items);
            Ok(acc)
        })
        .await
}

/// Every tag attached to `resource_arn`.
pub async fn list_all_tags(client: &dyn FleetMetricClient, resource_arn: &str) -> Result<Vec<RemoteTag>, RemoteError> {
    let tags = collect_pages(move |token: Option<String>| async move {
        client.list_tags_for_resource(resource_arn, token.as_deref()).await
    })
    .await?;
    debug!(arn = %resource_arn, count = tags.len(), "listed tags");
    Ok(tags)
}
