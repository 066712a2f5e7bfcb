//! Paged listing of a zone's record sets.

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tracing::debug;

use super::provider::{PageCursor, RecordSet, ZoneDirectory};
use crate::error::DirectoryError;

/// Stream every record set in the zone, fetching the next page only when
/// the previous one has been consumed.
///
/// Cursors are not stable across mutations of the zone, so callers that
/// intend to change records must drain the stream first.
pub fn record_sets<'a>(
    directory: &'a dyn ZoneDirectory,
    zone_id: &'a str,
) -> BoxStream<'a, Result<RecordSet, DirectoryError>> {
    // None once the last page has been fetched
    let start: Option<Option<PageCursor>> = Some(None);

    stream::try_unfold((start, 0usize), move |(state, page_count)| async move {
        let Some(cursor) = state else {
            debug!(total_pages = page_count, "Completed paginated record listing");
            return Ok::<_, DirectoryError>(None);
        };

        let page = directory.list_record_sets(zone_id, cursor.as_ref()).await?;
        let page_count = page_count + 1;
        debug!(
            page = page_count,
            items_in_page = page.records.len(),
            truncated = page.is_truncated(),
            "Fetched record set page"
        );

        let next = page.next.map(Some);
        Ok::<_, DirectoryError>(Some((page.records, (next, page_count))))
    })
    .map_ok(|records| stream::iter(records.into_iter().map(Ok::<_, DirectoryError>)))
    .try_flatten()
    .boxed()
}
