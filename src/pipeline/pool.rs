// src/pipeline/pool.rs

//! Bounded fan-out over independent work items.

use std::future::Future;

use futures::stream::{self, Stream, StreamExt};

/// Run `work` over `items` with at most `limit` futures in flight.
///
/// Results arrive in completion order. A limit of zero is treated as one.
pub fn bounded<I, F, Fut>(items: I, limit: usize, work: F) -> impl Stream<Item = Fut::Output>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future,
{
    stream::iter(items).map(work).buffer_unordered(limit.max(1))
}
