//! Lazy value sources.
//!
//! Entity data may be supplied directly, promised by a future, or
//! produced on demand by a function receiving the effective options.
//! [`One`] and [`Many`] normalize those shapes into a uniform async
//! value / async stream, resolved once at unwrap time.

use crate::error::CoreResult;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use std::future::Future;

type OneFn<T, O> = Box<dyn FnOnce(O) -> BoxFuture<'static, CoreResult<Option<T>>> + Send>;
type ManyFn<T, O> = Box<dyn FnOnce(O) -> BoxStream<'static, CoreResult<T>> + Send>;

/// A single value, supplied directly or produced on demand.
///
/// Resolves to `None` when a deferred lookup matches nothing.
pub enum One<T, O = ()> {
    /// An immediately available value.
    Ready(T),
    /// A producer invoked with the effective options at unwrap time.
    Deferred(OneFn<T, O>),
}

impl<T, O> One<T, O>
where
    T: Send + 'static,
    O: Send + 'static,
{
    /// Wraps an immediately available value.
    pub fn ready(value: T) -> Self {
        Self::Ready(value)
    }

    /// Wraps a future of a value.
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self::Deferred(Box::new(move |_| future.map(|value| Ok(Some(value))).boxed()))
    }

    /// Wraps a producer invoked with the effective options.
    ///
    /// The producer may fail, and may report that nothing matched by
    /// resolving to `Ok(None)`.
    pub fn produce<F, Fut>(producer: F) -> Self
    where
        F: FnOnce(O) -> Fut + Send + 'static,
        Fut: Future<Output = CoreResult<Option<T>>> + Send + 'static,
    {
        Self::Deferred(Box::new(move |options| producer(options).boxed()))
    }

    /// Resolves the source with the effective options.
    pub async fn resolve(self, options: O) -> CoreResult<Option<T>> {
        match self {
            One::Ready(value) => Ok(Some(value)),
            One::Deferred(producer) => producer(options).await,
        }
    }
}

impl<T, O> From<T> for One<T, O> {
    fn from(value: T) -> Self {
        Self::Ready(value)
    }
}

impl<T, O> std::fmt::Debug for One<T, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            One::Ready(_) => f.write_str("One::Ready"),
            One::Deferred(_) => f.write_str("One::Deferred"),
        }
    }
}

/// A sequence of values: an iterator, a stream, or a producer of a
/// stream.
pub enum Many<T, O = ()> {
    /// An in-memory sequence.
    Iter(Box<dyn Iterator<Item = T> + Send>),
    /// An asynchronous sequence, possibly infinite.
    Stream(BoxStream<'static, CoreResult<T>>),
    /// A producer invoked with the effective options at unwrap time.
    Deferred(ManyFn<T, O>),
}

impl<T, O> Many<T, O>
where
    T: Send + 'static,
    O: Send + 'static,
{
    /// Wraps an in-memory sequence.
    pub fn items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::Iter(Box::new(items.into_iter()))
    }

    /// Wraps an infallible stream.
    pub fn stream<S>(stream: S) -> Self
    where
        S: futures::Stream<Item = T> + Send + 'static,
    {
        Self::Stream(stream.map(Ok).boxed())
    }

    /// Wraps a stream whose items may fail.
    pub fn try_stream<S>(stream: S) -> Self
    where
        S: futures::Stream<Item = CoreResult<T>> + Send + 'static,
    {
        Self::Stream(stream.boxed())
    }

    /// Wraps a producer invoked with the effective options.
    pub fn produce<F, S>(producer: F) -> Self
    where
        F: FnOnce(O) -> S + Send + 'static,
        S: futures::Stream<Item = CoreResult<T>> + Send + 'static,
    {
        Self::Deferred(Box::new(move |options| producer(options).boxed()))
    }

    /// Resolves the source into a stream with the effective options.
    pub fn resolve(self, options: O) -> BoxStream<'static, CoreResult<T>> {
        match self {
            Many::Iter(iter) => futures::stream::iter(iter).map(Ok).boxed(),
            Many::Stream(stream) => stream,
            Many::Deferred(producer) => producer(options),
        }
    }
}

impl<T, O> From<Vec<T>> for Many<T, O>
where
    T: Send + 'static,
    O: Send + 'static,
{
    fn from(items: Vec<T>) -> Self {
        Self::items(items)
    }
}

impl<T, O> std::fmt::Debug for Many<T, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Many::Iter(_) => f.write_str("Many::Iter"),
            Many::Stream(_) => f.write_str("Many::Stream"),
            Many::Deferred(_) => f.write_str("Many::Deferred"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::TryStreamExt;

    #[test]
    fn ready_value_resolves_to_itself() {
        let one: One<i32> = One::ready(42);
        assert_eq!(block_on(one.resolve(())).unwrap(), Some(42));
    }

    #[test]
    fn future_resolves_when_awaited() {
        let one: One<i32> = One::future(async { 42 });
        assert_eq!(block_on(one.resolve(())).unwrap(), Some(42));
    }

    #[test]
    fn producer_receives_the_options() {
        let one: One<i32, i32> = One::produce(|options| async move { Ok(Some(options * 2)) });
        assert_eq!(block_on(one.resolve(21)).unwrap(), Some(42));
    }

    #[test]
    fn producer_may_match_nothing() {
        let one: One<i32> = One::produce(|()| async { Ok(None) });
        assert_eq!(block_on(one.resolve(())).unwrap(), None);
    }

    #[test]
    fn items_preserve_order() {
        let many: Many<i32> = Many::items(vec![1, 2, 3]);
        let collected: Vec<i32> = block_on(many.resolve(()).try_collect()).unwrap();
        assert_eq!(collected, vec![1, 2, 3]);
    }

    #[test]
    fn stream_passes_through() {
        let many: Many<i32> = Many::stream(futures::stream::iter(vec![4, 5]));
        let collected: Vec<i32> = block_on(many.resolve(()).try_collect()).unwrap();
        assert_eq!(collected, vec![4, 5]);
    }

    #[test]
    fn deferred_stream_receives_the_options() {
        let many: Many<i32, i32> = Many::produce(|options| {
            futures::stream::iter((0..options).map(Ok))
        });
        let collected: Vec<i32> = block_on(many.resolve(3).try_collect()).unwrap();
        assert_eq!(collected, vec![0, 1, 2]);
    }
}
