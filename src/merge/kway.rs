//! Streaming k-way merge

use super::types::RecordSource;
use crate::error::{Error, Result};
use futures::Stream;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use tracing::{debug, warn};

/// Boxed stream produced by [`KWayMerge::into_stream`]
pub type MergedStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

struct Slot<S: RecordSource> {
    head: Option<S::Item>,
    source: S,
}

/// Merges sources that are each sorted greatest-first into one sequence
/// sorted greatest-first under `compare`.
///
/// Holds at most one record per live source. After a record is yielded, only
/// its own source is pulled again, and only when the next record is asked
/// for. Ties go to the source that was listed first.
pub struct KWayMerge<S: RecordSource, F> {
    pending: Vec<S>,
    slots: Vec<Slot<S>>,
    finished: Vec<S>,
    deferred: VecDeque<Error>,
    compare: F,
    primed: bool,
}

impl<S, F> KWayMerge<S, F>
where
    S: RecordSource,
    F: Fn(&S::Item, &S::Item) -> Ordering + Send,
{
    /// Create a merge over `sources`; nothing is pulled until the first `next`
    pub fn new(sources: Vec<S>, compare: F) -> Self {
        Self {
            pending: sources,
            slots: Vec::new(),
            finished: Vec::new(),
            deferred: VecDeque::new(),
            compare,
            primed: false,
        }
    }

    /// Pull the next record in merged order.
    ///
    /// An error from one source is returned once; that source is dropped and
    /// the remaining sources carry on.
    pub async fn next(&mut self) -> Result<Option<S::Item>> {
        if !self.primed {
            self.prime().await;
        }
        self.refill().await?;

        if let Some(e) = self.deferred.pop_front() {
            return Err(e);
        }

        let Some(index) = self.select() else {
            return Ok(None);
        };
        Ok(self.slots[index].head.take())
    }

    /// Pull the first record of every source concurrently
    async fn prime(&mut self) {
        self.primed = true;
        let sources = std::mem::take(&mut self.pending);
        let pulls = sources.into_iter().map(|mut source| async move {
            let first = source.next_record().await;
            (source, first)
        });

        for (source, first) in futures::future::join_all(pulls).await {
            match first {
                Ok(Some(head)) => self.slots.push(Slot {
                    head: Some(head),
                    source,
                }),
                Ok(None) => self.finished.push(source),
                Err(e) => {
                    warn!("Dropping source that failed on its first record: {e}");
                    self.deferred.push_back(e);
                    self.finished.push(source);
                }
            }
        }
        debug!(
            "Primed merge: {} live, {} finished",
            self.slots.len(),
            self.finished.len()
        );
    }

    /// Replace the head yielded last time from its own source
    async fn refill(&mut self) -> Result<()> {
        let Some(index) = self.slots.iter().position(|slot| slot.head.is_none()) else {
            return Ok(());
        };

        match self.slots[index].source.next_record().await {
            Ok(Some(head)) => {
                self.slots[index].head = Some(head);
                Ok(())
            }
            Ok(None) => {
                let slot = self.slots.remove(index);
                self.finished.push(slot.source);
                Ok(())
            }
            Err(e) => {
                warn!("Dropping source after error: {e}");
                let slot = self.slots.remove(index);
                self.finished.push(slot.source);
                Err(e)
            }
        }
    }

    /// Index of the greatest head; the earliest slot wins ties
    fn select(&self) -> Option<usize> {
        let mut best: Option<(usize, &S::Item)> = None;
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(head) = slot.head.as_ref() else {
                continue;
            };
            match best {
                Some((_, current)) if (self.compare)(head, current) != Ordering::Greater => {}
                _ => best = Some((index, head)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Sources that may still yield records
    pub fn live_count(&self) -> usize {
        self.pending.len() + self.slots.len()
    }

    /// Check if the first record of every source has been pulled
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Sources that have ended, in the order they ended
    pub fn finished_sources(&self) -> &[S] {
        &self.finished
    }

    /// Drain the merge into a vector, stopping at the first error
    pub async fn collect_all(mut self) -> Result<Vec<S::Item>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Convert into a `futures::Stream`.
    ///
    /// Unlike the single-query stream, errors do not end it: the failing
    /// source is dropped and the rest keep merging.
    pub fn into_stream(self) -> MergedStream<S::Item>
    where
        S: 'static,
        S::Item: 'static,
        F: 'static,
    {
        Box::pin(futures::stream::unfold(self, |mut merge| async move {
            match merge.next().await {
                Ok(Some(item)) => Some((Ok(item), merge)),
                Ok(None) => None,
                Err(e) => Some((Err(e), merge)),
            }
        }))
    }
}

impl<S: RecordSource, F> fmt::Debug for KWayMerge<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KWayMerge")
            .field("pending", &self.pending.len())
            .field("live", &self.slots.len())
            .field("finished", &self.finished.len())
            .field("primed", &self.primed)
            .finish_non_exhaustive()
    }
}
