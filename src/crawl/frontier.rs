// src/crawl/frontier.rs
// =============================================================================
// The frontier is the shared state of a crawl:
// - a FIFO queue of pending tasks
// - the set of URLs ever enqueued (the "visited" set)
// - the number of tasks that workers are currently processing (in flight)
// - a "done" flag, set once the crawl is quiescent
//
// All four live behind ONE mutex. Deciding "no work is left" needs the queue
// and the in-flight counter read in the same critical section; splitting
// them over separate locks lets a worker exit while a sibling is still about
// to enqueue children.
//
// Quiescence: the queue is empty AND nothing is in flight. Only a task in
// flight can produce new tasks, so once this holds it holds forever.
//
// Waiting: workers park on a tokio Notify. A waiter registers for the
// notification before looking at the state, so a wake that happens between
// "queue is empty" and "go to sleep" is not lost.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use url::Url;

/// One unit of crawl work: fetch `url`, found `depth` links away from the seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub url: String,
    pub depth: usize,
}

/// What happened to a URL handed to `Frontier::enqueue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enqueued {
    /// New URL; it is now marked visited and waiting in the queue
    Queued,
    /// The URL was enqueued before (possibly by another worker)
    AlreadySeen,
    /// Not an absolute http(s) URL
    Rejected,
    /// The crawl already finished; nothing is accepted any more
    Closed,
}

#[derive(Debug, Default)]
struct State {
    queue: VecDeque<Task>,
    visited: HashSet<String>,
    in_flight: usize,
    done: bool,
}

impl State {
    fn is_quiescent(&self) -> bool {
        self.queue.is_empty() && self.in_flight == 0
    }
}

#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<State>,
    wake: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL to the crawl unless it was seen before.
    ///
    /// The visited check and the visited mark happen under one lock, so of
    /// several workers racing to enqueue the same URL exactly one wins.
    pub fn enqueue(&self, url: &str, depth: usize) -> Enqueued {
        let outcome = self.enqueue_locked(&mut self.lock(), url, depth);
        if outcome == Enqueued::Queued {
            self.wake.notify_waiters();
        }
        outcome
    }

    /// Enqueues a batch of URLs at the same depth under a single lock.
    ///
    /// Returns how many of them were new.
    pub fn enqueue_all<I, S>(&self, urls: I, depth: usize) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut queued = 0;
        {
            let mut state = self.lock();
            for url in urls {
                if self.enqueue_locked(&mut state, url.as_ref(), depth) == Enqueued::Queued {
                    queued += 1;
                }
            }
        }
        if queued > 0 {
            self.wake.notify_waiters();
        }
        queued
    }

    fn enqueue_locked(&self, state: &mut State, url: &str, depth: usize) -> Enqueued {
        if state.done {
            return Enqueued::Closed;
        }
        let Some(url) = canonicalize(url) else {
            return Enqueued::Rejected;
        };
        if !state.visited.insert(url.clone()) {
            return Enqueued::AlreadySeen;
        }
        state.queue.push_back(Task { url, depth });
        Enqueued::Queued
    }

    /// Waits for the next task.
    ///
    /// Returns `None` once the crawl is quiescent. A returned task counts as
    /// in flight until the guard is dropped.
    pub async fn dequeue(&self) -> Option<InFlight<'_>> {
        loop {
            let notified = self.wake.notified();
            tokio::pin!(notified);
            // Register before inspecting state so a concurrent wake is not missed
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(task) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(InFlight {
                        frontier: self,
                        task,
                    });
                }
                if state.done {
                    return None;
                }
                if state.is_quiescent() {
                    // Nothing queued and nobody working: e.g. the seed was rejected
                    state.done = true;
                    drop(state);
                    self.wake.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    // Called exactly once per dequeued task, after its children were enqueued
    fn complete(&self) {
        let finished = {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            if !state.done && state.is_quiescent() {
                state.done = true;
                true
            } else {
                false
            }
        };
        if finished {
            self.wake.notify_waiters();
        }
    }

    /// True once the crawl reached quiescence.
    pub fn is_done(&self) -> bool {
        self.lock().done
    }

    /// Number of tasks waiting in the queue.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of tasks currently being processed.
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Whether a URL was ever enqueued.
    pub fn is_visited(&self, url: &str) -> bool {
        match canonicalize(url) {
            Some(url) => self.lock().visited.contains(&url),
            None => false,
        }
    }

    // A poisoned lock only means some worker panicked mid-update of plain
    // collections; the data is still consistent enough to finish the crawl
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A task that has been dequeued and is being worked on.
///
/// Dropping it marks the task complete and runs the quiescence check, on
/// every exit path including early returns and panics.
#[derive(Debug)]
pub struct InFlight<'a> {
    frontier: &'a Frontier,
    task: Task,
}

impl InFlight<'_> {
    pub fn task(&self) -> &Task {
        &self.task
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.frontier.complete();
    }
}

/// Canonical form used for deduplication: parsed, fragment removed,
/// http(s) only.
///
/// Examples:
///   "https://Example.com/a#top" -> Some("https://example.com/a")
///   "mailto:me@example.com"     -> None
pub fn canonicalize(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }
    parsed.set_fragment(None);
    Some(parsed.into())
}
