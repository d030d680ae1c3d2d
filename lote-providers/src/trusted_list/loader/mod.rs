//! Recursive loading of a trusted list and the lists it points to.
//!
//! The traversal is a depth-first walk over `pointers_to_other` with a
//! bounded depth, a bounded total list count, and cycle detection along
//! the current path. Pointers of one list are processed in chunks of
//! `sibling_parallelism`: pointers within a chunk are fetched
//! concurrently, chunks run one after another, and a failure in one
//! branch never cancels its siblings.
//!
//! Cycle detection is path-local rather than global: a URL reachable
//! through two sibling branches is fetched once per branch, so every
//! branch is exactly as fresh as its own fetch. Callers who want each
//! list only once deduplicate on the emitted events.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use thiserror::Error;

use super::fetcher::{DocumentFetcher, FetchError};
use super::model::TrustedEntityList;


#[derive(Clone, Copy, Debug)]
pub struct LoaderParams {
    /// Pointer-following depth; the root list is at depth 0.
    pub max_depth: u32,
    /// Upper bound on successfully loaded lists per traversal.
    pub max_lists: usize,
    /// How many sibling pointers are fetched concurrently.
    pub sibling_parallelism: usize,
}

impl Default for LoaderParams {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_lists: 10,
            sibling_parallelism: 4,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LoaderParamsError {
    #[error("maximum depth must be at least 1")]
    ZeroMaxDepth,
    #[error("maximum list count must be at least 1")]
    ZeroMaxLists,
    #[error("sibling parallelism must be at least 1")]
    ZeroParallelism,
}

/// One step of a traversal, in emission order.
#[derive(Clone, Debug)]
pub enum LoadEvent {
    /// The root list; the first event of a traversal whose root fetch
    /// succeeded, emitted at most once.
    Primary {
        list: Arc<TrustedEntityList>,
        url: String,
    },
    /// A list reached through `pointers_to_other`.
    Referenced {
        list: Arc<TrustedEntityList>,
        url: String,
        depth: u32,
    },
    Problem(LoadProblem),
}

/// A pruned branch. Problems are events, not errors: the rest of the
/// traversal continues around them.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadProblem {
    MaxDepthReached { url: String, max_depth: u32 },
    MaxListsReached { url: String, max_lists: usize },
    CircularReference { url: String },
    Fetch { url: String, cause: FetchError },
}

/// Everything one traversal produced, in event order.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub primary: Option<Arc<TrustedEntityList>>,
    pub referenced: Vec<ReferencedList>,
    pub problems: Vec<LoadProblem>,
}

#[derive(Clone, Debug)]
pub struct ReferencedList {
    pub list: Arc<TrustedEntityList>,
    pub url: String,
    pub depth: u32,
}

pub struct TrustedListLoader {
    fetcher: Arc<dyn DocumentFetcher>,
    params: LoaderParams,
}

struct Traversal {
    fetcher: Arc<dyn DocumentFetcher>,
    params: LoaderParams,
    loaded: AtomicUsize,
}

impl TrustedListLoader {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        params: LoaderParams,
    ) -> Result<Self, LoaderParamsError> {
        if params.max_depth == 0 {
            return Err(LoaderParamsError::ZeroMaxDepth);
        }
        if params.max_lists == 0 {
            return Err(LoaderParamsError::ZeroMaxLists);
        }
        if params.sibling_parallelism == 0 {
            return Err(LoaderParamsError::ZeroParallelism);
        }

        Ok(Self {
            fetcher,
            params,
        })
    }

    /// Starts a traversal at `url` and returns its lazy event stream.
    ///
    /// Dropping the stream cancels every in-flight fetch; events emitted
    /// up to that point remain valid.
    pub fn load(&self, url: &str) -> BoxStream<'static, LoadEvent> {
        let traversal = Arc::new(Traversal {
            fetcher: Arc::clone(&self.fetcher),
            params: self.params,
            loaded: AtomicUsize::new(0),
        });

        load_branch(traversal, url.to_string(), 0, HashSet::new())
    }

    /// Drains a traversal into a [`LoadOutcome`].
    pub async fn load_collected(&self, url: &str) -> LoadOutcome {
        let mut events = self.load(url);
        let mut outcome = LoadOutcome::default();

        while let Some(event) = events.next().await {
            match event {
                LoadEvent::Primary { list, .. } => outcome.primary = Some(list),
                LoadEvent::Referenced { list, url, depth } => {
                    outcome.referenced.push(ReferencedList { list, url, depth })
                }
                LoadEvent::Problem(problem) => outcome.problems.push(problem),
            }
        }

        outcome
    }
}

fn load_branch(
    traversal: Arc<Traversal>,
    url: String,
    depth: u32,
    visiting: HashSet<String>,
) -> BoxStream<'static, LoadEvent> {
    stream::once(async move { load_step(traversal, url, depth, visiting).await })
        .flatten()
        .boxed()
}

async fn load_step(
    traversal: Arc<Traversal>,
    url: String,
    depth: u32,
    mut visiting: HashSet<String>,
) -> BoxStream<'static, LoadEvent> {
    let params = traversal.params;

    if depth > params.max_depth {
        tracing::debug!(%url, depth, "trusted list traversal depth exhausted");
        return problem(LoadProblem::MaxDepthReached {
            url,
            max_depth: params.max_depth,
        });
    }
    if traversal.loaded.load(Ordering::SeqCst) >= params.max_lists {
        tracing::debug!(%url, "trusted list count bound reached");
        return problem(LoadProblem::MaxListsReached {
            url,
            max_lists: params.max_lists,
        });
    }
    if visiting.contains(&url) {
        tracing::debug!(%url, "circular trusted list reference");
        return problem(LoadProblem::CircularReference { url });
    }
    visiting.insert(url.clone());

    let list = match traversal.fetcher.fetch(&url).await {
        Ok(list) => Arc::new(list),
        Err(cause) => {
            tracing::warn!(%url, %cause, "trusted list fetch failed");
            return problem(LoadProblem::Fetch { url, cause });
        }
    };

    // siblings of one chunk may pass the pre-check together; the
    // reservation keeps the loaded count within bounds regardless
    let reserved = traversal
        .loaded
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
            (count < params.max_lists).then_some(count + 1)
        })
        .is_ok();
    if !reserved {
        return problem(LoadProblem::MaxListsReached {
            url,
            max_lists: params.max_lists,
        });
    }

    let event = if depth == 0 {
        LoadEvent::Primary {
            list: Arc::clone(&list),
            url: url.clone(),
        }
    } else {
        LoadEvent::Referenced {
            list: Arc::clone(&list),
            url: url.clone(),
            depth,
        }
    };

    let chunks: Vec<Vec<String>> = list
        .pointers_to_other
        .chunks(params.sibling_parallelism)
        .map(|chunk| chunk.iter().map(|pointer| pointer.location.clone()).collect())
        .collect();

    let children = stream::iter(chunks).flat_map(move |chunk| {
        let branches: Vec<_> = chunk
            .into_iter()
            .map(|pointer| {
                load_branch(
                    Arc::clone(&traversal),
                    pointer,
                    depth + 1,
                    visiting.clone(),
                )
            })
            .collect();

        stream::select_all(branches)
    });

    stream::once(async move { event }).chain(children).boxed()
}

fn problem(problem: LoadProblem) -> BoxStream<'static, LoadEvent> {
    stream::once(async move { LoadEvent::Problem(problem) }).boxed()
}
