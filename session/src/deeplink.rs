//! Deep-link synchronization between the full-size viewer and the URL.
//!
//! The route scheme is `/job/:identifier`, where `:identifier` is the
//! resolved identity of the shown item (percent-encoded, since the url
//! fallback key space contains URLs). History is modeled explicitly so the
//! forward/reverse directions and close semantics are testable headlessly.

use gallery::{identify, GalleryAction, GalleryItem, GalleryStore};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const JOB_ROUTE_PREFIX: &str = "/job/";
pub const DEFAULT_FALLBACK_PATH: &str = "/create";

/// Escape set matching encodeURIComponent: everything but alphanumerics
/// and `-_.!~*'()`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn job_path(identity: &str) -> String {
    format!("{JOB_ROUTE_PREFIX}{}", utf8_percent_encode(identity, COMPONENT))
}

/// Decode the identifier segment of a job route, if the path is one.
pub fn parse_job_path(path: &str) -> Option<String> {
    let segment = path.strip_prefix(JOB_ROUTE_PREFIX)?;
    if segment.is_empty() {
        return None;
    }
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

/// Pure index resolution within the filtered view. Never cached: filters
/// can change between calls and a stale index would point at the wrong
/// item.
pub fn position_of(identity: &str, items: &[GalleryItem]) -> Option<usize> {
    items
        .iter()
        .position(|item| identify(item).as_deref() == Some(identity))
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub path: String,
    /// Where the viewer was opened from, so close is a true return rather
    /// than a hardcoded redirect.
    pub job_origin: Option<String>,
}

/// Linear navigation history with a cursor, mirroring browser pushState
/// semantics: pushing truncates any forward entries.
#[derive(Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    pub fn new(initial_path: impl Into<String>) -> Self {
        History {
            entries: vec![HistoryEntry { path: initial_path.into(), job_origin: None }],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    pub fn path(&self) -> &str {
        &self.current().path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, path: impl Into<String>, job_origin: Option<String>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry { path: path.into(), job_origin });
        self.cursor += 1;
    }

    pub fn replace(&mut self, path: impl Into<String>, job_origin: Option<String>) {
        self.entries[self.cursor] = HistoryEntry { path: path.into(), job_origin };
    }

    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }
}

/// Keeps "the item currently shown full-size" and the URL mutually
/// consistent, in both directions.
#[derive(Debug)]
pub struct ViewerRouter {
    history: History,
    fallback: String,
}

impl ViewerRouter {
    pub fn new(initial_path: impl Into<String>) -> Self {
        ViewerRouter {
            history: History::new(initial_path),
            fallback: DEFAULT_FALLBACK_PATH.to_string(),
        }
    }

    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback = path.into();
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn path(&self) -> &str {
        self.history.path()
    }

    /// Forward direction: show `item` full-size and navigate to its route.
    ///
    /// Re-opening the same resolved identity is a no-op navigation; items
    /// without any usable key are skipped defensively. Returns whether the
    /// viewer was opened.
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self, store, item)))]
    pub fn open_item(&mut self, store: &mut GalleryStore, item: &GalleryItem) -> bool {
        let Some(identity) = identify(item) else {
            tracing::warn!("refusing to open item without any usable key");
            return false;
        };
        let index = position_of(&identity, &store.filtered_items()).unwrap_or(0);
        store.dispatch(GalleryAction::SetViewer { item: Some(item.clone()), index });

        let target = job_path(&identity);
        if self.history.path() == target {
            return true;
        }
        // Stepping from one job route to another keeps the original origin.
        let origin = if self.history.path().starts_with(JOB_ROUTE_PREFIX) {
            self.history.current().job_origin.clone()
        } else {
            Some(self.history.path().to_string())
        };
        self.history.push(target, origin);
        true
    }

    /// Reverse direction: resolve the current path against the *full*
    /// collection (a direct link must work even when filters would hide
    /// the item). Returns false when the path is not a job route or the
    /// item is not hydrated yet; the viewer is left closed and hydration
    /// is expected to re-trigger resolution.
    pub fn resolve_current(&mut self, store: &mut GalleryStore) -> bool {
        let Some(key) = parse_job_path(self.history.path()) else {
            return false;
        };
        let Some(item) = store.find_by_any_key(&key).cloned() else {
            tracing::debug!(%key, "deep link does not resolve yet");
            return false;
        };
        let index = identify(&item)
            .and_then(|identity| position_of(&identity, &store.filtered_items()))
            .unwrap_or(0);
        store.dispatch(GalleryAction::SetViewer { item: Some(item), index });
        true
    }

    /// Close the viewer and return to the recorded origin, or the fallback
    /// surface when there is none (or the current path is stale).
    pub fn close(&mut self, store: &mut GalleryStore) {
        store.dispatch(GalleryAction::SetViewerOpen(false));
        let current = self.history.current().clone();
        if !current.path.starts_with(JOB_ROUTE_PREFIX) {
            // Stale viewer state on a non-job route.
            if current.path != self.fallback {
                self.history.push(self.fallback.clone(), None);
            }
            return;
        }
        match current.job_origin {
            Some(origin) => self.history.push(origin, None),
            None => self.history.push(self.fallback.clone(), None),
        }
    }

    pub fn next(&mut self, store: &mut GalleryStore) -> bool {
        self.step(store, 1)
    }

    pub fn prev(&mut self, store: &mut GalleryStore) -> bool {
        self.step(store, -1)
    }

    fn step(&mut self, store: &mut GalleryStore, delta: isize) -> bool {
        let filtered = store.filtered_items();
        if filtered.is_empty() {
            return false;
        }
        let Some(current) = store.viewer().item.clone() else {
            return false;
        };
        let Some(identity) = identify(&current) else {
            return false;
        };
        let index = position_of(&identity, &filtered)
            .unwrap_or_else(|| store.viewer().index.min(filtered.len() - 1));
        let len = filtered.len() as isize;
        let next = (index as isize + delta).rem_euclid(len) as usize;
        let target = filtered[next].clone();
        self.open_item(store, &target)
    }

    /// Browser back: if the new current path is a job route, reopen the
    /// matching item; otherwise close the viewer.
    pub fn go_back(&mut self, store: &mut GalleryStore) -> bool {
        if !self.history.back() {
            return false;
        }
        self.sync_after_navigation(store);
        true
    }

    pub fn go_forward(&mut self, store: &mut GalleryStore) -> bool {
        if !self.history.forward() {
            return false;
        }
        self.sync_after_navigation(store);
        true
    }

    fn sync_after_navigation(&mut self, store: &mut GalleryStore) {
        if self.history.path().starts_with(JOB_ROUTE_PREFIX) {
            self.resolve_current(store);
        } else {
            store.dispatch(GalleryAction::SetViewerOpen(false));
        }
    }
}
