//! Viewer state: load lifecycle, selected key, and the current window.
//!
//! The session owns the state a front-end mutates (key selection, presets,
//! window edits) and delegates every date decision to `window`. The visible
//! slice is never stored; `view()` derives it from the current state on each
//! call.

use tracing::{info, warn};

use crate::domain::{DateWindow, LoadState, SeriesMap, WindowEdge};
use crate::error::DataSourceError;
use crate::view::{self, ViewSlice};
use crate::window::{self, InvalidWindowEdit};

#[derive(Debug, Clone, Default)]
pub struct ViewerSession {
    state: LoadState,
    selected: Option<String>,
    window: Option<DateWindow>,
}

impl ViewerSession {
    /// A session waiting for its first load.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that already holds a map, with the first key selected.
    pub fn with_map(map: SeriesMap) -> Self {
        let mut session = Self::new();
        session.finish_load(Ok(map));
        session
    }

    /// Install the outcome of a load, replacing whatever was there.
    ///
    /// On success the first key (sorted) is selected with its default window.
    /// On failure the session holds no data and exposes no keys.
    pub fn finish_load(&mut self, result: Result<SeriesMap, DataSourceError>) {
        self.selected = None;
        self.window = None;

        match result {
            Ok(map) => {
                let first = map.keys().first().map(|k| k.to_string());
                info!(keys = map.len(), "series map loaded");
                self.state = LoadState::Loaded(map);
                if let Some(key) = first {
                    self.select(&key);
                }
            }
            Err(err) => {
                warn!(error = %err, "load failed; continuing with no data");
                self.state = LoadState::Failed {
                    reason: err.to_string(),
                };
            }
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Sorted selectable keys; empty unless loaded.
    pub fn keys(&self) -> Vec<&str> {
        self.state
            .series_map()
            .map(SeriesMap::keys)
            .unwrap_or_default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn window(&self) -> Option<&DateWindow> {
        self.window.as_ref()
    }

    /// Select a key and reset the window to its default.
    ///
    /// Returns `false` (state unchanged) when the key is not in the map.
    pub fn select(&mut self, key: &str) -> bool {
        let Some(series) = self.state.series_map().and_then(|m| m.get(key)) else {
            warn!(key, "ignoring selection of unknown key");
            return false;
        };
        self.window = window::default_window(series);
        self.selected = Some(key.to_string());
        true
    }

    /// Replace the window with a preset relative to the selected series.
    ///
    /// Returns `false` when nothing is selected or the preset is empty.
    pub fn apply_preset(&mut self, months: u32) -> bool {
        let Some(series) = self
            .selected
            .as_deref()
            .and_then(|k| self.state.series_map()?.get(k))
        else {
            return false;
        };
        match window::preset_window(series, months) {
            Some(w) => {
                self.window = Some(w);
                true
            }
            None => false,
        }
    }

    /// Apply a user edit to one edge of the window.
    ///
    /// A rejected edit leaves the window untouched; the reason is logged and
    /// handed back for display.
    pub fn edit_window(&mut self, edge: WindowEdge, value: &str) -> Result<DateWindow, InvalidWindowEdit> {
        match window::validate_edit(self.window.as_ref(), edge, value) {
            Ok(w) => {
                self.window = Some(w);
                Ok(w)
            }
            Err(err) => {
                warn!(%edge, value, reason = %err, "window edit rejected");
                Err(err)
            }
        }
    }

    /// Replace both edges of the window in one validated step.
    ///
    /// Needs a selected key; otherwise both edges count as missing.
    pub fn set_window(&mut self, start: &str, end: &str) -> Result<DateWindow, InvalidWindowEdit> {
        if self.window.is_none() {
            return Err(InvalidWindowEdit::MissingEdge(WindowEdge::Start));
        }
        match window::validate_range(start, end) {
            Ok(w) => {
                self.window = Some(w);
                Ok(w)
            }
            Err(err) => {
                warn!(start, end, reason = %err, "window range rejected");
                Err(err)
            }
        }
    }

    /// The visible slice for the current key and window.
    pub fn view(&self) -> Option<ViewSlice<'_>> {
        let series = self.state.series_map()?.get(self.selected.as_deref()?)?;
        Some(view::project(series, self.window?))
    }
}
