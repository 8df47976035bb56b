//! Scroll-spy: which TOC entry is "currently being read"
//!
//! Visibility reports arrive as a stream of [`VisibilityEvent`]s and are
//! folded into the active entry by [`ScrollSpy`]. The reducer never looks at
//! geometry; [`VisibilityTracker`] produces events from element positions
//! when no browser is around.

use std::collections::{HashMap, HashSet};

use super::nav::NavigationEntry;

/// One intersection-state report for a heading element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityEvent {
    pub id: String,
    pub intersecting: bool,
}

impl VisibilityEvent {
    pub fn enter(id: &str) -> Self {
        Self {
            id: id.to_string(),
            intersecting: true,
        }
    }

    pub fn exit(id: &str) -> Self {
        Self {
            id: id.to_string(),
            intersecting: false,
        }
    }
}

/// Identifies one generation of watchers registered by [`ScrollSpy::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchHandle {
    generation: u64,
}

/// Active-entry reducer: sticky, last write wins
#[derive(Debug, Clone, Default)]
pub struct ScrollSpy {
    entries: Vec<NavigationEntry>,
    watched: HashSet<String>,
    generation: u64,
}

impl ScrollSpy {
    pub fn new(entries: Vec<NavigationEntry>) -> Self {
        Self {
            entries,
            watched: HashSet::new(),
            generation: 0,
        }
    }

    /// Register one watcher per rendered heading element
    pub fn observe<I, S>(&mut self, ids: I) -> WatchHandle
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.watched.extend(ids.into_iter().map(Into::into));
        WatchHandle {
            generation: self.generation,
        }
    }

    /// Whether watchers from `handle` are still live
    pub fn is_current(&self, handle: WatchHandle) -> bool {
        handle.generation == self.generation && !self.watched.is_empty()
    }

    /// Apply one visibility report. Returns whether the active entry changed.
    pub fn apply(&mut self, event: &VisibilityEvent) -> bool {
        if !event.intersecting || !self.watched.contains(&event.id) {
            return false;
        }

        let before = self.active().map(str::to_string);
        for entry in &mut self.entries {
            entry.active = entry.id == event.id;
        }
        before.as_deref() != self.active()
    }

    /// Apply reports delivered in the same tick, in delivery order
    pub fn apply_batch<'a, I>(&mut self, events: I) -> bool
    where
        I: IntoIterator<Item = &'a VisibilityEvent>,
    {
        let before = self.active().map(str::to_string);
        for event in events {
            self.apply(event);
        }
        before.as_deref() != self.active()
    }

    /// Release every watcher; later events are ignored until `observe`
    pub fn teardown(&mut self) {
        if !self.watched.is_empty() {
            tracing::debug!("Releasing {} heading watchers", self.watched.len());
        }
        self.watched.clear();
        self.generation += 1;
    }

    /// Tear down and start over with a new document's entries
    pub fn replace(&mut self, entries: Vec<NavigationEntry>) {
        self.teardown();
        self.entries = entries;
    }

    pub fn active(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.active)
            .map(|e| e.id.as_str())
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }
}

/// Vertical band of the viewport that counts as "being read".
///
/// Margins are fractions of the viewport height cut from the top and bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportBand {
    pub top_margin: f64,
    pub bottom_margin: f64,
}

impl Default for ViewportBand {
    fn default() -> Self {
        Self {
            top_margin: 0.10,
            bottom_margin: 0.70,
        }
    }
}

impl ViewportBand {
    /// Build a band, clamping margins so the band never inverts
    pub fn new(top_margin: f64, bottom_margin: f64) -> Self {
        let top_margin = top_margin.clamp(0.0, 1.0);
        let bottom_margin = bottom_margin.clamp(0.0, 1.0 - top_margin);
        Self {
            top_margin,
            bottom_margin,
        }
    }

    /// Observer `rootMargin` for the client script
    pub fn root_margin(&self) -> String {
        format!(
            "-{}% 0px -{}% 0px",
            percent(self.top_margin),
            percent(self.bottom_margin)
        )
    }

    /// Band edges in viewport coordinates
    pub fn bounds(&self, viewport_height: f64) -> (f64, f64) {
        (
            viewport_height * self.top_margin,
            viewport_height * (1.0 - self.bottom_margin),
        )
    }

    /// Whether a box spanning `top..bottom` (viewport coordinates) touches the band
    pub fn intersects(&self, top: f64, bottom: f64, viewport_height: f64) -> bool {
        let (band_top, band_bottom) = self.bounds(viewport_height);
        top <= band_bottom && bottom >= band_top
    }
}

fn percent(fraction: f64) -> String {
    let value = (fraction * 1000.0).round() / 10.0;
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Layout of one heading element in document coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBox {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

/// Produces visibility transitions from element layout and scroll position
#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    band: ViewportBand,
    elements: Vec<ElementBox>,
    state: HashMap<String, bool>,
}

impl VisibilityTracker {
    pub fn new(band: ViewportBand, elements: Vec<ElementBox>) -> Self {
        Self {
            band,
            elements,
            state: HashMap::new(),
        }
    }

    /// Events for this scroll position, in element order.
    ///
    /// The first call reports every element; later calls report only
    /// elements whose state changed.
    pub fn scroll_to(&mut self, scroll_y: f64, viewport_height: f64) -> Vec<VisibilityEvent> {
        let mut events = Vec::new();
        for element in &self.elements {
            let top = element.top - scroll_y;
            let intersecting = self
                .band
                .intersects(top, top + element.height, viewport_height);
            let previous = self.state.insert(element.id.clone(), intersecting);
            if previous != Some(intersecting) {
                events.push(VisibilityEvent {
                    id: element.id.clone(),
                    intersecting,
                });
            }
        }
        events
    }
}
