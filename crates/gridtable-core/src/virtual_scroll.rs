//! Virtual scrolling over a table's visible rows.
//!
//! [`VirtualScroll`] is a plugin: once installed it follows `state:change`
//! and keeps a window over the current page of rows. Scroll positions from
//! the host are coalesced through a [`FrameScheduler`], so a burst of scroll
//! events costs one recomputation per frame.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::Serialize;

use gridtable_engine::engine::{
    BoxMetrics, Row, RowData, ViewportMetrics, VirtualWindow, bottom_offset, compute_window,
    default_overscan, measure_row_height, row_offset,
};

use crate::error::Result;
use crate::events::{EventKind, Subscription, TableEvent};
use crate::plugin::Plugin;
use crate::table::{DataTable, TableState};

pub const PLUGIN_NAME: &str = "virtual-scroll";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// The host's per-frame callback queue.
///
/// The host calls [`VirtualScroll::run_frame`] with the id once the frame fires.
pub trait FrameScheduler {
    fn request_frame(&self) -> FrameId;
    fn cancel_frame(&self, id: FrameId);
}

/// Frame queue driven by hand. Requested frames wait in a list until taken.
#[derive(Debug, Default)]
pub struct ManualFrames {
    next: Cell<u64>,
    pending: RefCell<Vec<FrameId>>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the frames requested and not cancelled since the last call.
    pub fn take_pending(&self) -> Vec<FrameId> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&self) -> FrameId {
        let id = FrameId(self.next.get());
        self.next.set(self.next.get() + 1);
        self.pending.borrow_mut().push(id);
        id
    }

    fn cancel_frame(&self, id: FrameId) {
        self.pending.borrow_mut().retain(|f| *f != id);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VirtualScrollOptions {
    pub row_height: f64,
    pub container_height: f64,
    /// Rows rendered past each edge of the viewport. Defaults to half a screen.
    pub overscan: Option<usize>,
}

impl VirtualScrollOptions {
    pub fn new(row_height: f64, container_height: f64) -> Self {
        VirtualScrollOptions {
            row_height,
            container_height,
            overscan: None,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = Some(overscan);
        self
    }

    /// Take the row height from a sample row's rendered box.
    pub fn with_measured_row(mut self, metrics: &BoxMetrics) -> Self {
        self.row_height = measure_row_height(metrics);
        self
    }
}

/// The rows to render and where to put them.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase", bound(serialize = "T: Serialize"))]
pub struct VirtualScrollState<T> {
    pub scroll_top: f64,
    pub visible_start_index: usize,
    pub visible_end_index: usize,
    pub virtual_rows: Vec<Row<T>>,
    pub total_height: f64,
    pub offset_y: f64,
}

impl<T> Default for VirtualScrollState<T> {
    fn default() -> Self {
        VirtualScrollState {
            scroll_top: 0.0,
            visible_start_index: 0,
            visible_end_index: 0,
            virtual_rows: Vec::new(),
            total_height: 0.0,
            offset_y: 0.0,
        }
    }
}

struct Viewport<T> {
    options: VirtualScrollOptions,
    scroll_top: f64,
    pending_frame: Option<FrameId>,
    pending_top: Option<f64>,
    snapshot: Option<Rc<TableState<T>>>,
    state: VirtualScrollState<T>,
    subscription: Option<Subscription>,
}

impl<T: RowData> Viewport<T> {
    fn row_count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |s| s.visible_rows.len())
    }

    fn overscan(&self) -> usize {
        let VirtualScrollOptions {
            row_height,
            container_height,
            overscan,
        } = self.options;
        overscan.unwrap_or_else(|| default_overscan(container_height, row_height))
    }

    fn recompute(&mut self) {
        let window: VirtualWindow = compute_window(&ViewportMetrics {
            row_height: self.options.row_height,
            container_height: self.options.container_height,
            scroll_top: self.scroll_top,
            overscan: self.overscan(),
            row_count: self.row_count(),
        });
        self.scroll_top = window.scroll_top;
        let virtual_rows = match &self.snapshot {
            Some(snapshot) => {
                snapshot.visible_rows[window.visible_start_index..window.visible_end_index].to_vec()
            }
            None => Vec::new(),
        };
        log::trace!(
            "virtual window {}..{} of {} at {}px",
            window.visible_start_index,
            window.visible_end_index,
            self.row_count(),
            window.scroll_top
        );
        self.state = VirtualScrollState {
            scroll_top: window.scroll_top,
            visible_start_index: window.visible_start_index,
            visible_end_index: window.visible_end_index,
            virtual_rows,
            total_height: window.total_height,
            offset_y: window.offset_y,
        };
    }
}

/// Windowed rendering over a table. Clones share one viewport, so the host
/// keeps a clone and hands another to [`DataTable::use_plugin`].
pub struct VirtualScroll<T> {
    viewport: Rc<RefCell<Viewport<T>>>,
    scheduler: Rc<dyn FrameScheduler>,
}

impl<T> Clone for VirtualScroll<T> {
    fn clone(&self) -> Self {
        VirtualScroll {
            viewport: self.viewport.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: RowData> VirtualScroll<T> {
    pub fn new(options: VirtualScrollOptions, scheduler: Rc<dyn FrameScheduler>) -> Self {
        VirtualScroll {
            viewport: Rc::new(RefCell::new(Viewport {
                options,
                scroll_top: 0.0,
                pending_frame: None,
                pending_top: None,
                snapshot: None,
                state: VirtualScrollState::default(),
                subscription: None,
            })),
            scheduler,
        }
    }

    /// Record a scroll position from the host. Any frame already requested is
    /// cancelled in favour of a new one.
    pub fn on_scroll(&self, scroll_top: f64) -> FrameId {
        let mut viewport = self.viewport.borrow_mut();
        if let Some(stale) = viewport.pending_frame.take() {
            self.scheduler.cancel_frame(stale);
        }
        let id = self.scheduler.request_frame();
        viewport.pending_frame = Some(id);
        viewport.pending_top = Some(scroll_top);
        id
    }

    /// Run a frame callback. Returns false for a frame that is no longer pending.
    pub fn run_frame(&self, id: FrameId) -> bool {
        let mut viewport = self.viewport.borrow_mut();
        if viewport.pending_frame != Some(id) {
            return false;
        }
        viewport.pending_frame = None;
        if let Some(top) = viewport.pending_top.take() {
            viewport.scroll_top = top;
        }
        viewport.recompute();
        true
    }

    pub fn has_pending_frame(&self) -> bool {
        self.viewport.borrow().pending_frame.is_some()
    }

    /// Jump to `scroll_top` now, dropping any pending frame.
    pub fn set_scroll_top(&self, scroll_top: f64) {
        let mut viewport = self.viewport.borrow_mut();
        if let Some(stale) = viewport.pending_frame.take() {
            self.scheduler.cancel_frame(stale);
        }
        viewport.pending_top = None;
        viewport.scroll_top = scroll_top;
        viewport.recompute();
    }

    pub fn scroll_to_row(&self, index: usize) {
        let row_height = self.viewport.borrow().options.row_height;
        self.set_scroll_top(row_offset(index, row_height));
    }

    pub fn scroll_to_top(&self) {
        self.set_scroll_top(0.0);
    }

    pub fn scroll_to_bottom(&self) {
        let (count, row_height) = {
            let viewport = self.viewport.borrow();
            (viewport.row_count(), viewport.options.row_height)
        };
        self.set_scroll_top(bottom_offset(count, row_height));
    }

    pub fn set_container_height(&self, container_height: f64) {
        let mut viewport = self.viewport.borrow_mut();
        viewport.options.container_height = container_height;
        viewport.recompute();
    }

    pub fn set_row_height(&self, row_height: f64) {
        let mut viewport = self.viewport.borrow_mut();
        viewport.options.row_height = row_height;
        viewport.recompute();
    }

    pub fn state(&self) -> VirtualScrollState<T> {
        self.viewport.borrow().state.clone()
    }
}

impl<T: RowData> Plugin<T> for VirtualScroll<T> {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn install(&mut self, table: &DataTable<T>) -> Result<()> {
        let snapshot = table.get_state()?;
        let weak: Weak<RefCell<Viewport<T>>> = Rc::downgrade(&self.viewport);
        let subscription = table.on(EventKind::StateChange, move |event| {
            let (TableEvent::StateChange(snapshot), Some(viewport)) = (event, weak.upgrade())
            else {
                return;
            };
            let mut viewport = viewport.borrow_mut();
            viewport.snapshot = Some(snapshot.clone());
            viewport.recompute();
        })?;

        let mut viewport = self.viewport.borrow_mut();
        viewport.snapshot = Some(snapshot);
        viewport.subscription = Some(subscription);
        viewport.recompute();
        Ok(())
    }

    fn uninstall(&mut self, _table: &DataTable<T>) {
        let mut viewport = self.viewport.borrow_mut();
        if let Some(subscription) = viewport.subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(frame) = viewport.pending_frame.take() {
            self.scheduler.cancel_frame(frame);
        }
        viewport.pending_top = None;
        viewport.snapshot = None;
    }
}
