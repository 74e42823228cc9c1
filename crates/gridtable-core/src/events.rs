//! Synchronous event bus.
//!
//! `emit` calls every handler registered for the event kind, in registration
//! order, before returning. The handler list is copied before dispatch so a
//! handler may subscribe or unsubscribe without disturbing the current emit.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::{Rc, Weak};

use gridtable_engine::engine::{FilterState, Row, RowId, SortState};

use crate::table::TableState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Init,
    DataChange,
    ColumnVisibility,
    SortChange,
    FilterChange,
    SearchChange,
    PageChange,
    SelectionChange,
    RowSelect,
    StateChange,
    Destroy,
}

impl EventKind {
    pub const ALL: [EventKind; 11] = [
        EventKind::Init,
        EventKind::DataChange,
        EventKind::ColumnVisibility,
        EventKind::SortChange,
        EventKind::FilterChange,
        EventKind::SearchChange,
        EventKind::PageChange,
        EventKind::SelectionChange,
        EventKind::RowSelect,
        EventKind::StateChange,
        EventKind::Destroy,
    ];

    /// Canonical event name, e.g. `"sort:change"`.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Init => "init",
            EventKind::DataChange => "data:change",
            EventKind::ColumnVisibility => "column:visibility",
            EventKind::SortChange => "sort:change",
            EventKind::FilterChange => "filter:change",
            EventKind::SearchChange => "search:change",
            EventKind::PageChange => "page:change",
            EventKind::SelectionChange => "selection:change",
            EventKind::RowSelect => "row:select",
            EventKind::StateChange => "state:change",
            EventKind::Destroy => "destroy",
        }
    }

    pub fn from_name(name: &str) -> Option<EventKind> {
        EventKind::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a `data:change` was caused by.
#[derive(Clone, Debug, PartialEq)]
pub enum DataDelta<T> {
    Replaced { count: usize },
    Added(Row<T>),
    Updated(Row<T>),
    Deleted(RowId),
    Cleared,
}

#[derive(Clone, Debug)]
pub enum TableEvent<T> {
    Init,
    DataChange(DataDelta<T>),
    ColumnVisibility { column_id: String, visible: bool },
    SortChange(SortState),
    FilterChange(FilterState),
    SearchChange(String),
    PageChange { page_index: usize, page_size: usize },
    SelectionChange { selected_row_ids: BTreeSet<RowId> },
    RowSelect { row: Row<T>, selected: bool },
    /// The full snapshot after the mutation.
    StateChange(Rc<TableState<T>>),
    Destroy,
}

impl<T> TableEvent<T> {
    pub fn kind(&self) -> EventKind {
        match self {
            TableEvent::Init => EventKind::Init,
            TableEvent::DataChange(_) => EventKind::DataChange,
            TableEvent::ColumnVisibility { .. } => EventKind::ColumnVisibility,
            TableEvent::SortChange(_) => EventKind::SortChange,
            TableEvent::FilterChange(_) => EventKind::FilterChange,
            TableEvent::SearchChange(_) => EventKind::SearchChange,
            TableEvent::PageChange { .. } => EventKind::PageChange,
            TableEvent::SelectionChange { .. } => EventKind::SelectionChange,
            TableEvent::RowSelect { .. } => EventKind::RowSelect,
            TableEvent::StateChange(_) => EventKind::StateChange,
            TableEvent::Destroy => EventKind::Destroy,
        }
    }
}

pub type Handler<T> = Rc<dyn Fn(&TableEvent<T>)>;

struct Listener<T> {
    id: u64,
    kind: EventKind,
    handler: Handler<T>,
}

struct BusInner<T> {
    next_id: u64,
    listeners: Vec<Listener<T>>,
}

pub struct EventBus<T> {
    inner: Rc<RefCell<BusInner<T>>>,
}

impl<T: 'static> EventBus<T> {
    pub fn new() -> Self {
        EventBus {
            inner: Rc::new(RefCell::new(BusInner {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn on(&self, kind: EventKind, handler: impl Fn(&TableEvent<T>) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push(Listener {
                id,
                kind,
                handler: Rc::new(handler),
            });
            id
        };
        let bus: Weak<RefCell<BusInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Box::new(move || {
                if let Some(bus) = bus.upgrade() {
                    bus.borrow_mut().listeners.retain(|l| l.id != id);
                }
            }),
        }
    }

    pub fn emit(&self, event: &TableEvent<T>) {
        let kind = event.kind();
        let handlers: Vec<Handler<T>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| l.handler.clone())
            .collect();
        log::trace!("emit {} to {} handler(s)", kind, handlers.len());
        for handler in handlers {
            handler(event);
        }
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.kind == kind)
            .count()
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().listeners.clear();
    }
}

impl<T: 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by `on`. Dropping it keeps the handler registered.
pub struct Subscription {
    cancel: Box<dyn Fn()>,
}

impl Subscription {
    /// Remove the handler. Calling this more than once is harmless.
    pub fn unsubscribe(&self) {
        (self.cancel)()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}
