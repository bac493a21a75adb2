use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use serde::Serialize;

use crate::ir::NodeKey;

/// Notification published by the editor after a user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GraphEvent {
    Link { from: String, to: String },
    Unlink { from: String, to: String },
    EditObjective { id: String },
    EditOutcome { id: String },
}

impl GraphEvent {
    pub fn link(from: &NodeKey, to: &NodeKey) -> Self {
        Self::Link {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn unlink(from: &NodeKey, to: &NodeKey) -> Self {
        Self::Unlink {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Listener for editor output. Every method defaults to a no-op.
pub trait GraphObserver {
    fn on_link(&mut self, _from: &NodeKey, _to: &NodeKey) {}
    fn on_unlink(&mut self, _from: &NodeKey, _to: &NodeKey) {}
    fn on_edit_objective(&mut self, _id: &str) {}
    fn on_edit_outcome(&mut self, _id: &str) {}
}

/// Fan-out to any number of subscribers, in subscription order.
#[derive(Default)]
pub struct Observers {
    subscribers: Vec<Box<dyn GraphObserver>>,
}

impl Observers {
    pub fn subscribe(&mut self, observer: Box<dyn GraphObserver>) {
        self.subscribers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl GraphObserver for Observers {
    fn on_link(&mut self, from: &NodeKey, to: &NodeKey) {
        for sub in &mut self.subscribers {
            sub.on_link(from, to);
        }
    }

    fn on_unlink(&mut self, from: &NodeKey, to: &NodeKey) {
        for sub in &mut self.subscribers {
            sub.on_unlink(from, to);
        }
    }

    fn on_edit_objective(&mut self, id: &str) {
        for sub in &mut self.subscribers {
            sub.on_edit_objective(id);
        }
    }

    fn on_edit_outcome(&mut self, id: &str) {
        for sub in &mut self.subscribers {
            sub.on_edit_outcome(id);
        }
    }
}

/// Records every event it sees.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<GraphEvent>,
}

impl GraphObserver for EventLog {
    fn on_link(&mut self, from: &NodeKey, to: &NodeKey) {
        self.events.push(GraphEvent::link(from, to));
    }

    fn on_unlink(&mut self, from: &NodeKey, to: &NodeKey) {
        self.events.push(GraphEvent::unlink(from, to));
    }

    fn on_edit_objective(&mut self, id: &str) {
        self.events.push(GraphEvent::EditObjective { id: id.to_string() });
    }

    fn on_edit_outcome(&mut self, id: &str) {
        self.events.push(GraphEvent::EditOutcome { id: id.to_string() });
    }
}

/// Publishes events on a channel. A hung-up receiver is ignored.
impl GraphObserver for Sender<GraphEvent> {
    fn on_link(&mut self, from: &NodeKey, to: &NodeKey) {
        let _ = self.send(GraphEvent::link(from, to));
    }

    fn on_unlink(&mut self, from: &NodeKey, to: &NodeKey) {
        let _ = self.send(GraphEvent::unlink(from, to));
    }

    fn on_edit_objective(&mut self, id: &str) {
        let _ = self.send(GraphEvent::EditObjective { id: id.to_string() });
    }

    fn on_edit_outcome(&mut self, id: &str) {
        let _ = self.send(GraphEvent::EditOutcome { id: id.to_string() });
    }
}

/// Lets the host keep a handle on an observer it also subscribed.
impl<T: GraphObserver> GraphObserver for Rc<RefCell<T>> {
    fn on_link(&mut self, from: &NodeKey, to: &NodeKey) {
        self.borrow_mut().on_link(from, to);
    }

    fn on_unlink(&mut self, from: &NodeKey, to: &NodeKey) {
        self.borrow_mut().on_unlink(from, to);
    }

    fn on_edit_objective(&mut self, id: &str) {
        self.borrow_mut().on_edit_objective(id);
    }

    fn on_edit_outcome(&mut self, id: &str) {
        self.borrow_mut().on_edit_outcome(id);
    }
}
