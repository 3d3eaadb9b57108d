//! Named entity actions.

use std::fmt;
use std::rc::Rc;

/// Parameters an action is triggered with: up to three leading parameters
/// and whatever follows them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionParams {
    pub p1: String,
    pub p2: String,
    pub p3: String,
    pub rest: Vec<String>,
}

impl ActionParams {
    /// Split a parameter list. Missing leading parameters are empty.
    #[must_use]
    pub fn from_slice<S: AsRef<str>>(params: &[S]) -> Self {
        let nth = |i: usize| params.get(i).map(|p| p.as_ref().to_string()).unwrap_or_default();
        Self {
            p1: nth(0),
            p2: nth(1),
            p3: nth(2),
            rest: params
                .iter()
                .skip(3)
                .map(|p| p.as_ref().to_string())
                .collect(),
        }
    }
}

/// Receiver connected to an action.
pub type ActionReceiver = Rc<dyn Fn(&ActionParams)>;

/// Handle returned by [`Action::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReceiverId(u64);

/// A named trigger with any number of receivers.
pub struct Action {
    name: String,
    receivers: Vec<(ReceiverId, ActionReceiver)>,
    next_id: u64,
}

impl Action {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            receivers: Vec::new(),
            next_id: 1,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connect(&mut self, receiver: ActionReceiver) -> ReceiverId {
        let id = ReceiverId(self.next_id);
        self.next_id += 1;
        self.receivers.push((id, receiver));
        id
    }

    pub fn disconnect(&mut self, id: ReceiverId) -> bool {
        let before = self.receivers.len();
        self.receivers.retain(|(r, _)| *r != id);
        self.receivers.len() != before
    }

    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.receivers.len()
    }

    /// The connected receivers in connection order.
    #[must_use]
    pub fn receivers(&self) -> Vec<ActionReceiver> {
        self.receivers.iter().map(|(_, r)| Rc::clone(r)).collect()
    }

    /// Call every receiver in connection order.
    pub fn trigger(&self, params: &ActionParams) {
        for receiver in self.receivers() {
            receiver(params);
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("receivers", &self.receivers.len())
            .finish()
    }
}
