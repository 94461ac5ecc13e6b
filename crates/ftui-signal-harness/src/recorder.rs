#![forbid(unsafe_code)]

//! Recording receivers for dispatch tests.

use std::cell::RefCell;
use std::rc::Rc;

use ftui_signal::{Observer, Slot, Trackable};

/// Callback run by [`Recorder::on_value`] after it logs.
pub type Hook = Rc<dyn Fn(&Recorder, &i32, &Slot)>;

/// One recorded slot invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub value: i32,
}

/// Shared, ordered record of invocations across many receivers.
#[derive(Debug, Clone, Default)]
pub struct InvocationLog {
    entries: Rc<RefCell<Vec<Invocation>>>,
}

impl InvocationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, name: &str, value: i32) {
        self.entries.borrow_mut().push(Invocation {
            name: name.to_string(),
            value,
        });
    }

    /// Receiver names in invocation order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    pub fn entries(&self) -> Vec<Invocation> {
        self.entries.borrow().clone()
    }

    /// Number of invocations recorded for `name`.
    pub fn count_of(&self, name: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.name == name)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

/// Receiver that logs every call under its name.
pub struct Recorder {
    name: String,
    trackable: Trackable,
    log: InvocationLog,
    hook: RefCell<Option<Hook>>,
}

impl Recorder {
    pub fn new(name: impl Into<String>, log: &InvocationLog) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            trackable: Trackable::new(),
            log: log.clone(),
            hook: RefCell::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Install the hook run by [`on_value`](Self::on_value). Replaces any
    /// previous hook; a hook may replace itself while running.
    pub fn set_hook(&self, hook: impl Fn(&Recorder, &i32, &Slot) + 'static) {
        *self.hook.borrow_mut() = Some(Rc::new(hook));
    }

    pub fn clear_hook(&self) {
        self.hook.borrow_mut().take();
    }

    /// Log, then run the hook if one is installed.
    pub fn on_value(&self, value: &i32, slot: &Slot) {
        self.log.push(&self.name, *value);
        let hook = self.hook.borrow().clone();
        if let Some(hook) = hook {
            (*hook)(self, value, slot);
        }
    }

    /// Log under `<name>:alt`. Never runs the hook.
    pub fn on_alt(&self, value: &i32, _slot: &Slot) {
        self.log.push(&format!("{}:alt", self.name), *value);
    }

    /// Log, then disconnect the running connection.
    pub fn on_unbind_self(&self, value: &i32, slot: &Slot) {
        self.log.push(&self.name, *value);
        self.trackable.unbind(slot);
    }
}

impl Observer for Recorder {
    fn trackable(&self) -> &Trackable {
        &self.trackable
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("name", &self.name)
            .field("bindings", &self.trackable.count_bindings())
            .field("hooked", &self.hook.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftui_signal::Signal;

    #[test]
    fn records_in_order() {
        let log = InvocationLog::new();
        let signal = Signal::<i32>::new();
        let a = Recorder::new("a", &log);
        let b = Recorder::new("b", &log);
        signal.connect(&a, Recorder::on_value);
        signal.connect(&b, Recorder::on_alt);
        signal.emit(&4);

        assert_eq!(log.names(), vec!["a", "b:alt"]);
        assert_eq!(
            log.entries()[0],
            Invocation {
                name: "a".into(),
                value: 4
            }
        );
        assert_eq!(log.count_of("a"), 1);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn hook_can_clear_itself() {
        let log = InvocationLog::new();
        let signal = Signal::<i32>::new();
        let a = Recorder::new("a", &log);
        a.set_hook(|me, _, _| me.clear_hook());
        signal.connect(&a, Recorder::on_value);
        signal.emit(&0);
        signal.emit(&0);
        assert_eq!(log.len(), 2);
        assert!(format!("{a:?}").contains("hooked: false"));
    }

    #[test]
    fn unbind_self_runs_once() {
        let log = InvocationLog::new();
        let signal = Signal::<i32>::new();
        let a = Recorder::new("a", &log);
        signal.connect(&a, Recorder::on_unbind_self);
        signal.emit(&1);
        signal.emit(&2);
        assert_eq!(log.names(), vec!["a"]);
        assert_eq!(a.trackable().count_bindings(), 0);
    }
}
