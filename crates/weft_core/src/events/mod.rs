//! Event bus
//!
//! Subscriptions live on the owning object's definition and are
//! dispatched in registration order, across owners, using a globally
//! monotonic subscription id. Dispatch runs over a snapshot taken at
//! dispatch start: handlers may add or remove listeners freely, but
//! mutations only affect later events. A handler that unsubscribes a
//! not-yet-run snapshot entry does not suppress it; every entry in the
//! running pass still fires.
//!
//! Delegated expressions (`"a.b@change:x"`) are resolved lazily at
//! dispatch time, so reassigning an intermediate object retargets the
//! listener without any re-registration.

mod expr;

pub(crate) use expr::{DelegatePath, EventExpr, ExprBody};

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use weft_dom::NodeId;

use crate::error::Result;
use crate::registry::{ObjectId, ObjectKind};
use crate::runtime::Runtime;
use crate::timer::{TimerId, DEFAULT_DEBOUNCE_DELAY};
use crate::value::Value;

/// A dispatched event as seen by handlers
#[derive(Debug, Clone)]
pub struct Event {
    /// Full event name, including the `:key` suffix when present
    pub name: String,
    /// Object whose subscription matched (the listener's owner)
    pub subject: ObjectId,
    /// Object the event actually occurred on; differs from `subject`
    /// only for delegated subscriptions
    pub target: ObjectId,
    /// Originating DOM node for DOM events
    pub node: Option<NodeId>,
    /// Arguments passed to `trigger` or synthesized by lifecycle events
    pub args: Vec<Value>,
}

pub type Handler = Rc<RefCell<dyn FnMut(&mut Runtime, &Event)>>;

/// Wrap a closure as a shareable [`Handler`]
pub fn handler<F>(f: F) -> Handler
where
    F: FnMut(&mut Runtime, &Event) + 'static,
{
    Rc::new(RefCell::new(f))
}

/// Registration-time options for [`Runtime::on_with`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ListenerOptions {
    /// Invoke the handler once immediately after registration, with a
    /// synthetic event carrying the raw expression as its name
    pub trigger_on_init: bool,
}

pub(crate) struct DebounceSub {
    pub delay: Duration,
    pub timer: Option<TimerId>,
    pub pending: Option<Event>,
}

pub(crate) struct Subscription {
    pub id: u64,
    pub raw: String,
    pub expr: Rc<EventExpr>,
    pub handler: Handler,
    pub once: bool,
    pub debounce: Option<DebounceSub>,
}

impl Runtime {
    /// Register a listener for an event expression. Returns the
    /// subscription id, usable with [`Runtime::off_sub`].
    pub fn on(&mut self, obj: ObjectId, expr: &str, handler: Handler) -> Result<u64> {
        self.register(obj, expr, handler, false, None, ListenerOptions::default())
    }

    pub fn on_with(
        &mut self,
        obj: ObjectId,
        expr: &str,
        handler: Handler,
        options: ListenerOptions,
    ) -> Result<u64> {
        self.register(obj, expr, handler, false, None, options)
    }

    /// Register a listener removed after its first invocation
    pub fn once(&mut self, obj: ObjectId, expr: &str, handler: Handler) -> Result<u64> {
        self.register(obj, expr, handler, true, None, ListenerOptions::default())
    }

    /// Register a trailing-edge debounced listener. A burst of matching
    /// events yields one call with the last event after `delay`
    /// (default 50ms) of quiet.
    pub fn on_debounce(
        &mut self,
        obj: ObjectId,
        expr: &str,
        delay: Option<Duration>,
        handler: Handler,
    ) -> Result<u64> {
        self.register(
            obj,
            expr,
            handler,
            false,
            Some(delay.unwrap_or(DEFAULT_DEBOUNCE_DELAY)),
            ListenerOptions::default(),
        )
    }

    /// Register one handler under several whitespace-separated
    /// expressions
    pub fn on_many(&mut self, obj: ObjectId, exprs: &str, handler: Handler) -> Result<Vec<u64>> {
        let mut ids = Vec::new();
        for raw in exprs.split_whitespace() {
            ids.push(self.on(obj, raw, Rc::clone(&handler))?);
        }
        Ok(ids)
    }

    /// Register several expression/handler pairs in one call
    pub fn on_each(&mut self, obj: ObjectId, entries: &[(&str, Handler)]) -> Result<Vec<u64>> {
        let mut ids = Vec::new();
        for (raw, handler) in entries {
            ids.push(self.on(obj, raw, Rc::clone(handler))?);
        }
        Ok(ids)
    }

    /// Batch mirror of [`Runtime::on_each`]: remove each expression's
    /// subscriptions bound to its paired handler
    pub fn off_each(&mut self, obj: ObjectId, entries: &[(&str, Handler)]) -> Result<()> {
        for (raw, handler) in entries {
            self.off_handler(obj, raw, handler)?;
        }
        Ok(())
    }

    fn register(
        &mut self,
        obj: ObjectId,
        raw: &str,
        handler: Handler,
        once: bool,
        debounce: Option<Duration>,
        options: ListenerOptions,
    ) -> Result<u64> {
        let expr = self.parse_expr(raw);
        let id = self.next_sub;
        self.next_sub += 1;

        let sub = Subscription {
            id,
            raw: raw.to_string(),
            expr: Rc::clone(&expr),
            handler: Rc::clone(&handler),
            once,
            debounce: debounce.map(|delay| DebounceSub {
                delay,
                timer: None,
                pending: None,
            }),
        };
        self.def_mut(obj)?.subs.push(sub);

        if expr.is_dom() {
            self.dom_subs.push((obj, id));
        } else if expr.path != DelegatePath::None {
            self.delegated_subs.push((obj, id));
        }
        tracing::trace!(?obj, expr = raw, id, "listener registered");

        if options.trigger_on_init {
            let ev = Event {
                name: raw.to_string(),
                subject: obj,
                target: obj,
                node: None,
                args: vec![],
            };
            self.invoke(handler, &ev);
        }
        Ok(id)
    }

    pub(crate) fn parse_expr(&mut self, raw: &str) -> Rc<EventExpr> {
        if let Some(expr) = self.expr_cache.get(raw) {
            return Rc::clone(expr);
        }
        let expr = EventExpr::parse(raw);
        self.expr_cache.insert(raw.to_string(), Rc::clone(&expr));
        expr
    }

    /// Remove every subscription owned by `obj`
    pub fn off(&mut self, obj: ObjectId) -> Result<()> {
        let ids: Vec<u64> = self.def(obj)?.subs.iter().map(|s| s.id).collect();
        for id in ids {
            self.remove_sub(obj, id);
        }
        Ok(())
    }

    /// Remove subscriptions registered under exactly this expression
    pub fn off_name(&mut self, obj: ObjectId, expr: &str) -> Result<()> {
        let ids: Vec<u64> = self
            .def(obj)?
            .subs
            .iter()
            .filter(|s| s.raw == expr)
            .map(|s| s.id)
            .collect();
        for id in ids {
            self.remove_sub(obj, id);
        }
        Ok(())
    }

    /// Remove subscriptions under this expression bound to this exact
    /// handler
    pub fn off_handler(&mut self, obj: ObjectId, expr: &str, handler: &Handler) -> Result<()> {
        let ids: Vec<u64> = self
            .def(obj)?
            .subs
            .iter()
            .filter(|s| s.raw == expr && Rc::ptr_eq(&s.handler, handler))
            .map(|s| s.id)
            .collect();
        for id in ids {
            self.remove_sub(obj, id);
        }
        Ok(())
    }

    /// Remove one subscription by the id `on` returned
    pub fn off_sub(&mut self, obj: ObjectId, id: u64) -> Result<()> {
        self.def(obj)?;
        self.remove_sub(obj, id);
        Ok(())
    }

    pub(crate) fn remove_sub(&mut self, owner: ObjectId, id: u64) {
        let timer = self.objects.get_mut(owner).and_then(|def| {
            let pos = def.subs.iter().position(|s| s.id == id)?;
            let sub = def.subs.remove(pos);
            sub.debounce.and_then(|d| d.timer)
        });
        if let Some(timer) = timer {
            self.timers.cancel(timer);
        }
        self.delegated_subs.retain(|&(o, s)| !(o == owner && s == id));
        self.dom_subs.retain(|&(o, s)| !(o == owner && s == id));
    }

    /// Fire an object event. Handlers run synchronously, in
    /// registration order across direct and delegated listeners.
    pub fn trigger(&mut self, obj: ObjectId, name: &str, args: Vec<Value>) -> Result<()> {
        self.def(obj)?;
        let event = Event {
            name: name.to_string(),
            subject: obj,
            target: obj,
            node: None,
            args,
        };
        self.dispatch(obj, event);
        Ok(())
    }

    /// Fire a lifecycle event, tolerating a vanished object
    pub(crate) fn emit(&mut self, obj: ObjectId, name: &str, args: Vec<Value>) {
        if let Err(err) = self.trigger(obj, name, args) {
            tracing::warn!(%err, name, "lifecycle event dropped");
        }
    }

    fn dispatch(&mut self, target: ObjectId, event: Event) {
        // Snapshot of matching entries, ordered globally. Handlers are
        // captured here so that removing a subscription mid-pass cannot
        // suppress an entry already scheduled for this pass.
        let mut matched: Vec<(u64, ObjectId, Handler, bool, bool)> = Vec::new();

        if let Some(def) = self.objects.get(target) {
            for sub in &def.subs {
                if sub.expr.path == DelegatePath::None && expr_matches(&sub.expr, &sub.raw, &event.name) {
                    matched.push((
                        sub.id,
                        target,
                        Rc::clone(&sub.handler),
                        sub.once,
                        sub.debounce.is_some(),
                    ));
                }
            }
        }

        for (owner, id) in self.delegated_subs.clone() {
            let Some((expr, raw, handler, once, debounced)) =
                self.objects.get(owner).and_then(|def| {
                    def.subs.iter().find(|s| s.id == id).map(|s| {
                        (
                            Rc::clone(&s.expr),
                            s.raw.clone(),
                            Rc::clone(&s.handler),
                            s.once,
                            s.debounce.is_some(),
                        )
                    })
                })
            else {
                continue;
            };
            if !self.delegate_resolves_to(owner, &expr.path, target) {
                continue;
            }
            if expr_matches(&expr, &raw, &event.name) {
                matched.push((id, owner, handler, once, debounced));
            }
        }

        matched.sort_unstable_by_key(|(id, _, _, _, _)| *id);

        for (id, owner, handler, once, debounced) in matched {
            let mut ev = event.clone();
            ev.subject = owner;

            if debounced {
                self.schedule_debounced(owner, id, ev);
                continue;
            }
            if once {
                self.remove_sub(owner, id);
            }
            self.invoke(handler, &ev);
        }
    }

    /// Whether a delegation prefix on `owner` currently points at
    /// `target`
    fn delegate_resolves_to(&self, owner: ObjectId, path: &DelegatePath, target: ObjectId) -> bool {
        match path {
            DelegatePath::None => owner == target,
            DelegatePath::Wildcard => {
                matches!(self.object_kind(owner), Ok(ObjectKind::List | ObjectKind::Keyed))
                    && self.members(owner).contains(&target)
            }
            DelegatePath::Path(segs) => {
                let segs: Vec<&str> = segs.iter().map(String::as_str).collect();
                self.resolve_owner(owner, &segs) == Some(target)
            }
        }
    }

    fn schedule_debounced(&mut self, owner: ObjectId, id: u64, ev: Event) {
        let Some(def) = self.objects.get_mut(owner) else {
            return;
        };
        let Some(sub) = def.subs.iter_mut().find(|s| s.id == id) else {
            return;
        };
        let Some(db) = &mut sub.debounce else {
            return;
        };
        db.pending = Some(ev);
        let delay = db.delay;
        let stale = db.timer.take();
        if let Some(stale) = stale {
            self.timers.cancel(stale);
        }
        let timer = self
            .timers
            .set_timeout(delay, move |rt| rt.fire_debounced(owner, id));
        if let Some(sub) = self
            .objects
            .get_mut(owner)
            .and_then(|def| def.subs.iter_mut().find(|s| s.id == id))
        {
            if let Some(db) = &mut sub.debounce {
                db.timer = Some(timer);
            }
        }
    }

    fn fire_debounced(&mut self, owner: ObjectId, id: u64) {
        let Some((handler, once, ev)) = self.objects.get_mut(owner).and_then(|def| {
            let sub = def.subs.iter_mut().find(|s| s.id == id)?;
            let db = sub.debounce.as_mut()?;
            db.timer = None;
            let ev = db.pending.take()?;
            Some((Rc::clone(&sub.handler), sub.once, ev))
        }) else {
            return;
        };
        if once {
            self.remove_sub(owner, id);
        }
        self.invoke(handler, &ev);
    }

    /// Simulate a DOM event on a node. Binder change hooks listening on
    /// that exact node run first, then DOM subscriptions whose bound
    /// nodes contain the event node.
    pub fn fire_node_event(&mut self, node: NodeId, event: &str, args: Vec<Value>) {
        let hooks = self
            .node_listeners
            .get(&(node, event.to_string()))
            .cloned()
            .unwrap_or_default();
        for binding in hooks {
            self.handle_node_change(binding);
        }

        let mut matched: Vec<(u64, ObjectId, ObjectId)> = Vec::new();
        for (owner, id) in self.dom_subs.clone() {
            let Some(expr) = self.objects.get(owner).and_then(|def| {
                def.subs.iter().find(|s| s.id == id).map(|s| Rc::clone(&s.expr))
            }) else {
                continue;
            };
            let targets = self.delegate_targets(owner, &expr.path);
            for target in targets {
                if self.dom_sub_hits(target, &expr, node, event) {
                    matched.push((id, owner, target));
                    break;
                }
            }
        }
        matched.sort_unstable_by_key(|(id, _, _)| *id);

        for (id, owner, target) in matched {
            let Some((handler, once)) = self.objects.get(owner).and_then(|def| {
                def.subs
                    .iter()
                    .find(|s| s.id == id)
                    .map(|s| (Rc::clone(&s.handler), s.once))
            }) else {
                continue;
            };
            let ev = Event {
                name: event.to_string(),
                subject: owner,
                target,
                node: Some(node),
                args: args.clone(),
            };
            if once {
                self.remove_sub(owner, id);
            }
            self.invoke(handler, &ev);
        }
    }

    /// Objects a delegation prefix currently resolves to
    fn delegate_targets(&self, owner: ObjectId, path: &DelegatePath) -> Vec<ObjectId> {
        match path {
            DelegatePath::None => vec![owner],
            DelegatePath::Wildcard => self.members(owner),
            DelegatePath::Path(segs) => {
                let segs: Vec<&str> = segs.iter().map(String::as_str).collect();
                self.resolve_owner(owner, &segs).into_iter().collect()
            }
        }
    }

    /// Whether a DOM subscription on `target` covers `node` for `event`
    fn dom_sub_hits(&self, target: ObjectId, expr: &EventExpr, node: NodeId, event: &str) -> bool {
        let ExprBody::Dom {
            event: want,
            key,
            selector,
        } = &expr.body
        else {
            return false;
        };
        if want != event {
            return false;
        }
        let roots = match key {
            Some(key) => self.bound_nodes(target, key),
            None => self.bound_nodes(target, "sandbox"),
        };
        for root in roots {
            match selector {
                None => {
                    if root == node || self.dom.is_ancestor(root, node) {
                        return true;
                    }
                }
                Some(sel) => {
                    if self.node_matches_within(root, node, sel) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Bubbling check: the event node, or one of its ancestors below
    /// `root`, matches `sel` inside `root`
    fn node_matches_within(&self, root: NodeId, node: NodeId, sel: &str) -> bool {
        let Ok(selector) = weft_dom::Selector::parse(sel) else {
            return false;
        };
        if !(root == node || self.dom.is_ancestor(root, node)) {
            return false;
        }
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == root {
                break;
            }
            if selector.matches(&self.dom, n) {
                return true;
            }
            cur = self.dom.parent(n);
        }
        false
    }

    pub(crate) fn invoke(&mut self, handler: Handler, ev: &Event) {
        match handler.try_borrow_mut() {
            Ok(mut f) => (&mut *f)(self, ev),
            Err(_) => {
                tracing::warn!(event = %ev.name, "re-entrant handler invocation skipped");
            }
        }
    }
}

/// Whether a subscription expression matches a fired event name. DOM
/// expressions never match object triggers except by their exact raw
/// text, which lets `trigger` replay a DOM expression manually.
fn expr_matches(expr: &EventExpr, raw: &str, fired: &str) -> bool {
    match &expr.body {
        ExprBody::Object { name, key } => match key {
            Some(key) => {
                fired.len() == name.len() + 1 + key.len()
                    && fired.starts_with(name.as_str())
                    && fired.as_bytes()[name.len()] == b':'
                    && fired.ends_with(key.as_str())
            }
            None => fired == name,
        },
        ExprBody::Dom { .. } => {
            // Strip any delegation prefix from the raw text before
            // comparing against the fired name
            let body = raw.split_once('@').map(|(_, b)| b).unwrap_or(raw);
            fired == body
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WeftError;
    use std::cell::RefCell as StdRefCell;

    fn log() -> (Rc<StdRefCell<Vec<String>>>, Rc<StdRefCell<Vec<String>>>) {
        let l = Rc::new(StdRefCell::new(Vec::new()));
        (Rc::clone(&l), l)
    }

    #[test]
    fn test_trigger_runs_handlers_in_registration_order() {
        let mut rt = Runtime::new();
        let obj = rt.create_object(ObjectKind::Plain);
        let (log, seen) = log();

        for tag in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            rt.on(obj, "ping", handler(move |_, _| log.borrow_mut().push(tag.into())))
                .unwrap();
        }
        rt.trigger(obj, "ping", vec![]).unwrap();
        assert_eq!(*seen.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_on_each_pairs_and_off_each_mirrors() {
        let mut rt = Runtime::new();
        let obj = rt.create_object(ObjectKind::Plain);
        let (log, seen) = log();

        let on_ping = {
            let log = Rc::clone(&log);
            handler(move |_, _| log.borrow_mut().push("ping".into()))
        };
        let on_pong = {
            let log = Rc::clone(&log);
            handler(move |_, _| log.borrow_mut().push("pong".into()))
        };
        let ids = rt
            .on_each(obj, &[("ping", Rc::clone(&on_ping)), ("pong", Rc::clone(&on_pong))])
            .unwrap();
        assert_eq!(ids.len(), 2);

        rt.trigger(obj, "ping", vec![]).unwrap();
        rt.trigger(obj, "pong", vec![]).unwrap();
        assert_eq!(*seen.borrow(), vec!["ping", "pong"]);

        // off_each only detaches each expression's own handler
        rt.off_each(obj, &[("ping", on_ping), ("ping", on_pong)]).unwrap();
        rt.trigger(obj, "ping", vec![]).unwrap();
        rt.trigger(obj, "pong", vec![]).unwrap();
        assert_eq!(*seen.borrow(), vec!["ping", "pong", "pong"]);
    }

    #[test]
    fn test_once_fires_a_single_time() {
        let mut rt = Runtime::new();
        let obj = rt.create_object(ObjectKind::Plain);
        let (log, seen) = log();
        rt.once(obj, "ping", handler(move |_, _| log.borrow_mut().push("x".into())))
            .unwrap();
        rt.trigger(obj, "ping", vec![]).unwrap();
        rt.trigger(obj, "ping", vec![]).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_handler_added_during_dispatch_misses_current_event() {
        let mut rt = Runtime::new();
        let obj = rt.create_object(ObjectKind::Plain);
        let (log, seen) = log();
        let inner_log = Rc::clone(&log);
        rt.on(
            obj,
            "ping",
            handler(move |rt, ev| {
                let log = Rc::clone(&inner_log);
                let target = ev.target;
                rt.on(target, "ping", handler(move |_, _| log.borrow_mut().push("late".into())))
                    .unwrap();
            }),
        )
        .unwrap();

        rt.trigger(obj, "ping", vec![]).unwrap();
        assert!(seen.borrow().is_empty());
        rt.trigger(obj, "ping", vec![]).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_removal_mid_dispatch_spares_current_pass() {
        let mut rt = Runtime::new();
        let obj = rt.create_object(ObjectKind::Plain);
        let (log, seen) = log();

        let second_id = Rc::new(StdRefCell::new(0u64));
        let slot = Rc::clone(&second_id);
        rt.on(
            obj,
            "ping",
            handler(move |rt, ev| {
                rt.off_sub(ev.target, *slot.borrow()).unwrap();
            }),
        )
        .unwrap();
        let id = rt
            .on(obj, "ping", handler(move |_, _| log.borrow_mut().push("second".into())))
            .unwrap();
        *second_id.borrow_mut() = id;

        // The first handler removes the second, but the second was
        // already scheduled for this pass and still fires.
        rt.trigger(obj, "ping", vec![]).unwrap();
        assert_eq!(*seen.borrow(), ["second"]);

        // The removal takes effect from the next event on.
        rt.trigger(obj, "ping", vec![]).unwrap();
        assert_eq!(*seen.borrow(), ["second"]);
    }

    #[test]
    fn test_delegated_listener_follows_reassignment() {
        let mut rt = Runtime::new();
        let outer = rt.create_object(ObjectKind::Plain);
        let first = rt.create_object(ObjectKind::Plain);
        let second = rt.create_object(ObjectKind::Plain);
        rt.set_key(outer, "inner", Value::Object(first)).unwrap();

        let (log, seen) = log();
        rt.on(outer, "inner@boom", handler(move |_, ev| {
            log.borrow_mut().push(format!("{:?}", ev.target));
        }))
        .unwrap();

        rt.trigger(first, "boom", vec![]).unwrap();
        assert_eq!(seen.borrow().len(), 1);

        rt.set_key(outer, "inner", Value::Object(second)).unwrap();
        rt.trigger(first, "boom", vec![]).unwrap();
        assert_eq!(seen.borrow().len(), 1, "old target no longer matches");
        rt.trigger(second, "boom", vec![]).unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_wildcard_targets_collection_members() {
        let mut rt = Runtime::new();
        let list = rt.create_object(ObjectKind::List);
        let a = rt.create_object(ObjectKind::Plain);
        let b = rt.create_object(ObjectKind::Plain);
        rt.set_key(list, "items", Value::from(vec![Value::Object(a), Value::Object(b)]))
            .unwrap();

        let (log, seen) = log();
        rt.on(list, "*@modify", handler(move |_, _| log.borrow_mut().push("hit".into())))
            .unwrap();

        rt.trigger(a, "modify", vec![]).unwrap();
        rt.trigger(b, "modify", vec![]).unwrap();
        assert_eq!(seen.borrow().len(), 2);

        let plain = rt.create_object(ObjectKind::Plain);
        rt.trigger(plain, "modify", vec![]).unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_debounced_burst_collapses_to_last_event() {
        let mut rt = Runtime::new();
        let obj = rt.create_object(ObjectKind::Plain);
        let (log, seen) = log();
        rt.on_debounce(obj, "tick", None, handler(move |_, ev| {
            log.borrow_mut().push(ev.args[0].as_text());
        }))
        .unwrap();

        for n in 1..=3i64 {
            rt.trigger(obj, "tick", vec![Value::from(n)]).unwrap();
        }
        assert!(seen.borrow().is_empty());
        rt.advance(Duration::from_millis(50));
        assert_eq!(*seen.borrow(), vec!["3"]);
    }

    #[test]
    fn test_off_name_and_off_handler() {
        let mut rt = Runtime::new();
        let obj = rt.create_object(ObjectKind::Plain);
        let (log, seen) = log();
        let log2 = Rc::clone(&log);
        let h1 = handler(move |_: &mut Runtime, _: &Event| log.borrow_mut().push("1".into()));
        let h2 = handler(move |_: &mut Runtime, _: &Event| log2.borrow_mut().push("2".into()));
        rt.on(obj, "ping", Rc::clone(&h1)).unwrap();
        rt.on(obj, "ping", Rc::clone(&h2)).unwrap();

        rt.off_handler(obj, "ping", &h1).unwrap();
        rt.trigger(obj, "ping", vec![]).unwrap();
        assert_eq!(*seen.borrow(), vec!["2"]);

        rt.off_name(obj, "ping").unwrap();
        rt.trigger(obj, "ping", vec![]).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_trigger_on_init_fires_synthetic_event() {
        let mut rt = Runtime::new();
        let obj = rt.create_object(ObjectKind::Plain);
        let (log, seen) = log();
        rt.on_with(
            obj,
            "change:x",
            handler(move |_, ev| log.borrow_mut().push(ev.name.clone())),
            ListenerOptions { trigger_on_init: true },
        )
        .unwrap();
        assert_eq!(*seen.borrow(), vec!["change:x"]);
    }

    #[test]
    fn test_trigger_unknown_object_errors() {
        let mut rt = Runtime::new();
        let obj = rt.create_object(ObjectKind::Plain);
        rt.remove_object(obj).unwrap();
        assert!(matches!(
            rt.trigger(obj, "ping", vec![]),
            Err(WeftError::UnknownObject)
        ));
    }
}
