//! Coordinator for the message and context stores
//!
//! Multi-step operations run message first, then context, and stop at the
//! first failure. There is no rollback:
//!
//! - emit: a failed message write never touches the context; a failed context
//!   write leaves the new message in place (message without context is valid).
//! - silence: a failed message delete leaves both files intact and retryable;
//!   a failed context delete is surfaced after the message is already gone.

use std::io::Write;

use crate::context::{Context, ContextStore};
use crate::error::Result;
use crate::store::StateStore;
use crate::types::IdentityKey;

pub struct Beacon<W: Write> {
    store: Box<dyn StateStore>,
    context_store: Option<Box<dyn ContextStore>>,
    out: W,
}

impl<W: Write> Beacon<W> {
    /// Coordinator without context support
    pub fn new(store: Box<dyn StateStore>, out: W) -> Self {
        Self {
            store,
            context_store: None,
            out,
        }
    }

    /// Coordinator managing both stores
    pub fn with_context_store(
        store: Box<dyn StateStore>,
        context_store: Box<dyn ContextStore>,
        out: W,
    ) -> Self {
        Self {
            store,
            context_store: Some(context_store),
            out,
        }
    }

    /// Publish a message for `key`
    pub fn emit(&mut self, key: &IdentityKey, message: &str) -> Result<()> {
        self.store.write(key, message)
    }

    /// Publish a message, then its context when both a context and a store exist
    pub fn emit_with_context(
        &mut self,
        key: &IdentityKey,
        message: &str,
        context: Option<&dyn Context>,
    ) -> Result<()> {
        self.store.write(key, message)?;

        match (context, &self.context_store) {
            (Some(context), Some(store)) => store.write(key, context),
            _ => Ok(()),
        }
    }

    /// Clear the message for `key`, then its context
    pub fn silence(&mut self, key: &IdentityKey) -> Result<()> {
        self.store.delete(key)?;

        match &self.context_store {
            Some(store) => store.delete(key),
            None => Ok(()),
        }
    }

    /// Write every entry as `key<TAB>message` in store order
    pub fn list(&mut self) -> Result<()> {
        for state in self.store.list()? {
            self.out.write_all(state.to_line().as_bytes())?;
        }
        Ok(())
    }

    /// Consume the coordinator, returning the output sink
    pub fn into_output(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FileContextStore, TmuxContext};
    use crate::error::BeaconError;
    use crate::store::FileStore;
    use crate::types::test_utils::key;
    use crate::types::StateEntry;
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;
    use std::io;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Shared view of what the doubles did, in call order
    type Log = Rc<RefCell<Vec<String>>>;

    fn injected(op: &str) -> BeaconError {
        BeaconError::Storage(io::Error::new(io::ErrorKind::PermissionDenied, op.to_string()))
    }

    /// In-memory state store with switchable faults
    #[derive(Default)]
    struct FaultyStore {
        states: RefCell<BTreeMap<IdentityKey, String>>,
        fail_write: Cell<bool>,
        fail_delete: Cell<bool>,
        log: Log,
    }

    impl StateStore for Rc<FaultyStore> {
        fn write(&self, key: &IdentityKey, message: &str) -> Result<()> {
            self.log.borrow_mut().push(format!("state.write {key}"));
            if self.fail_write.get() {
                return Err(injected("state write"));
            }
            self.states.borrow_mut().insert(key.clone(), message.to_string());
            Ok(())
        }

        fn delete(&self, key: &IdentityKey) -> Result<()> {
            self.log.borrow_mut().push(format!("state.delete {key}"));
            if self.fail_delete.get() {
                return Err(injected("state delete"));
            }
            self.states.borrow_mut().remove(key);
            Ok(())
        }

        fn list(&self) -> Result<Vec<StateEntry>> {
            Ok(self
                .states
                .borrow()
                .iter()
                .map(|(k, m)| StateEntry::new(k.clone(), m.trim()))
                .collect())
        }
    }

    /// In-memory context store with switchable faults
    #[derive(Default)]
    struct FaultyContextStore {
        contexts: RefCell<BTreeMap<IdentityKey, Vec<u8>>>,
        fail_write: Cell<bool>,
        fail_delete: Cell<bool>,
        log: Log,
    }

    impl ContextStore for Rc<FaultyContextStore> {
        fn write(&self, key: &IdentityKey, context: &dyn Context) -> Result<()> {
            self.log.borrow_mut().push(format!("context.write {key}"));
            if self.fail_write.get() {
                return Err(injected("context write"));
            }
            let data = context.to_json()?;
            self.contexts.borrow_mut().insert(key.clone(), data);
            Ok(())
        }

        fn delete(&self, key: &IdentityKey) -> Result<()> {
            self.log.borrow_mut().push(format!("context.delete {key}"));
            if self.fail_delete.get() {
                return Err(injected("context delete"));
            }
            self.contexts.borrow_mut().remove(key);
            Ok(())
        }

        fn read(&self, key: &IdentityKey) -> Result<Vec<u8>> {
            self.contexts
                .borrow()
                .get(key)
                .cloned()
                .ok_or_else(|| BeaconError::ContextNotFound {
                    key: key.to_string(),
                })
        }
    }

    struct Harness {
        states: Rc<FaultyStore>,
        contexts: Rc<FaultyContextStore>,
        log: Log,
        beacon: Beacon<Vec<u8>>,
    }

    fn harness() -> Harness {
        let log = Log::default();
        let states = Rc::new(FaultyStore {
            log: log.clone(),
            ..Default::default()
        });
        let contexts = Rc::new(FaultyContextStore {
            log: log.clone(),
            ..Default::default()
        });
        let beacon = Beacon::with_context_store(
            Box::new(states.clone()),
            Box::new(contexts.clone()),
            Vec::new(),
        );
        Harness {
            states,
            contexts,
            log,
            beacon,
        }
    }

    fn pane() -> TmuxContext {
        TmuxContext {
            session_name: "main".to_string(),
            window_index: 0,
            pane_index: 1,
            pane_id: "%2".to_string(),
        }
    }

    fn file_beacon(dir: &TempDir) -> Beacon<Vec<u8>> {
        Beacon::with_context_store(
            Box::new(FileStore::with_dir(dir.path())),
            Box::new(FileContextStore::with_dir(dir.path())),
            Vec::new(),
        )
    }

    fn listing(beacon: &mut Beacon<Vec<u8>>) -> String {
        beacon.list().unwrap();
        let out = std::mem::take(&mut beacon.out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn emit_then_list() {
        let dir = TempDir::new().unwrap();
        let mut beacon = file_beacon(&dir);

        beacon.emit(&key("42"), "building").unwrap();
        assert_eq!(listing(&mut beacon), "42\tbuilding\n");
    }

    #[test]
    fn emit_overwrites() {
        let dir = TempDir::new().unwrap();
        let mut beacon = file_beacon(&dir);

        beacon.emit(&key("42"), "a").unwrap();
        beacon.emit(&key("42"), "b").unwrap();
        assert_eq!(listing(&mut beacon), "42\tb\n");
    }

    #[test]
    fn list_empty_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut beacon = Beacon::new(
            Box::new(FileStore::with_dir(dir.path().join("missing"))),
            Vec::new(),
        );
        beacon.list().unwrap();
        assert!(beacon.into_output().is_empty());
    }

    #[test]
    fn list_keeps_store_order() {
        let mut h = harness();
        h.beacon.emit(&key("b"), "second").unwrap();
        h.beacon.emit(&key("a"), "  first  ").unwrap();
        assert_eq!(listing(&mut h.beacon), "a\tfirst\nb\tsecond\n");
    }

    #[test]
    fn emit_with_context_writes_both() {
        let dir = TempDir::new().unwrap();
        let mut beacon = file_beacon(&dir);

        beacon
            .emit_with_context(&key("7"), "waiting", Some(&pane()))
            .unwrap();

        let contexts = FileContextStore::with_dir(dir.path());
        assert_eq!(
            String::from_utf8(contexts.read(&key("7")).unwrap()).unwrap(),
            r#"{"session_name":"main","window_index":0,"pane_index":1,"pane_id":"%2"}"#
        );
        assert_eq!(listing(&mut beacon), "7\twaiting\n");
    }

    #[test]
    fn emit_with_context_without_context_store() {
        let h = harness();
        let mut beacon = Beacon::new(Box::new(h.states.clone()), Vec::new());

        beacon
            .emit_with_context(&key("7"), "waiting", Some(&pane()))
            .unwrap();

        assert_eq!(listing(&mut beacon), "7\twaiting\n");
        assert_eq!(*h.log.borrow(), vec!["state.write 7"]);
        assert!(h.contexts.read(&key("7")).is_err());
    }

    #[test]
    fn emit_with_no_context_skips_context_store() {
        let mut h = harness();
        h.beacon.emit_with_context(&key("7"), "waiting", None).unwrap();
        assert_eq!(*h.log.borrow(), vec!["state.write 7"]);
    }

    #[test]
    fn emit_state_failure_skips_context() {
        let mut h = harness();
        h.states.fail_write.set(true);

        let err = h
            .beacon
            .emit_with_context(&key("7"), "waiting", Some(&pane()))
            .unwrap_err();

        assert!(matches!(err, BeaconError::Storage(_)));
        assert_eq!(*h.log.borrow(), vec!["state.write 7"]);
        assert!(matches!(
            h.contexts.read(&key("7")),
            Err(BeaconError::ContextNotFound { .. })
        ));
    }

    #[test]
    fn emit_context_failure_keeps_message() {
        let mut h = harness();
        h.contexts.fail_write.set(true);

        let err = h
            .beacon
            .emit_with_context(&key("7"), "waiting", Some(&pane()))
            .unwrap_err();

        assert!(err.to_string().contains("context write"));
        assert_eq!(*h.log.borrow(), vec!["state.write 7", "context.write 7"]);
        assert_eq!(listing(&mut h.beacon), "7\twaiting\n");
    }

    #[test]
    fn silence_removes_both() {
        let dir = TempDir::new().unwrap();
        let mut beacon = file_beacon(&dir);

        beacon
            .emit_with_context(&key("7"), "waiting", Some(&pane()))
            .unwrap();
        beacon.emit(&key("8"), "other").unwrap();
        beacon.silence(&key("7")).unwrap();

        assert_eq!(listing(&mut beacon), "8\tother\n");
        let contexts = FileContextStore::with_dir(dir.path());
        assert!(matches!(
            contexts.read(&key("7")),
            Err(BeaconError::ContextNotFound { .. })
        ));
    }

    #[test]
    fn silence_missing_key_succeeds() {
        let dir = TempDir::new().unwrap();
        let mut beacon = file_beacon(&dir);
        beacon.silence(&key("missing-key")).unwrap();
        beacon.silence(&key("missing-key")).unwrap();
    }

    #[test]
    fn silence_state_failure_keeps_both() {
        let mut h = harness();
        h.beacon
            .emit_with_context(&key("7"), "waiting", Some(&pane()))
            .unwrap();
        h.log.borrow_mut().clear();
        h.states.fail_delete.set(true);

        assert!(h.beacon.silence(&key("7")).is_err());

        assert_eq!(*h.log.borrow(), vec!["state.delete 7"]);
        assert!(h.contexts.read(&key("7")).is_ok());
        assert_eq!(listing(&mut h.beacon), "7\twaiting\n");
    }

    #[test]
    fn silence_context_failure_after_message_removed() {
        let mut h = harness();
        h.beacon
            .emit_with_context(&key("7"), "waiting", Some(&pane()))
            .unwrap();
        h.log.borrow_mut().clear();
        h.contexts.fail_delete.set(true);

        let err = h.beacon.silence(&key("7")).unwrap_err();

        assert!(err.to_string().contains("context delete"));
        assert_eq!(*h.log.borrow(), vec!["state.delete 7", "context.delete 7"]);
        assert_eq!(listing(&mut h.beacon), "");
        // Retrying finishes the cleanup
        h.contexts.fail_delete.set(false);
        h.beacon.silence(&key("7")).unwrap();
        assert!(h.contexts.read(&key("7")).is_err());
    }
}
