//! Shared test fixture: a `Note` application object and its datablock kind.

// not every test binary exercises every fixture
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use datablock::{DatablockKind, EntityError, LiveObject, LiveRef};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
}

impl Note {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            tags: Vec::new(),
        }
    }
}

/// Kind for `Note`. Keeps a uuid-to-live-object table so `resolve()` can
/// reacquire targets, the way an application would hand out fresh objects
/// for incoming datablocks.
#[derive(Default)]
pub struct NoteKind {
    targets: Mutex<HashMap<Uuid, LiveRef>>,
}

impl NoteKind {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provide_target(&self, uuid: Uuid, live: LiveRef) {
        self.targets.lock().unwrap().insert(uuid, live);
    }
}

impl DatablockKind for NoteKind {
    fn type_name(&self) -> &'static str {
        "Note"
    }

    fn matches(&self, live: &LiveObject) -> bool {
        live.downcast_ref::<Note>().is_some()
    }

    fn dump(&self, live: &LiveObject) -> Result<Value, EntityError> {
        let note = live
            .downcast_ref::<Note>()
            .ok_or(EntityError::LiveTypeMismatch { type_name: "Note" })?;
        serde_json::to_value(note).map_err(|e| EntityError::DumpFailed {
            reason: e.to_string(),
        })
    }

    fn load(&self, data: &Value, target: &mut LiveObject) -> Result<(), EntityError> {
        let note = target
            .downcast_mut::<Note>()
            .ok_or(EntityError::LiveTypeMismatch { type_name: "Note" })?;
        *note = serde_json::from_value(data.clone()).map_err(|e| EntityError::LoadFailed {
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn resolve(&self, uuid: &Uuid) -> Option<LiveRef> {
        self.targets.lock().unwrap().get(uuid).cloned()
    }
}

/// Kind whose `load` signals a reparent until its dependencies are marked
/// satisfied, mimicking an object that cannot attach before its parent.
#[derive(Default)]
pub struct ChildNoteKind {
    inner: NoteKind,
    ready: Mutex<bool>,
}

impl ChildNoteKind {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provide_target(&self, uuid: Uuid, live: LiveRef) {
        self.inner.provide_target(uuid, live);
    }

    pub fn mark_ready(&self) {
        *self.ready.lock().unwrap() = true;
    }
}

impl DatablockKind for ChildNoteKind {
    fn type_name(&self) -> &'static str {
        "ChildNote"
    }

    fn matches(&self, live: &LiveObject) -> bool {
        self.inner.matches(live)
    }

    fn dump(&self, live: &LiveObject) -> Result<Value, EntityError> {
        self.inner.dump(live)
    }

    fn load(&self, data: &Value, target: &mut LiveObject) -> Result<(), EntityError> {
        if !*self.ready.lock().unwrap() {
            return Err(EntityError::ReparentNeeded);
        }
        self.inner.load(data, target)
    }

    fn resolve(&self, uuid: &Uuid) -> Option<LiveRef> {
        self.inner.resolve(uuid)
    }
}
