use std::{sync::Arc, time::Duration};

use super::error::RegistryError;
use crate::{entity::DatablockKind, types::LiveObject};

/// Per-kind configuration carried through the registry untouched; the
/// registry never interprets it, it only hands it back to whoever drives
/// the polling loops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KindSettings {
    /// Push automatically after a dirty diff pass
    pub auto_push: bool,
    /// Include this kind in common-state checks
    pub check_common: bool,
    /// How often the owner's diff pass should visit this kind
    pub poll_interval: Duration,
}

impl Default for KindSettings {
    fn default() -> Self {
        Self {
            auto_push: true,
            check_common: false,
            poll_interval: Duration::from_millis(250),
        }
    }
}

struct RegisteredKind {
    kind: Arc<dyn DatablockKind>,
    settings: KindSettings,
}

/// Registry of datablock implementations: decouples "what wire type name
/// was received" from "which implementation builds it".
///
/// Registration order matters only in that the first structural match wins
/// when resolving by instance.
#[derive(Default)]
pub struct DatablockKinds {
    kinds: Vec<RegisteredKind>,
}

impl DatablockKinds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_kind(&mut self, kind: Arc<dyn DatablockKind>) {
        self.add_kind_with_settings(kind, KindSettings::default());
    }

    pub fn add_kind_with_settings(&mut self, kind: Arc<dyn DatablockKind>, settings: KindSettings) {
        self.kinds.push(RegisteredKind { kind, settings });
    }

    /// Resolve the implementation matching a live instance's runtime type.
    pub fn kind_from_instance(
        &self,
        live: &LiveObject,
    ) -> Result<&Arc<dyn DatablockKind>, RegistryError> {
        self.kinds
            .iter()
            .find(|registered| registered.kind.matches(live))
            .map(|registered| &registered.kind)
            .ok_or(RegistryError::NoInstanceMatch)
    }

    /// Resolve the implementation registered under a wire type name.
    pub fn kind_from_name(&self, type_name: &str) -> Result<&Arc<dyn DatablockKind>, RegistryError> {
        self.kinds
            .iter()
            .find(|registered| registered.kind.type_name() == type_name)
            .map(|registered| &registered.kind)
            .ok_or_else(|| RegistryError::KindNotFound {
                type_name: type_name.to_string(),
            })
    }

    pub fn settings_for(&self, type_name: &str) -> Option<&KindSettings> {
        self.kinds
            .iter()
            .find(|registered| registered.kind.type_name() == type_name)
            .map(|registered| &registered.settings)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
