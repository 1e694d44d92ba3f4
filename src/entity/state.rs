/// Lifecycle state of a datablock.
///
/// Authored datablocks start at `Added`; wire-received ones start at
/// `Fetched` (typed) or `Up` (relay, bytes kept undecoded). `commit()` moves
/// toward `Committed`, a successful `push()` or `apply()` lands on `Up`, and
/// `diff()` is the only thing that produces `Modified`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatablockState {
    /// Freshly authored locally, never committed
    Added,
    /// Snapshot is current with the live object, ready to push
    Committed,
    /// Received and decoded, not yet applied to a live object
    Fetched,
    /// In sync with the peer
    Up,
    /// A diff pass found the live object drifted from the snapshot
    Modified,
    /// Decode or commit failed; the datablock is parked until repaired
    Error,
    /// Apply deferred: dependencies are not yet satisfied locally
    Reparent,
}

impl DatablockState {
    /// States from which `commit()` will recompute the snapshot.
    pub fn can_commit(self) -> bool {
        matches!(self, Self::Added | Self::Modified | Self::Up)
    }

    /// States from which `push()` will send.
    pub fn can_push(self) -> bool {
        matches!(self, Self::Committed | Self::Up)
    }

    /// States from which `apply()` will load into the live object.
    pub fn can_apply(self) -> bool {
        matches!(self, Self::Fetched | Self::Up | Self::Reparent)
    }
}
