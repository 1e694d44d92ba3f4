mod common;

use std::sync::Arc;

use common::{ChildNoteKind, Note, NoteKind};
use datablock::{
    live_ref, ChannelTransport, Datablock, DatablockKinds, DatablockState, Protocol,
    ReplicationEndpoint, Transport,
};

#[test]
fn owner_pass_pushes_added_and_modified_only() {
    let (client, mut server) = ChannelTransport::pair("alice", "server");
    let protocol = Protocol::builder().build();
    let endpoint = ReplicationEndpoint::new("alice", &protocol);

    let kind = Arc::new(NoteKind::new());
    let owned_live = live_ref(Note::new("mine", "v1"));
    let owned = Datablock::from_live("alice", &owned_live, kind.clone());
    let owned_uuid = owned.uuid();
    owned.store(endpoint.graph());

    // a datablock owned by someone else must be left alone
    let foreign_live = live_ref(Note::new("theirs", "v1"));
    let foreign = Datablock::from_live("bob", &foreign_live, kind.clone());
    let foreign_uuid = foreign.uuid();
    foreign.store(endpoint.graph());

    let report = endpoint.sync_owned(&client);
    assert!(report.is_clean());
    assert_eq!(report.pushed, 1);

    let relay = ReplicationEndpoint::new("server", &protocol);
    let report = relay.receive_pending(&mut server, None);
    assert_eq!(report.fetched, 1);
    assert!(relay.graph().contains(&owned_uuid));
    assert!(!relay.graph().contains(&foreign_uuid));

    assert_eq!(
        endpoint.graph().get(&owned_uuid).unwrap().state(),
        DatablockState::Up
    );
    assert_eq!(
        endpoint.graph().get(&foreign_uuid).unwrap().state(),
        DatablockState::Added
    );
}

#[test]
fn owner_pass_pushes_committed_datablocks() {
    let (client, mut server) = ChannelTransport::pair("alice", "server");
    let protocol = Protocol::builder().build();
    let endpoint = ReplicationEndpoint::new("alice", &protocol);

    // data supplied directly: no live object, starts at Committed
    let data = serde_json::to_value(Note::new("prebuilt", "no live object")).unwrap();
    let block = Datablock::from_data("alice", data, Arc::new(NoteKind::new()));
    let uuid = block.uuid();
    assert_eq!(block.state(), DatablockState::Committed);
    block.store(endpoint.graph());

    let report = endpoint.sync_owned(&client);
    assert!(report.is_clean());
    assert_eq!(report.pushed, 1);
    assert_eq!(endpoint.graph().get(&uuid).unwrap().state(), DatablockState::Up);

    let relay = ReplicationEndpoint::new("server", &protocol);
    assert_eq!(relay.receive_pending(&mut server, None).fetched, 1);
    assert!(relay.graph().contains(&uuid));
}

#[test]
fn drift_is_pushed_on_the_next_pass() {
    let (client, mut server) = ChannelTransport::pair("alice", "server");
    let protocol = Protocol::builder().build();
    let endpoint = ReplicationEndpoint::new("alice", &protocol);
    let relay = ReplicationEndpoint::new("server", &protocol);

    let live = live_ref(Note::new("mine", "v1"));
    let block = Datablock::from_live("alice", &live, Arc::new(NoteKind::new()));
    let uuid = block.uuid();
    block.store(endpoint.graph());

    assert_eq!(endpoint.sync_owned(&client).pushed, 1);
    assert_eq!(relay.receive_pending(&mut server, None).fetched, 1);

    // no mutation: nothing to push
    assert_eq!(endpoint.sync_owned(&client).pushed, 0);

    live.write()
        .unwrap()
        .downcast_mut::<Note>()
        .unwrap()
        .body = "v2".to_string();
    assert_eq!(endpoint.sync_owned(&client).pushed, 1);
    assert_eq!(endpoint.graph().get(&uuid).unwrap().state(), DatablockState::Up);
    assert_eq!(relay.receive_pending(&mut server, None).fetched, 1);
}

#[test]
fn apply_pass_defers_reparent_until_dependencies_land() {
    let (client, mut server) = ChannelTransport::pair("alice", "client_b");
    let child_kind = Arc::new(ChildNoteKind::new());
    let mut kinds = DatablockKinds::new();
    kinds.add_kind(child_kind.clone());

    let live = live_ref(Note::new("child", "attached"));
    let mut block = Datablock::from_live("alice", &live, child_kind.clone());
    block.try_commit().expect("commit");
    block.try_push(&client, None, 1024).expect("push");

    let protocol = Protocol::builder().build();
    let endpoint = ReplicationEndpoint::new("client_b", &protocol);
    assert_eq!(endpoint.receive_pending(&mut server, Some(&kinds)).fetched, 1);
    let uuid = endpoint.graph().uuids()[0];
    child_kind.provide_target(uuid, live_ref(Note::default()));

    // parent not present yet: the apply parks the datablock
    let report = endpoint.apply_ready();
    assert_eq!(report.applied, 0);
    assert_eq!(report.deferred, vec![uuid]);
    assert_eq!(
        endpoint.graph().get(&uuid).unwrap().state(),
        DatablockState::Reparent
    );

    child_kind.mark_ready();
    let report = endpoint.apply_ready();
    assert_eq!(report.applied, 1);
    assert!(report.deferred.is_empty());
    assert_eq!(endpoint.graph().get(&uuid).unwrap().state(), DatablockState::Up);
}

#[test]
fn bad_datablock_does_not_abort_the_batch() {
    let (client, mut server) = ChannelTransport::pair("alice", "server");
    let protocol = Protocol::builder().build();
    let endpoint = ReplicationEndpoint::new("server", &protocol);

    // a malformed metadata message followed by a healthy datablock
    client
        .send_multipart(None, vec![b"junk".to_vec()])
        .expect("send junk");
    let live = live_ref(Note::new("ok", "fine"));
    let mut block = Datablock::from_live("alice", &live, Arc::new(NoteKind::new()));
    block.try_commit().expect("commit");
    block.try_push(&client, None, 1024).expect("push");

    let report = endpoint.receive_pending(&mut server, None);
    assert_eq!(report.fetched, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(endpoint.graph().len(), 1);
}
