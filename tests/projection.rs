mod common;

use bytes::Bytes;
use std::sync::Arc;

use cloudmount::projection::{Item, PropertyType, Value};
use cloudmount::remote::RemoteStore;
use cloudmount::tree::{JCR_CONTENT, NT_FILE, NT_FOLDER, NT_RESOURCE, SLING_FOLDER};
use cloudmount::{Mount, MountConfig};
use common::{MOUNT_POINT, MemoryStore, REMOTE_ROOT, mount, mount_at, sample_store};

#[tokio::test]
async fn test_every_snapshot_path_round_trips() {
    let store = Arc::new(sample_store());
    let mount = mount(&store).await;
    let provider = mount.provider();

    let mut paths: Vec<&str> = mount.snapshot().paths().collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "/content/dropbox",
            "/content/dropbox/bar",
            "/content/dropbox/bar/baz.md",
            "/content/dropbox/bar/baz.md/jcr:content",
            "/content/dropbox/foo.txt",
            "/content/dropbox/foo.txt/jcr:content",
        ]
    );

    for path in paths.into_iter().filter(|p| *p != MOUNT_POINT) {
        let node = provider.get_node(path).unwrap();
        let descriptor = mount.snapshot().get(path).unwrap();
        assert_eq!(node.path(), path);
        assert_eq!(node.primary_type(), descriptor.primary_type());
        assert_eq!(
            node.property("jcr:primaryType").unwrap().get_string().unwrap(),
            descriptor.primary_type()
        );
    }
}

#[tokio::test]
async fn test_children_follow_enumeration_order() {
    let store = Arc::new(
        MemoryStore::new()
            .folder("/adaptto")
            .file("/adaptto/zeta.txt", b"z")
            .folder("/adaptto/Alpha")
            .file("/adaptto/mid.txt", b"m"),
    );
    let mount = mount(&store).await;

    let names: Vec<String> = mount
        .provider()
        .get_children(MOUNT_POINT)
        .map(|n| n.name().to_string())
        .collect();
    assert_eq!(names, vec!["zeta.txt", "Alpha", "mid.txt"]);

    let root = mount.login().get_node(MOUNT_POINT).unwrap();
    assert_eq!(root.primary_type(), NT_FOLDER);
    assert_eq!(root.children().size(), 3);
    assert_eq!(root.children().nth(1).unwrap().primary_type(), SLING_FOLDER);
}

#[tokio::test]
async fn test_mount_point_is_a_bare_virtual_folder() {
    let store = Arc::new(sample_store());
    let mount = mount(&store).await;
    let session = mount.login();

    let root = session.get_node(MOUNT_POINT).unwrap();
    assert_eq!(root.path(), MOUNT_POINT);
    assert_eq!(root.primary_type(), NT_FOLDER);
    let names: Vec<&str> = root.properties().map(|p| p.name()).collect();
    assert_eq!(names, vec!["jcr:primaryType"]);
    assert!(!root.has_property("jcr:name"));

    // the cached root descriptor still feeds navigation
    assert_eq!(mount.snapshot().get(MOUNT_POINT).unwrap().primary_type(), SLING_FOLDER);
    let children: Vec<String> = root.children().map(|n| n.path().to_string()).collect();
    assert_eq!(children, vec!["/content/dropbox/foo.txt", "/content/dropbox/bar"]);
    assert_eq!(root.node("bar").unwrap().primary_type(), SLING_FOLDER);
}

#[tokio::test]
async fn test_repeated_lookups_are_equal_but_independent() {
    let store = Arc::new(sample_store());
    let mount = mount(&store).await;
    let session = mount.login();

    let a = session.get_node("/content/dropbox/foo.txt").unwrap();
    let b = session.get_node("/content/dropbox/foo.txt").unwrap();
    assert_eq!(a, b);
    assert!(a.is_same(&b));

    // reading one instance's payload leaves the other untouched
    let data_a = a.property("jcr:content/jcr:data").unwrap();
    data_a.get_stream().await.unwrap();
    let data_b = b.property("jcr:content/jcr:data").unwrap();
    assert!(data_a.get_binary().is_loaded());
    assert!(!data_b.get_binary().is_loaded());
}

#[tokio::test]
async fn test_pagination_collects_every_live_entry() {
    let store = Arc::new(
        MemoryStore::new()
            .page_size(2)
            .folder("/adaptto")
            .file("/adaptto/1.txt", b"1")
            .deleted("/adaptto/2.txt")
            .file("/adaptto/3.txt", b"3")
            .folder("/adaptto/4")
            .file("/adaptto/5.txt", b"5"),
    );
    let mount = mount(&store).await;

    let names: Vec<String> = mount
        .provider()
        .get_children(MOUNT_POINT)
        .map(|n| n.name().to_string())
        .collect();
    assert_eq!(names, vec!["1.txt", "3.txt", "4", "5.txt"]);

    // 5 entries in pages of 2: one list call and two continuations for the root
    assert_eq!(MemoryStore::count(&store.continue_calls), 2);
    // root plus the empty folder "4"
    assert_eq!(MemoryStore::count(&store.list_calls), 2);
}

#[tokio::test]
async fn test_deleted_entries_are_excluded() {
    let store = Arc::new(
        MemoryStore::new()
            .folder("/adaptto")
            .deleted("/adaptto/gone.txt")
            .file("/adaptto/kept.txt", b"k"),
    );
    let mount = mount(&store).await;

    assert!(!mount.snapshot().contains("/content/dropbox/gone.txt"));
    assert!(mount.provider().get_node("/content/dropbox/gone.txt").is_none());
    assert_eq!(mount.provider().get_children(MOUNT_POINT).size(), 1);
}

#[tokio::test]
async fn test_content_is_downloaded_lazily_and_once() {
    let store = Arc::new(sample_store());
    let mount = mount(&store).await;
    let session = mount.login();

    let file = session.get_node("/content/dropbox/foo.txt").unwrap();
    assert_eq!(file.primary_type(), NT_FILE);
    let content = file.node(JCR_CONTENT).unwrap();
    assert_eq!(content.primary_type(), NT_RESOURCE);
    let data = content.primary_item().unwrap();
    assert_eq!(data.property_type(), PropertyType::Binary);
    assert_eq!(MemoryStore::count(&store.downloads), 0);

    assert_eq!(data.get_long().unwrap(), -1);
    let first = data.get_stream().await.unwrap();
    assert_eq!(first, Bytes::from_static(b"hello from foo"));
    assert_eq!(MemoryStore::count(&store.downloads), 1);

    let second = data.get_stream().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(data.length().await.unwrap(), 14);
    assert_eq!(data.binary_size().await.unwrap(), 14);
    assert_eq!(data.get_long().unwrap(), 14);
    assert_eq!(MemoryStore::count(&store.downloads), 1);
}

#[tokio::test]
async fn test_failed_download_is_retried_on_next_read() {
    let store = Arc::new(sample_store().failing_downloads(1));
    let mount = mount(&store).await;

    let data = mount
        .login()
        .get_property("/content/dropbox/foo.txt/jcr:content/jcr:data")
        .unwrap();

    let err = data.get_stream().await.unwrap_err();
    assert!(err.is_content_fetch());
    assert_eq!(
        data.get_stream().await.unwrap(),
        Bytes::from_static(b"hello from foo")
    );
    assert_eq!(MemoryStore::count(&store.downloads), 2);
}

#[tokio::test]
async fn test_mutations_are_rejected() {
    let store = Arc::new(sample_store());
    let mount = mount(&store).await;
    let session = mount.login();
    let node = session.get_node("/content/dropbox/bar").unwrap();

    assert!(node.set_property("x", Value::from("y")).unwrap_err().is_constraint_violation());
    assert!(node.add_node("child", None).unwrap_err().is_constraint_violation());
    assert!(node.order_before("a", None).unwrap_err().is_constraint_violation());
    assert!(node.set_primary_type("nt:unstructured").unwrap_err().is_constraint_violation());
    assert!(node.add_mixin("mix:title").unwrap_err().is_constraint_violation());
    assert!(node.remove_mixin("mix:title").unwrap_err().is_constraint_violation());
    assert!(node.remove().unwrap_err().is_access_denied());

    assert!(node.checkin().unwrap_err().is_unsupported());
    assert!(node.checkout().unwrap_err().is_unsupported());
    assert!(node.restore("1.0", true).unwrap_err().is_unsupported());
    assert!(node.merge("default", false).unwrap_err().is_unsupported());
    assert!(node.lock(true, false).unwrap_err().is_unsupported());
    assert!(node.unlock().unwrap_err().is_unsupported());
    assert!(node.update("default").unwrap_err().is_unsupported());
    assert!(node.uuid().unwrap_err().is_unsupported());

    let property = node.property("jcr:name").unwrap();
    assert!(property.set_value(Value::from("renamed")).unwrap_err().is_constraint_violation());
    assert!(property.remove().unwrap_err().is_constraint_violation());

    assert!(session.remove_item("/content/dropbox/bar").unwrap_err().is_access_denied());
    assert!(
        session
            .remove_item("/content/dropbox/bar/jcr:name")
            .unwrap_err()
            .is_constraint_violation()
    );
    assert!(session.remove_item("/content/dropbox/nope").unwrap_err().is_not_found());
    assert!(session.move_item("/content/dropbox/bar", "/x").unwrap_err().is_unsupported());
    assert!(session.copy("/content/dropbox/bar", "/x").unwrap_err().is_unsupported());

    assert!(node.save().is_ok());
    assert!(session.save().is_ok());
    assert!(session.refresh(false).is_ok());
    assert!(!node.is_new() && !node.is_modified() && !session.has_pending_changes());
    assert!(node.is_checked_out());
    assert!(!node.is_locked());

    // nothing changed
    assert_eq!(session.get_node("/content/dropbox/bar").unwrap(), node);
}

#[tokio::test]
async fn test_missing_remote_root_mounts_empty_tree() {
    let store = Arc::new(MemoryStore::new().folder("/elsewhere"));
    let mount = mount(&store).await;

    assert!(mount.snapshot().is_empty());
    let root = mount.login().get_node(MOUNT_POINT).unwrap();
    assert_eq!(root.primary_type(), NT_FOLDER);
    assert!(!root.has_children());
    assert_eq!(MemoryStore::count(&store.list_calls), 0);
}

#[tokio::test]
async fn test_listing_failure_aborts_activation() {
    let store: Arc<dyn RemoteStore> = Arc::new(sample_store().failing_list("/adaptto/bar"));
    let err = Mount::activate(MountConfig::new(MOUNT_POINT, "/adaptto"), store)
        .await
        .unwrap_err();
    assert!(err.is_build_failure());
    assert!(err.to_string().contains("/adaptto/bar"));
}

#[tokio::test]
async fn test_continuation_failure_aborts_activation() {
    let store = Arc::new(sample_store().page_size(1).failing_continue("/adaptto"));
    let err = Mount::activate(
        MountConfig::new(MOUNT_POINT, REMOTE_ROOT),
        Arc::clone(&store) as Arc<dyn RemoteStore>,
    )
    .await
    .unwrap_err();

    assert!(err.is_build_failure());
    assert!(err.to_string().contains("/adaptto"));
    assert_eq!(MemoryStore::count(&store.list_calls), 1);
    assert_eq!(MemoryStore::count(&store.continue_calls), 1);
}

#[tokio::test]
async fn test_root_metadata_error_aborts_activation() {
    let store = Arc::new(sample_store().failing_metadata("/adaptto"));
    let err = Mount::activate(
        MountConfig::new(MOUNT_POINT, REMOTE_ROOT),
        Arc::clone(&store) as Arc<dyn RemoteStore>,
    )
    .await
    .unwrap_err();

    assert!(err.is_build_failure());
    assert_eq!(MemoryStore::count(&store.list_calls), 0);
}

#[tokio::test]
async fn test_root_not_found_error_mounts_empty_tree() {
    let store = Arc::new(sample_store().vanished_metadata("/adaptto"));
    let mount = mount(&store).await;

    assert!(mount.snapshot().is_empty());
    assert_eq!(MemoryStore::count(&store.list_calls), 0);
    let root = mount.login().get_node(MOUNT_POINT).unwrap();
    assert!(!root.has_children());
}

#[tokio::test]
async fn test_invalid_mount_point_is_rejected() {
    let store: Arc<dyn RemoteStore> = Arc::new(sample_store());
    let err = Mount::activate(MountConfig::new("content", "/adaptto"), store)
        .await
        .unwrap_err();
    assert!(matches!(err, cloudmount::MountError::InvalidConfig(_)));
}

#[tokio::test]
async fn test_file_as_remote_root() {
    let store = Arc::new(sample_store());
    let mount = mount_at(&store, "/adaptto/foo.txt").await;
    let session = mount.login();

    let root = session.get_node(MOUNT_POINT).unwrap();
    assert_eq!(root.primary_type(), NT_FOLDER);
    assert_eq!(
        mount.snapshot().get(MOUNT_POINT).unwrap().primary_type(),
        NT_FILE
    );
    let children: Vec<_> = root.children().collect();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].path(), "/content/dropbox/jcr:content");
    assert_eq!(
        session
            .get_property("/content/dropbox/jcr:content/jcr:data")
            .unwrap()
            .get_stream()
            .await
            .unwrap(),
        Bytes::from_static(b"hello from foo")
    );
}

#[tokio::test]
async fn test_store_root_skips_metadata() {
    let store = Arc::new(sample_store());
    let mount = mount_at(&store, "").await;

    assert_eq!(MemoryStore::count(&store.metadata_calls), 0);
    let names: Vec<String> = mount
        .provider()
        .get_children(MOUNT_POINT)
        .map(|n| n.name().to_string())
        .collect();
    assert_eq!(names, vec!["adaptto"]);
    assert!(mount.snapshot().contains("/content/dropbox/adaptto/bar/baz.md"));
}

#[tokio::test]
async fn test_ancestors_of_mount_point_are_virtual() {
    let store = Arc::new(sample_store());
    let mount = mount(&store).await;
    let session = mount.login();

    let root = session.root_node().unwrap();
    assert_eq!(root.path(), "/");
    assert_eq!(root.primary_type(), NT_FOLDER);
    assert_eq!(root.properties().count(), 1);

    let content = session.get_node("/content").unwrap();
    assert_eq!(content.primary_type(), NT_FOLDER);
    assert!(session.get_node("/apps").unwrap_err().is_not_found());

    let baz = session.get_node("/content/dropbox/bar/baz.md").unwrap();
    assert_eq!(baz.depth(), 4);
    assert_eq!(baz.parent().unwrap().path(), "/content/dropbox/bar");
    assert_eq!(baz.ancestor(1).unwrap().path(), "/content");
    assert_eq!(baz.ancestor(2).unwrap().primary_type(), NT_FOLDER);
    assert_eq!(baz.ancestor(3).unwrap().primary_type(), SLING_FOLDER);
    assert!(baz.ancestor(5).is_err());
    assert!(root.parent().is_err());
}

#[tokio::test]
async fn test_session_item_lookup() {
    let store = Arc::new(sample_store());
    let mount = mount(&store).await;
    let session = mount.login();

    match session.get_item("/content/dropbox/foo.txt").unwrap() {
        Item::Node(node) => assert_eq!(node.name(), "foo.txt"),
        Item::Property(_) => panic!("expected a node"),
    }
    match session.get_item("/content/dropbox/foo.txt/jcr:name").unwrap() {
        Item::Property(p) => assert_eq!(p.get_string().unwrap(), "foo.txt"),
        Item::Node(_) => panic!("expected a property"),
    }

    assert!(session.node_exists("/content/dropbox/bar"));
    assert!(!session.node_exists("/content/dropbox/bar/jcr:name"));
    assert!(session.property_exists("/content/dropbox/bar/jcr:name"));
    assert!(session.item_exists("/content/dropbox/bar/jcr:primaryType"));
    assert!(!session.item_exists("/content/dropbox/bar/missing"));
    assert!(session.get_node_or_none("/content/dropbox/missing").is_none());
    assert!(session.get_property("/content/dropbox/missing").unwrap_err().is_not_found());
    assert_eq!(session.mount_point(), MOUNT_POINT);
}

#[tokio::test]
async fn test_node_property_paths() {
    let store = Arc::new(sample_store());
    let mount = mount(&store).await;
    let bar = mount.login().get_node("/content/dropbox/bar").unwrap();

    let names: Vec<&str> = bar.properties().map(|p| p.name()).collect();
    assert_eq!(names, vec!["jcr:primaryType", "jcr:name"]);
    assert_eq!(
        bar.property("jcr:name").unwrap().path(),
        "/content/dropbox/bar/jcr:name"
    );
    assert!(bar.has_property("baz.md/jcr:content/jcr:data"));
    assert!(bar.has_property("/content/dropbox/foo.txt/jcr:name"));
    assert!(!bar.has_property("jcr:data"));
    assert!(bar.property("jcr:data").unwrap_err().is_not_found());
    assert!(bar.primary_item().unwrap_err().is_not_found());

    assert!(bar.has_node("baz.md"));
    assert!(bar.has_node("../foo.txt"));
    assert!(!bar.has_node("qux"));
    assert!(bar.is_node_type(SLING_FOLDER));
    assert!(bar.mixin_types().is_empty());
    assert!(bar.references().is_empty());
    assert_eq!(bar.identifier(), "/content/dropbox/bar");
    assert_eq!(bar.index(), 0);
}
