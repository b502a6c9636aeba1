use libmemvfs::{
    AccessFlag, DeviceCharacteristics, LockLevel, MemFile, MemVfs, OpenFlags, ReadOutcome,
    SECTOR_SIZE, SyncFlags, Vfs, VfsFile,
};
use log::info;

use std::sync::Once;
static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_secs()
            .target(env_logger::Target::Stdout)
            .init();
    });
}

async fn open_rw(store: &MemVfs, name: &str) -> MemFile {
    let flags = OpenFlags::READ_WRITE | OpenFlags::CREATE;
    store.open(name, flags).await.unwrap().0
}

/// Drives any VFS implementation the way an embedded engine would: open the
/// main database, persist a page, fsync, read it back, close.
async fn write_then_reload<V: Vfs>(vfs: &V, name: &str, page: &[u8]) -> Vec<u8> {
    let flags = OpenFlags::READ_WRITE | OpenFlags::CREATE | OpenFlags::MAIN_DB;
    let (db, echoed) = vfs.open(name, flags).await.unwrap();
    assert_eq!(echoed, flags);

    db.write_at(page, 0).await.unwrap();
    db.sync(SyncFlags::FULL).await.unwrap();
    assert_eq!(db.file_size().await.unwrap(), page.len() as u64);
    db.close().await.unwrap();

    let (db, _) = vfs.open(name, flags).await.unwrap();
    let mut out = vec![0u8; page.len()];
    assert_eq!(db.read_at(&mut out, 0).await.unwrap(), ReadOutcome::Complete);
    db.close().await.unwrap();
    out
}

#[tokio::test]
async fn test_main_database_round_trip() {
    init_logging();
    let store = MemVfs::new().retain_on_close(true);

    let page = vec![0x42u8; 4096];
    let out = write_then_reload(&store, "app.db", &page).await;
    assert_eq!(out, page);
    info!("round trip ok, {} files live", store.file_count());
}

#[tokio::test]
async fn test_journal_is_gone_after_close() {
    let store = MemVfs::new();
    let flags = OpenFlags::READ_WRITE
        | OpenFlags::CREATE
        | OpenFlags::MAIN_JOURNAL
        | OpenFlags::DELETE_ON_CLOSE;
    let (journal, _) = store.open("app.db-journal", flags).await.unwrap();

    journal.write_at(b"rollback pages", 0).await.unwrap();
    assert!(
        store
            .access("app.db-journal", AccessFlag::Exists)
            .await
            .unwrap()
    );

    journal.close().await.unwrap();
    assert!(
        !store
            .access("app.db-journal", AccessFlag::Exists)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_access_tracks_open_and_delete() {
    let store = MemVfs::new();
    for flag in [AccessFlag::Exists, AccessFlag::ReadWrite, AccessFlag::Read] {
        assert!(!store.access("wal", flag).await.unwrap());
    }

    let f = open_rw(&store, "wal").await;
    for flag in [AccessFlag::Exists, AccessFlag::ReadWrite, AccessFlag::Read] {
        assert!(store.access("wal", flag).await.unwrap());
    }

    store.delete("wal", true).await.unwrap();
    assert!(!store.access("wal", AccessFlag::Exists).await.unwrap());
    drop(f);
}

#[tokio::test]
async fn test_two_connections_share_content_immediately() {
    let store = MemVfs::new();
    let writer = open_rw(&store, "shared.db").await;
    let reader = open_rw(&store, "shared.db").await;

    writer.write_at(b"committed", 0).await.unwrap();
    // no sync needed, visibility is immediate
    let mut buf = [0u8; 9];
    assert_eq!(
        reader.read_at(&mut buf, 0).await.unwrap(),
        ReadOutcome::Complete
    );
    assert_eq!(&buf, b"committed");
}

#[tokio::test]
async fn test_contract_constants() {
    let store = MemVfs::new();
    let f = open_rw(&store, "probe.db").await;

    assert_eq!(f.sector_size(), SECTOR_SIZE);
    assert_eq!(f.sector_size(), 512);
    assert_eq!(f.device_characteristics(), DeviceCharacteristics::empty());
    assert_eq!(
        store.full_pathname("probe.db").await.unwrap(),
        "probe.db"
    );
}

#[tokio::test]
async fn test_lock_ladder_as_engine_uses_it() {
    let store = MemVfs::new();
    let conn = open_rw(&store, "app.db").await;

    // read txn, then upgrade for a write txn
    conn.lock(LockLevel::Shared).await.unwrap();
    conn.lock(LockLevel::Reserved).await.unwrap();
    assert!(conn.check_reserved_lock().await.unwrap());
    conn.lock(LockLevel::Pending).await.unwrap();
    conn.lock(LockLevel::Exclusive).await.unwrap();

    // commit: back down to Shared, reservation is gone
    conn.unlock(LockLevel::Shared).await.unwrap();
    assert!(!conn.check_reserved_lock().await.unwrap());
    conn.unlock(LockLevel::Unlocked).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_disjoint_writers() {
    init_logging();
    let store = MemVfs::new();
    open_rw(&store, "parallel.db").await;

    let s1 = store.clone();
    let a = tokio::spawn(async move {
        let f = open_rw(&s1, "parallel.db").await;
        f.write_at(&[1u8; 100], 0).await.unwrap();
    });
    let s2 = store.clone();
    let b = tokio::spawn(async move {
        let f = open_rw(&s2, "parallel.db").await;
        f.write_at(&[2u8; 100], 100).await.unwrap();
    });
    a.await.unwrap();
    b.await.unwrap();

    // both payloads intact regardless of arrival order
    let raw = store.get_raw("parallel.db").unwrap();
    assert_eq!(raw.len(), 200);
    assert_eq!(&raw[..100], &[1u8; 100]);
    assert_eq!(&raw[100..], &[2u8; 100]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_observe_partial_write() {
    const LEN: usize = 4096;
    let store = MemVfs::new();
    let setup = open_rw(&store, "atomic.db").await;
    setup.truncate(LEN as u64).await.unwrap();

    let mut readers = Vec::new();
    for _ in 0..8 {
        let s = store.clone();
        readers.push(tokio::spawn(async move {
            let f = open_rw(&s, "atomic.db").await;
            let mut buf = vec![0u8; LEN];
            assert_eq!(f.read_at(&mut buf, 0).await.unwrap(), ReadOutcome::Complete);
            // a single write_at is atomic: all old bytes or all new ones
            let all_zero = buf.iter().all(|&b| b == 0);
            let all_pattern = buf.iter().all(|&b| b == 0xAB);
            assert!(all_zero || all_pattern);
        }));
    }

    let s = store.clone();
    let writer = tokio::spawn(async move {
        let f = open_rw(&s, "atomic.db").await;
        f.write_at(&[0xABu8; LEN], 0).await.unwrap();
    });

    writer.await.unwrap();
    for res in futures::future::join_all(readers).await {
        res.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_files_do_not_interfere() {
    let store = MemVfs::new();

    let mut tasks = Vec::new();
    for i in 0..8u8 {
        let s = store.clone();
        tasks.push(tokio::spawn(async move {
            let name = format!("file-{i}.db");
            let f = open_rw(&s, &name).await;
            f.write_at(&[i; 32], 0).await.unwrap();
            f.file_size().await.unwrap()
        }));
    }
    for t in tasks {
        assert_eq!(t.await.unwrap(), 32);
    }

    assert_eq!(store.file_count(), 8);
    for i in 0..8u8 {
        let raw = store.get_raw(&format!("file-{i}.db")).unwrap();
        assert_eq!(raw.as_ref(), &[i; 32]);
    }
}
