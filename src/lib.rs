//! libmemvfs: RAM-backed virtual file store for embedded database engines.
//!
//! 为数据库引擎的存储层提供一个进程内、按字节寻址的虚拟文件仓库：引擎照常做
//! open/read/write/truncate/size/lock，全部落在内存缓冲上，进程退出即消失。
//!
//! 两个入口类型：
//! - [`MemVfs`]：名字到缓冲的共享命名空间，每个引擎实例构造一个并注入；
//! - [`MemFile`]：每次 open 得到的句柄，承载全部字节级 I/O 与咨询锁。
//!
//! close 语义（与 POSIX 不同，务必留意）：默认策略下 close 句柄会把缓冲从
//! 命名空间整体移除，对齐内存数据库"关闭连接即释放存储"的预期；需要数据留到
//! 显式 delete 的话，用 [`MemVfs::retain_on_close`] 构造。
//!
//! ```rust
//! use libmemvfs::{MemVfs, OpenFlags, ReadOutcome, Vfs, VfsFile};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> libmemvfs::Result<()> {
//! let store = MemVfs::new();
//! let (db, _) = store.open("app.db", OpenFlags::MAIN_DB | OpenFlags::CREATE).await?;
//! db.write_at(b"hello", 0).await?;
//!
//! let mut buf = [0u8; 8];
//! assert_eq!(db.read_at(&mut buf, 0).await?, ReadOutcome::Short { valid: 5 });
//! assert_eq!(&buf, b"hello\0\0\0");
//!
//! db.close().await?;
//! assert!(store.names().is_empty());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod file;
pub mod lock;
pub mod store;
pub mod vfs;

pub use error::{Result, VfsError};
pub use file::MemFile;
pub use lock::{LockLevel, LockState};
pub use store::MemVfs;
pub use vfs::{
    AccessFlag, DeviceCharacteristics, OpenFlags, ReadOutcome, SECTOR_SIZE, SyncFlags, Vfs,
    VfsFile,
};
