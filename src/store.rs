//! MemVfs：名字 → 字节缓冲的共享命名空间。
//!
//! 两级锁纪律：命名空间互斥锁只在查找/建立/删除条目时短暂持有，
//! 拿到某个名字的缓冲引用后立刻释放；单文件内容的一致性由该缓冲
//! 自己的读写锁保证（见 `file` 模块）。不同名字之间的 I/O 因此
//! 互不串行。

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;

use crate::error::{Result, VfsError};
use crate::file::MemFile;
use crate::vfs::{AccessFlag, OpenFlags, Vfs};

/// 单个虚拟文件的内容；`Vec::len()` 即权威文件大小，没有可失同步的
/// 独立 size 字段。
pub(crate) type Buffer = Arc<RwLock<Vec<u8>>>;

/// In-memory virtual file store: one namespace per engine instance.
///
/// The store exclusively owns every buffer; handles resolve back into it by
/// name on each operation and never keep their own copy of the contents.
/// Cloning is cheap and shares the namespace: construct one store per
/// logical engine and inject it wherever handles are opened.
#[derive(Clone, Default)]
pub struct MemVfs {
    files: Arc<Mutex<HashMap<String, Buffer>>>,
    retain_on_close: bool,
}

impl MemVfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构造期开关：close 句柄时保留缓冲（默认策略是连缓冲一起移除）。
    /// 应在 store 被克隆/共享之前设置。
    pub fn retain_on_close(mut self, retain: bool) -> Self {
        self.retain_on_close = retain;
        self
    }

    /// 取出（必要时新建零长）`name` 的缓冲引用。
    /// 命名空间锁只握到拿到 Arc 为止，之后的内容拷贝不占用它。
    pub(crate) fn buffer(&self, name: &str) -> Buffer {
        let mut files = self.files.lock().unwrap();
        match files.entry(name.to_string()) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(v) => {
                debug!("create buffer {name:?}");
                v.insert(Buffer::default()).clone()
            }
        }
    }

    /// 只读探测，不创建。
    pub(crate) fn lookup(&self, name: &str) -> Option<Buffer> {
        self.files.lock().unwrap().get(name).cloned()
    }

    /// 从命名空间移除；返回是否确有此文件。移除后 `access` 立即对
    /// 所有调用方报告不存在，仍握着旧 Arc 的在途操作安全地写进孤儿
    /// 缓冲，随后的操作会重新解析到全新的空文件。
    pub(crate) fn remove(&self, name: &str) -> bool {
        let removed = self.files.lock().unwrap().remove(name).is_some();
        if removed {
            debug!("drop buffer {name:?}");
        }
        removed
    }

    /// close 触发的回收 seam：默认把缓冲一并移除，
    /// `retain_on_close` 的 store 则什么都不做。
    pub(crate) fn release_on_close(&self, name: &str) {
        if !self.retain_on_close {
            self.remove(name);
        }
    }

    /// 诊断/测试用内容快照。零长文件返回空快照；名字不存在返回
    /// [`VfsError::NotFound`]，这是两种不同的状态。
    pub fn get_raw(&self, name: &str) -> Result<Bytes> {
        let buf = self
            .lookup(name)
            .ok_or_else(|| VfsError::NotFound(name.to_string()))?;
        let data = buf.read().unwrap();
        Ok(Bytes::copy_from_slice(&data))
    }

    /// 枚举当前存在的文件名（无序）。
    pub fn names(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    /// 当前文件数。
    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl Vfs for MemVfs {
    type File = MemFile;

    async fn open(&self, name: &str, flags: OpenFlags) -> Result<(MemFile, OpenFlags)> {
        // open 即建立缓冲：存在性检查从这一刻起为真，重复 open 共享
        // 同一底层缓冲
        self.buffer(name);
        debug!("open {name:?} flags={flags:?}");
        Ok((MemFile::new(self.clone(), name), flags))
    }

    async fn delete(&self, name: &str, _sync_dir: bool) -> Result<()> {
        // 幂等：删除不存在的名字也是成功
        self.remove(name);
        Ok(())
    }

    async fn access(&self, name: &str, _flag: AccessFlag) -> Result<bool> {
        // 内存中可读即可写，所有 flag 同义于存在性
        Ok(self.lookup(name).is_some())
    }

    async fn full_pathname(&self, name: &str) -> Result<String> {
        Ok(name.to_string())
    }
}
