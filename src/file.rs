//! MemFile：指向 store 中某个名字的文件句柄。
//!
//! 句柄本身不持有内容，每次 I/O 都按名字回到 store 重新解析缓冲。
//! 这保证 delete-while-open 之后，旧句柄的下一次操作落在全新的空
//! 文件上，而不是悄悄续写一个已从命名空间消失的孤儿缓冲。
//!
//! Read/write/truncate each take the buffer's own RwLock for the whole
//! operation, so a concurrent reader sees either none or all of a writer's
//! bytes, never an interleaving.

use async_trait::async_trait;
use log::trace;

use crate::error::{Result, VfsError};
use crate::lock::{LockLevel, LockState};
use crate::store::MemVfs;
use crate::vfs::{ReadOutcome, SyncFlags, VfsFile};

/// Handle onto one named in-memory file.
///
/// Multiple handles may target the same name; they share the underlying
/// buffer but each carries its own advisory [`LockState`].
pub struct MemFile {
    store: MemVfs,
    name: String,
    lock: LockState,
}

impl MemFile {
    pub(crate) fn new(store: MemVfs, name: &str) -> Self {
        Self {
            store,
            name: name.to_string(),
            lock: LockState::new(),
        }
    }

    /// 句柄绑定的文件名。
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl VfsFile for MemFile {
    async fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome> {
        let file = self.store.buffer(&self.name);
        let data = file.read().unwrap();
        let len = data.len() as u64;

        // offset 越界或余量不足时 valid < buf.len()，未读到的尾部
        // 必须整体清零，调用方不能看到自己的旧脏字节
        let valid = if offset >= len {
            0
        } else {
            ((len - offset) as usize).min(buf.len())
        };
        if valid > 0 {
            let start = offset as usize;
            buf[..valid].copy_from_slice(&data[start..start + valid]);
        }
        buf[valid..].fill(0);

        trace!(
            "read {:?} offset={offset} want={} got={valid}",
            self.name,
            buf.len()
        );
        if valid < buf.len() {
            Ok(ReadOutcome::Short { valid })
        } else {
            Ok(ReadOutcome::Complete)
        }
    }

    async fn write_at(&self, data: &[u8], offset: u64) -> Result<usize> {
        let end = offset
            .checked_add(data.len() as u64)
            .ok_or(VfsError::InvalidOffset {
                offset,
                len: data.len() as u64,
            })?;
        let end: usize = end.try_into().map_err(|_| VfsError::InvalidOffset {
            offset,
            len: data.len() as u64,
        })?;

        let file = self.store.buffer(&self.name);
        let mut content = file.write().unwrap();
        if content.len() < end {
            // 稀疏写：先把 [旧尾, end) 补零，间隙字节从此可读且为 0
            content.resize(end, 0);
        }
        content[offset as usize..end].copy_from_slice(data);

        trace!("write {:?} offset={offset} len={}", self.name, data.len());
        Ok(data.len())
    }

    async fn truncate(&self, size: u64) -> Result<()> {
        let new_len: usize = size.try_into().map_err(|_| VfsError::InvalidOffset {
            offset: size,
            len: 0,
        })?;

        let file = self.store.buffer(&self.name);
        let mut content = file.write().unwrap();
        match new_len.cmp(&content.len()) {
            std::cmp::Ordering::Less => {
                content.truncate(new_len);
                // 收缩要真正归还内存，不是只改 len
                content.shrink_to_fit();
            }
            std::cmp::Ordering::Greater => content.resize(new_len, 0),
            std::cmp::Ordering::Equal => {}
        }
        trace!("truncate {:?} to {new_len}", self.name);
        Ok(())
    }

    async fn sync(&self, _flags: SyncFlags) -> Result<()> {
        // 内存即持久：写入在 write_at 返回时就已对所有句柄可见
        Ok(())
    }

    async fn file_size(&self) -> Result<u64> {
        let file = self.store.buffer(&self.name);
        let len = file.read().unwrap().len();
        Ok(len as u64)
    }

    async fn lock(&self, level: LockLevel) -> Result<()> {
        let now = self.lock.raise(level);
        trace!("lock {:?} -> {now:?}", self.name);
        Ok(())
    }

    async fn unlock(&self, level: LockLevel) -> Result<()> {
        self.lock.set(level);
        Ok(())
    }

    async fn check_reserved_lock(&self) -> Result<bool> {
        Ok(self.lock.at_least(LockLevel::Reserved))
    }

    async fn close(&self) -> Result<()> {
        // 默认策略：句柄关闭即回收缓冲（journal/WAL 一类临时文件的
        // 生命周期就到这里）；retain_on_close 的 store 会跳过回收
        self.store.release_on_close(&self.name);
        trace!("close {:?}", self.name);
        Ok(())
    }
}
