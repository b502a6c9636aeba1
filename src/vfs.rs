//! Engine-facing callback contract
//!
//! Responsibilities:
//! - Define the pluggable-storage surface a database engine binds to:
//!   namespace calls on [`Vfs`], per-handle byte I/O on [`VfsFile`].
//! - Carry the flag vocabulary (open/access/sync/device characteristics)
//!   with the engine's ABI values so a registration shim can pass them
//!   through unchanged.
//!
//! 注册机制本身不在本 crate 内；这里只约定回调的形状，
//! `MemVfs`/`MemFile` 给出内存实现。

use async_trait::async_trait;
use bitflags::bitflags;

use crate::error::Result;
use crate::lock::LockLevel;

/// 报告给引擎的扇区大小（字节），用于对齐假设。
pub const SECTOR_SIZE: u32 = 512;

bitflags! {
    /// open 调用的标志位，取值与引擎 ABI 一致，原样回传。
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const READ_ONLY       = 0x0000_0001;
        const READ_WRITE      = 0x0000_0002;
        const CREATE          = 0x0000_0004;
        const DELETE_ON_CLOSE = 0x0000_0008;
        const EXCLUSIVE       = 0x0000_0010;
        const MAIN_DB         = 0x0000_0100;
        const TEMP_DB         = 0x0000_0200;
        const MAIN_JOURNAL    = 0x0000_0800;
        const TEMP_JOURNAL    = 0x0000_1000;
        const SUB_JOURNAL     = 0x0000_2000;
        const WAL             = 0x0008_0000;
    }
}

bitflags! {
    /// sync 调用的标志位；内存后端没有可刷写的层，全部忽略。
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SyncFlags: u32 {
        const NORMAL    = 0x0000_0002;
        const FULL      = 0x0000_0003;
        const DATA_ONLY = 0x0000_0010;
    }
}

bitflags! {
    /// 设备特性位集；内存后端不声明任何特殊特性（返回空集）。
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DeviceCharacteristics: u32 {
        const ATOMIC      = 0x0000_0001;
        const SAFE_APPEND = 0x0000_0200;
        const SEQUENTIAL  = 0x0000_0400;
        const IMMUTABLE   = 0x0200_0000;
    }
}

/// access 询问的权限种类。
///
/// 内存中的文件永远可读可写，因此除存在性外各种类同义。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessFlag {
    Exists,
    ReadWrite,
    Read,
}

/// 读结果。短读不是错误：越界部分已经整体补零，引擎据此信号决定
/// 是把尾部当作合法的零页还是报告损坏。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// 请求范围完全落在文件内。
    Complete,
    /// 仅前 `valid` 字节来自文件内容，其余已补零。
    Short { valid: usize },
}

impl ReadOutcome {
    /// 是否发生了短读。
    pub fn is_short(&self) -> bool {
        matches!(self, ReadOutcome::Short { .. })
    }
}

/// Namespace-level callbacks. `open` never fails because a name is missing.
#[async_trait]
pub trait Vfs: Send + Sync {
    type File: VfsFile;

    /// 打开（必要时创建）`name` 对应的缓冲；flags 原样回传。
    /// 对同一个名字重复 open 共享同一底层缓冲。
    async fn open(&self, name: &str, flags: OpenFlags) -> Result<(Self::File, OpenFlags)>;

    /// 幂等删除；`sync_dir` 对内存后端无意义，忽略。
    async fn delete(&self, name: &str, sync_dir: bool) -> Result<()>;

    /// 存在性检查；所有 [`AccessFlag`] 种类同义。
    async fn access(&self, name: &str, flag: AccessFlag) -> Result<bool>;

    /// 扁平命名空间：恒等变换，无路径规范化。
    async fn full_pathname(&self, name: &str) -> Result<String>;
}

/// Per-handle callbacks: byte-range I/O plus advisory locking.
#[async_trait]
pub trait VfsFile: Send + Sync {
    /// 从 `offset` 起读满 `buf`；不足部分整尾补零并返回
    /// [`ReadOutcome::Short`]。
    async fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<ReadOutcome>;

    /// 把 `data` 写到 `offset`；跨过当前末尾时先以零物化间隙。
    /// 成功时返回写入的字节数（恒等于 `data.len()`）。
    async fn write_at(&self, data: &[u8], offset: u64) -> Result<usize>;

    /// 截断或零扩展到 `size`。
    async fn truncate(&self, size: u64) -> Result<()>;

    /// 无事可做：内存在进程生命周期内即是"持久"的。
    async fn sync(&self, flags: SyncFlags) -> Result<()>;

    /// 当前文件长度（字节）。
    async fn file_size(&self) -> Result<u64>;

    /// 咨询锁单调升级到 `max(当前, level)`。
    async fn lock(&self, level: LockLevel) -> Result<()>;

    /// 咨询锁精确设置为 `level`（可降级）。
    async fn unlock(&self, level: LockLevel) -> Result<()>;

    /// 本句柄当前级别是否不低于 Reserved。
    async fn check_reserved_lock(&self) -> Result<bool>;

    /// 扇区大小，固定 [`SECTOR_SIZE`]。
    fn sector_size(&self) -> u32 {
        SECTOR_SIZE
    }

    /// 设备特性：内存后端不声明任何特性。
    fn device_characteristics(&self) -> DeviceCharacteristics {
        DeviceCharacteristics::empty()
    }

    /// 释放句柄。默认策略下还会把底层缓冲从命名空间移除，
    /// 见 `MemFile::close` 的说明。
    async fn close(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values_match_engine_abi() {
        assert_eq!(OpenFlags::READ_WRITE.bits(), 0x2);
        assert_eq!(OpenFlags::CREATE.bits(), 0x4);
        assert_eq!(OpenFlags::MAIN_DB.bits(), 0x100);
        assert_eq!(OpenFlags::WAL.bits(), 0x8_0000);
        // FULL 包含 NORMAL 位
        assert!(SyncFlags::FULL.contains(SyncFlags::NORMAL));
    }

    #[test]
    fn test_read_outcome_short_probe() {
        assert!(!ReadOutcome::Complete.is_short());
        assert!(ReadOutcome::Short { valid: 3 }.is_short());
    }
}
