//! 存储层统一错误类型与 Result 别名。

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, VfsError>;

/// Errors surfaced by the in-memory store.
///
/// 短读不在此列：越过文件末尾的读取会整尾补零并通过
/// `ReadOutcome::Short` 作为正常返回值上报，不是错误。
#[derive(Debug, Error)]
pub enum VfsError {
    /// Only the diagnostic snapshot accessor raises this; engine-facing
    /// opens auto-create missing names instead.
    #[error("no in-memory file named {0:?}")]
    NotFound(String),

    /// The target range `[offset, offset + len)` is not representable.
    #[error("range {offset}+{len} exceeds the addressable file size")]
    InvalidOffset { offset: u64, len: u64 },
}
