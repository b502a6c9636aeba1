//! 咨询锁状态机：句柄内单调升级、精确降级的五级锁。

use std::sync::Mutex;

/// Advisory lock levels, ordered by exclusivity.
///
/// The ordering carries the whole contract: `lock` raises the level
/// monotonically, `unlock` sets it exactly, and a reservation check compares
/// the current level against [`LockLevel::Reserved`]. Discriminants match
/// the engine ABI so a registration shim can cast them straight through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LockLevel {
    /// 未持锁。
    #[default]
    Unlocked = 0,
    /// 共享读。
    Shared = 1,
    /// 写意向已预留。
    Reserved = 2,
    /// 等待独占。
    Pending = 3,
    /// 独占。
    Exclusive = 4,
}

/// Per-handle lock bookkeeping.
///
/// 只做状态记录，不做互斥：并发句柄之间的真正排他由存储层的缓冲锁保证，
/// 这里维护的级别仅供引擎的协作式检查（如 reserved 探测）读取。
#[derive(Debug, Default)]
pub struct LockState {
    level: Mutex<LockLevel>,
}

impl LockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 单调升级：目标低于当前级别时维持现状，返回生效后的级别。
    pub fn raise(&self, to: LockLevel) -> LockLevel {
        let mut level = self.level.lock().unwrap();
        if *level < to {
            *level = to;
        }
        *level
    }

    /// 精确设置（unlock 语义）：降级必须能真正降下去。
    pub fn set(&self, to: LockLevel) {
        *self.level.lock().unwrap() = to;
    }

    /// 当前级别。
    pub fn level(&self) -> LockLevel {
        *self.level.lock().unwrap()
    }

    /// 当前级别是否不低于 `level`。
    pub fn at_least(&self, level: LockLevel) -> bool {
        self.level() >= level
    }
}
