//! Identity Port - 会话令牌 → 用户标识

/// Identity Port
pub trait IdentityPort: Send + Sync {
    /// 校验会话令牌，成功时返回用户标识
    fn authenticate(&self, token: &str) -> Option<String>;
}
