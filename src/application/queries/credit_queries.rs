//! Credit Queries

/// 查询用户额度
#[derive(Debug, Clone)]
pub struct GetCredits {
    pub user_id: String,
}
