//! Meditation Library Commands

use uuid::Uuid;

/// 重命名冥想命令
#[derive(Debug, Clone)]
pub struct RenameMeditation {
    pub user_id: String,
    pub meditation_id: Uuid,
    pub new_name: String,
}

/// 删除冥想命令
#[derive(Debug, Clone)]
pub struct DeleteMeditation {
    pub user_id: String,
    pub meditation_id: Uuid,
}
