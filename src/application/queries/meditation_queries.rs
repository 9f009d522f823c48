//! Meditation Library Queries

use uuid::Uuid;

/// 列出用户冥想
#[derive(Debug, Clone)]
pub struct ListMeditations {
    pub user_id: String,
}

/// 获取冥想音频的签名 URL
#[derive(Debug, Clone)]
pub struct GetMeditationAudio {
    pub user_id: String,
    pub meditation_id: Uuid,
}
