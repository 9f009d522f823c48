//! Playback Plan - 语音段与静音的交错顺序

/// 播放序列中的一项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackItem {
    /// 第 n 个语音段（按顺序排列后的位置）
    Segment(usize),
    /// 一段静音
    Silence,
}

/// 生成交错序列：seg0, silence, seg1, silence, ..., seg(n-1)
///
/// 末尾不追加静音；n = 0 时返回空序列
pub fn interleave(segment_count: usize) -> Vec<PlaybackItem> {
    let mut plan = Vec::with_capacity(segment_count.saturating_mul(2).saturating_sub(1));
    for i in 0..segment_count {
        if i > 0 {
            plan.push(PlaybackItem::Silence);
        }
        plan.push(PlaybackItem::Segment(i));
    }
    plan
}

/// 格式化时长为 `m:ss`（分钟不补零，秒补足两位）
pub fn format_duration(duration_ms: u64) -> String {
    let total_secs = duration_ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleave_three_segments() {
        assert_eq!(
            interleave(3),
            vec![
                PlaybackItem::Segment(0),
                PlaybackItem::Silence,
                PlaybackItem::Segment(1),
                PlaybackItem::Silence,
                PlaybackItem::Segment(2),
            ]
        );
    }

    #[test]
    fn test_interleave_counts() {
        for n in 1..10 {
            let plan = interleave(n);
            let silences = plan.iter().filter(|i| **i == PlaybackItem::Silence).count();
            assert_eq!(plan.len(), 2 * n - 1);
            assert_eq!(silences, n - 1);
            assert_ne!(plan.last(), Some(&PlaybackItem::Silence));
        }
    }

    #[test]
    fn test_interleave_edge_cases() {
        assert!(interleave(0).is_empty());
        assert_eq!(interleave(1), vec![PlaybackItem::Segment(0)]);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59_999), "0:59");
        assert_eq!(format_duration(181_500), "3:01");
        assert_eq!(format_duration(600_000), "10:00");
        assert_eq!(format_duration(3_725_000), "62:05");
    }
}
