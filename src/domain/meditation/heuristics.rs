//! Heuristic Resolver - 时长档位 × 引导强度 → 生成参数
//!
//! 参数表以 (DurationBucket, GuidanceLevel) 为键，必须覆盖全部 9 种组合

use std::collections::HashMap;

use super::errors::MeditationError;
use super::value_objects::{DurationBucket, GuidanceLevel};

/// 生成参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicParameters {
    /// 目标脚本字符数
    pub target_character_count: u32,
    /// 停顿次数（段落数 = 停顿次数 + 1）
    pub pause_count: u32,
    /// 每次停顿时长（秒）
    pub pause_length_secs: u32,
}

impl HeuristicParameters {
    pub const fn new(target_character_count: u32, pause_count: u32, pause_length_secs: u32) -> Self {
        Self {
            target_character_count,
            pause_count,
            pause_length_secs,
        }
    }

    /// 期望的脚本段落数
    pub fn section_count(&self) -> u32 {
        self.pause_count + 1
    }
}

/// 内置参数表
const STANDARD_TABLE: [(DurationBucket, GuidanceLevel, HeuristicParameters); 9] = [
    (DurationBucket::Short, GuidanceLevel::Low, HeuristicParameters::new(1000, 2, 90)),
    (DurationBucket::Short, GuidanceLevel::Medium, HeuristicParameters::new(2000, 2, 60)),
    (DurationBucket::Short, GuidanceLevel::High, HeuristicParameters::new(2000, 4, 30)),
    (DurationBucket::Medium, GuidanceLevel::Low, HeuristicParameters::new(2000, 2, 165)),
    (DurationBucket::Medium, GuidanceLevel::Medium, HeuristicParameters::new(3500, 4, 60)),
    (DurationBucket::Medium, GuidanceLevel::High, HeuristicParameters::new(4000, 6, 40)),
    (DurationBucket::Long, GuidanceLevel::Low, HeuristicParameters::new(2500, 3, 180)),
    (DurationBucket::Long, GuidanceLevel::Medium, HeuristicParameters::new(4000, 5, 85)),
    (DurationBucket::Long, GuidanceLevel::High, HeuristicParameters::new(5000, 6, 50)),
];

/// 启发式参数表
#[derive(Debug, Clone)]
pub struct HeuristicTable {
    entries: HashMap<(DurationBucket, GuidanceLevel), HeuristicParameters>,
}

impl HeuristicTable {
    /// 内置的标准参数表
    pub fn standard() -> Self {
        Self {
            entries: STANDARD_TABLE
                .iter()
                .map(|(duration, guidance, params)| ((*duration, *guidance), *params))
                .collect(),
        }
    }

    /// 从自定义条目构建参数表
    ///
    /// 条目必须覆盖全部组合，停顿时长必须为正
    #[cfg(test)]
    fn from_entries<I>(entries: I) -> Result<Self, MeditationError>
    where
        I: IntoIterator<Item = (DurationBucket, GuidanceLevel, HeuristicParameters)>,
    {
        let table = Self {
            entries: entries
                .into_iter()
                .map(|(duration, guidance, params)| ((duration, guidance), params))
                .collect(),
        };
        table.validate()?;
        Ok(table)
    }

    /// 校验表的完整性
    #[cfg(test)]
    fn validate(&self) -> Result<(), MeditationError> {
        for duration in DurationBucket::ALL {
            for guidance in GuidanceLevel::ALL {
                let params = self.resolve(duration, guidance)?;
                if params.pause_length_secs == 0 {
                    return Err(MeditationError::InvalidHeuristic {
                        duration: duration.as_str(),
                        guidance: guidance.as_str(),
                        reason: "pause length must be positive".to_string(),
                    });
                }
                if params.target_character_count == 0 {
                    return Err(MeditationError::InvalidHeuristic {
                        duration: duration.as_str(),
                        guidance: guidance.as_str(),
                        reason: "target character count must be positive".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// 查询参数
    pub fn resolve(
        &self,
        duration: DurationBucket,
        guidance: GuidanceLevel,
    ) -> Result<HeuristicParameters, MeditationError> {
        self.entries
            .get(&(duration, guidance))
            .copied()
            .ok_or(MeditationError::MissingHeuristic {
                duration: duration.as_str(),
                guidance: guidance.as_str(),
            })
    }
}

impl Default for HeuristicTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_complete() {
        assert!(HeuristicTable::standard().validate().is_ok());
    }

    #[test]
    fn test_resolve_known_entries() {
        let table = HeuristicTable::standard();

        let short_low = table.resolve(DurationBucket::Short, GuidanceLevel::Low).unwrap();
        assert_eq!(short_low, HeuristicParameters::new(1000, 2, 90));
        assert_eq!(short_low.section_count(), 3);

        let medium_high = table.resolve(DurationBucket::Medium, GuidanceLevel::High).unwrap();
        assert_eq!(medium_high, HeuristicParameters::new(4000, 6, 40));

        let long_medium = table.resolve(DurationBucket::Long, GuidanceLevel::Medium).unwrap();
        assert_eq!(long_medium.pause_length_secs, 85);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let table = HeuristicTable::standard();
        for duration in DurationBucket::ALL {
            for guidance in GuidanceLevel::ALL {
                assert_eq!(
                    table.resolve(duration, guidance).unwrap(),
                    table.resolve(duration, guidance).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_incomplete_table_is_rejected() {
        let entries = vec![(
            DurationBucket::Short,
            GuidanceLevel::Low,
            HeuristicParameters::new(1000, 2, 90),
        )];
        let err = HeuristicTable::from_entries(entries).unwrap_err();
        assert!(matches!(err, MeditationError::MissingHeuristic { .. }));
    }

    #[test]
    fn test_zero_pause_length_is_rejected() {
        let entries = DurationBucket::ALL.iter().flat_map(|d| {
            GuidanceLevel::ALL
                .iter()
                .map(move |g| (*d, *g, HeuristicParameters::new(1000, 2, 0)))
        });
        let err = HeuristicTable::from_entries(entries).unwrap_err();
        assert!(matches!(err, MeditationError::InvalidHeuristic { .. }));
    }
}
