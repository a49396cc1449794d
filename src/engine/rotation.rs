// ==========================================
// 考官排班约束核心 - 轮班计算纯函数库
// ==========================================
// 规则: 四个班组按 白班 → 晚班 → 休息 → 休息 轮转,周期 4 天
// 基准: 2025-09-04 为周期位置 0（白班=二组,晚班=一组）
// 红线: 无状态、无副作用、无 I/O
// ==========================================

use crate::domain::types::{DutyShift, RotationGroup};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// 轮转周期（天）
pub const ROTATION_CYCLE_DAYS: i64 = 4;

/// 周期位置 → (白班, 晚班, [休息, 休息])
const ROTATION_TABLE: [(RotationGroup, RotationGroup, [RotationGroup; 2]); 4] = [
    (
        RotationGroup::Two,
        RotationGroup::One,
        [RotationGroup::Three, RotationGroup::Four],
    ),
    (
        RotationGroup::Three,
        RotationGroup::Two,
        [RotationGroup::One, RotationGroup::Four],
    ),
    (
        RotationGroup::Four,
        RotationGroup::Three,
        [RotationGroup::One, RotationGroup::Two],
    ),
    (
        RotationGroup::One,
        RotationGroup::Four,
        [RotationGroup::Two, RotationGroup::Three],
    ),
];

/// 轮转基准日
pub fn rotation_base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 4).expect("2025-09-04 是合法日期")
}

/// 某日的值班状态（派生值,不存储）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyState {
    pub cycle_position: u8,
    pub day_shift_group: RotationGroup,
    pub night_shift_group: RotationGroup,
    pub resting_groups: [RotationGroup; 2],
}

impl DutyState {
    pub fn shift_of(&self, group: RotationGroup) -> DutyShift {
        if !group.is_rotating() {
            DutyShift::Unrestricted
        } else if group == self.day_shift_group {
            DutyShift::DayShift
        } else if group == self.night_shift_group {
            DutyShift::NightShift
        } else {
            DutyShift::Resting
        }
    }
}

/// 排班表中的一天
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationDay {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub state: DutyState,
}

// ==========================================
// RotationCalculator - 纯函数工具类
// ==========================================
pub struct RotationCalculator;

impl RotationCalculator {
    /// 周期位置 = ((d % 4) + 4) % 4,d 为距基准日天数（可为负）
    pub fn cycle_position(date: NaiveDate) -> usize {
        let offset = date.signed_duration_since(rotation_base_date()).num_days();
        offset.rem_euclid(ROTATION_CYCLE_DAYS) as usize
    }

    /// 计算某日值班状态
    ///
    /// # 示例
    /// ```
    /// use chrono::NaiveDate;
    /// use exam_scheduler_core::domain::RotationGroup;
    /// use exam_scheduler_core::engine::RotationCalculator;
    ///
    /// let state = RotationCalculator::duty_state(NaiveDate::from_ymd_opt(2025, 9, 4).unwrap());
    /// assert_eq!(state.day_shift_group, RotationGroup::Two);
    /// assert_eq!(state.night_shift_group, RotationGroup::One);
    /// ```
    pub fn duty_state(date: NaiveDate) -> DutyState {
        let position = Self::cycle_position(date);
        let (day, night, resting) = ROTATION_TABLE[position];
        DutyState {
            cycle_position: position as u8,
            day_shift_group: day,
            night_shift_group: night,
            resting_groups: resting,
        }
    }

    /// 某班组某日的值班状态
    pub fn duty_of(group: RotationGroup, date: NaiveDate) -> DutyShift {
        Self::duty_state(date).shift_of(group)
    }

    /// 是否可参加考试（白班不可）
    pub fn is_available(group: RotationGroup, date: NaiveDate) -> bool {
        Self::duty_of(group, date) != DutyShift::DayShift
    }

    /// 考官选择优先级: 晚班(0) > 休息(1) > 无班组(2); 白班返回 None（排除）
    pub fn examiner_priority(group: RotationGroup, date: NaiveDate) -> Option<u8> {
        Self::duty_of(group, date).examiner_priority()
    }

    /// 连续多日排班表（报表用）
    ///
    /// 超出日期可表示范围时提前结束
    pub fn schedule(start: NaiveDate, days: u32) -> Vec<RotationDay> {
        (0..i64::from(days))
            .map_while(|i| start.checked_add_signed(Duration::days(i)))
            .map(|date| RotationDay {
                date,
                state: Self::duty_state(date),
            })
            .collect()
    }
}
