// ==========================================
// 考官排班约束核心 - 科室标准化纯函数库
// ==========================================
// 职责: 把自由文本科室（"一室" / "区域一室" / "1室" / "1" ...）归一到 一~十
// 红线: 无状态、无副作用（除数据完整性告警日志）
// 红线: 考试科目名误填到科室字段时返回 None,不猜测
// ==========================================

use tracing::warn;

/// 三室与七室互通（考官一唯一允许的跨科室组合）
const CROSS_USE_PAIR: (&str, &str) = ("三", "七");

/// 标准科室代码
pub const DEPARTMENT_CODES: [&str; 10] = ["一", "二", "三", "四", "五", "六", "七", "八", "九", "十"];

/// 考试科目关键字（出现在科室字段说明上游数据错位）
const SUBJECT_KEYWORDS: [&str; 7] = ["模拟机", "现场", "口试", "理论", "实操", "实践", "笔试"];

/// 精确匹配表（按顺序查找）
const EXACT_TABLE: &[(&str, &str)] = &[
    // 标准写法
    ("一室", "一"), ("二室", "二"), ("三室", "三"), ("四室", "四"), ("五室", "五"),
    ("六室", "六"), ("七室", "七"), ("八室", "八"), ("九室", "九"), ("十室", "十"),
    // 区域前缀
    ("区域一室", "一"), ("区域二室", "二"), ("区域三室", "三"), ("区域四室", "四"),
    ("区域五室", "五"), ("区域六室", "六"), ("区域七室", "七"), ("区域八室", "八"),
    ("区域九室", "九"), ("区域十室", "十"),
    // 阿拉伯数字
    ("1室", "一"), ("2室", "二"), ("3室", "三"), ("4室", "四"), ("5室", "五"),
    ("6室", "六"), ("7室", "七"), ("8室", "八"), ("9室", "九"), ("10室", "十"),
    // 纯数字键
    ("1", "一"), ("2", "二"), ("3", "三"), ("4", "四"),
    ("5", "五"), ("6", "六"), ("7", "七"), ("8", "八"),
    // 已是标准代码
    ("一", "一"), ("二", "二"), ("三", "三"), ("四", "四"), ("五", "五"),
    ("六", "六"), ("七", "七"), ("八", "八"), ("九", "九"), ("十", "十"),
];

/// 去除修饰后的数字 → 代码
const DIGIT_TABLE: &[(&str, &str)] = &[
    ("1", "一"), ("2", "二"), ("3", "三"), ("4", "四"), ("5", "五"),
    ("6", "六"), ("7", "七"), ("8", "八"), ("9", "九"), ("10", "十"),
    ("一", "一"), ("二", "二"), ("三", "三"), ("四", "四"), ("五", "五"),
    ("六", "六"), ("七", "七"), ("八", "八"), ("九", "九"), ("十", "十"),
];

/// 清洗时去除的修饰词
const STRIP_PATTERNS: [&str; 3] = ["区域", "室", "科"];

// ==========================================
// DepartmentNormalizer - 纯函数工具类
// ==========================================
pub struct DepartmentNormalizer;

impl DepartmentNormalizer {
    /// 标准化科室文本
    ///
    /// # 规则
    /// 1. 空值/空串 → None
    /// 2. 含考试科目关键字 → None + 数据完整性告警
    /// 3. 精确匹配表命中 → 代码
    /// 4. 去除 区域/室/科 后按数字表匹配 → 代码
    /// 5. 否则 → 去空白后的原文
    ///
    /// # 示例
    /// ```
    /// use exam_scheduler_core::engine::DepartmentNormalizer;
    /// assert_eq!(DepartmentNormalizer::normalize(Some("区域三室")).as_deref(), Some("三"));
    /// assert_eq!(DepartmentNormalizer::normalize(Some("7")).as_deref(), Some("七"));
    /// assert_eq!(DepartmentNormalizer::normalize(Some("口试")), None);
    /// ```
    pub fn normalize(label: Option<&str>) -> Option<String> {
        let trimmed = label?.trim();
        if trimmed.is_empty() {
            return None;
        }

        if Self::is_subject_keyword(trimmed) {
            warn!(label = %trimmed, "科室字段包含考试科目名称,疑似上游数据错位");
            return None;
        }

        if let Some(code) = lookup(EXACT_TABLE, trimmed) {
            return Some(code.to_string());
        }

        let cleaned = STRIP_PATTERNS
            .iter()
            .fold(trimmed.to_string(), |acc, pattern| acc.replace(pattern, ""));
        let cleaned = cleaned.trim();

        if let Some(code) = lookup(DIGIT_TABLE, cleaned) {
            return Some(code.to_string());
        }

        Some(trimmed.to_string())
    }

    /// 是否为考试科目关键字
    pub fn is_subject_keyword(label: &str) -> bool {
        SUBJECT_KEYWORDS.iter().any(|kw| label.contains(kw))
    }

    /// 是否为标准科室代码
    pub fn is_canonical(code: &str) -> bool {
        DEPARTMENT_CODES.contains(&code)
    }

    /// 互通科室（三 ↔ 七）
    pub fn cross_use_partner(code: &str) -> Option<&'static str> {
        match code {
            c if c == CROSS_USE_PAIR.0 => Some(CROSS_USE_PAIR.1),
            c if c == CROSS_USE_PAIR.1 => Some(CROSS_USE_PAIR.0),
            _ => None,
        }
    }

    /// 考官一科室规则: E1 == D 或 {D, E1} == {三, 七}; 任一侧缺失为 false
    ///
    /// 参数为标准化后的科室代码
    pub fn is_valid_examiner1_department(student: Option<&str>, examiner: Option<&str>) -> bool {
        match (student, examiner) {
            (Some(d), Some(e)) => d == e || Self::cross_use_partner(d) == Some(e),
            _ => false,
        }
    }

    /// 考官二科室规则: E2 != D
    pub fn is_valid_examiner2_department(student: Option<&str>, examiner: Option<&str>) -> bool {
        !Self::same_department(student, examiner)
    }

    /// 两侧科室均已知且相同
    pub fn same_department(a: Option<&str>, b: Option<&str>) -> bool {
        matches!((a, b), (Some(x), Some(y)) if x == y)
    }
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(pattern, _)| *pattern == key)
        .map(|(_, code)| *code)
}
