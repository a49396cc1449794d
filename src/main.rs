// ==========================================
// 考官排班约束核心 - 命令行入口
// ==========================================
// 职责: 读取 JSON/CSV 文件,调用核心引擎,输出 JSON 或摘要文本
// 说明: 本文件是唯一接触文件系统的地方
// ==========================================

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use exam_scheduler_core::config::default_weights;
use exam_scheduler_core::domain::{parse_assignments, parse_date, parse_roster, parse_roster_csv, parse_students};
use exam_scheduler_core::engine::ConstraintConfig;
use exam_scheduler_core::{
    logging, AdaptiveConstraintStrategist, AssignmentRepairEngine, ConflictDetector,
    ConstraintValidator, EngineConfig, EngineError, RotationCalculator, Teacher,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Parser)]
#[command(name = "exam-scheduler")]
#[command(about = "考官排班约束核心: 冲突检测 / 自动修复 / 自适应约束 / 配置校验", long_about = None)]
struct Cli {
    /// 引擎配置文件（JSON）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出连续多日的轮班状态
    Rotation {
        /// 起始日期（YYYY-MM-DD）
        #[arg(long)]
        from: String,
        #[arg(long, default_value_t = 8)]
        days: u32,
    },
    /// 检测排班冲突与规则违规
    Detect {
        #[arg(long)]
        assignments: PathBuf,
        /// 花名册（.json 或 .csv）
        #[arg(long)]
        roster: PathBuf,
        /// 只输出可读摘要
        #[arg(long)]
        summary: bool,
    },
    /// 修复排班
    Repair {
        #[arg(long)]
        assignments: PathBuf,
        #[arg(long)]
        roster: PathBuf,
        /// 修复后的安排写入该文件（默认输出到 stdout）
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// 分析考官资源紧张度
    Analyze {
        #[arg(long)]
        students: PathBuf,
        #[arg(long)]
        roster: PathBuf,
    },
    /// 推荐求解器约束权重
    Recommend {
        #[arg(long)]
        students: PathBuf,
        #[arg(long)]
        roster: PathBuf,
        /// 基础权重（JSON 对象,缺省为各软约束最优值）
        #[arg(long)]
        weights: Option<PathBuf>,
    },
    /// 校验约束配置并评分
    Validate {
        #[arg(long)]
        constraints: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json_log);

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    config.validate().context("invalid engine config")?;

    match cli.command {
        Commands::Rotation { from, days } => {
            let start = parse_date(&from).ok_or_else(|| EngineError::DateFormat {
                field: "from".to_string(),
                value: from.clone(),
            })?;
            print_json(&RotationCalculator::schedule(start, days))?;
        }
        Commands::Detect {
            assignments,
            roster,
            summary,
        } => {
            let assignments = parse_assignments(&read_json(&assignments)?)?;
            let roster = load_roster(&roster)?;
            let report = ConflictDetector::with_config(&config).check_all(&assignments, &roster);
            if summary {
                println!("{}", report.summary);
            } else {
                print_json(&report)?;
            }
        }
        Commands::Repair {
            assignments,
            roster,
            out,
        } => {
            let assignments = parse_assignments(&read_json(&assignments)?)?;
            let roster = load_roster(&roster)?;
            let outcome = AssignmentRepairEngine::with_config(config).repair(&assignments, &roster, None);
            match out {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    serde_json::to_writer_pretty(file, &outcome.assignments)?;
                    for line in &outcome.report.change_log {
                        println!("{line}");
                    }
                    print_json(&outcome.report.summary())?;
                }
                None => print_json(&outcome)?,
            }
        }
        Commands::Analyze { students, roster } => {
            let students = parse_students(&read_json(&students)?)?;
            let roster = load_roster(&roster)?;
            print_json(&AdaptiveConstraintStrategist::with_config(&config).analyze(&students, &roster))?;
        }
        Commands::Recommend {
            students,
            roster,
            weights,
        } => {
            let students = parse_students(&read_json(&students)?)?;
            let roster = load_roster(&roster)?;
            let base: BTreeMap<String, f64> = match weights {
                Some(path) => serde_json::from_value(read_json(&path)?)
                    .with_context(|| format!("invalid weight map in {}", path.display()))?,
                None => default_weights(),
            };
            let result =
                AdaptiveConstraintStrategist::with_config(&config).recommend(&students, &roster, &base);
            print_json(&result)?;
        }
        Commands::Validate { constraints } => {
            let constraints: ConstraintConfig = serde_json::from_value(read_json(&constraints)?)
                .with_context(|| format!("invalid constraint config in {}", constraints.display()))?;
            let result = ConstraintValidator::with_config(&config).validate(&constraints);
            print_json(&result)?;
            if !result.is_valid {
                std::process::exit(2);
            }
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("failed to parse JSON in {}", path.display()))
}

/// 按扩展名读取花名册
fn load_roster(path: &Path) -> anyhow::Result<Vec<Teacher>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let roster = if is_csv {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        parse_roster_csv(file)
    } else {
        parse_roster(&read_json(path)?)
    };
    roster.with_context(|| format!("failed to read roster {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
