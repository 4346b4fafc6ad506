// ==========================================
// 项目评审排期系统 - 命令行入口
// ==========================================
// 用法:
//   review-scheduler <command> [--config PATH] [--date YYYY-MM-DD]
//                    [--status STATUS] [--month N] [--year N] [--out PATH]
//
// 命令:
//   calculate  重算下次评审日期与状态
//   assign     为待评审项目分配评审人
//   run        calculate 后接 assign
//   validate   校验三张实体集
//   report     schedule | workload | overdue（--out 导出 CSV）
//   notify     为活跃评审发送通知（仅记录日志）
// ==========================================

use anyhow::{anyhow, bail, Context};
use chrono::{Datelike, NaiveDate};
use review_scheduler::api::{parse_reference_date, resolve_reference_date, SchedulerApi};
use review_scheduler::config::SchedulerConfig;
use review_scheduler::engine::report::{write_overdue_csv, write_schedule_csv, write_workload_csv};
use review_scheduler::engine::LogNotificationSink;
use review_scheduler::{logging, ProjectStatus, APP_NAME, VERSION};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    command: String,
    report_kind: Option<String>,
    config: Option<PathBuf>,
    date: Option<NaiveDate>,
    status: Option<ProjectStatus>,
    month: Option<u32>,
    year: Option<i32>,
    out: Option<PathBuf>,
}

fn parse_args(args: impl Iterator<Item = String>) -> anyhow::Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut args = args;

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("{} 缺少参数值", flag))
        };

        match arg.as_str() {
            "--config" => cli.config = Some(PathBuf::from(value("--config")?)),
            "--date" => cli.date = Some(parse_reference_date(&value("--date")?)?),
            "--status" => {
                let raw = value("--status")?;
                cli.status = Some(
                    ProjectStatus::parse(&raw)
                        .ok_or_else(|| anyhow!("无法识别的项目状态: {}", raw))?,
                );
            }
            "--month" => {
                cli.month = Some(value("--month")?.parse::<u32>().context("--month 应为整数")?)
            }
            "--year" => cli.year = Some(value("--year")?.parse::<i32>().context("--year 应为整数")?),
            "--out" => cli.out = Some(PathBuf::from(value("--out")?)),
            flag if flag.starts_with("--") => bail!("未知参数: {}", flag),
            word if cli.command.is_empty() => cli.command = word.to_string(),
            word if cli.command == "report" && cli.report_kind.is_none() => {
                cli.report_kind = Some(word.to_string())
            }
            word => bail!("多余的参数: {}", word),
        }
    }

    if cli.command.is_empty() {
        bail!("缺少命令 (calculate | assign | run | validate | report | notify)");
    }
    Ok(cli)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = parse_args(std::env::args().skip(1))?;
    tracing::info!(app = APP_NAME, version = VERSION, command = %cli.command, "启动");

    let config = SchedulerConfig::load(cli.config.as_deref())?;
    let api = SchedulerApi::open(config)?;

    match cli.command.as_str() {
        "calculate" => print_json(&api.calculate_reviews(cli.date)?)?,
        "assign" => print_json(&api.assign_reviewers(cli.date)?)?,
        "run" => print_json(&api.run_cycle(cli.date)?)?,
        "validate" => {
            let report = api.validate()?;
            print_json(&report)?;
            if !report.is_valid() {
                std::process::exit(2);
            }
        }
        "report" => {
            let reference_date = resolve_reference_date(cli.date);
            match cli.report_kind.as_deref().unwrap_or("schedule") {
                "schedule" => {
                    let year = cli.year.unwrap_or_else(|| reference_date.year());
                    let month = cli.month.unwrap_or_else(|| reference_date.month());
                    let rows = api.monthly_schedule(year, month)?;
                    match &cli.out {
                        Some(path) => write_schedule_csv(path, &rows)?,
                        None => print_json(&rows)?,
                    }
                }
                "workload" => {
                    let rows = api.workload_report()?;
                    match &cli.out {
                        Some(path) => write_workload_csv(path, &rows)?,
                        None => print_json(&rows)?,
                    }
                }
                "overdue" => {
                    let rows = api.overdue_alerts(Some(reference_date))?;
                    match &cli.out {
                        Some(path) => write_overdue_csv(path, &rows)?,
                        None => print_json(&rows)?,
                    }
                }
                other => bail!("未知报表类型: {} (schedule | workload | overdue)", other),
            }
            if let Some(path) = &cli.out {
                tracing::info!(path = %path.display(), "报表已导出");
            }
        }
        "notify" => {
            let summary = api.send_notifications(cli.status, &LogNotificationSink)?;
            print_json(&summary)?;
        }
        other => bail!("未知命令: {}", other),
    }

    Ok(())
}
