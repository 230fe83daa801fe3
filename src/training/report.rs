/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 训练日志：LogReport 按触发间隔汇总观测值并落盘为 JSON，
 *                 PrintReport 把新增的日志条目按列打印到终端或文件
 */

use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{IntervalTrigger, Observation, Summary, TrainingError, TrainingState, write_atomic};

/// 一条日志：各观测键的均值，加上`epoch`、`iteration`、`elapsed_time`
pub type LogEntry = serde_json::Map<String, Value>;

// ==================== LogReport ====================

/// 按`trigger`间隔汇总观测值的日志
///
/// 触发时把区间内各键的均值连同训练进度追加为一条日志，
/// 若设置了`log_name`则把完整日志以 JSON 数组写入输出目录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogReport {
    trigger: IntervalTrigger,
    log_name: Option<String>,
    log: Vec<LogEntry>,
    #[serde(skip)]
    summary: Summary,
}

impl Default for LogReport {
    fn default() -> Self {
        Self::new(IntervalTrigger::epoch(1), Some("log"))
    }
}

impl LogReport {
    pub fn new(trigger: IntervalTrigger, log_name: Option<&str>) -> Self {
        Self {
            trigger,
            log_name: log_name.map(str::to_string),
            log: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// 累计一次观测；触发时生成新日志条目并返回`true`
    pub fn observe(
        &mut self,
        state: &TrainingState,
        observation: &Observation,
        out_dir: &Path,
    ) -> Result<bool, TrainingError> {
        self.summary.add(observation);
        if !self.trigger.fire(state) {
            return Ok(false);
        }

        let mut entry = self
            .summary
            .compute_mean()
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect::<LogEntry>();
        entry.insert("epoch".to_string(), Value::from(state.epoch));
        entry.insert("iteration".to_string(), Value::from(state.iteration));
        entry.insert("elapsed_time".to_string(), Value::from(state.elapsed_time));
        self.log.push(entry);

        if let Some(log_name) = &self.log_name {
            write_atomic(out_dir, log_name, |path| {
                let writer = BufWriter::new(File::create(path)?);
                serde_json::to_writer_pretty(writer, &self.log)?;
                Ok(())
            })?;
        }

        self.summary.clear();
        Ok(true)
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }
}

// ==================== PrintReport ====================

/// 每列的最小宽度
const MIN_WIDTH: usize = 10;

/// 把日志按列打印出来：第一次调用时先打印表头，之后每次只打印新增的条目
pub struct PrintReport<W: Write> {
    entries: Vec<String>,
    widths: Vec<usize>,
    out: W,
    header_printed: bool,
    log_len: usize,
}

impl PrintReport<Stdout> {
    /// 打印到终端
    pub fn stdout(entries: &[&str]) -> Self {
        Self::new(entries, io::stdout())
    }
}

impl PrintReport<BufWriter<File>> {
    /// 打印到文件（覆盖已有内容）
    pub fn to_file(entries: &[&str], path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(entries, BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> PrintReport<W> {
    pub fn new(entries: &[&str], out: W) -> Self {
        Self {
            entries: entries.iter().map(|e| (*e).to_string()).collect(),
            widths: entries
                .iter()
                .map(|e| e.chars().count().max(MIN_WIDTH))
                .collect(),
            out,
            header_printed: false,
            log_len: 0,
        }
    }

    /// 打印`log`中尚未打印过的条目
    pub fn update(&mut self, log: &[LogEntry]) -> io::Result<()> {
        if !self.header_printed {
            let header = self
                .entries
                .iter()
                .zip(&self.widths)
                .map(|(entry, &width)| format!("{entry:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            writeln!(self.out, "{header}")?;
            self.header_printed = true;
        }

        for entry in log.iter().skip(self.log_len) {
            let mut line = String::new();
            for (key, &width) in self.entries.iter().zip(&self.widths) {
                match entry.get(key) {
                    Some(value) => line.push_str(&format!("{:<width$}  ", format_value(value))),
                    None => line.push_str(&" ".repeat(width + 2)),
                }
            }
            writeln!(self.out, "{line}")?;
        }
        self.log_len = self.log_len.max(log.len());
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// 整数原样输出，浮点数按6位有效数字的通用格式（同 C 的`%g`）
fn format_value(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_u64() || n.is_i64() => n.to_string(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), format_general),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_general(v: f64) -> String {
    const PRECISION: i32 = 6;
    if v == 0.0 || !v.is_finite() {
        return v.to_string();
    }

    let exp = v.abs().log10().floor() as i32;
    if exp < -4 || exp >= PRECISION {
        let s = format!("{:.*e}", (PRECISION - 1) as usize, v);
        let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
        let exponent = exponent.parse::<i32>().unwrap_or(0);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_zeros(mantissa), exponent.abs())
    } else {
        let decimals = (PRECISION - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{v:.decimals$}")).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
