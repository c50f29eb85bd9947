//! 报告汇总
//!
//! 报告格式：
//! ```text
//! Command run: <command>
//! Output from <host>:
//! <line>
//! ...
//! <空行>
//! ```
//! 只写入有输出的主机，按提交顺序排列；报告文件只追加不覆盖。

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::dispatch::HostResult;
use crate::error::AppError;

/// 输出脱敏器
pub struct OutputSanitizer {
    rules: Vec<SanitizeRule>,
}

/// 脱敏规则
#[derive(Clone, Debug)]
pub struct SanitizeRule {
    pattern: Regex,
    replacement: String,
}

impl SanitizeRule {
    fn new(pattern: Regex, replacement: impl Into<String>) -> Self {
        Self {
            pattern,
            replacement: replacement.into(),
        }
    }
}

impl OutputSanitizer {
    /// 创建默认脱敏器
    pub fn new_default() -> Self {
        let rule = |pattern: &str, replacement: &str| {
            SanitizeRule::new(
                Regex::new(pattern).expect("built-in sanitize pattern"),
                replacement,
            )
        };

        Self {
            rules: vec![
                rule(r"(?i)(password|passwd|pwd)[\s=:]+[^\s]+", "$1=***"),
                rule(r"(?i)(api[_-]?key|apikey)[\s=:]+[^\s]+", "$1=***"),
                rule(
                    r"(?i)(token|access[_-]?token|refresh[_-]?token)[\s=:]+[^\s]+",
                    "$1=***",
                ),
                rule(
                    r"(?i)(secret|private[_-]?key|secret[_-]?key|community)[\s=:]+[^\s]+",
                    "$1=***",
                ),
            ],
        }
    }

    pub fn sanitize(&self, output: &str) -> String {
        let mut result = output.to_string();

        for rule in &self.rules {
            result = rule.pattern.replace_all(&result, &rule.replacement).to_string();
        }

        result
    }

    pub fn contains_sensitive(&self, output: &str) -> bool {
        self.rules.iter().any(|rule| rule.pattern.is_match(output))
    }
}

/// 全局默认脱敏器
static DEFAULT_SANITIZER: Lazy<Arc<OutputSanitizer>> =
    Lazy::new(|| Arc::new(OutputSanitizer::new_default()));

/// 获取默认脱敏器
pub fn default_sanitizer() -> Arc<OutputSanitizer> {
    Arc::clone(&DEFAULT_SANITIZER)
}

/// 报告写入器
#[derive(Clone, Default)]
pub struct ReportWriter {
    sanitizer: Option<Arc<OutputSanitizer>>,
}

impl ReportWriter {
    /// 输出原样写入
    pub fn new() -> Self {
        Self { sanitizer: None }
    }

    /// 写入前对每行脱敏
    pub fn sanitized() -> Self {
        Self {
            sanitizer: Some(default_sanitizer()),
        }
    }

    pub fn from_flag(sanitize: bool) -> Self {
        if sanitize {
            Self::sanitized()
        } else {
            Self::new()
        }
    }

    /// 渲染一次运行的报告内容
    pub fn render_entries<'a, I>(&self, command: &str, entries: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let mut report = format!("Command run: {}\n", command);

        for (host, lines) in entries {
            if lines.is_empty() {
                continue;
            }

            report.push_str(&format!("Output from {}:\n", host));
            for line in lines {
                match &self.sanitizer {
                    Some(sanitizer) => report.push_str(&sanitizer.sanitize(line)),
                    None => report.push_str(line),
                }
                report.push('\n');
            }
            report.push('\n');
        }

        report
    }

    pub fn render(&self, command: &str, results: &[HostResult]) -> String {
        self.render_entries(
            command,
            results.iter().map(|r| (r.host.as_str(), r.lines())),
        )
    }

    /// 写入任意输出流
    pub fn write<W: Write>(
        &self,
        sink: &mut W,
        command: &str,
        results: &[HostResult],
    ) -> std::io::Result<usize> {
        let report = self.render(command, results);
        sink.write_all(report.as_bytes())?;
        sink.flush()?;
        Ok(report.len())
    }

    /// 追加写入报告文件（不存在时创建），返回写入字节数
    pub fn append_to_file(
        &self,
        path: impl AsRef<Path>,
        command: &str,
        results: &[HostResult],
    ) -> Result<usize, AppError> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(AppError::Report)?;

        let written = self
            .write(&mut file, command, results)
            .map_err(AppError::Report)?;

        debug!(path = %path.display(), bytes = written, "Report appended");
        Ok(written)
    }
}
