//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{ApiSettings, Settings};
use crate::media::resolve_tool;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Vett Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let sections = [
        ("External Tools", check_tools(settings)),
        ("API Configuration", check_api_keys(settings)),
        ("Knowledge Store", check_knowledge(settings)),
        ("Configuration", vec![check_config_file()]),
    ];

    let mut checks = Vec::new();
    for (title, results) in sections {
        println!("{}", style(title).bold());
        for check in &results {
            check.print();
        }
        println!();
        checks.extend(results);
    }

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Vett.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Vett is ready to use.");
    }

    Ok(())
}

/// Video tools are optional: without them answers simply carry no video.
fn check_tools(settings: &Settings) -> Vec<CheckResult> {
    if !settings.media.enabled {
        return vec![CheckResult::ok("Video tools", "disabled in config")];
    }

    vec![
        check_tool("yt-dlp", &settings.media.yt_dlp_path, "--version", install_hint_ytdlp()),
        check_tool("ffmpeg", &settings.media.ffmpeg_path, "-version", install_hint_ffmpeg()),
    ]
}

fn check_tool(name: &str, configured: &str, version_arg: &str, hint: &str) -> CheckResult {
    let Some(path) = resolve_tool(configured) else {
        return CheckResult::warning(name, &format!("'{}' not found", configured), hint);
    };

    match Command::new(&path).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .chars()
                .take(50)
                .collect::<String>();
            CheckResult::ok(name, &version)
        }
        Ok(_) => CheckResult::warning(name, "installed but not working", hint),
        Err(e) => CheckResult::warning(name, &format!("error: {}", e), hint),
    }
}

fn check_api_keys(settings: &Settings) -> Vec<CheckResult> {
    let mut results = vec![
        check_api_key("Chat backend", &settings.backend, true),
        check_api_key("Embeddings", &settings.embedding.api, true),
        check_api_key("Speech", &settings.speech.api, false),
    ];

    let google = [
        &settings.web.google_api_key_env,
        &settings.web.google_engine_id_env,
    ];
    if google.iter().all(|name| env_is_set(name)) {
        results.push(CheckResult::ok("Google search", "configured"));
    } else {
        results.push(CheckResult::warning(
            "Google search",
            "not configured",
            &format!(
                "Set {} and {}; DuckDuckGo is used until then",
                google[0], google[1]
            ),
        ));
    }

    results
}

fn check_api_key(name: &str, api: &ApiSettings, required: bool) -> CheckResult {
    let var = &api.api_key_env;
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => {
            CheckResult::ok(name, &format!("{} set ({})", var, mask_key(&key)))
        }
        _ => {
            let hint = format!("Set with: export {}='...'", var);
            if required {
                CheckResult::error(name, &format!("{} not set", var), &hint)
            } else {
                CheckResult::warning(name, &format!("{} not set", var), &hint)
            }
        }
    }
}

fn env_is_set(name: &str) -> bool {
    std::env::var(name).map(|v| !v.trim().is_empty()).unwrap_or(false)
}

fn check_knowledge(settings: &Settings) -> Vec<CheckResult> {
    let provider = settings.knowledge.provider.as_str();
    match provider {
        "memory" => vec![CheckResult::warning(
            "Provider",
            "memory",
            "Learned knowledge is lost on exit; use provider = \"sqlite\" to keep it",
        )],
        "sqlite" => {
            let db_path = settings.sqlite_path();
            if db_path.exists() {
                let size = std::fs::metadata(&db_path)
                    .map(|m| format_size(m.len()))
                    .unwrap_or_else(|_| "unknown size".to_string());
                vec![CheckResult::ok(
                    "Database",
                    &format!("{} ({})", db_path.display(), size),
                )]
            } else {
                vec![CheckResult::warning(
                    "Database",
                    &format!("{} (not created yet)", db_path.display()),
                    "Database will be created on the first question",
                )]
            }
        }
        other => vec![CheckResult::error(
            "Provider",
            &format!("unknown provider '{}'", other),
            "Use \"sqlite\" or \"memory\"",
        )],
    }
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: vett config edit",
        )
    }
}

/// First and last four characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}
