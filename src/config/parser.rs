use crate::utils::error::{AtlasMnsError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// 檔案開頭隱含的區段名稱
pub const ROOT_SECTION: &str = "root";
/// 其中的鍵對所有區段生效，除非該區段自己設定了同名鍵
pub const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub section: String,
    pub key: String,
    pub value: String,
    pub line: usize,
}

/// 解析 `key = value` 設定檔內容
///
/// 檔案內容被視為包在隱含的 `[root]` 區段中。支援 `=` 或 `:` 分隔、`#` 與 `;`
/// 註解、縮排的續行，以及其他 `[section]` 區段（由呼叫端決定是否忽略）。
/// 同一區段內重複的鍵、缺少分隔符號的行都是錯誤，整份檔案不會被部分套用。
pub fn parse_entries(content: &str) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = Vec::new();
    let mut section = ROOT_SECTION.to_string();
    let mut seen_sections = vec![ROOT_SECTION.to_string()];
    // 最後一個鍵所在的索引，續行會接在它後面
    let mut last_entry: Option<usize> = None;
    // 值中間的空行只在後面還有續行時保留，結尾的空行會被丟掉
    let mut pending_blank_lines = 0;

    for (index, raw_line) in content.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = raw_line.trim();

        if trimmed.is_empty() {
            if last_entry.is_some() {
                pending_blank_lines += 1;
            }
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = raw_line.starts_with(|c: char| c.is_whitespace());
        if indented {
            if let Some(entry_index) = last_entry {
                let entry = &mut entries[entry_index];
                for _ in 0..pending_blank_lines {
                    entry.value.push('\n');
                }
                entry.value.push('\n');
                entry.value.push_str(trimmed);
                pending_blank_lines = 0;
                continue;
            }
        }
        pending_blank_lines = 0;

        if trimmed.starts_with('[') {
            let name = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| AtlasMnsError::ConfigParseError {
                    line: line_no,
                    message: format!("Malformed section header '{}'", trimmed),
                })?;
            if seen_sections.iter().any(|s| s == name) {
                return Err(AtlasMnsError::ConfigParseError {
                    line: line_no,
                    message: format!("Section '{}' already exists", name),
                });
            }
            seen_sections.push(name.to_string());
            section = name.to_string();
            last_entry = None;
            continue;
        }

        let (key, value) = split_key_value(trimmed).ok_or_else(|| AtlasMnsError::ConfigParseError {
            line: line_no,
            message: format!("Expected 'key = value', found '{}'", trimmed),
        })?;

        if key.is_empty() {
            return Err(AtlasMnsError::ConfigParseError {
                line: line_no,
                message: "Parameter name cannot be empty".to_string(),
            });
        }

        if let Some(previous) = entries
            .iter()
            .find(|e| e.section == section && e.key == key)
        {
            return Err(AtlasMnsError::ConfigParseError {
                line: line_no,
                message: format!(
                    "Parameter '{}' already set at line {}",
                    key, previous.line
                ),
            });
        }

        entries.push(Entry {
            section: section.clone(),
            key: key.to_string(),
            value: value.to_string(),
            line: line_no,
        });
        last_entry = Some(entries.len() - 1);
    }

    Ok(entries)
}

/// 以第一個出現的 `=` 或 `:` 切開
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let pos = line.find(['=', ':'])?;
    Some((line[..pos].trim(), line[pos + 1..].trim()))
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex is valid")
    })
}

/// 替換環境變數 (例如 ${ATLAS_API_KEY})，未設定的變數保留原樣
pub fn substitute_env_vars(value: &str) -> String {
    env_var_pattern()
        .replace_all(value, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}
