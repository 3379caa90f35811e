use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

lazy_static! {
    static ref USER_INFO_EMAIL: Regex =
        Regex::new(r#""userInfo"\s*:\s*\{\s*"email"\s*:\s*"([^"]+)""#).unwrap();
    static ref ANY_EMAIL: Regex = Regex::new(r#""email"\s*:\s*"([^"]+)""#).unwrap();
}

/// Pull the signed-in account out of raw Local Storage bytes.
///
/// The `userInfo` record wins over any other `email` field.
pub fn extract_email(content: &str) -> Option<String> {
    [&*USER_INFO_EMAIL, &*ANY_EMAIL].iter().find_map(|pattern| {
        pattern
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .find(|candidate| looks_like_email(candidate))
            .map(str::to_string)
    })
}

fn looks_like_email(candidate: &str) -> bool {
    candidate.contains('@') && candidate.contains('.')
}

/// Scan the browser's Local Storage leveldb for the logged-in e-mail.
///
/// Write-ahead `.log` files are read before compacted `.ldb` tables,
/// newest first within each kind.
pub fn detect_logged_in_email(browser_data: &Path) -> Option<String> {
    let leveldb = browser_data.join("Local Storage").join("leveldb");
    let entries = match fs::read_dir(&leveldb) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("No Local Storage at {}: {}", leveldb.display(), e);
            return None;
        }
    };

    let mut candidates: Vec<(u8, SystemTime, PathBuf)> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter_map(|path| {
            let rank = match path.extension().and_then(|e| e.to_str()) {
                Some("log") => 0,
                Some("ldb") => 1,
                _ => return None,
            };
            let modified = fs::metadata(&path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            Some((rank, modified, path))
        })
        .collect();
    candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    for (_, _, path) in candidates {
        let Ok(bytes) = fs::read(&path) else {
            tracing::warn!("Could not read {}", path.display());
            continue;
        };
        if let Some(email) = extract_email(&String::from_utf8_lossy(&bytes)) {
            tracing::debug!("Detected {} in {}", email, path.display());
            return Some(email);
        }
    }

    None
}
