use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::warn;

pub const TAIL_LINES: usize = 100;
/// Only this much of the end of a log file is read per request.
pub const TAIL_WINDOW_BYTES: u64 = 256 * 1024;
pub const PLACEHOLDER_LINE: &str = "Log viewer coming soon";

/// Last `TAIL_LINES` non-blank lines of the first log file that exists.
///
/// Falls back to a single placeholder line when no candidate exists or the
/// chosen file cannot be read.
pub async fn tail_first_existing(candidates: &[PathBuf]) -> Vec<String> {
    for path in candidates {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            continue;
        }
        return match read_tail(path, TAIL_WINDOW_BYTES).await {
            Ok(lines) => lines,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read log file");
                vec![PLACEHOLDER_LINE.to_string()]
            }
        };
    }
    vec![PLACEHOLDER_LINE.to_string()]
}

async fn read_tail(path: &Path, window: u64) -> std::io::Result<Vec<String>> {
    let mut file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    let start = len.saturating_sub(window);
    file.seek(SeekFrom::Start(start)).await?;

    let mut bytes = Vec::with_capacity((len - start) as usize);
    file.read_to_end(&mut bytes).await?;

    // A window that starts mid-file begins with a partial line.
    let body = if start > 0 {
        match bytes.iter().position(|&b| b == b'\n') {
            Some(i) => &bytes[i + 1..],
            None => &[][..],
        }
    } else {
        &bytes[..]
    };

    let text = String::from_utf8_lossy(body);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let first = lines.len().saturating_sub(TAIL_LINES);
    Ok(lines[first..].iter().map(|l| l.to_string()).collect())
}
