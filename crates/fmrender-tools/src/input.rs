use std::fs::File;
use std::io::{Read, stdin};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use fmrender::Timeline;

/// Read timeline text from a path or stdin ('-').
///
/// Input ending in `.gz` or starting with the gzip magic bytes (0x1F 0x8B)
/// is decompressed.
pub fn read_timeline_text(path: &Path) -> Result<String> {
    let mut raw = Vec::new();
    if path == Path::new("-") {
        stdin()
            .read_to_end(&mut raw)
            .context("failed to read from stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("failed to open input file: {}", path.display()))?
            .read_to_end(&mut raw)
            .with_context(|| format!("failed to read input file: {}", path.display()))?;
    }

    let is_gzip = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
        || raw.starts_with(&[0x1F, 0x8B]);

    let bytes = if is_gzip {
        let mut out = Vec::new();
        GzDecoder::new(&raw[..])
            .read_to_end(&mut out)
            .context("gzip decompression failed")?;
        out
    } else {
        raw
    };

    String::from_utf8(bytes).context("timeline is not valid UTF-8")
}

/// Read and parse a timeline, reporting the input path on failure.
pub fn load_timeline(path: &Path) -> Result<Timeline> {
    let text = read_timeline_text(path)?;
    text.parse::<Timeline>()
        .with_context(|| format!("failed to parse timeline: {}", path.display()))
}
