use super::types::EnclosureRecord;

/// Accumulates one `url`/`length`/`type` triplet.
#[derive(Debug, Default)]
struct PendingEnclosure {
    url: Option<String>,
    length: Option<String>,
    mime_type: Option<String>,
}

impl PendingEnclosure {
    /// Returns the completed record and resets, once all three keys are set.
    fn take_complete(&mut self) -> Option<EnclosureRecord> {
        if self.url.is_none() || self.length.is_none() || self.mime_type.is_none() {
            return None;
        }
        let pending = std::mem::take(self);
        Some(EnclosureRecord {
            url: pending.url?,
            length: pending.length?,
            mime_type: pending.mime_type?,
        })
    }
}

/// Parses a line-oriented `key=value` block into enclosure records.
///
/// Lines are trimmed and split on the first `=`. Only the exact keys
/// `url`, `length` and `type` are recognized; everything else is ignored.
/// A record is emitted as soon as all three keys have been seen, after
/// which a fresh record starts. An incomplete trailing record is dropped.
///
/// ```
/// use georss::feed::parse_enclosures;
///
/// let records = parse_enclosures("url=http://x/a.mp3\nlength=10\ntype=audio/mpeg");
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].mime_type, "audio/mpeg");
/// ```
pub fn parse_enclosures(block: &str) -> Vec<EnclosureRecord> {
    let mut records = Vec::new();
    let mut pending = PendingEnclosure::default();

    for line in block.split(['\r', '\n']).map(str::trim) {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let slot = match key {
            "url" => &mut pending.url,
            "length" => &mut pending.length,
            "type" => &mut pending.mime_type,
            _ => continue,
        };
        *slot = Some(value.to_string());

        if let Some(record) = pending.take_complete() {
            records.push(record);
        }
    }

    records
}
