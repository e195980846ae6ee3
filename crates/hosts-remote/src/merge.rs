//! Marker-delimited region merging for remote hosts content.
//!
//! Each remote source owns at most one region in the merged file, bracketed
//! by literal begin/end markers derived from the source name. Content is
//! parsed into a sequence of segments first; [`clean`] and [`merge`] are
//! pure functions over that sequence, so re-merging a source replaces its
//! region instead of stacking duplicates.

/// Text shared by every begin marker, used to find where any region starts.
const GENERIC_BEGIN: &str = "\n\n# ===== BEGIN REMOTE: ";

const BEGIN_SUFFIX: &str = " =====";

/// Begin marker for `name`. Blank-line padded so the region stands apart
/// from hand-written entries.
#[must_use]
pub fn begin_marker(name: &str) -> String {
    format!("{GENERIC_BEGIN}{name}{BEGIN_SUFFIX}\n")
}

/// End marker for `name`.
#[must_use]
pub fn end_marker(name: &str) -> String {
    format!("\n# ===== END REMOTE: {name} =====\n\n")
}

/// One parsed piece of hosts-file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text outside any tagged region, kept byte-for-byte.
    Literal(String),
    /// A well-formed region: begin and end markers both present, end first.
    Region { name: String, body: String },
    /// A begin marker whose end marker never arrives before the next begin
    /// marker or end of content. `raw` holds the whole span, markers
    /// included, so rendering stays lossless.
    Unterminated { name: String, raw: String },
}

impl Segment {
    /// Source name of a tagged segment, `None` for literals.
    #[must_use]
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Region { name, .. } | Self::Unterminated { name, .. } => Some(name),
        }
    }
}

/// Split `content` into literal and region segments.
///
/// Every byte of the input lands in exactly one segment, so
/// `render(&parse(content)) == content` for any input. A begin marker with
/// a malformed header line is not a region start and stays literal text.
#[must_use]
pub fn parse(content: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(found) = content[cursor..].find(GENERIC_BEGIN) {
        let begin = cursor + found;
        let header_start = begin + GENERIC_BEGIN.len();
        let Some((name, body_start)) = parse_begin_header(content, header_start) else {
            cursor = header_start;
            continue;
        };

        if literal_start < begin {
            segments.push(Segment::Literal(content[literal_start..begin].to_string()));
        }

        let end_tag = end_marker(&name);
        let next_begin = content[body_start..]
            .find(GENERIC_BEGIN)
            .map(|offset| body_start + offset);
        let end_at = content[body_start..]
            .find(&end_tag)
            .map(|offset| body_start + offset);

        match end_at {
            Some(end) if next_begin.is_none_or(|next| end < next) => {
                segments.push(Segment::Region {
                    name,
                    body: content[body_start..end].to_string(),
                });
                cursor = end + end_tag.len();
            }
            _ => {
                let stop = next_begin.unwrap_or(content.len());
                segments.push(Segment::Unterminated {
                    name,
                    raw: content[begin..stop].to_string(),
                });
                cursor = stop;
            }
        }
        literal_start = cursor;
    }

    if literal_start < content.len() {
        segments.push(Segment::Literal(content[literal_start..].to_string()));
    }
    segments
}

/// The source name and body start, if a valid begin-marker header line
/// starts at `header_start`.
fn parse_begin_header(content: &str, header_start: usize) -> Option<(String, usize)> {
    let rest = &content[header_start..];
    let line_end = rest.find('\n')?;
    let name = rest[..line_end].strip_suffix(BEGIN_SUFFIX)?;
    Some((name.to_string(), header_start + line_end + 1))
}

/// Concatenate segments back into hosts-file content.
#[must_use]
pub fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Region { name, body } => {
                out.push_str(&begin_marker(name));
                out.push_str(body);
                out.push_str(&end_marker(name));
            }
            Segment::Unterminated { raw, .. } => out.push_str(raw),
        }
    }
    out
}

/// Remove every region tagged with `source_name`, truncated ones included.
/// Unrelated content and other sources' regions pass through untouched,
/// which makes this idempotent.
#[must_use]
pub fn clean(content: &str, source_name: &str) -> String {
    let kept: Vec<Segment> = parse(content)
        .into_iter()
        .filter(|segment| segment.source_name() != Some(source_name))
        .collect();
    render(&kept)
}

/// Replace the region for `source_name` with `remote` content.
///
/// The current content gets a trailing newline if it lacks one, any stale
/// region for this source is removed, and a fresh marker-bracketed region
/// is appended. After this, exactly one region for `source_name` exists.
#[must_use]
pub fn merge(current: &str, remote: &str, source_name: &str) -> String {
    let mut base = current.to_string();
    if !base.is_empty() && !base.ends_with('\n') {
        base.push('\n');
    }
    let mut merged = clean(&base, source_name);
    merged.push_str(&begin_marker(source_name));
    merged.push_str(remote);
    merged.push_str(&end_marker(source_name));
    merged
}
