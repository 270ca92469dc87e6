use chrono::{DateTime, Datelike, Timelike, Utc};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// A path pattern with `%`-prefixed date/time placeholders.
///
/// The pattern is scanned once at compile time; resolving substitutes the
/// placeholders against a UTC reading of the given instant. Supported
/// tokens, all fixed-width and zero-padded:
///
/// | Token | Meaning | Format |
/// |-------|---------|--------|
/// | `%Y` | year | 4 digits |
/// | `%m` | month | `01`–`12` |
/// | `%d` | day of month | `01`–`31` |
/// | `%x` | calendar date | `YYYY-MM-DD` |
/// | `%h` | hour | `00`–`23` |
/// | `%M` | minute | `00`–`59` |
/// | `%S` | second | `00`–`61` |
/// | `%X` | time of day | `HH:MM:SS` |
/// | `%I` | date-time | `YYYY-MM-DDTHH:MM:SS` |
///
/// Unrecognized `%`-tokens (and a lone trailing `%`) pass through verbatim.
/// A relative resolved path is joined onto the anchor directory; a pattern
/// with no recognized placeholder resolves once at compile time and is
/// cached for every later call.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use logroll::PathTemplate;
/// use std::path::Path;
///
/// let tpl = PathTemplate::compile("logs/app-%x.log", Path::new("/srv"));
/// let now = Utc.with_ymd_and_hms(2012, 9, 24, 15, 12, 47).unwrap();
/// assert_eq!(
///     tpl.resolve_at(now),
///     Path::new("/srv/logs/app-2012-09-24.log")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PathTemplate {
    pattern: String,
    segments: Vec<Segment>,
    anchor: PathBuf,
    fixed: Option<PathBuf>,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Field(Field),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year,
    Month,
    Day,
    Date,
    Hour,
    Minute,
    Second,
    Time,
    DateTime,
}

impl Field {
    fn from_token(token: char) -> Option<Field> {
        match token {
            'Y' => Some(Field::Year),
            'm' => Some(Field::Month),
            'd' => Some(Field::Day),
            'x' => Some(Field::Date),
            'h' => Some(Field::Hour),
            'M' => Some(Field::Minute),
            'S' => Some(Field::Second),
            'X' => Some(Field::Time),
            'I' => Some(Field::DateTime),
            _ => None,
        }
    }

    fn render(self, now: DateTime<Utc>, out: &mut String) {
        // Writing to a String never fails.
        let _ = match self {
            Field::Year => write!(out, "{:04}", now.year()),
            Field::Month => write!(out, "{:02}", now.month()),
            Field::Day => write!(out, "{:02}", now.day()),
            Field::Date => write!(out, "{:04}-{:02}-{:02}", now.year(), now.month(), now.day()),
            Field::Hour => write!(out, "{:02}", now.hour()),
            Field::Minute => write!(out, "{:02}", now.minute()),
            Field::Second => write!(out, "{:02}", now.second()),
            Field::Time => write!(out, "{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second()),
            Field::DateTime => write!(
                out,
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
                now.year(),
                now.month(),
                now.day(),
                now.hour(),
                now.minute(),
                now.second()
            ),
        };
    }
}

impl PathTemplate {
    /// Compile a pattern, capturing `anchor` as the base for relative
    /// resolved paths.
    pub fn compile(pattern: &str, anchor: &Path) -> PathTemplate {
        let segments = parse(pattern);
        let fixed = if segments.iter().any(|s| matches!(s, Segment::Field(_))) {
            None
        } else {
            // No recognized placeholder: every byte is literal, so the
            // resolution can never change.
            Some(anchored(anchor, Path::new(pattern)))
        };
        PathTemplate {
            pattern: pattern.to_string(),
            segments,
            anchor: anchor.to_path_buf(),
            fixed,
        }
    }

    /// The raw pattern this template was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the pattern contains no recognized placeholder, meaning
    /// every resolution returns the same path.
    pub fn is_static(&self) -> bool {
        self.fixed.is_some()
    }

    /// Resolve the pattern against `now`.
    pub fn resolve_at(&self, now: DateTime<Utc>) -> PathBuf {
        if let Some(fixed) = &self.fixed {
            return fixed.clone();
        }
        let mut out = String::with_capacity(self.pattern.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => field.render(now, &mut out),
            }
        }
        anchored(&self.anchor, Path::new(&out))
    }

    /// Resolve the pattern against the current instant.
    pub fn resolve_now(&self) -> PathBuf {
        self.resolve_at(Utc::now())
    }
}

fn parse(pattern: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        match chars.next() {
            Some(token) => match Field::from_token(token) {
                Some(field) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                }
                None => {
                    literal.push('%');
                    literal.push(token);
                }
            },
            // Lone '%' at the end of the pattern.
            None => literal.push('%'),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

fn anchored(anchor: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        anchor.join(path)
    }
}
