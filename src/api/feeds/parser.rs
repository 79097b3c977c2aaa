use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Rss,
    Atom,
}

impl FeedKind {
    /// Source name for entries whose link has no host
    pub fn fallback_source(&self) -> &'static str {
        match self {
            FeedKind::Rss => "RSS",
            FeedKind::Atom => "Atom",
        }
    }
}

/// One `<item>` or `<entry>`, text fields trimmed, nothing validated yet
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub kind: FeedKind,
    pub title: String,
    pub link: String,
    /// Raw date text; Atom prefers `updated` over `published`
    pub published: String,
    pub summary: String,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Link,
    Published,
    Updated,
    Summary,
}

fn field_for(kind: FeedKind, name: &[u8]) -> Option<Field> {
    match (kind, name) {
        (_, b"title") => Some(Field::Title),
        (FeedKind::Rss, b"link") => Some(Field::Link),
        (FeedKind::Rss, b"pubDate") | (FeedKind::Atom, b"published") => Some(Field::Published),
        (FeedKind::Atom, b"updated") => Some(Field::Updated),
        (FeedKind::Rss, b"description") | (FeedKind::Atom, b"summary") => Some(Field::Summary),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct PartialEntry {
    title: String,
    link: String,
    published: String,
    updated: String,
    summary: String,
}

impl PartialEntry {
    fn push(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
            Field::Summary => &mut self.summary,
        };
        target.push_str(text);
    }

    /// Atom links live in attributes; the first alternate link wins
    fn take_link(&mut self, start: &BytesStart) {
        if !self.link.is_empty() {
            return;
        }
        let mut href = None;
        let mut alternate = true;
        for attr in start.attributes().flatten() {
            match attr.key.local_name().as_ref() {
                b"href" => href = attr.unescape_value().ok().map(Cow::into_owned),
                b"rel" => alternate = attr.value.as_ref() == b"alternate",
                _ => {}
            }
        }
        if let (true, Some(href)) = (alternate, href) {
            self.link = href.trim().to_string();
        }
    }

    fn finish(self, kind: FeedKind) -> FeedEntry {
        let published = if kind == FeedKind::Atom && !self.updated.trim().is_empty() {
            self.updated
        } else {
            self.published
        };
        FeedEntry {
            kind,
            title: self.title.trim().to_string(),
            link: self.link.trim().to_string(),
            published: published.trim().to_string(),
            summary: self.summary.trim().to_string(),
        }
    }
}

/// Collect every RSS `<item>` and Atom `<entry>` in document order.
///
/// Text that is not valid XML-escaped (HTML entities in descriptions, say) is
/// kept verbatim instead of failing the feed.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<FeedEntry>, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut entries = Vec::new();
    let mut current: Option<(FeedKind, PartialEntry)> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => match start.local_name().as_ref() {
                b"item" if current.is_none() => current = Some((FeedKind::Rss, PartialEntry::default())),
                b"entry" if current.is_none() => current = Some((FeedKind::Atom, PartialEntry::default())),
                name => {
                    if let Some((kind, partial)) = current.as_mut() {
                        if *kind == FeedKind::Atom && name == b"link" {
                            partial.take_link(&start);
                        }
                        field = field_for(*kind, name);
                    }
                }
            },
            Event::Empty(start) => {
                if let Some((FeedKind::Atom, partial)) = current.as_mut() {
                    if start.local_name().as_ref() == b"link" {
                        partial.take_link(&start);
                    }
                }
            }
            Event::Text(text) => {
                if let (Some((_, partial)), Some(f)) = (current.as_mut(), field) {
                    let value = text
                        .unescape()
                        .map(Cow::into_owned)
                        .unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned());
                    partial.push(f, &value);
                }
            }
            Event::CData(data) => {
                if let (Some((_, partial)), Some(f)) = (current.as_mut(), field) {
                    partial.push(f, &String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(end) => {
                if matches!(end.local_name().as_ref(), b"item" | b"entry") {
                    if let Some((kind, partial)) = current.take() {
                        entries.push(partial.finish(kind));
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}
