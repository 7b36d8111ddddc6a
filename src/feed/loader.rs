//! RSS 2.0 feed parsing.
//!
//! Streams the generated feed file into a [`FeedDocument`]. Only the
//! fields the rebuilder re-emits are captured; unknown and
//! namespace-prefixed elements are skipped wholesale. Optional fields
//! that are missing or empty become `None`, never empty strings.

use super::{Channel, FeedDocument, FeedError, FeedItem};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Parse a raw RSS document.
///
/// Fatal on structural problems: no `<channel>`, a channel without a
/// `<link>`, an item without a `<link>`, or an empty item list. The
/// caller must not write any output after such a failure.
pub fn parse(xml: &str) -> Result<FeedDocument, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = None;
    loop {
        match next_event(&mut reader)? {
            Event::Start(e) if e.name().as_ref() == b"channel" => {
                parsed = Some(parse_channel(&mut reader)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let Some((channel, items)) = parsed else {
        return Err(FeedError::Malformed("missing <channel> element".into()));
    };
    if items.is_empty() {
        return Err(FeedError::Malformed("channel has no <item> elements".into()));
    }

    Ok(FeedDocument { channel, items })
}

fn parse_channel(reader: &mut Reader<&[u8]>) -> Result<(Channel, Vec<FeedItem>), FeedError> {
    let mut channel = Channel::default();
    let mut link = None;
    let mut items = Vec::new();

    loop {
        match next_event(reader)? {
            Event::Start(e) => match e.name().as_ref() {
                b"item" => items.push(parse_item(reader)?),
                b"title" => channel.title = non_empty(collect_text(reader, b"title")?),
                b"description" => {
                    channel.description = non_empty(collect_text(reader, b"description")?);
                }
                b"link" => link = non_empty(collect_text(reader, b"link")?),
                b"lastBuildDate" => {
                    channel.last_build_date = non_empty(collect_text(reader, b"lastBuildDate")?);
                }
                b"author" => channel.author = non_empty(collect_text(reader, b"author")?),
                _ => skip_element(reader, &e)?,
            },
            Event::End(e) if e.name().as_ref() == b"channel" => break,
            Event::Eof => {
                return Err(FeedError::Malformed("unclosed <channel> element".into()));
            }
            _ => {}
        }
    }

    channel.link = link.ok_or_else(|| FeedError::Malformed("channel is missing <link>".into()))?;
    Ok((channel, items))
}

fn parse_item(reader: &mut Reader<&[u8]>) -> Result<FeedItem, FeedError> {
    let mut item = FeedItem::default();
    let mut link = None;

    loop {
        match next_event(reader)? {
            Event::Start(e) => match e.name().as_ref() {
                b"title" => item.title = non_empty(collect_text(reader, b"title")?),
                b"link" => link = non_empty(collect_text(reader, b"link")?),
                b"description" => {
                    item.description = non_empty(collect_text(reader, b"description")?);
                }
                b"pubDate" => item.pub_date = non_empty(collect_text(reader, b"pubDate")?),
                b"lastUpdatedTimestamp" => {
                    item.last_updated = non_empty(collect_text(reader, b"lastUpdatedTimestamp")?);
                }
                b"category" => {
                    if let Some(category) = non_empty(collect_text(reader, b"category")?) {
                        item.categories.push(category);
                    }
                }
                b"content" => item.content = non_empty(collect_text(reader, b"content")?),
                _ => skip_element(reader, &e)?,
            },
            Event::End(e) if e.name().as_ref() == b"item" => break,
            Event::Eof => return Err(FeedError::Malformed("unclosed <item> element".into())),
            _ => {}
        }
    }

    item.link = link.ok_or_else(|| FeedError::Malformed("item is missing <link>".into()))?;
    Ok(item)
}

/// Accumulate the text content of the current element, dropping any
/// nested markup. Entities are decoded here; the rebuilder re-encodes
/// on the way out.
fn collect_text(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<String, FeedError> {
    let mut text = String::new();
    loop {
        match next_event(reader)? {
            Event::Text(t) => {
                let decoded = t.unescape().map_err(|e| FeedError::Parse {
                    position: reader.buffer_position(),
                    source: quick_xml::Error::from(e),
                })?;
                text.push_str(&decoded);
            }
            Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t)),
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(e) if e.name().as_ref() == end => break,
            Event::Eof => {
                return Err(FeedError::Malformed(format!(
                    "unclosed <{}> element",
                    String::from_utf8_lossy(end)
                )));
            }
            _ => {}
        }
    }
    Ok(text)
}

fn skip_element(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<(), FeedError> {
    reader
        .read_to_end(start.name())
        .map(|_| ())
        .map_err(|e| FeedError::Parse {
            position: reader.error_position(),
            source: e,
        })
}

fn next_event<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Event<'a>, FeedError> {
    reader.read_event().map_err(|e| FeedError::Parse {
        position: reader.error_position(),
        source: e,
    })
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>My Blog</title>
    <description>Posts about things</description>
    <link>https://example.com/</link>
    <atom:link href="https://example.com/rss.xml" rel="self"/>
    <lastBuildDate>Sat, 15 Jun 2024 00:00:00 GMT</lastBuildDate>
    <item>
      <title>Hello &amp; Welcome</title>
      <link>https://example.com/posts/hello-world</link>
      <description><![CDATA[A <b>short</b> intro]]></description>
      <pubDate>Sat, 15 Jun 2024 00:00:00 GMT</pubDate>
      <lastUpdatedTimestamp>2024-06-15T10:00:00Z</lastUpdatedTimestamp>
      <category>rust</category>
      <category>blog</category>
    </item>
    <item>
      <title>Second</title>
      <link>https://example.com/posts/second</link>
      <pubDate>Sun, 16 Jun 2024 00:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_basic_feed() {
        let doc = parse(FEED).unwrap();
        assert_eq!(doc.channel.title.as_deref(), Some("My Blog"));
        assert_eq!(doc.channel.link, "https://example.com/");
        assert_eq!(doc.channel.author, None);
        assert_eq!(doc.items.len(), 2);

        let first = &doc.items[0];
        assert_eq!(first.title.as_deref(), Some("Hello & Welcome"));
        assert_eq!(first.link, "https://example.com/posts/hello-world");
        assert_eq!(first.description.as_deref(), Some("A <b>short</b> intro"));
        assert_eq!(first.last_updated.as_deref(), Some("2024-06-15T10:00:00Z"));
        assert_eq!(first.categories, vec!["rust", "blog"]);
        assert_eq!(first.content, None);
    }

    #[test]
    fn test_missing_optional_fields_are_absent() {
        let doc = parse(FEED).unwrap();
        let second = &doc.items[1];
        assert_eq!(second.description, None);
        assert_eq!(second.last_updated, None);
        assert!(second.categories.is_empty());
    }

    #[test]
    fn test_namespaced_elements_are_skipped() {
        // atom:link must not clobber the channel link
        let doc = parse(FEED).unwrap();
        assert_eq!(doc.channel.link, "https://example.com/");
    }

    #[test]
    fn test_missing_channel_is_fatal() {
        let err = parse(r#"<rss version="2.0"></rss>"#).unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
    }

    #[test]
    fn test_missing_channel_link_is_fatal() {
        let xml = r#"<rss version="2.0"><channel><title>t</title>
            <item><link>https://e.com/p/a</link></item></channel></rss>"#;
        let err = parse(xml).unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
    }

    #[test]
    fn test_empty_item_list_is_fatal() {
        let xml = r#"<rss version="2.0"><channel>
            <link>https://e.com</link></channel></rss>"#;
        let err = parse(xml).unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
    }

    #[test]
    fn test_item_without_link_is_fatal() {
        let xml = r#"<rss version="2.0"><channel><link>https://e.com</link>
            <item><title>orphan</title></item></channel></rss>"#;
        let err = parse(xml).unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
    }

    #[test]
    fn test_broken_xml_is_fatal() {
        let err = parse("<rss><channel><link>x</link><item>").unwrap_err();
        assert!(matches!(
            err,
            FeedError::Malformed(_) | FeedError::Parse { .. }
        ));
    }
}
