//! RSS 2.0 feed serialization.
//!
//! Rebuilds the enhanced feed with a fixed element order, pretty
//! indentation and empty-node suppression, then prepends the XML
//! declaration and the stylesheet processing instruction. The output
//! overwrites the original feed file in place.

use super::FeedDocument;
use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::BytesText;
use std::io::Write;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Serialize the document back to RSS text.
pub fn render(doc: &FeedDocument, stylesheet_href: &str) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .create_element("rss")
        .with_attribute(("version", "2.0"))
        .write_inner_content::<_, anyhow::Error>(|w| write_channel(w, doc))?;

    let body = String::from_utf8(writer.into_inner())?;
    let stylesheet =
        format!("<?xml-stylesheet href=\"{stylesheet_href}\" type=\"text/xsl\"?>\n");
    Ok(format!("{XML_DECLARATION}{stylesheet}{body}"))
}

fn write_channel<W: Write>(w: &mut Writer<W>, doc: &FeedDocument) -> Result<()> {
    w.create_element("channel")
        .write_inner_content::<_, anyhow::Error>(|w| {
        let channel = &doc.channel;
        write_opt(w, "title", channel.title.as_deref())?;
        write_opt(w, "description", channel.description.as_deref())?;
        write_text(w, "link", &channel.link)?;
        write_opt(w, "lastBuildDate", channel.last_build_date.as_deref())?;
        // author only if originally present
        write_opt(w, "author", channel.author.as_deref())?;

        for item in &doc.items {
            write_item(w, item)?;
        }
        Ok(())
    })?;
    Ok(())
}

/// Emit one item with the fixed field order: title, link, guid,
/// description, pubDate, lastUpdatedTimestamp, categories, content.
fn write_item<W: Write>(w: &mut Writer<W>, item: &super::FeedItem) -> Result<()> {
    w.create_element("item")
        .write_inner_content::<_, anyhow::Error>(|w| {
        write_opt(w, "title", item.title.as_deref())?;
        write_text(w, "link", &item.link)?;
        w.create_element("guid")
            .with_attribute(("isPermaLink", "true"))
            .write_text_content(BytesText::new(&item.link))?;
        write_opt(w, "description", item.description.as_deref())?;
        write_opt(w, "pubDate", item.pub_date.as_deref())?;
        write_opt(w, "lastUpdatedTimestamp", item.last_updated.as_deref())?;
        for category in &item.categories {
            write_text(w, "category", category)?;
        }
        write_opt(w, "content", item.content.as_deref())?;
        Ok(())
    })?;
    Ok(())
}

fn write_text<W: Write>(w: &mut Writer<W>, name: &str, value: &str) -> Result<()> {
    w.create_element(name)
        .write_text_content(BytesText::new(value))?;
    Ok(())
}

/// Absent fields are not emitted at all; present-but-empty fields
/// collapse to a self-closing element.
fn write_opt<W: Write>(w: &mut Writer<W>, name: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some("") => {
            w.create_element(name).write_empty()?;
        }
        Some(value) => write_text(w, name, value)?,
        None => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{Channel, FeedItem, loader};

    fn make_doc() -> FeedDocument {
        FeedDocument {
            channel: Channel {
                title: Some("My Blog".into()),
                description: Some("Posts & things".into()),
                link: "https://example.com".into(),
                last_build_date: Some("Sat, 15 Jun 2024 00:00:00 GMT".into()),
                author: None,
            },
            items: vec![FeedItem {
                title: Some("Hello".into()),
                link: "https://example.com/posts/hello".into(),
                description: Some("A post".into()),
                pub_date: Some("Sat, 15 Jun 2024 00:00:00 GMT".into()),
                last_updated: Some("2024-06-15T10:00:00Z".into()),
                categories: vec!["rust".into(), "blog".into()],
                content: Some("<p>Hello <b>world</b></p>".into()),
            }],
        }
    }

    #[test]
    fn test_render_prepends_declaration_and_stylesheet() {
        let xml = render(&make_doc(), "/rss-styles.xsl").unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains("<?xml-stylesheet href=\"/rss-styles.xsl\" type=\"text/xsl\"?>\n"));
    }

    #[test]
    fn test_render_guid_is_permalink() {
        let xml = render(&make_doc(), "/rss-styles.xsl").unwrap();
        assert!(
            xml.contains("<guid isPermaLink=\"true\">https://example.com/posts/hello</guid>")
        );
    }

    #[test]
    fn test_render_field_order() {
        let xml = render(&make_doc(), "/rss-styles.xsl").unwrap();
        let order = [
            "<title>Hello</title>",
            "<link>https://example.com/posts/hello</link>",
            "<guid",
            "<description>A post</description>",
            "<pubDate>",
            "<lastUpdatedTimestamp>",
            "<category>rust</category>",
            "<category>blog</category>",
            "<content>",
        ];
        let mut last = 0;
        for needle in order {
            let pos = xml.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
            assert!(pos > last, "{needle} out of order");
            last = pos;
        }
    }

    #[test]
    fn test_render_escapes_content() {
        let xml = render(&make_doc(), "/rss-styles.xsl").unwrap();
        assert!(xml.contains("&lt;p&gt;Hello &lt;b&gt;world&lt;/b&gt;&lt;/p&gt;"));
        assert!(xml.contains("Posts &amp; things"));
    }

    #[test]
    fn test_render_omits_absent_fields() {
        let mut doc = make_doc();
        doc.channel.author = None;
        doc.items[0].content = None;
        doc.items[0].categories.clear();
        let xml = render(&doc, "/rss-styles.xsl").unwrap();
        assert!(!xml.contains("<author>"));
        assert!(!xml.contains("<content>"));
        assert!(!xml.contains("<category>"));
    }

    #[test]
    fn test_render_round_trips_through_loader() {
        let xml = render(&make_doc(), "/rss-styles.xsl").unwrap();
        let doc = loader::parse(&xml).unwrap();
        assert_eq!(doc.items.len(), 1);
        assert_eq!(
            doc.items[0].content.as_deref(),
            Some("<p>Hello <b>world</b></p>")
        );
        // rendering the reparsed document is byte-stable
        let again = render(&doc, "/rss-styles.xsl").unwrap();
        assert_eq!(xml, again);
    }
}
