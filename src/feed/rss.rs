use anyhow::{Context, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::model::{Feed, FeedEntry};

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Serializes a feed as an RSS 2.0 document.
///
/// Text content (titles, categories, links, guids) is XML-escaped by
/// `quick-xml`. Descriptions are written as CDATA; a description that
/// contains `]]>` is split across adjacent CDATA sections so the document
/// stays well formed and the text reads back unchanged.
///
/// The writer does not indent: whitespace between CDATA sections would
/// become part of the description.
pub fn render_rss(feed: &Feed) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("Failed to write XML declaration")?;

    // <rss version="2.0"><channel>
    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    writer
        .write_event(Event::Start(rss))
        .context("Failed to write rss element")?;
    writer
        .write_event(Event::Start(BytesStart::new("channel")))
        .context("Failed to write channel element")?;

    write_text_element(&mut writer, "title", &feed.title)?;
    if let Some(link) = &feed.link {
        write_text_element(&mut writer, "link", link)?;
    }
    write_text_element(&mut writer, "description", &feed.description)?;
    write_text_element(
        &mut writer,
        "lastBuildDate",
        &feed.last_build_date.to_rfc2822(),
    )?;
    write_text_element(&mut writer, "ttl", &feed.ttl.to_string())?;

    for entry in &feed.entries {
        write_item(&mut writer, entry)
            .with_context(|| format!("Failed to write item {}", entry.guid))?;
    }

    // </channel></rss>
    writer
        .write_event(Event::End(BytesEnd::new("channel")))
        .context("Failed to write channel end")?;
    writer
        .write_event(Event::End(BytesEnd::new("rss")))
        .context("Failed to write rss end")?;

    let result = writer.into_inner().into_inner();
    String::from_utf8(result).context("Generated feed contains invalid UTF-8")
}

fn write_item(writer: &mut XmlWriter, entry: &FeedEntry) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("item")))?;

    write_text_element(writer, "title", &entry.title)?;
    write_text_element(writer, "link", &entry.link)?;

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "false"));
    writer.write_event(Event::Start(guid))?;
    writer.write_event(Event::Text(BytesText::new(&entry.guid)))?;
    writer.write_event(Event::End(BytesEnd::new("guid")))?;

    write_text_element(writer, "pubDate", &entry.published_at.to_rfc2822())?;

    for category in &entry.categories {
        write_text_element(writer, "category", category)?;
    }

    writer.write_event(Event::Start(BytesStart::new("description")))?;
    for section in cdata_sections(&entry.description) {
        writer.write_event(Event::CData(BytesCData::new(section)))?;
    }
    writer.write_event(Event::End(BytesEnd::new("description")))?;

    writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .with_context(|| format!("Failed to write {name} element"))?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .with_context(|| format!("Failed to write {name} text"))?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .with_context(|| format!("Failed to write {name} end"))?;
    Ok(())
}

/// Splits text so that no piece contains the CDATA terminator `]]>`.
///
/// Each `]]>` is cut between `]]` and `>`; concatenating the pieces
/// gives back the input. Always returns at least one (possibly empty) piece.
fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find("]]>") {
        let (head, tail) = rest.split_at(idx + 2);
        sections.push(head);
        rest = tail;
    }
    sections.push(rest);
    sections
}
