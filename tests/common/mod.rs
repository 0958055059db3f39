//! PDF fixtures generated on the fly with lopdf

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};

struct FixturePage {
    lines: Vec<String>,
    width: i64,
    height: i64,
    links: Vec<String>,
}

/// Builder for small single-font PDFs with optional info, outline and link annotations.
#[derive(Default)]
pub struct Fixture {
    pages: Vec<FixturePage>,
    info: Vec<(String, String)>,
    bookmarks: Vec<(String, u32)>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// US Letter page with one text line per entry.
    pub fn page(self, lines: &[&str]) -> Self {
        self.sized_page(lines, 612, 792)
    }

    pub fn sized_page(mut self, lines: &[&str], width: i64, height: i64) -> Self {
        self.pages.push(FixturePage {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            width,
            height,
            links: Vec::new(),
        });
        self
    }

    /// Add a URI link annotation to the last page added.
    pub fn link(mut self, url: &str) -> Self {
        if let Some(page) = self.pages.last_mut() {
            page.links.push(url.to_string());
        }
        self
    }

    pub fn info(mut self, key: &str, value: &str) -> Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    /// Top-level outline entry pointing at a 1-based page.
    pub fn bookmark(mut self, title: &str, page: u32) -> Self {
        self.bookmarks.push((title.to_string(), page));
        self
    }

    pub fn save(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut doc = self.build();
        doc.save(&path).unwrap();
        path
    }

    fn build(&self) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = Vec::new();
        for page in &self.pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
            ];
            for (idx, line) in page.lines.iter().enumerate() {
                if idx > 0 {
                    operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
                }
                operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
            }
            operations.push(Operation::new("ET", vec![]));
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

            let mut annots: Vec<Object> = Vec::new();
            for (idx, url) in page.links.iter().enumerate() {
                let top = 700 - 20 * idx as i64;
                let annot_id = doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Link",
                    "Rect" => vec![72.into(), (top - 12).into(), 300.into(), top.into()],
                    "A" => dictionary! {
                        "S" => "URI",
                        "URI" => Object::string_literal(url.as_str()),
                    },
                });
                annots.push(annot_id.into());
            }

            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), page.width.into(), page.height.into()],
            };
            if !annots.is_empty() {
                page_dict.set("Annots", annots);
            }
            page_ids.push(doc.add_object(page_dict));
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| (*id).into()).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if !self.bookmarks.is_empty() {
            let outlines_id = self.add_outline(&mut doc, &page_ids);
            catalog.set("Outlines", outlines_id);
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        if !self.info.is_empty() {
            let mut info = Dictionary::new();
            for (key, value) in &self.info {
                info.set(key.as_str(), Object::string_literal(value.as_str()));
            }
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }
        doc
    }

    fn add_outline(&self, doc: &mut Document, page_ids: &[ObjectId]) -> ObjectId {
        let outlines_id = doc.new_object_id();
        let item_ids: Vec<ObjectId> = self.bookmarks.iter().map(|_| doc.new_object_id()).collect();

        for (idx, (title, page)) in self.bookmarks.iter().enumerate() {
            let target = page_ids[*page as usize - 1];
            let mut item = dictionary! {
                "Title" => Object::string_literal(title.as_str()),
                "Parent" => outlines_id,
                "Dest" => vec![target.into(), "Fit".into()],
            };
            if idx > 0 {
                item.set("Prev", item_ids[idx - 1]);
            }
            if idx + 1 < item_ids.len() {
                item.set("Next", item_ids[idx + 1]);
            }
            doc.objects.insert(item_ids[idx], Object::Dictionary(item));
        }

        let outlines = dictionary! {
            "Type" => "Outlines",
            "First" => item_ids[0],
            "Last" => item_ids[item_ids.len() - 1],
            "Count" => item_ids.len() as i64,
        };
        doc.objects.insert(outlines_id, Object::Dictionary(outlines));
        outlines_id
    }
}

/// A three-page report with metadata, an outline and one link.
pub fn sample_report() -> Fixture {
    Fixture::new()
        .page(&["Quarterly report", "Revenue grew"])
        .link("https://example.com/q3")
        .page(&["Costs were flat"])
        .page(&["Outlook is stable"])
        .info("Title", "Q3 Report")
        .info("Author", "Finance")
        .bookmark("Summary", 1)
        .bookmark("Outlook", 3)
}
