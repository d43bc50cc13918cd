//! Docset bundle reader.
//!
//! A docset bundle is a directory with a fixed layout: a SQLite search
//! index at `Contents/Resources/docSet.dsidx` whose `searchIndex` table
//! maps symbol names to relative page paths, and the pages themselves
//! under `Contents/Resources/Documents/`. This module walks the search
//! index and turns each indexed page into a [`DocumentEntry`] of visible
//! text.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use scraper::{ElementRef, Html, Node};
use tracing::{debug, info};

use crate::document::DocumentEntry;
use crate::error::{Error, Result};

const INDEX_RELATIVE_PATH: &str = "Contents/Resources/docSet.dsidx";
const DOCUMENTS_RELATIVE_PATH: &str = "Contents/Resources/Documents";

/// An opened docset bundle with a validated layout.
#[derive(Debug, Clone)]
pub struct DocsetBundle {
    root: PathBuf,
    index_path: PathBuf,
    documents_dir: PathBuf,
}

impl DocsetBundle {
    /// Opens a bundle and validates its layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBundle`] if `path` is not a directory, the
    /// search index database is missing, or the documents directory is
    /// missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::InvalidBundle {
                path: root,
                reason: "not a directory".into(),
            });
        }

        let index_path = root.join(INDEX_RELATIVE_PATH);
        if !index_path.is_file() {
            return Err(Error::InvalidBundle {
                path: root,
                reason: format!("missing search index database ({INDEX_RELATIVE_PATH})"),
            });
        }

        let documents_dir = root.join(DOCUMENTS_RELATIVE_PATH);
        if !documents_dir.is_dir() {
            return Err(Error::InvalidBundle {
                path: root,
                reason: format!("missing documents directory ({DOCUMENTS_RELATIVE_PATH})"),
            });
        }

        Ok(Self {
            root,
            index_path,
            documents_dir,
        })
    }

    /// Bundle root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads every indexed page and returns it as visible text, in search
    /// index order.
    ///
    /// Rows whose backing file does not exist under the documents
    /// directory are skipped. Pages are read leniently: byte sequences
    /// that are not valid UTF-8 are replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBundle`] if the search index cannot be
    /// queried, or [`Error::Io`] if reading an existing page fails.
    pub fn documents(&self) -> Result<Vec<DocumentEntry>> {
        let conn = Connection::open_with_flags(&self.index_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|err| self.bundle_error(format!("cannot open search index: {err}")))?;

        let mut stmt = conn
            .prepare("SELECT name, path FROM searchIndex WHERE path NOT NULL")
            .map_err(|err| self.bundle_error(format!("cannot query search index: {err}")))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|err| self.bundle_error(format!("cannot query search index: {err}")))?;

        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for row in rows {
            let (name, relative_path) =
                row.map_err(|err| self.bundle_error(format!("malformed search index row: {err}")))?;
            let page_path = self.documents_dir.join(&relative_path);
            if !page_path.is_file() {
                debug!(name = %name, path = %relative_path, "skipping entry without backing file");
                skipped += 1;
                continue;
            }
            let bytes = fs::read(&page_path)?;
            let html = String::from_utf8_lossy(&bytes);
            let text = visible_text(&html);
            entries.push(DocumentEntry {
                name,
                path: PathBuf::from(relative_path),
                text,
            });
        }

        info!(
            bundle = %self.root.display(),
            documents = entries.len(),
            skipped,
            "extracted docset documents"
        );
        Ok(entries)
    }

    fn bundle_error(&self, reason: String) -> Error {
        Error::InvalidBundle {
            path: self.root.clone(),
            reason,
        }
    }
}

/// Extracts the visible text of an HTML page.
///
/// Text inside `<script>` and `<style>` elements is dropped and runs of
/// whitespace collapse to single spaces. Malformed markup is tolerated;
/// the parser recovers the way browsers do.
fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_visible(document.root_element(), &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_visible(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) => {
                let name = el.name();
                if name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style") {
                    continue;
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_visible(child_element, out);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn create_bundle(root: &Path, rows: &[(&str, Option<&str>)], pages: &[(&str, &str)]) {
        let resources = root.join("Contents/Resources");
        fs::create_dir_all(resources.join("Documents")).unwrap();

        let conn = Connection::open(resources.join("docSet.dsidx")).unwrap();
        conn.execute_batch(
            "CREATE TABLE searchIndex (id INTEGER PRIMARY KEY, name TEXT, type TEXT, path TEXT);",
        )
        .unwrap();
        for (name, path) in rows {
            conn.execute(
                "INSERT INTO searchIndex (name, type, path) VALUES (?1, 'Class', ?2)",
                rusqlite::params![name, path],
            )
            .unwrap();
        }

        for (relative, html) in pages {
            let page = resources.join("Documents").join(relative);
            if let Some(parent) = page.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(page, html).unwrap();
        }
    }

    #[test]
    fn extracts_documents_in_index_order() {
        let dir = tempfile::tempdir().unwrap();
        create_bundle(
            dir.path(),
            &[
                ("UIView", Some("uiview.html")),
                ("UIButton", Some("uibutton.html")),
            ],
            &[
                ("uiview.html", "<html><body><p>View basics.</p></body></html>"),
                ("uibutton.html", "<html><body><p>Button basics.</p></body></html>"),
            ],
        );

        let bundle = DocsetBundle::open(dir.path()).unwrap();
        let entries = bundle.documents().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "UIView");
        assert_eq!(entries[0].text, "View basics.");
        assert_eq!(entries[1].name, "UIButton");
        assert_eq!(entries[1].text, "Button basics.");
    }

    #[test]
    fn skips_rows_without_backing_file() {
        let dir = tempfile::tempdir().unwrap();
        create_bundle(
            dir.path(),
            &[
                ("Present", Some("present.html")),
                ("Gone", Some("gone.html")),
            ],
            &[("present.html", "<p>Here.</p>")],
        );

        let bundle = DocsetBundle::open(dir.path()).unwrap();
        let entries = bundle.documents().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Present");
    }

    #[test]
    fn filters_rows_with_null_path() {
        let dir = tempfile::tempdir().unwrap();
        create_bundle(
            dir.path(),
            &[("Anchor", None), ("Page", Some("page.html"))],
            &[("page.html", "<p>Content.</p>")],
        );

        let bundle = DocsetBundle::open(dir.path()).unwrap();
        let entries = bundle.documents().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Page");
    }

    #[test]
    fn rejects_missing_bundle_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("Nope.docset");
        let err = DocsetBundle::open(&missing).unwrap_err();
        assert!(matches!(err, Error::InvalidBundle { .. }));
    }

    #[test]
    fn rejects_bundle_without_search_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Contents/Resources/Documents")).unwrap();
        let err = DocsetBundle::open(dir.path()).unwrap_err();
        match err {
            Error::InvalidBundle { reason, .. } => assert!(reason.contains("docSet.dsidx")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_bundle_without_documents_directory() {
        let dir = tempfile::tempdir().unwrap();
        let resources = dir.path().join("Contents/Resources");
        fs::create_dir_all(&resources).unwrap();
        let conn = Connection::open(resources.join("docSet.dsidx")).unwrap();
        conn.execute_batch("CREATE TABLE searchIndex (id INTEGER PRIMARY KEY);")
            .unwrap();
        drop(conn);

        let err = DocsetBundle::open(dir.path()).unwrap_err();
        match err {
            Error::InvalidBundle { reason, .. } => assert!(reason.contains("Documents")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn visible_text_drops_script_and_style() {
        let html = "<html><head><style>body { color: red; }</style></head>\
                    <body><h1>UIView</h1><script>var x = 1;</script>\
                    <p>A   view manages\n\ncontent.</p></body></html>";
        assert_eq!(visible_text(html), "UIView A view manages content.");
    }

    #[test]
    fn visible_text_tolerates_malformed_markup() {
        let html = "<p>Unclosed <b>bold <p>next paragraph";
        assert_eq!(visible_text(html), "Unclosed bold next paragraph");
    }

    #[test]
    fn visible_text_of_empty_page_is_empty() {
        assert_eq!(visible_text(""), "");
        assert_eq!(visible_text("<html><body></body></html>"), "");
    }
}
