use crate::domain::model::PageText;
use scraper::{Html, Selector};

const PARAGRAPH_SELECTOR: &str = "p";
const INFOBOX_SELECTOR: &str = "td.infobox-data";

/// Collect narrative paragraphs and infobox data cells from the season page.
///
/// Broken markup never fails here; html5ever repairs what it can and missing
/// zones simply come back empty.
pub fn extract_page_text(html: &[u8]) -> PageText {
    let source = String::from_utf8_lossy(html);
    let document = Html::parse_document(&source);

    PageText {
        paragraphs: collect_text(&document, PARAGRAPH_SELECTOR),
        infobox_cells: collect_text(&document, INFOBOX_SELECTOR),
    }
}

fn collect_text(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        tracing::warn!("Invalid CSS selector: {}", selector);
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .collect()
}
