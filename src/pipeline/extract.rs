//! Pin extraction from board markup.
//!
//! The stage parses the fetched page once and materialises the full list
//! of [`RawPinEntry`] records up front — the orchestrator needs the total
//! count before iterating to compute progress percentages, and returning
//! plain owned records keeps all document-library traversal isolated
//! behind this one function.
//!
//! Extraction does not validate content: a pin with an empty description
//! or missing image is passed through unchanged, and downstream geocoding
//! failure is what flags unusable entries.

use crate::config::PinSelectors;
use crate::error::MapinterestError;
use crate::output::RawPinEntry;
use scraper::{Html, Selector};
use tracing::debug;

/// Extract all pin entries from a board page body, in document order.
pub fn extract_pins(
    body: &str,
    selectors: &PinSelectors,
) -> Result<Vec<RawPinEntry>, MapinterestError> {
    let pin_sel = parse_selector("pin", &selectors.pin)?;
    let desc_sel = parse_selector("description", &selectors.description)?;
    let img_sel = parse_selector("image", &selectors.image)?;

    let document = Html::parse_document(body);

    let entries: Vec<RawPinEntry> = document
        .select(&pin_sel)
        .map(|pin| {
            let description = pin
                .select(&desc_sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            let image_url = pin
                .select(&img_sel)
                .next()
                .and_then(|el| el.value().attr("src"))
                .unwrap_or_default()
                .to_string();
            RawPinEntry {
                description,
                image_url,
            }
        })
        .collect();

    debug!("Extracted {} pins from board page", entries.len());
    Ok(entries)
}

fn parse_selector(name: &str, sel: &str) -> Result<Selector, MapinterestError> {
    Selector::parse(sel).map_err(|e| {
        MapinterestError::InvalidConfig(format!("invalid {name} selector '{sel}': {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_page(pins: &[(&str, &str)]) -> String {
        let mut html = String::from("<html><body><div class=\"board\">");
        for (desc, img) in pins {
            html.push_str(&format!(
                "<div class=\"pin\"><p class=\"description\">{desc}</p>\
                 <img class=\"PinImageImg\" src=\"{img}\"></div>"
            ));
        }
        html.push_str("</div></body></html>");
        html
    }

    #[test]
    fn extracts_all_pins_in_document_order() {
        let body = board_page(&[
            ("Amsterdam", "https://img.example/a.jpg"),
            ("Paris", "https://img.example/b.jpg"),
            ("Berlin", "https://img.example/c.jpg"),
        ]);
        let pins = extract_pins(&body, &PinSelectors::default()).unwrap();
        assert_eq!(pins.len(), 3);
        assert_eq!(pins[0].description, "Amsterdam");
        assert_eq!(pins[1].description, "Paris");
        assert_eq!(pins[2].description, "Berlin");
        assert_eq!(pins[2].image_url, "https://img.example/c.jpg");
    }

    #[test]
    fn missing_description_becomes_empty_string() {
        let body = "<html><body>\
            <div class=\"pin\"><img class=\"PinImageImg\" src=\"x.jpg\"></div>\
            </body></html>";
        let pins = extract_pins(body, &PinSelectors::default()).unwrap();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].description, "");
        assert_eq!(pins[0].image_url, "x.jpg");
    }

    #[test]
    fn missing_image_becomes_empty_string() {
        let body = "<html><body>\
            <div class=\"pin\"><p class=\"description\">Rome</p></div>\
            </body></html>";
        let pins = extract_pins(body, &PinSelectors::default()).unwrap();
        assert_eq!(pins[0].description, "Rome");
        assert_eq!(pins[0].image_url, "");
    }

    #[test]
    fn first_matching_nodes_win() {
        let body = "<html><body><div class=\"pin\">\
            <p class=\"description\">First</p>\
            <p class=\"description\">Second</p>\
            <img class=\"PinImageImg\" src=\"one.jpg\">\
            <img class=\"PinImageImg\" src=\"two.jpg\">\
            </div></body></html>";
        let pins = extract_pins(body, &PinSelectors::default()).unwrap();
        assert_eq!(pins[0].description, "First");
        assert_eq!(pins[0].image_url, "one.jpg");
    }

    #[test]
    fn page_without_pins_yields_empty_vec() {
        let body = "<html><body><p>nothing here</p></body></html>";
        let pins = extract_pins(body, &PinSelectors::default()).unwrap();
        assert!(pins.is_empty());
    }

    #[test]
    fn nested_text_is_concatenated() {
        let body = "<html><body><div class=\"pin\">\
            <p class=\"description\">Amsterdam, <em>Netherlands</em></p>\
            </div></body></html>";
        let pins = extract_pins(body, &PinSelectors::default()).unwrap();
        assert_eq!(pins[0].description, "Amsterdam, Netherlands");
    }
}
