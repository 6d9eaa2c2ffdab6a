//! HTML extraction of the coordinate microformat.
//!
//! Articles carry the `.latitude`/`.longitude` pair more than once. The first
//! occurrence belongs to a template header; the second is authoritative.

use super::{LookupError, LookupResult};
use crate::model::geo::Coordinates;
use scraper::{Html, Selector};

const LATITUDE_CLASS: &str = "latitude";
const LONGITUDE_CLASS: &str = "longitude";
const AUTHORITATIVE_MATCH: usize = 1;

/// Pre-parsed selectors for the coordinate classes.
#[derive(Debug, Clone)]
pub struct CoordinateScraper {
    latitude: Selector,
    longitude: Selector,
}

impl CoordinateScraper {
    pub fn new() -> LookupResult<Self> {
        Ok(Self {
            latitude: class_selector(LATITUDE_CLASS)?,
            longitude: class_selector(LONGITUDE_CLASS)?,
        })
    }

    /// Extracts coordinates from an article document.
    ///
    /// # Errors
    /// - `MissingCoordinates` when either class has fewer than two matches.
    /// - `InvalidNumber` when the matched text does not parse after
    ///   converting a decimal comma to a decimal point.
    pub fn extract(&self, html: &str) -> LookupResult<Coordinates> {
        let document = Html::parse_document(html);
        let latitude = nth_value(&document, &self.latitude, LATITUDE_CLASS)?;
        let longitude = nth_value(&document, &self.longitude, LONGITUDE_CLASS)?;
        Ok(Coordinates::new(latitude, longitude))
    }
}

fn class_selector(class: &str) -> LookupResult<Selector> {
    Selector::parse(&format!(".{class}"))
        .map_err(|err| LookupError::InvalidSelector(err.to_string()))
}

fn nth_value(document: &Html, selector: &Selector, class: &'static str) -> LookupResult<f64> {
    let matches: Vec<_> = document.select(selector).collect();
    let element = matches
        .get(AUTHORITATIVE_MATCH)
        .ok_or(LookupError::MissingCoordinates {
            class,
            found: matches.len(),
        })?;

    let text = element.text().collect::<String>();
    let normalized = text.trim().replace(',', ".");
    // `f64::from_str` also accepts "NaN" and "inf".
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| LookupError::InvalidNumber {
            class,
            value: text.trim().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::CoordinateScraper;
    use crate::geocode::LookupError;
    use crate::model::geo::Coordinates;

    const WARSAW_ARTICLE: &str = r#"<!DOCTYPE html>
<html><body>
  <div id="coordinates">
    <span class="latitude">52°13′56″N</span>
    <span class="longitude">21°00′30″E</span>
  </div>
  <table class="infobox">
    <tr><td><span class="geo">
      <span class="latitude">52,229722</span>;
      <span class="longitude">21,011667</span>
    </span></td></tr>
  </table>
</body></html>"#;

    #[test]
    fn second_match_with_decimal_comma_is_used() {
        let scraper = CoordinateScraper::new().unwrap();
        let coords = scraper.extract(WARSAW_ARTICLE).unwrap();
        assert_eq!(coords, Coordinates::new(52.229722, 21.011667));
    }

    #[test]
    fn single_match_is_reported_as_missing() {
        let scraper = CoordinateScraper::new().unwrap();
        let html =
            r#"<p><span class="latitude">1,0</span><span class="longitude">2,0</span></p>"#;
        let err = scraper.extract(html).unwrap_err();
        assert!(matches!(
            err,
            LookupError::MissingCoordinates {
                class: "latitude",
                found: 1
            }
        ));
    }

    #[test]
    fn page_without_microformat_is_missing() {
        let scraper = CoordinateScraper::new().unwrap();
        let err = scraper
            .extract("<html><body><p>Strona nie istnieje</p></body></html>")
            .unwrap_err();
        assert!(matches!(err, LookupError::MissingCoordinates { found: 0, .. }));
    }

    #[test]
    fn non_numeric_text_is_rejected() {
        let scraper = CoordinateScraper::new().unwrap();
        let html = r#"<span class="latitude">x</span><span class="latitude">north</span>
<span class="longitude">x</span><span class="longitude">21,0</span>"#;
        let err = scraper.extract(html).unwrap_err();
        assert!(matches!(
            err,
            LookupError::InvalidNumber { class: "latitude", ref value } if value == "north"
        ));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let scraper = CoordinateScraper::new().unwrap();
        for bad in ["NaN", "inf", "-Infinity"] {
            let html = format!(
                r#"<span class="latitude">0</span><span class="latitude">{bad}</span>
<span class="longitude">0</span><span class="longitude">21,0</span>"#
            );
            let err = scraper.extract(&html).unwrap_err();
            assert!(
                matches!(
                    err,
                    LookupError::InvalidNumber { class: "latitude", ref value } if value == bad
                ),
                "`{bad}` was accepted"
            );
        }
    }
}
