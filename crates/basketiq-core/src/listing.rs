use serde::{Deserialize, Serialize};

/// One raw product observation as delivered by a retailer's scraping feed.
///
/// Only `name`, `price`, and `url` are required by the ingestion contract.
/// They are still modelled as optional here so a malformed record
/// deserializes and can be rejected per listing instead of failing the
/// whole feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub url: Option<String>,
    pub external_id: Option<String>,
    /// Free-text pack size, e.g. `"500g"` or `"4 pack"`.
    pub size: Option<String>,
    /// Free-text unit price, e.g. `"£1.45 per 1L"` or `"20p per 100ml"`.
    pub unit_price: Option<String>,
    pub currency: Option<String>,
    pub image_url: Option<String>,
    pub brand: Option<String>,
    pub rating: Option<f64>,
    pub badges: Option<String>,
    /// Promotional price text, e.g. `"£1.20 Clubcard Price"`.
    pub discount_price: Option<String>,
    pub base_url: Option<String>,
    pub provide_rating: Option<bool>,
}

impl RawListing {
    /// The listing name with surrounding whitespace removed, if non-empty.
    #[must_use]
    pub fn trimmed_name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    /// The listing URL with surrounding whitespace removed, if non-empty.
    #[must_use]
    pub fn trimmed_url(&self) -> Option<&str> {
        non_blank(self.url.as_deref())
    }

    /// The promotional text, when the listing carries an offer.
    #[must_use]
    pub fn offer_text(&self) -> Option<&str> {
        non_blank(self.discount_price.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_scraper_payload_with_unknown_fields() {
        let json = r#"{
            "store": "Tesco",
            "name": "Organic Bananas 5 Pack",
            "price": 1.49,
            "url": "https://www.tesco.com/groceries/en-GB/products/123456789",
            "size": "5 pack",
            "unit_price": "£0.30/each",
            "currency": "GBP",
            "rating": 4.5,
            "provide_rating": true,
            "external_id": "34566543",
            "timestamp": "2023-09-08T12:34:56.789Z"
        }"#;
        let listing: RawListing = serde_json::from_str(json).expect("deserialize listing");
        assert_eq!(listing.trimmed_name(), Some("Organic Bananas 5 Pack"));
        assert_eq!(listing.price, Some(1.49));
        assert_eq!(listing.size.as_deref(), Some("5 pack"));
        assert_eq!(listing.provide_rating, Some(true));
        assert!(listing.brand.is_none());
    }

    #[test]
    fn blank_name_is_treated_as_missing() {
        let listing = RawListing {
            name: Some("   ".to_string()),
            ..RawListing::default()
        };
        assert!(listing.trimmed_name().is_none());
    }

    #[test]
    fn offer_text_requires_content() {
        let mut listing = RawListing {
            discount_price: Some(String::new()),
            ..RawListing::default()
        };
        assert!(listing.offer_text().is_none());

        listing.discount_price = Some(" £1.20 Clubcard Price ".to_string());
        assert_eq!(listing.offer_text(), Some("£1.20 Clubcard Price"));
    }
}
