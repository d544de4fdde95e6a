//! Sample content for the in-memory backend.

use chrono::{TimeZone, Utc};
use kurbo::{Point, Size};
use webifyx_core::{Element, ElementKind, GlobalStyles, Site};

/// The demo portfolio served when no storage directory is configured.
pub fn sample_sites() -> Vec<Site> {
    let header = Element::with_id("header-1", ElementKind::Header)
        .with_prop("text", "Welcome to My Portfolio")
        .with_style("fontSize", "32px")
        .with_style("color", "#1a1a1a")
        .with_position(Point::ZERO)
        .with_size(Size::new(800.0, 100.0))
        .with_z_index(1);

    let intro = Element::with_id("text-1", ElementKind::Text)
        .with_prop(
            "text",
            "I am a web developer passionate about creating amazing experiences.",
        )
        .with_style("color", "#666")
        .with_position(Point::new(0.0, 120.0))
        .with_size(Size::new(600.0, 50.0))
        .with_z_index(2);

    let mut portfolio = Site::new("site-1", "My Portfolio", "portfolio.webifyx.com")
        .with_elements(vec![header, intro]);
    portfolio.user_id = "user-1".to_string();
    portfolio.content.global_styles = GlobalStyles {
        font_family: Some("Inter, sans-serif".to_string()),
        primary_color: Some("#3b82f6".to_string()),
        secondary_color: Some("#64748b".to_string()),
    };
    if let Some(created) = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single() {
        portfolio.created_at = created;
    }

    vec![portfolio]
}
