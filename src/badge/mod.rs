//! Badge rendering module
//!
//! Produces flat style SVG badges: a grey label box on the left and a colored
//! message box on the right. Rendering is a pure function of its inputs.

mod width;

use crate::config::BadgeConfig;
use width::text_width;

/// Horizontal padding on each side of a text run, in pixels
const PADDING: u32 = 5;
const HEIGHT: u32 = 20;

/// Renders `(label, message)` pairs with fixed colors
#[derive(Debug, Clone)]
pub struct BadgeRenderer {
    label_color: String,
    color: String,
}

impl BadgeRenderer {
    pub fn new(config: &BadgeConfig) -> Self {
        Self {
            label_color: resolve_color(&config.label_color),
            color: resolve_color(&config.color),
        }
    }

    /// Render a badge.
    ///
    /// An empty label produces a message-only badge.
    pub fn render(&self, label: &str, message: &str) -> String {
        let message_part = Part::new(message);
        if label.is_empty() {
            return self.render_message_only(&message_part);
        }

        let label_part = Part::new(label);
        let left = label_part.box_width();
        let right = message_part.box_width();
        let total = left + right;
        let title = escape_xml(&format!("{label}: {message}"));

        let mut svg = open_svg(total, &title);
        svg.push_str(&format!(
            r#"<g clip-path="url(#r)"><rect width="{left}" height="{HEIGHT}" fill="{label_color}"/><rect x="{left}" width="{right}" height="{HEIGHT}" fill="{color}"/><rect width="{total}" height="{HEIGHT}" fill="url(#s)"/></g>"#,
            label_color = escape_xml(&self.label_color),
            color = escape_xml(&self.color),
        ));
        svg.push_str(TEXT_GROUP_OPEN);
        svg.push_str(&label_part.text(left * 5));
        svg.push_str(&message_part.text(left * 10 + right * 5));
        svg.push_str("</g></svg>");
        svg
    }

    fn render_message_only(&self, message: &Part) -> String {
        let total = message.box_width();
        let title = escape_xml(&message.raw);

        let mut svg = open_svg(total, &title);
        svg.push_str(&format!(
            r#"<g clip-path="url(#r)"><rect width="{total}" height="{HEIGHT}" fill="{color}"/><rect width="{total}" height="{HEIGHT}" fill="url(#s)"/></g>"#,
            color = escape_xml(&self.color),
        ));
        svg.push_str(TEXT_GROUP_OPEN);
        svg.push_str(&message.text(total * 5));
        svg.push_str("</g></svg>");
        svg
    }
}

const TEXT_GROUP_OPEN: &str = r##"<g fill="#fff" text-anchor="middle" font-family="Verdana,Geneva,DejaVu Sans,sans-serif" text-rendering="geometricPrecision" font-size="110">"##;

/// One text run of the badge
struct Part {
    raw: String,
    escaped: String,
    width: u32,
}

impl Part {
    fn new(text: &str) -> Self {
        Self {
            raw: text.to_string(),
            escaped: escape_xml(text),
            width: text_width(text),
        }
    }

    const fn box_width(&self) -> u32 {
        self.width + 2 * PADDING
    }

    /// Shadow and foreground text, centered on `x` (tenths of a pixel)
    fn text(&self, x: u32) -> String {
        let length = self.width * 10;
        format!(
            r##"<text aria-hidden="true" x="{x}" y="150" fill="#010101" fill-opacity=".3" transform="scale(.1)" textLength="{length}">{text}</text><text x="{x}" y="140" transform="scale(.1)" fill="#fff" textLength="{length}">{text}</text>"##,
            text = self.escaped,
        )
    }
}

fn open_svg(width: u32, title: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width}" height="{HEIGHT}" role="img" aria-label="{title}"><title>{title}</title><linearGradient id="s" x2="0" y2="100%"><stop offset="0" stop-color="#bbb" stop-opacity=".1"/><stop offset="1" stop-opacity=".1"/></linearGradient><clipPath id="r"><rect width="{width}" height="{HEIGHT}" rx="3" fill="#fff"/></clipPath>"##
    )
}

/// Map the usual badge color names to hex; anything else is used as given.
fn resolve_color(color: &str) -> String {
    let hex = match color.trim().to_ascii_lowercase().as_str() {
        "brightgreen" | "success" => "#4c1",
        "green" => "#97ca00",
        "yellowgreen" => "#a4a61d",
        "yellow" => "#dfb317",
        "orange" | "important" => "#fe7d37",
        "red" | "critical" => "#e05d44",
        "blue" | "informational" => "#007ec6",
        "grey" | "gray" => "#555",
        "lightgrey" | "lightgray" | "inactive" => "#9f9f9f",
        _ => return color.trim().to_string(),
    };
    hex.to_string()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> BadgeRenderer {
        BadgeRenderer::new(&BadgeConfig {
            label_color: "#555".to_string(),
            color: "#4c1".to_string(),
        })
    }

    #[test]
    fn test_render_label_and_message() {
        let svg = renderer().render("👍", "3");
        assert!(svg.starts_with("<svg "));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("<title>👍: 3</title>"));
        assert!(svg.contains(">👍</text>"));
        assert!(svg.contains(">3</text>"));
        assert!(svg.contains(r##"fill="#555""##));
        assert!(svg.contains(r##"fill="#4c1""##));
    }

    #[test]
    fn test_layout_widths() {
        // label "1": 7px + 10 padding, message "23": 14px + 10 padding
        let svg = renderer().render("1", "23");
        assert!(svg.contains(r#"width="41" height="20" role="img""#));
        assert!(svg.contains(r#"<rect width="17" height="20""#));
        assert!(svg.contains(r#"<rect x="17" width="24" height="20""#));
        assert!(svg.contains(r#"x="85" y="140""#));
        assert!(svg.contains(r#"x="290" y="140""#));
    }

    #[test]
    fn test_message_only_when_label_empty() {
        let svg = renderer().render("", "12");
        assert!(svg.contains("<title>12</title>"));
        assert!(!svg.contains(r##"fill="#555""##));
        assert_eq!(svg.matches("<text ").count(), 2);
    }

    #[test]
    fn test_escapes_markup() {
        let svg = renderer().render("<b>&\"votes\"", "1");
        assert!(svg.contains("&lt;b&gt;&amp;&quot;votes&quot;"));
        assert!(!svg.contains("<b>"));
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(resolve_color("brightgreen"), "#4c1");
        assert_eq!(resolve_color("Blue"), "#007ec6");
        assert_eq!(resolve_color("#ff69b4"), "#ff69b4");
    }
}
