//! Position-based cell styling for exported workbooks
//!
//! Styles depend only on where a cell sits and whether it is empty, never on
//! what the value means.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern};
use serde_json::Value;

/// Header fill, also used for labelled first-column body cells
pub const HEADER_FILL: u32 = 0x4F81BD;
/// Fill for non-empty body cells outside the first column
pub const BODY_FILL: u32 = 0xD9E1F2;
/// Fill for empty body cells
pub const EMPTY_FILL: u32 = 0xC0C0C0;
pub const WHITE: u32 = 0xFFFFFF;
pub const BLACK: u32 = 0x000000;

/// Library-independent description of a cell's formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpec {
    pub bold: bool,
    pub font_color: u32,
    pub fill: u32,
    /// Thin border on all four sides
    pub border: bool,
    /// Centered horizontally and vertically
    pub centered: bool,
}

impl StyleSpec {
    pub const HEADER: StyleSpec = StyleSpec {
        bold: true,
        font_color: WHITE,
        fill: HEADER_FILL,
        border: false,
        centered: true,
    };

    pub const LABEL: StyleSpec = StyleSpec {
        bold: true,
        font_color: WHITE,
        fill: HEADER_FILL,
        border: true,
        centered: true,
    };

    pub const BODY: StyleSpec = StyleSpec {
        bold: false,
        font_color: BLACK,
        fill: BODY_FILL,
        border: false,
        centered: true,
    };

    pub const EMPTY: StyleSpec = StyleSpec {
        bold: false,
        font_color: BLACK,
        fill: EMPTY_FILL,
        border: false,
        centered: true,
    };

    /// Convert to a rust_xlsxwriter format
    pub fn to_format(&self) -> Format {
        let mut format = Format::new()
            .set_font_color(Color::RGB(self.font_color))
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(self.fill));

        if self.bold {
            format = format.set_bold();
        }
        if self.centered {
            format = format
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter);
        }
        if self.border {
            format = format
                .set_border(FormatBorder::Thin)
                .set_border_color(Color::RGB(BLACK));
        }

        format
    }
}

/// Null and empty strings count as empty; `0` and `false` do not.
pub fn is_empty_cell(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Style for the cell at zero-based `(row, col)`; row 0 is the header.
pub fn style_for(row: u32, col: u16, value: &Value) -> StyleSpec {
    if row == 0 {
        StyleSpec::HEADER
    } else if is_empty_cell(value) {
        StyleSpec::EMPTY
    } else if col == 0 {
        StyleSpec::LABEL
    } else {
        StyleSpec::BODY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_row_ignores_content() {
        assert_eq!(style_for(0, 0, &json!("a")), StyleSpec::HEADER);
        assert_eq!(style_for(0, 3, &json!("")), StyleSpec::HEADER);
        assert_eq!(style_for(0, 1, &Value::Null), StyleSpec::HEADER);
    }

    #[test]
    fn test_header_is_bold_white_on_blue_centered() {
        let spec = style_for(0, 0, &json!("a"));
        assert!(spec.bold);
        assert_eq!(spec.font_color, WHITE);
        assert_eq!(spec.fill, 0x4F81BD);
        assert!(spec.centered);
        assert!(!spec.border);
    }

    #[test]
    fn test_first_column_label() {
        let spec = style_for(1, 0, &json!(1));
        assert_eq!(spec, StyleSpec::LABEL);
        assert!(spec.border);
        assert!(spec.bold);
        assert_eq!(spec.fill, HEADER_FILL);
    }

    #[test]
    fn test_body_cell() {
        let spec = style_for(5, 2, &json!("bolt"));
        assert_eq!(spec.fill, 0xD9E1F2);
        assert_eq!(spec.font_color, BLACK);
        assert!(!spec.bold);
        assert!(!spec.border);
    }

    #[test]
    fn test_empty_cells_are_gray_in_any_column() {
        assert_eq!(style_for(1, 0, &Value::Null), StyleSpec::EMPTY);
        assert_eq!(style_for(2, 4, &json!("")), StyleSpec::EMPTY);
        assert_eq!(StyleSpec::EMPTY.fill, 0xC0C0C0);
        assert!(!StyleSpec::EMPTY.border);
    }

    #[test]
    fn test_zero_and_false_are_not_empty() {
        assert_eq!(style_for(1, 1, &json!(0)), StyleSpec::BODY);
        assert_eq!(style_for(1, 1, &json!(false)), StyleSpec::BODY);
        assert_eq!(style_for(1, 0, &json!(0.0)), StyleSpec::LABEL);
    }

    #[test]
    fn test_whitespace_is_not_empty() {
        assert!(!is_empty_cell(&json!(" ")));
    }

    #[test]
    fn test_to_format_differs_per_style() {
        let header = StyleSpec::HEADER.to_format();
        let label = StyleSpec::LABEL.to_format();
        let body = StyleSpec::BODY.to_format();
        assert_ne!(header, label);
        assert_ne!(label, body);
        assert_eq!(body, StyleSpec::BODY.to_format());
    }
}
