//! Constants for page dimensions and layout defaults

/// Standard A4 page width in points
pub const A4_WIDTH: f32 = 595.0;

/// Standard A4 page height in points
pub const A4_HEIGHT: f32 = 842.0;

/// US Letter page width in points
pub const LETTER_WIDTH: f32 = 612.0;

/// US Letter page height in points
pub const LETTER_HEIGHT: f32 = 792.0;

/// Default page margin in points
pub const DEFAULT_MARGIN: f32 = 50.0;

/// Default character width ratio for text estimation
/// (average character width as a fraction of font size)
pub const DEFAULT_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Default line height multiplier
pub const DEFAULT_LINE_HEIGHT_MULTIPLIER: f32 = 1.2;

/// Minimum column width in points
pub const MIN_COLUMN_WIDTH: f32 = 20.0;

/// Default cell padding in points
pub const DEFAULT_PADDING: f32 = 4.0;

/// Default body font size in points
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

/// Default table border width in points
pub const DEFAULT_BORDER_WIDTH: f32 = 0.5;

/// Vertical gap left after every block
pub const DEFAULT_BLOCK_SPACING: f32 = 8.0;

/// Height of the running header band, including the divider under it
pub const DEFAULT_HEADER_HEIGHT: f32 = 36.0;

/// Height the header logo is scaled to
pub const LOGO_HEIGHT: f32 = 24.0;

/// Footer font size in points
pub const FOOTER_FONT_SIZE: f32 = 8.0;

/// Distance of the footer baseline below the usable area
pub const FOOTER_OFFSET: f32 = 20.0;

/// Heading size multipliers relative to the base font size
pub const HEADING_ONE_SCALE: f32 = 1.6;
pub const HEADING_TWO_SCALE: f32 = 1.3;

/// Inner padding of a banner heading
pub const BANNER_PADDING: f32 = 4.0;

/// Horizontal indent of bullet list item text
pub const BULLET_INDENT: f32 = 12.0;

/// Fixed extent of a rule block; the stroke is centered in it
pub const RULE_HEIGHT: f32 = 6.0;

/// Stroke thickness of a rule
pub const RULE_THICKNESS: f32 = 0.75;

/// Height of the box drawn in place of an image that failed to load
pub const PLACEHOLDER_HEIGHT: f32 = 60.0;

/// Blank space above the signature line
pub const SIGNATURE_SPACE: f32 = 28.0;

/// Share of the key/value table width given to the label column
pub const KEY_COLUMN_SHARE: f32 = 0.35;

/// Date format used in footers and file names
pub const DATE_FORMAT: &str = "%Y-%m-%d";
