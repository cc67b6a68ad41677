//! Chart colors for expense categories.

/// Used for any category no keyword matches, including the synthetic "Other" group.
pub const NEUTRAL_GRAY: &str = "#9CA3AF";

/// Keywords checked in order against the lowercased category name. The first one the name
/// contains picks the color.
const KEYWORD_COLORS: &[(&str, &str)] = &[
    ("food", "#10B981"),
    ("restaurant", "#10B981"),
    ("travel", "#3B82F6"),
    ("shop", "#F59E0B"),
    ("entertainment", "#8B5CF6"),
    ("health", "#EF4444"),
    ("transport", "#6366F1"),
];

/// Picks the color for `category` by case-insensitive keyword, falling back to `NEUTRAL_GRAY`.
pub fn category_color(category: &str) -> &'static str {
    let category = category.to_lowercase();
    KEYWORD_COLORS
        .iter()
        .find(|(keyword, _)| category.contains(keyword))
        .map(|(_, color)| *color)
        .unwrap_or(NEUTRAL_GRAY)
}
