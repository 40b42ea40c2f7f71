//! The closed interest vocabulary and the prompt templates used to frame
//! text before embedding.

/// Interest tags every category is mapped onto. Fixed at compile time.
pub const INTEREST_TAXONOMY: &[&str] = &[
    "Pizza",
    "Burgers",
    "Sushi",
    "Italian",
    "Mexican",
    "Chinese",
    "Japanese",
    "Indian",
    "Thai",
    "Mediterranean",
    "Seafood",
    "Steak",
    "Barbecue",
    "Vegetarian",
    "Vegan",
    "Salads",
    "Sandwiches",
    "Noodles",
    "Breakfast",
    "Bakery",
    "Desserts",
    "Coffee",
    "Cocktails",
];

const CATEGORY_TEMPLATE_PREFIX: &str = "Food category or restaurant menu section: ";
const INTEREST_TEMPLATE_PREFIX: &str = "Food type, cuisine or meal category: ";

/// Owned copy of the taxonomy.
pub fn taxonomy() -> Vec<String> {
    INTEREST_TAXONOMY.iter().map(|s| s.to_string()).collect()
}

/// Wrap a raw category in its embedding template. Identical categories
/// always produce identical text, which is what the embedding cache keys on.
pub fn enhance_category(category: &str) -> String {
    format!("{CATEGORY_TEMPLATE_PREFIX}{category}")
}

/// Wrap an interest in its embedding template.
pub fn enhance_interest(interest: &str) -> String {
    format!("{INTEREST_TEMPLATE_PREFIX}{interest}")
}
