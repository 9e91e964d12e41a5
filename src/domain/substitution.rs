/// A stand-in for an ingredient you ran out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    /// The missing ingredient.
    pub ingredient: &'static str,
    /// What to use instead.
    pub substitute: &'static str,
    /// Practical advice.
    pub notes: &'static str,
}

/// The built-in substitution guide.
pub const GUIDE: &[Substitution] = &[
    Substitution {
        ingredient: "Buttermilk",
        substitute: "1 cup milk + 1 tbsp lemon juice or white vinegar",
        notes: "Let sit for 5-10 minutes until slightly curdled.",
    },
    Substitution {
        ingredient: "Active Dry Yeast",
        substitute: "Instant Yeast (use 25% less)",
        notes: "No need to bloom instant yeast in water first.",
    },
    Substitution {
        ingredient: "Cake Flour",
        substitute: "1 cup all-purpose flour minus 2 tbsp + 2 tbsp cornstarch",
        notes: "Sift together multiple times for best results.",
    },
    Substitution {
        ingredient: "Egg (for binding)",
        substitute: "1/4 cup applesauce or 1 tbsp flaxseed meal + 3 tbsp water",
        notes: "Works best in muffins or quick breads.",
    },
    Substitution {
        ingredient: "Baking Powder",
        substitute: "1/4 tsp baking soda + 1/2 tsp cream of tartar",
        notes: "Use immediately as the reaction starts right away.",
    },
];

/// Entries whose ingredient or substitute contains `query`, ignoring case.
///
/// An empty query matches everything.
pub fn search(query: &str) -> impl Iterator<Item = &'static Substitution> + use<> {
    let query = query.trim().to_lowercase();
    GUIDE.iter().filter(move |entry| {
        entry.ingredient.to_lowercase().contains(&query)
            || entry.substitute.to_lowercase().contains(&query)
    })
}
