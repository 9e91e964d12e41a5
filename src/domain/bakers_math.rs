//! Baker's percentages: every ingredient as a share of total flour weight.

use serde::{Deserialize, Serialize};

/// A recipe ingredient, as used by the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name.
    pub name: String,
    /// Non-negative amount.
    pub amount: f64,
    /// Unit of `amount`, e.g. `g`.
    pub unit: String,
    /// Counts towards total flour weight.
    #[serde(default)]
    pub is_flour: bool,
    /// Counts towards total liquid weight.
    #[serde(default)]
    pub is_liquid: bool,
}

impl Ingredient {
    /// An ingredient that is neither flour nor liquid.
    #[must_use]
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
            is_flour: false,
            is_liquid: false,
        }
    }

    /// Marks the ingredient as flour.
    #[must_use]
    pub const fn flour(mut self) -> Self {
        self.is_flour = true;
        self
    }

    /// Marks the ingredient as liquid.
    #[must_use]
    pub const fn liquid(mut self) -> Self {
        self.is_liquid = true;
        self
    }
}

/// An ingredient annotated with its baker's percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedIngredient {
    /// The ingredient.
    #[serde(flatten)]
    pub ingredient: Ingredient,
    /// Amount as a percentage of total flour weight.
    pub percentage: f64,
}

fn total_flour(ingredients: &[Ingredient]) -> f64 {
    ingredients
        .iter()
        .filter(|i| i.is_flour)
        .map(|i| i.amount)
        .sum()
}

fn total_liquid(ingredients: &[Ingredient]) -> f64 {
    ingredients
        .iter()
        .filter(|i| i.is_liquid)
        .map(|i| i.amount)
        .sum()
}

/// Annotates each ingredient with `amount / total_flour * 100`.
///
/// With no flour at all every percentage is zero.
#[must_use]
pub fn calculate_bakers_percentage(ingredients: &[Ingredient]) -> Vec<WeightedIngredient> {
    let flour = total_flour(ingredients);

    ingredients
        .iter()
        .map(|ingredient| WeightedIngredient {
            ingredient: ingredient.clone(),
            percentage: if flour == 0.0 {
                0.0
            } else {
                ingredient.amount / flour * 100.0
            },
        })
        .collect()
}

/// Multiplies every amount by `factor`.
///
/// The factor is not validated; a non-positive factor is the caller's
/// problem.
#[must_use]
pub fn scale_recipe(ingredients: &[Ingredient], factor: f64) -> Vec<Ingredient> {
    ingredients
        .iter()
        .map(|ingredient| Ingredient {
            amount: ingredient.amount * factor,
            ..ingredient.clone()
        })
        .collect()
}

/// Liquid weight as a whole-number percentage of flour weight; zero without
/// flour.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn derive_hydration(ingredients: &[Ingredient]) -> u32 {
    let flour = total_flour(ingredients);
    if flour == 0.0 {
        return 0;
    }
    (total_liquid(ingredients) / flour * 100.0).round().max(0.0) as u32
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A fixed baseline recipe that can be rescaled to any flour weight.
///
/// Scaling always starts from the baseline, so repeatedly changing the
/// target flour weight never compounds rounding error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formula {
    base: Vec<Ingredient>,
}

/// A [`Formula`] scaled to a target flour weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledFormula {
    /// The requested total flour weight.
    pub target_flour: f64,
    /// Scaled ingredients with percentages.
    pub ingredients: Vec<WeightedIngredient>,
    /// Hydration of the scaled recipe.
    pub hydration: u32,
}

impl Formula {
    /// Creates a formula from baseline ingredients.
    #[must_use]
    pub const fn new(base: Vec<Ingredient>) -> Self {
        Self { base }
    }

    /// The baseline ingredients.
    #[must_use]
    pub fn base(&self) -> &[Ingredient] {
        &self.base
    }

    /// Total flour weight of the baseline.
    #[must_use]
    pub fn base_flour(&self) -> f64 {
        total_flour(&self.base)
    }

    /// Scales the baseline so its flour totals `target_flour`.
    ///
    /// Amounts are rounded to one decimal place. A baseline without flour
    /// cannot be scaled and is returned as is.
    #[must_use]
    pub fn at_flour(&self, target_flour: f64) -> ScaledFormula {
        let base_flour = self.base_flour();
        let factor = if base_flour == 0.0 {
            1.0
        } else {
            target_flour / base_flour
        };

        let scaled: Vec<Ingredient> = scale_recipe(&self.base, factor)
            .into_iter()
            .map(|ingredient| Ingredient {
                amount: round_to_tenth(ingredient.amount),
                ..ingredient
            })
            .collect();

        ScaledFormula {
            target_flour,
            hydration: derive_hydration(&scaled),
            ingredients: calculate_bakers_percentage(&scaled),
        }
    }
}

impl Default for Formula {
    /// A lean bread dough at 75% hydration.
    fn default() -> Self {
        Self::new(vec![
            Ingredient::new("Bread Flour", 500.0, "g").flour(),
            Ingredient::new("Water", 375.0, "g").liquid(),
            Ingredient::new("Salt", 10.0, "g"),
            Ingredient::new("Yeast", 5.0, "g"),
        ])
    }
}
