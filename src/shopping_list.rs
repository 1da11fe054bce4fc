use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::models::IngredientAmount;
use crate::render::{Document, DocumentRenderer, RenderError};
use crate::repository::{CartRepository, IngredientRepository, RepoError};

#[derive(Debug, Error)]
pub enum ShoppingListError {
    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error("recipe ingredient references missing ingredient {ingredient_id}")]
    MissingIngredient { ingredient_id: i32 },

    #[error("ingredient {ingredient_id} has non-positive amount {amount}")]
    NonPositiveAmount { ingredient_id: i32, amount: i64 },

    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl ShoppingListError {
    /// Whether the failure came from the store rather than from the data it returned.
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, ShoppingListError::Repository(_))
    }
}

/// One aggregated ingredient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

impl fmt::Display for ShoppingListLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) — {}",
            capitalize(&self.name),
            self.measurement_unit,
            self.amount
        )
    }
}

pub struct ShoppingListAggregator<'a, R: ?Sized> {
    repo: &'a R,
    renderer: &'a dyn DocumentRenderer,
}

impl<'a, R> ShoppingListAggregator<'a, R>
where
    R: CartRepository + IngredientRepository + ?Sized,
{
    pub fn new(repo: &'a R, renderer: &'a dyn DocumentRenderer) -> Self {
        Self { repo, renderer }
    }

    pub fn generate_shopping_list(&self, user_id: i32) -> Result<Document, ShoppingListError> {
        let lines = self.collect_lines(user_id)?;
        log::debug!(
            "rendering shopping list for user {} with {} lines",
            user_id,
            lines.len()
        );
        Ok(self.renderer.render(&lines)?)
    }

    pub fn collect_lines(&self, user_id: i32) -> Result<Vec<ShoppingListLine>, ShoppingListError> {
        let recipe_ids = self.repo.entries_for_user(user_id)?;
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.repo.amounts_for_recipes(&recipe_ids)?;
        aggregate(rows)
    }
}

/// Sums amounts per ingredient and orders the groups by lower-cased name, then unit, then id.
pub fn aggregate<I>(rows: I) -> Result<Vec<ShoppingListLine>, ShoppingListError>
where
    I: IntoIterator<Item = IngredientAmount>,
{
    let mut groups: HashMap<i32, ShoppingListLine> = HashMap::new();
    for row in rows {
        let (name, measurement_unit) = match (row.name, row.measurement_unit) {
            (Some(name), Some(unit)) => (name, unit),
            _ => {
                return Err(ShoppingListError::MissingIngredient {
                    ingredient_id: row.ingredient_id,
                })
            }
        };
        if row.amount <= 0 {
            return Err(ShoppingListError::NonPositiveAmount {
                ingredient_id: row.ingredient_id,
                amount: i64::from(row.amount),
            });
        }
        groups
            .entry(row.ingredient_id)
            .or_insert_with(|| ShoppingListLine {
                name,
                measurement_unit,
                amount: 0,
            })
            .amount += i64::from(row.amount);
    }

    let mut lines: Vec<(i32, ShoppingListLine)> = groups.into_iter().collect();
    lines.sort_by_cached_key(|(id, line)| {
        (line.name.to_lowercase(), line.measurement_unit.clone(), *id)
    });
    Ok(lines.into_iter().map(|(_, line)| line).collect())
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
