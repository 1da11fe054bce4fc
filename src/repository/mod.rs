// every method blocks; handlers call them inside web::block

use std::collections::BTreeSet;

use diesel::r2d2::PoolError;
use thiserror::Error;

use crate::models::{Ingredient, IngredientAmount, RecipeShort, Tag, User};

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MysqlRepository;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database connection unavailable: {0}")]
    Pool(#[from] PoolError),

    #[error("database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("entry already exists")]
    Conflict,
}

/// Which per-user recipe list a membership operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListKind {
    ShoppingCart,
    Favorites,
}

pub trait UserRepository {
    fn user_for_token(&self, token: &str) -> Result<Option<User>, RepoError>;

    fn find_user(&self, user_id: i32) -> Result<Option<User>, RepoError>;
}

pub trait IngredientRepository {
    /// All ingredients ordered by name. `name_prefix` restricts to a case-insensitive prefix match.
    fn list_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, RepoError>;

    fn find_ingredient(&self, ingredient_id: i32) -> Result<Option<Ingredient>, RepoError>;

    /// Every recipe_ingredients row of the given recipes, left-joined to its ingredient.
    fn amounts_for_recipes(
        &self,
        recipe_ids: &BTreeSet<i32>,
    ) -> Result<Vec<IngredientAmount>, RepoError>;
}

pub trait TagRepository {
    fn list_tags(&self) -> Result<Vec<Tag>, RepoError>;

    fn find_tag(&self, tag_id: i32) -> Result<Option<Tag>, RepoError>;
}

pub trait RecipeRepository {
    fn find_recipe(&self, recipe_id: i32) -> Result<Option<RecipeShort>, RepoError>;

    /// Newest first, truncated to `limit` when given.
    fn recipes_by_author(
        &self,
        author_id: i32,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeShort>, RepoError>;

    fn count_recipes_by_author(&self, author_id: i32) -> Result<i64, RepoError>;
}

pub trait CartRepository {
    /// Distinct recipe ids in the user's shopping cart.
    fn entries_for_user(&self, user_id: i32) -> Result<BTreeSet<i32>, RepoError>;
}

pub trait MembershipRepository {
    /// Fails with [`RepoError::Conflict`] when the pair is already present.
    fn add_entry(&self, kind: ListKind, user_id: i32, recipe_id: i32) -> Result<(), RepoError>;

    /// Returns `false` when there was nothing to remove.
    fn remove_entry(&self, kind: ListKind, user_id: i32, recipe_id: i32)
        -> Result<bool, RepoError>;
}

pub trait SubscriptionRepository {
    /// Fails with [`RepoError::Conflict`] when already subscribed.
    fn subscribe(&self, subscriber_id: i32, author_id: i32) -> Result<(), RepoError>;

    fn unsubscribe(&self, subscriber_id: i32, author_id: i32) -> Result<bool, RepoError>;

    /// Total number of followed authors plus one page of them ordered by username.
    fn subscribed_authors(
        &self,
        subscriber_id: i32,
        offset: i64,
        limit: i64,
    ) -> Result<(i64, Vec<User>), RepoError>;
}

/// Everything the HTTP layer needs, usable as `web::Data<dyn Repository>`.
pub trait Repository:
    UserRepository
    + IngredientRepository
    + TagRepository
    + RecipeRepository
    + CartRepository
    + MembershipRepository
    + SubscriptionRepository
    + Send
    + Sync
{
}

impl<T> Repository for T where
    T: UserRepository
        + IngredientRepository
        + TagRepository
        + RecipeRepository
        + CartRepository
        + MembershipRepository
        + SubscriptionRepository
        + Send
        + Sync
{
}
