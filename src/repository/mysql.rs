use std::collections::BTreeSet;

use diesel::r2d2::{self, ConnectionManager};
use diesel::MysqlConnection;

use super::{
    CartRepository, IngredientRepository, ListKind, MembershipRepository, RecipeRepository,
    RepoError, SubscriptionRepository, TagRepository, UserRepository,
};
use crate::models::{Ingredient, IngredientAmount, RecipeShort, Tag, User};
use crate::query;

pub type DbPool = r2d2::Pool<ConnectionManager<MysqlConnection>>;

/// Repository backed by a pooled MySQL connection per call.
#[derive(Clone)]
pub struct MysqlRepository {
    pool: DbPool,
}

impl MysqlRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn connect(database_url: &str) -> Result<Self, r2d2::PoolError> {
        let manager = ConnectionManager::<MysqlConnection>::new(database_url);
        let pool = r2d2::Pool::builder().build(manager)?;
        Ok(Self::new(pool))
    }
}

impl UserRepository for MysqlRepository {
    fn user_for_token(&self, token: &str) -> Result<Option<User>, RepoError> {
        let conn = self.pool.get()?;
        query::find_user_by_token(&conn, token)
    }

    fn find_user(&self, user_id: i32) -> Result<Option<User>, RepoError> {
        let conn = self.pool.get()?;
        query::find_user(&conn, user_id)
    }
}

impl IngredientRepository for MysqlRepository {
    fn list_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, RepoError> {
        let conn = self.pool.get()?;
        query::find_ingredients(&conn, name_prefix)
    }

    fn find_ingredient(&self, ingredient_id: i32) -> Result<Option<Ingredient>, RepoError> {
        let conn = self.pool.get()?;
        query::find_ingredient(&conn, ingredient_id)
    }

    fn amounts_for_recipes(
        &self,
        recipe_ids: &BTreeSet<i32>,
    ) -> Result<Vec<IngredientAmount>, RepoError> {
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.pool.get()?;
        query::find_amounts_for_recipes(&conn, recipe_ids)
    }
}

impl TagRepository for MysqlRepository {
    fn list_tags(&self) -> Result<Vec<Tag>, RepoError> {
        let conn = self.pool.get()?;
        query::find_all_tags(&conn)
    }

    fn find_tag(&self, tag_id: i32) -> Result<Option<Tag>, RepoError> {
        let conn = self.pool.get()?;
        query::find_tag(&conn, tag_id)
    }
}

impl RecipeRepository for MysqlRepository {
    fn find_recipe(&self, recipe_id: i32) -> Result<Option<RecipeShort>, RepoError> {
        let conn = self.pool.get()?;
        query::find_recipe(&conn, recipe_id)
    }

    fn recipes_by_author(
        &self,
        author_id: i32,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeShort>, RepoError> {
        let conn = self.pool.get()?;
        query::find_recipes_by_author(&conn, author_id, limit)
    }

    fn count_recipes_by_author(&self, author_id: i32) -> Result<i64, RepoError> {
        let conn = self.pool.get()?;
        query::count_recipes_by_author(&conn, author_id)
    }
}

impl CartRepository for MysqlRepository {
    fn entries_for_user(&self, user_id: i32) -> Result<BTreeSet<i32>, RepoError> {
        let conn = self.pool.get()?;
        query::find_cart_recipe_ids(&conn, user_id)
    }
}

impl MembershipRepository for MysqlRepository {
    fn add_entry(&self, kind: ListKind, user_id: i32, recipe_id: i32) -> Result<(), RepoError> {
        let conn = self.pool.get()?;
        query::insert_entry(&conn, kind, user_id, recipe_id)
    }

    fn remove_entry(
        &self,
        kind: ListKind,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, RepoError> {
        let conn = self.pool.get()?;
        query::delete_entry(&conn, kind, user_id, recipe_id)
    }
}

impl SubscriptionRepository for MysqlRepository {
    fn subscribe(&self, subscriber_id: i32, author_id: i32) -> Result<(), RepoError> {
        let conn = self.pool.get()?;
        query::insert_subscription(&conn, subscriber_id, author_id)
    }

    fn unsubscribe(&self, subscriber_id: i32, author_id: i32) -> Result<bool, RepoError> {
        let conn = self.pool.get()?;
        query::delete_subscription(&conn, subscriber_id, author_id)
    }

    fn subscribed_authors(
        &self,
        subscriber_id: i32,
        offset: i64,
        limit: i64,
    ) -> Result<(i64, Vec<User>), RepoError> {
        let conn = self.pool.get()?;
        query::find_subscribed_authors(&conn, subscriber_id, offset, limit)
    }
}
