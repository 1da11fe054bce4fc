use serde::{Deserialize, Serialize};

use crate::schema::{ingredients, tags};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl Ingredient {
    /// Decodes a catalogue previously stored with [`Ingredient::list_to_u8`].
    pub fn list_from_u8(bytes: &[u8]) -> Result<Vec<Self>, bincode::Error> {
        bincode::deserialize(bytes)
    }

    pub fn list_to_u8(list: &[Ingredient]) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(list)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Queryable)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Queryable)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Projection of a recipe returned by the cart, favorite and subscription endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Queryable)]
pub struct RecipeShort {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// One recipe_ingredients row joined to its ingredient.
///
/// `name` and `measurement_unit` are `None` when the referenced ingredient row is missing.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct IngredientAmount {
    pub ingredient_id: i32,
    pub name: Option<String>,
    pub measurement_unit: Option<String>,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscribedAuthor {
    #[serde(flatten)]
    pub user: User,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeShort>,
    pub recipes_count: i64,
}

// rows read by the load-data binary
#[derive(Debug, Deserialize, Insertable)]
#[table_name = "ingredients"]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Deserialize, Insertable)]
#[table_name = "tags"]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}
