use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use super::{
    CartRepository, IngredientRepository, ListKind, MembershipRepository, RecipeRepository,
    RepoError, SubscriptionRepository, TagRepository, UserRepository,
};
use crate::models::{Ingredient, IngredientAmount, RecipeShort, Tag, User};

#[derive(Default)]
struct State {
    users: BTreeMap<i32, User>,
    tokens: HashMap<String, i32>,
    ingredients: BTreeMap<i32, Ingredient>,
    tags: BTreeMap<i32, Tag>,
    recipes: BTreeMap<i32, (i32, RecipeShort)>,
    // (recipe_id, ingredient_id, amount)
    recipe_ingredients: Vec<(i32, i32, i32)>,
    entries: BTreeSet<(ListKind, i32, i32)>,
    subscriptions: BTreeSet<(i32, i32)>,
}

#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory repository poisoned")
    }

    pub fn add_user(&self, id: i32, username: &str, token: &str) -> User {
        let user = User {
            id,
            email: format!("{username}@example.com"),
            username: username.to_string(),
            first_name: username.to_string(),
            last_name: "Tester".to_string(),
        };
        let mut state = self.state();
        state.users.insert(id, user.clone());
        state.tokens.insert(token.to_string(), id);
        user
    }

    pub fn add_ingredient(&self, id: i32, name: &str, measurement_unit: &str) {
        self.state().ingredients.insert(
            id,
            Ingredient {
                id,
                name: name.to_string(),
                measurement_unit: measurement_unit.to_string(),
            },
        );
    }

    pub fn add_tag(&self, id: i32, name: &str, color: &str, slug: &str) {
        self.state().tags.insert(
            id,
            Tag {
                id,
                name: name.to_string(),
                color: color.to_string(),
                slug: slug.to_string(),
            },
        );
    }

    /// `ingredients` holds (ingredient_id, amount) pairs.
    pub fn add_recipe(&self, id: i32, author_id: i32, name: &str, ingredients: &[(i32, i32)]) {
        let mut state = self.state();
        state.recipes.insert(
            id,
            (
                author_id,
                RecipeShort {
                    id,
                    name: name.to_string(),
                    image: format!("recipes/{id}.png"),
                    cooking_time: 10,
                },
            ),
        );
        state
            .recipe_ingredients
            .extend(ingredients.iter().map(|&(ingredient_id, amount)| (id, ingredient_id, amount)));
    }

    /// Drops an ingredient row while leaving recipe_ingredients pointing at it.
    pub fn remove_ingredient(&self, id: i32) {
        self.state().ingredients.remove(&id);
    }
}

impl UserRepository for MemoryRepository {
    fn user_for_token(&self, token: &str) -> Result<Option<User>, RepoError> {
        let state = self.state();
        Ok(state
            .tokens
            .get(token)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    fn find_user(&self, user_id: i32) -> Result<Option<User>, RepoError> {
        Ok(self.state().users.get(&user_id).cloned())
    }
}

impl IngredientRepository for MemoryRepository {
    fn list_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, RepoError> {
        let prefix = name_prefix.map(str::to_lowercase);
        let mut list: Vec<Ingredient> = self
            .state()
            .ingredients
            .values()
            .filter(|i| match &prefix {
                Some(p) => i.name.to_lowercase().starts_with(p.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        // same order as the case-insensitive collation on the mysql side
        list.sort_by_cached_key(|i| (i.name.to_lowercase(), i.measurement_unit.to_lowercase()));
        Ok(list)
    }

    fn find_ingredient(&self, ingredient_id: i32) -> Result<Option<Ingredient>, RepoError> {
        Ok(self.state().ingredients.get(&ingredient_id).cloned())
    }

    fn amounts_for_recipes(
        &self,
        recipe_ids: &BTreeSet<i32>,
    ) -> Result<Vec<IngredientAmount>, RepoError> {
        let state = self.state();
        Ok(state
            .recipe_ingredients
            .iter()
            .filter(|(recipe_id, _, _)| recipe_ids.contains(recipe_id))
            .map(|&(_, ingredient_id, amount)| {
                let ingredient = state.ingredients.get(&ingredient_id);
                IngredientAmount {
                    ingredient_id,
                    name: ingredient.map(|i| i.name.clone()),
                    measurement_unit: ingredient.map(|i| i.measurement_unit.clone()),
                    amount,
                }
            })
            .collect())
    }
}

impl TagRepository for MemoryRepository {
    fn list_tags(&self) -> Result<Vec<Tag>, RepoError> {
        Ok(self.state().tags.values().cloned().collect())
    }

    fn find_tag(&self, tag_id: i32) -> Result<Option<Tag>, RepoError> {
        Ok(self.state().tags.get(&tag_id).cloned())
    }
}

impl RecipeRepository for MemoryRepository {
    fn find_recipe(&self, recipe_id: i32) -> Result<Option<RecipeShort>, RepoError> {
        Ok(self
            .state()
            .recipes
            .get(&recipe_id)
            .map(|(_, recipe)| recipe.clone()))
    }

    fn recipes_by_author(
        &self,
        author_id: i32,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeShort>, RepoError> {
        let state = self.state();
        let recipes = state
            .recipes
            .values()
            .rev()
            .filter(|(author, _)| *author == author_id)
            .map(|(_, recipe)| recipe.clone());
        Ok(match limit {
            Some(limit) => recipes.take(limit as usize).collect(),
            None => recipes.collect(),
        })
    }

    fn count_recipes_by_author(&self, author_id: i32) -> Result<i64, RepoError> {
        Ok(self
            .state()
            .recipes
            .values()
            .filter(|(author, _)| *author == author_id)
            .count() as i64)
    }
}

impl CartRepository for MemoryRepository {
    fn entries_for_user(&self, user_id: i32) -> Result<BTreeSet<i32>, RepoError> {
        Ok(self
            .state()
            .entries
            .iter()
            .filter(|(kind, user, _)| *kind == ListKind::ShoppingCart && *user == user_id)
            .map(|&(_, _, recipe_id)| recipe_id)
            .collect())
    }
}

impl MembershipRepository for MemoryRepository {
    fn add_entry(&self, kind: ListKind, user_id: i32, recipe_id: i32) -> Result<(), RepoError> {
        if self.state().entries.insert((kind, user_id, recipe_id)) {
            Ok(())
        } else {
            Err(RepoError::Conflict)
        }
    }

    fn remove_entry(
        &self,
        kind: ListKind,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, RepoError> {
        Ok(self.state().entries.remove(&(kind, user_id, recipe_id)))
    }
}

impl SubscriptionRepository for MemoryRepository {
    fn subscribe(&self, subscriber_id: i32, author_id: i32) -> Result<(), RepoError> {
        if self.state().subscriptions.insert((subscriber_id, author_id)) {
            Ok(())
        } else {
            Err(RepoError::Conflict)
        }
    }

    fn unsubscribe(&self, subscriber_id: i32, author_id: i32) -> Result<bool, RepoError> {
        Ok(self.state().subscriptions.remove(&(subscriber_id, author_id)))
    }

    fn subscribed_authors(
        &self,
        subscriber_id: i32,
        offset: i64,
        limit: i64,
    ) -> Result<(i64, Vec<User>), RepoError> {
        let state = self.state();
        let mut authors: Vec<User> = state
            .subscriptions
            .iter()
            .filter(|(subscriber, _)| *subscriber == subscriber_id)
            .filter_map(|(_, author)| state.users.get(author).cloned())
            .collect();
        authors.sort_by(|a, b| a.username.cmp(&b.username));
        let count = authors.len() as i64;
        let page = authors
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((count, page))
    }
}
