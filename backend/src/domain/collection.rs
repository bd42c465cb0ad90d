//! A single user's recipe collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::recipe::{Recipe, RecipeId};

/// All recipes belonging to one user, keyed by id.
///
/// Backed by an ordered map so the persisted file lists recipes in id order
/// and id allocation can read the highest key directly. Ids are allocated as
/// highest-in-use plus one, so deleting the newest recipe frees its id for
/// the next addition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeCollection {
    recipes: BTreeMap<RecipeId, Recipe>,
}

impl RecipeCollection {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recipes held.
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether the collection holds no recipes.
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Look up a recipe by id.
    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(&id)
    }

    /// Mutable access to a recipe by id.
    pub fn get_mut(&mut self, id: RecipeId) -> Option<&mut Recipe> {
        self.recipes.get_mut(&id)
    }

    /// Insert or replace the recipe stored under `id`.
    pub fn insert(&mut self, id: RecipeId, recipe: Recipe) {
        self.recipes.insert(id, recipe);
    }

    /// Remove and return the recipe stored under `id`.
    pub fn remove(&mut self, id: RecipeId) -> Option<Recipe> {
        self.recipes.remove(&id)
    }

    /// The id the next added recipe will receive.
    pub fn next_id(&self) -> RecipeId {
        self.recipes
            .keys()
            .next_back()
            .map_or(RecipeId::new(1), |id| id.next())
    }

    /// Highest id currently in use, if any.
    pub fn max_id(&self) -> Option<RecipeId> {
        self.recipes.keys().next_back().copied()
    }

    /// Whether any recipe already carries this exact title.
    ///
    /// Comparison is case sensitive over normalised titles, which start every
    /// word with a capital, so "toast" and "Toast" can never both be stored.
    pub fn contains_title(&self, title: &str) -> bool {
        self.recipes.values().any(|recipe| recipe.title() == title)
    }

    /// Whether a recipe other than `except` carries this exact title.
    ///
    /// Used when renaming, so a recipe may keep its own title.
    pub fn titled_elsewhere(&self, title: &str, except: RecipeId) -> bool {
        self.recipes
            .iter()
            .any(|(id, recipe)| *id != except && recipe.title() == title)
    }

    /// Recipes ordered by title, with the id breaking ties.
    pub fn sorted_by_title(&self) -> Vec<(RecipeId, &Recipe)> {
        let mut entries: Vec<(RecipeId, &Recipe)> = self
            .recipes
            .iter()
            .map(|(id, recipe)| (*id, recipe))
            .collect();
        entries.sort_by(|a, b| a.1.title().cmp(b.1.title()).then(a.0.cmp(&b.0)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::RecipeCollection;
    use crate::domain::recipe::{ImageDescriptor, Recipe, RecipeId};

    fn recipe(title: &str) -> Recipe {
        Recipe::new(
            title.to_owned(),
            vec!["Something".to_owned()],
            vec!["Cook it".to_owned()],
            String::new(),
            ImageDescriptor::None,
        )
    }

    #[test]
    fn the_first_id_is_one() {
        assert_eq!(RecipeCollection::new().next_id(), RecipeId::new(1));
    }

    #[test]
    fn ids_follow_the_highest_in_use() {
        let mut collection = RecipeCollection::new();
        collection.insert(RecipeId::new(1), recipe("Toast"));
        collection.insert(RecipeId::new(3), recipe("Soup"));
        assert_eq!(collection.next_id(), RecipeId::new(4));
        assert_eq!(collection.max_id(), Some(RecipeId::new(3)));
    }

    #[test]
    fn deleting_the_newest_recipe_frees_its_id() {
        let mut collection = RecipeCollection::new();
        collection.insert(RecipeId::new(1), recipe("Toast"));
        collection.insert(RecipeId::new(2), recipe("Soup"));
        collection.remove(RecipeId::new(2));
        assert_eq!(collection.next_id(), RecipeId::new(2));
    }

    #[test]
    fn title_lookup_is_case_sensitive() {
        let mut collection = RecipeCollection::new();
        collection.insert(RecipeId::new(1), recipe("Toast"));
        assert!(collection.contains_title("Toast"));
        assert!(!collection.contains_title("toast"));
    }

    #[test]
    fn renames_may_keep_their_own_title() {
        let mut collection = RecipeCollection::new();
        collection.insert(RecipeId::new(1), recipe("Toast"));
        collection.insert(RecipeId::new(2), recipe("Soup"));
        assert!(!collection.titled_elsewhere("Toast", RecipeId::new(1)));
        assert!(collection.titled_elsewhere("Soup", RecipeId::new(1)));
    }

    #[test]
    fn listing_orders_by_title_then_id() {
        let mut collection = RecipeCollection::new();
        collection.insert(RecipeId::new(3), recipe("Borscht"));
        collection.insert(RecipeId::new(1), recipe("Toast"));
        collection.insert(RecipeId::new(2), recipe("Borscht"));

        let order: Vec<_> = collection
            .sorted_by_title()
            .into_iter()
            .map(|(id, r)| (id.value(), r.title().to_owned()))
            .collect();
        assert_eq!(
            order,
            vec![
                (2, "Borscht".to_owned()),
                (3, "Borscht".to_owned()),
                (1, "Toast".to_owned()),
            ]
        );
    }
}
