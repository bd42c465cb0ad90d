//! Recipe collection operations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, warn};

use crate::domain::collection::RecipeCollection;
use crate::domain::error::DomainError;
use crate::domain::fields;
use crate::domain::ports::{ImageRepository, RecipeRepository, RemoveOutcome, StorageError};
use crate::domain::recipe::{
    ImageChoice, ImageDescriptor, ImageSelection, Recipe, RecipeId, RecipeUpdate, upload_filename,
};
use crate::domain::user::Username;

/// Raw form input for a new recipe, untouched by any validator.
#[derive(Debug, Clone, Default)]
pub struct NewRecipeInput {
    /// Title as typed; normalised during the add.
    pub title: String,
    /// Ingredient lines in one multi-line string.
    pub ingredients: String,
    /// Preparation steps in one multi-line string.
    pub instructions: String,
    /// Optional free-form notes.
    pub notes: String,
    /// Picture-related form fields.
    pub image: ImageSelection,
}

/// Per-user recipe operations over the recipe and image stores.
///
/// Every operation serialises on a per-user lock, so two requests from the
/// same account cannot interleave their load-modify-save cycles and an
/// allocated id is never handed out twice; the collections are small enough
/// that locking reads too costs nothing. Different accounts touch different
/// files and proceed in parallel. Locks appear on first use and are dropped
/// once nothing holds them, so the map tracks active accounts, not history.
pub struct RecipeService {
    recipes: Arc<dyn RecipeRepository>,
    images: Arc<dyn ImageRepository>,
    locks: StdMutex<HashMap<Username, Arc<AsyncMutex<()>>>>,
}

impl RecipeService {
    /// Build the service over its two stores.
    pub fn new(recipes: Arc<dyn RecipeRepository>, images: Arc<dyn ImageRepository>) -> Self {
        Self {
            recipes,
            images,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// All of `user`'s recipes, ordered by title with ids breaking ties.
    pub async fn list(&self, user: &Username) -> Result<Vec<(RecipeId, Recipe)>, DomainError> {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        let collection = self.load(user).await?;
        Ok(collection
            .sorted_by_title()
            .into_iter()
            .map(|(id, recipe)| (id, recipe.clone()))
            .collect())
    }

    /// Look up one recipe.
    ///
    /// # Errors
    /// [`DomainError::not_found`] when `user` has no recipe under `id`.
    pub async fn get(&self, user: &Username, id: RecipeId) -> Result<Recipe, DomainError> {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        let collection = self.load(user).await?;
        collection
            .get(id)
            .cloned()
            .ok_or_else(DomainError::not_found)
    }

    /// Highest id in use for `user`; `None` for an empty collection.
    ///
    /// Route handlers use this to reject out-of-range ids before a lookup.
    pub async fn max_id(&self, user: &Username) -> Result<Option<RecipeId>, DomainError> {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        Ok(self.load(user).await?.max_id())
    }

    /// Add a recipe from raw form input, returning its new id.
    ///
    /// Validation runs in a fixed order so exactly one message surfaces when
    /// several things are wrong at once: a duplicate title wins, then image
    /// consistency, then the first empty field in form order. The id is
    /// allocated as highest-in-use plus one; the image is placed before the
    /// collection is saved, so a stored recipe never points at a file that
    /// failed to arrive.
    pub async fn add(
        &self,
        user: &Username,
        input: NewRecipeInput,
    ) -> Result<RecipeId, DomainError> {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        let mut collection = self.load(user).await?;
        let NewRecipeInput {
            title,
            ingredients,
            instructions,
            notes,
            image,
        } = input;

        let title = fields::normalize_title(&title);
        if let Ok(ref normalized) = title {
            if collection.contains_title(normalized) {
                return Err(DomainError::duplicate_title());
            }
        }
        let image = ImageChoice::classify(image)?;
        let title = title?;
        let ingredients = fields::split_lines(&ingredients)?;
        let instructions = fields::split_lines(&instructions)?;
        let notes = notes.trim().to_owned();

        let id = collection.next_id();
        let descriptor = self.place_image(user, id, image).await?;
        collection.insert(
            id,
            Recipe::new(title, ingredients, instructions, notes, descriptor),
        );
        self.save(user, &collection).await?;
        Ok(id)
    }

    /// Replace one field of an existing recipe with validated content.
    ///
    /// # Errors
    /// - [`DomainError::not_found`] when `user` has no recipe under `id`.
    /// - [`DomainError::duplicate_title`] when a rename collides with a
    ///   different recipe's title; keeping the current title is allowed.
    pub async fn update_field(
        &self,
        user: &Username,
        id: RecipeId,
        update: RecipeUpdate,
    ) -> Result<(), DomainError> {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        let mut collection = self.load(user).await?;
        if collection.get(id).is_none() {
            return Err(DomainError::not_found());
        }
        if let RecipeUpdate::Title(ref title) = update {
            if collection.titled_elsewhere(title, id) {
                return Err(DomainError::duplicate_title());
            }
        }
        if let Some(recipe) = collection.get_mut(id) {
            recipe.apply(update);
        }
        self.save(user, &collection).await
    }

    /// Point a recipe at a new image source, tidying up any replaced upload.
    pub async fn set_image(
        &self,
        user: &Username,
        id: RecipeId,
        selection: ImageSelection,
    ) -> Result<(), DomainError> {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        let mut collection = self.load(user).await?;
        let Some(previous) = collection.get(id).map(|recipe| recipe.image().clone()) else {
            return Err(DomainError::not_found());
        };

        let choice = ImageChoice::classify(selection)?;
        let descriptor = self.place_image(user, id, choice).await?;
        let replaced = match (&previous, &descriptor) {
            (ImageDescriptor::Upload(old), ImageDescriptor::Upload(new)) if old == new => None,
            (ImageDescriptor::Upload(old), _) => Some(old.clone()),
            _ => None,
        };
        if let Some(filename) = replaced {
            self.discard_image(user, &filename).await;
        }
        if let Some(recipe) = collection.get_mut(id) {
            recipe.set_image(descriptor);
        }
        self.save(user, &collection).await
    }

    /// Remove a recipe's picture, deleting a stored upload if there was one.
    pub async fn clear_image(&self, user: &Username, id: RecipeId) -> Result<(), DomainError> {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        let mut collection = self.load(user).await?;
        let Some(previous) = collection.get(id).map(|recipe| recipe.image().clone()) else {
            return Err(DomainError::not_found());
        };
        if let ImageDescriptor::Upload(filename) = previous {
            self.discard_image(user, &filename).await;
        }
        if let Some(recipe) = collection.get_mut(id) {
            recipe.set_image(ImageDescriptor::None);
        }
        self.save(user, &collection).await
    }

    /// Raw bytes of one of `user`'s stored images; `None` when absent.
    ///
    /// Takes the user lock so a picture is never served half-replaced.
    pub async fn image_bytes(
        &self,
        user: &Username,
        filename: &str,
    ) -> Result<Option<Vec<u8>>, DomainError> {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        self.images
            .load(user, filename)
            .await
            .map_err(map_image_error)
    }

    /// Delete a recipe, returning the removed record for the goodbye
    /// message.
    pub async fn delete(&self, user: &Username, id: RecipeId) -> Result<Recipe, DomainError> {
        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        let mut collection = self.load(user).await?;
        let Some(recipe) = collection.remove(id) else {
            return Err(DomainError::not_found());
        };
        if let ImageDescriptor::Upload(filename) = recipe.image() {
            self.discard_image(user, filename).await;
        }
        self.save(user, &collection).await?;
        Ok(recipe)
    }

    async fn place_image(
        &self,
        user: &Username,
        id: RecipeId,
        choice: ImageChoice,
    ) -> Result<ImageDescriptor, DomainError> {
        match choice {
            ImageChoice::None => Ok(ImageDescriptor::None),
            ImageChoice::Link(url) => Ok(ImageDescriptor::Link(url)),
            ImageChoice::Upload(upload) => {
                let filename = upload_filename(id, upload.original_name());
                self.images
                    .store(user, &filename, upload.source())
                    .await
                    .map_err(map_image_error)?;
                Ok(ImageDescriptor::Upload(filename))
            }
        }
    }

    /// Best-effort removal of a stored image file; failures are logged and
    /// never abort the surrounding operation.
    async fn discard_image(&self, user: &Username, filename: &str) {
        match self.images.remove(user, filename).await {
            Ok(RemoveOutcome::Removed) => {}
            Ok(RemoveOutcome::AlreadyAbsent) => {
                warn!(user = %user, filename, "stored image was already gone");
            }
            Err(err) => {
                error!(user = %user, filename, error = %err, "failed to remove stored image");
            }
        }
    }

    fn user_lock(&self, user: &Username) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // A strong count of one means only the map still references the
        // lock; no request holds or awaits it, so the entry can go.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(user.clone()).or_default())
    }

    #[cfg(test)]
    pub(super) fn lock_count(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn load(&self, user: &Username) -> Result<RecipeCollection, DomainError> {
        self.recipes.load(user).await.map_err(map_recipe_error)
    }

    async fn save(
        &self,
        user: &Username,
        collection: &RecipeCollection,
    ) -> Result<(), DomainError> {
        self.recipes
            .save(user, collection)
            .await
            .map_err(map_recipe_error)
    }
}

fn map_recipe_error(err: StorageError) -> DomainError {
    DomainError::storage_unavailable(err.to_string())
}

fn map_image_error(err: StorageError) -> DomainError {
    DomainError::upload_io(err.to_string())
}
