//! Recipe listing, detail, add, edit, and delete handlers.
//!
//! ```text
//! GET  /recipes              recipe list in title order
//! GET  /recipe/{id}          detail page
//! GET  /add                  add form
//! POST /add                  create a recipe (multipart, optional upload)
//! GET  /add/cancel           back to the list
//! GET  /edit/{id}/{subject}  edit form for one field
//! POST /edit/{id}/{subject}  save one field
//! POST /delete/{id}          delete a recipe
//! ```
//!
//! Every route is gated by [`CurrentUser`]. A recipe id that is
//! malformed, out of range, or unknown bounces to the list with a flash
//! rather than a bare 404; validation failures re-render the form with
//! the message and the typed input preserved.

use actix_multipart::form::MultipartForm;
use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::text::Text;
use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;

use crate::domain::{
    DomainError, ErrorKind, ImageSelection, NewRecipeInput, PendingUpload, Recipe, RecipeField,
    RecipeId,
};
use crate::inbound::http::error::PageResult;
use crate::inbound::http::pages::{self, AddFormValues};
use crate::inbound::http::respond::{html, see_other, unprocessable};
use crate::inbound::http::session::{CurrentUser, SessionContext};
use crate::inbound::http::state::HttpState;

#[get("/recipes")]
pub async fn recipe_list(
    state: web::Data<HttpState>,
    user: CurrentUser,
    session: SessionContext,
) -> PageResult {
    let recipes = state.recipes.list(&user.0).await?;
    Ok(html(pages::recipe_list(
        user.0.as_ref(),
        session.take_flash().as_deref(),
        &recipes,
    )))
}

/// Parse an id route segment.
///
/// A segment that is not a number can never name a recipe; callers treat
/// `None` exactly like an unknown id rather than answering with a bare
/// 404.
pub(crate) fn parse_id(segment: &str) -> Option<RecipeId> {
    segment.parse().ok().map(RecipeId::new)
}

#[get("/recipe/{id}")]
pub async fn recipe_detail(
    state: web::Data<HttpState>,
    user: CurrentUser,
    session: SessionContext,
    path: web::Path<String>,
) -> PageResult {
    let Some(id) = parse_id(&path.into_inner()) else {
        session.set_flash(DomainError::not_found().message());
        return Ok(see_other("/recipes"));
    };
    // Range check before lookup; ids past the highest in use can never
    // exist.
    let in_range = state
        .recipes
        .max_id(&user.0)
        .await?
        .is_some_and(|max| id <= max);
    if !in_range {
        session.set_flash(DomainError::not_found().message());
        return Ok(see_other("/recipes"));
    }
    match state.recipes.get(&user.0, id).await {
        Ok(recipe) => Ok(html(pages::recipe_detail(
            id,
            &recipe,
            session.take_flash().as_deref(),
        ))),
        Err(error) if error.kind() == ErrorKind::NotFound => {
            session.set_flash(error.message());
            Ok(see_other("/recipes"))
        }
        Err(error) => Err(error.into()),
    }
}

/// Multipart fields of the add-recipe form.
#[derive(MultipartForm)]
pub struct AddRecipeForm {
    title: Text<String>,
    ingredients: Text<String>,
    instructions: Text<String>,
    notes: Text<String>,
    image_choice: Option<Text<String>>,
    image_link: Option<Text<String>>,
    #[multipart(limit = "8MiB")]
    image_upload: Option<TempFile>,
}

/// Spooled upload attached to a form, if a file was actually chosen.
///
/// Browsers submit an empty file part when the input is left blank; that
/// counts as no upload.
pub(crate) fn pending_upload(upload: Option<&TempFile>) -> Option<PendingUpload> {
    let file = upload?;
    if file.size == 0 {
        return None;
    }
    Some(PendingUpload::new(
        file.file.path(),
        file.file_name.as_deref().unwrap_or_default(),
    ))
}

#[get("/add")]
pub async fn add_recipe_form(_user: CurrentUser) -> HttpResponse {
    html(pages::add_recipe(None, &AddFormValues::default()))
}

#[post("/add")]
pub async fn add_recipe(
    state: web::Data<HttpState>,
    user: CurrentUser,
    session: SessionContext,
    form: MultipartForm<AddRecipeForm>,
) -> PageResult {
    let form = form.into_inner();
    let values = AddFormValues {
        title: form.title.into_inner(),
        ingredients: form.ingredients.into_inner(),
        instructions: form.instructions.into_inner(),
        notes: form.notes.into_inner(),
        image_choice: form.image_choice.map(Text::into_inner).unwrap_or_default(),
        image_link: form.image_link.map(Text::into_inner).unwrap_or_default(),
    };
    let input = NewRecipeInput {
        title: values.title.clone(),
        ingredients: values.ingredients.clone(),
        instructions: values.instructions.clone(),
        notes: values.notes.clone(),
        image: ImageSelection::new(
            values.image_choice.clone(),
            values.image_link.clone(),
            pending_upload(form.image_upload.as_ref()),
        ),
    };
    match state.recipes.add(&user.0, input).await {
        Ok(_) => {
            session.set_flash("Recipe successfully added.");
            Ok(see_other("/recipes"))
        }
        Err(error) if error.kind().is_user_input() => Ok(unprocessable(pages::add_recipe(
            Some(error.message()),
            &values,
        ))),
        Err(error) => Err(error.into()),
    }
}

#[get("/add/cancel")]
pub async fn add_recipe_cancel(_user: CurrentUser) -> HttpResponse {
    see_other("/recipes")
}

fn field_content(recipe: &Recipe, field: RecipeField) -> String {
    match field {
        RecipeField::Title => recipe.title().to_owned(),
        RecipeField::Ingredients => recipe.ingredients().join("\n"),
        RecipeField::Instructions => recipe.instructions().join("\n"),
        RecipeField::Notes => recipe.notes().to_owned(),
    }
}

#[get("/edit/{id}/{subject}")]
pub async fn edit_recipe_form(
    state: web::Data<HttpState>,
    user: CurrentUser,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> PageResult {
    let (raw_id, segment) = path.into_inner();
    let Some(field) = RecipeField::from_segment(&segment) else {
        return Ok(HttpResponse::NotFound().finish());
    };
    let Some(id) = parse_id(&raw_id) else {
        session.set_flash(DomainError::not_found().message());
        return Ok(see_other("/recipes"));
    };
    match state.recipes.get(&user.0, id).await {
        Ok(recipe) => {
            let content = field_content(&recipe, field);
            Ok(html(pages::edit_field(id, field, &content, None)))
        }
        Err(error) if error.kind() == ErrorKind::NotFound => {
            session.set_flash(error.message());
            Ok(see_other("/recipes"))
        }
        Err(error) => Err(error.into()),
    }
}

/// Urlencoded body of the single-field edit form.
#[derive(Deserialize)]
pub struct EditForm {
    content: String,
}

#[post("/edit/{id}/{subject}")]
pub async fn edit_recipe(
    state: web::Data<HttpState>,
    user: CurrentUser,
    session: SessionContext,
    path: web::Path<(String, String)>,
    form: web::Form<EditForm>,
) -> PageResult {
    let (raw_id, segment) = path.into_inner();
    let Some(field) = RecipeField::from_segment(&segment) else {
        return Ok(HttpResponse::NotFound().finish());
    };
    let Some(id) = parse_id(&raw_id) else {
        session.set_flash(DomainError::not_found().message());
        return Ok(see_other("/recipes"));
    };
    let content = form.into_inner().content;
    let update = match field.validate(&content) {
        Ok(update) => update,
        Err(error) => {
            return Ok(unprocessable(pages::edit_field(
                id,
                field,
                &content,
                Some(error.message()),
            )));
        }
    };
    match state.recipes.update_field(&user.0, id, update).await {
        Ok(()) => Ok(see_other(&format!("/recipe/{id}"))),
        Err(error) if error.kind() == ErrorKind::NotFound => {
            session.set_flash(error.message());
            Ok(see_other("/recipes"))
        }
        Err(error) if error.kind().is_user_input() => Ok(unprocessable(pages::edit_field(
            id,
            field,
            &content,
            Some(error.message()),
        ))),
        Err(error) => Err(error.into()),
    }
}

#[post("/delete/{id}")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    user: CurrentUser,
    session: SessionContext,
    path: web::Path<String>,
) -> PageResult {
    let Some(id) = parse_id(&path.into_inner()) else {
        session.set_flash(DomainError::not_found().message());
        return Ok(see_other("/recipes"));
    };
    match state.recipes.delete(&user.0, id).await {
        Ok(recipe) => {
            session.set_flash(&format!("{} recipe successfully deleted.", recipe.title()));
            Ok(see_other("/recipes"))
        }
        Err(error) if error.kind() == ErrorKind::NotFound => {
            session.set_flash(error.message());
            Ok(see_other("/recipes"))
        }
        Err(error) => Err(error.into()),
    }
}
