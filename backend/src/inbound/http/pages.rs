//! In-crate HTML rendering.
//!
//! Purpose: render every page of the application from plain functions, one
//! per page, over one shared layout. There is no template engine; the pages
//! are small enough that `format!` keeps them honest, and every piece of
//! user content passes through [`escape`] exactly once.

use crate::domain::{ImageDescriptor, Recipe, RecipeField, RecipeId};

/// Escape text for safe interpolation into HTML.
///
/// # Examples
/// ```
/// use backend::inbound::http::pages::escape;
///
/// assert_eq!(escape("Fish & <chips>"), "Fish &amp; &lt;chips&gt;");
/// ```
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn layout(title: &str, notice: Option<&str>, body: &str) -> String {
    let notice = notice
        .map(|message| format!("<p class=\"notice\">{}</p>\n", escape(message)))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         </head>\n\
         <body>\n\
         {notice}{body}\n\
         </body>\n\
         </html>\n",
        title = escape(title),
    )
}

/// Landing page for signed-out visitors.
pub fn welcome(notice: Option<&str>) -> String {
    layout(
        "Recipes",
        notice,
        "<h1>Recipes</h1>\n\
         <p>Keep your recipes in one place.</p>\n\
         <p><a href=\"/signin\">Sign in</a> or <a href=\"/register\">register</a> to get started.</p>",
    )
}

/// Sign-in form, optionally re-rendered with a message and the previous
/// username.
pub fn sign_in(notice: Option<&str>, username: &str) -> String {
    layout("Sign in", notice, &credentials_form("Sign in", "/signin", username))
}

/// Registration form, same shape as sign-in.
pub fn register(notice: Option<&str>, username: &str) -> String {
    layout(
        "Register",
        notice,
        &credentials_form("Register", "/register", username),
    )
}

fn credentials_form(heading: &str, action: &str, username: &str) -> String {
    format!(
        "<h1>{heading}</h1>\n\
         <form method=\"post\" action=\"{action}\">\n\
         <p><label>Username <input type=\"text\" name=\"username\" value=\"{username}\"></label></p>\n\
         <p><label>Password <input type=\"password\" name=\"password\"></label></p>\n\
         <p><button type=\"submit\">{heading}</button> <a href=\"{action}/cancel\">Cancel</a></p>\n\
         </form>",
        username = escape(username),
    )
}

/// Recipe list in title order, with the add link and sign-out control.
pub fn recipe_list(username: &str, notice: Option<&str>, recipes: &[(RecipeId, Recipe)]) -> String {
    let listing = if recipes.is_empty() {
        "<p>No recipes yet.</p>\n".to_owned()
    } else {
        let mut items = String::new();
        for (id, recipe) in recipes {
            items.push_str(&format!(
                "<li><a href=\"/recipe/{id}\">{title}</a></li>\n",
                title = escape(recipe.title()),
            ));
        }
        format!("<ul>\n{items}</ul>\n")
    };
    let body = format!(
        "<h1>{username}&#39;s recipes</h1>\n\
         {listing}\
         <p><a href=\"/add\">Add a recipe</a></p>\n\
         <form method=\"post\" action=\"/signout\"><button type=\"submit\">Sign out</button></form>",
        username = escape(username),
    );
    layout("Recipes", notice, &body)
}

/// Detail page for one recipe, with per-field edit links and the picture
/// and delete controls.
pub fn recipe_detail(id: RecipeId, recipe: &Recipe, notice: Option<&str>) -> String {
    let image = match recipe.image() {
        ImageDescriptor::None => String::new(),
        ImageDescriptor::Link(url) => format!(
            "<p><img src=\"{url}\" alt=\"{alt}\"></p>\n",
            url = escape(url),
            alt = escape(recipe.title()),
        ),
        ImageDescriptor::Upload(filename) => format!(
            "<p><img src=\"/images/{filename}\" alt=\"{alt}\"></p>\n",
            filename = escape(filename),
            alt = escape(recipe.title()),
        ),
    };
    let notes = if recipe.notes().is_empty() {
        "<p><em>No notes.</em></p>".to_owned()
    } else {
        format!("<p>{}</p>", escape(recipe.notes()))
    };
    let body = format!(
        "<h1>{title} {edit_title}</h1>\n\
         {image}\
         <h2>Ingredients {edit_ingredients}</h2>\n<ul>\n{ingredients}</ul>\n\
         <h2>Instructions {edit_instructions}</h2>\n<ol>\n{instructions}</ol>\n\
         <h2>Notes {edit_notes}</h2>\n{notes}\n\
         <p><a href=\"/image/{id}\">Change picture</a></p>\n\
         <form method=\"post\" action=\"/delete/{id}\"><button type=\"submit\">Delete recipe</button></form>\n\
         <p><a href=\"/recipes\">Back to recipes</a></p>",
        title = escape(recipe.title()),
        edit_title = edit_link(id, RecipeField::Title),
        edit_ingredients = edit_link(id, RecipeField::Ingredients),
        edit_instructions = edit_link(id, RecipeField::Instructions),
        edit_notes = edit_link(id, RecipeField::Notes),
        ingredients = item_lines(recipe.ingredients()),
        instructions = item_lines(recipe.instructions()),
    );
    layout(recipe.title(), notice, &body)
}

fn edit_link(id: RecipeId, field: RecipeField) -> String {
    format!("<a href=\"/edit/{id}/{}\">edit</a>", field.as_str())
}

fn item_lines(lines: &[String]) -> String {
    let mut items = String::new();
    for line in lines {
        items.push_str(&format!("<li>{}</li>\n", escape(line)));
    }
    items
}

/// Previously entered add-form values, re-shown when validation fails.
///
/// File inputs cannot be prefilled, so a rejected upload has to be chosen
/// again; everything else round-trips.
#[derive(Debug, Clone, Default)]
pub struct AddFormValues {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub notes: String,
    pub image_choice: String,
    pub image_link: String,
}

/// Add-recipe form; multipart because of the optional picture upload.
pub fn add_recipe(notice: Option<&str>, values: &AddFormValues) -> String {
    let body = format!(
        "<h1>Add a recipe</h1>\n\
         <form method=\"post\" action=\"/add\" enctype=\"multipart/form-data\">\n\
         <p><label>Title <input type=\"text\" name=\"title\" value=\"{title}\"></label></p>\n\
         <p><label>Ingredients (one per line)<br>\
         <textarea name=\"ingredients\" rows=\"8\">{ingredients}</textarea></label></p>\n\
         <p><label>Instructions (one per line)<br>\
         <textarea name=\"instructions\" rows=\"8\">{instructions}</textarea></label></p>\n\
         <p><label>Notes<br><textarea name=\"notes\" rows=\"4\">{notes}</textarea></label></p>\n\
         {picture}\
         <p><button type=\"submit\">Add recipe</button> <a href=\"/add/cancel\">Cancel</a></p>\n\
         </form>",
        title = escape(&values.title),
        ingredients = escape(&values.ingredients),
        instructions = escape(&values.instructions),
        notes = escape(&values.notes),
        picture = picture_fieldset(&values.image_choice, &values.image_link),
    );
    layout("Add a recipe", notice, &body)
}

/// Picture form for an existing recipe, showing the current picture state.
///
/// `choice` and `link` prefill the form: the current picture source on a
/// fresh render, the rejected submission on a validation re-render.
pub fn image_page(
    id: RecipeId,
    recipe_title: &str,
    current: &ImageDescriptor,
    notice: Option<&str>,
    choice: &str,
    link: &str,
) -> String {
    let current = match current {
        ImageDescriptor::None => "<p>No picture at the moment.</p>\n".to_owned(),
        ImageDescriptor::Link(url) => format!(
            "<p><img src=\"{url}\" alt=\"{alt}\"></p>\n\
             <form method=\"post\" action=\"/image/{id}/delete\">\
             <button type=\"submit\">Remove picture</button></form>\n",
            url = escape(url),
            alt = escape(recipe_title),
        ),
        ImageDescriptor::Upload(filename) => format!(
            "<p><img src=\"/images/{filename}\" alt=\"{alt}\"></p>\n\
             <form method=\"post\" action=\"/image/{id}/delete\">\
             <button type=\"submit\">Remove picture</button></form>\n",
            filename = escape(filename),
            alt = escape(recipe_title),
        ),
    };
    let body = format!(
        "<h1>Picture for {title}</h1>\n\
         {current}\
         <form method=\"post\" action=\"/image/{id}\" enctype=\"multipart/form-data\">\n\
         {picture}\
         <p><button type=\"submit\">Save picture</button> <a href=\"/recipe/{id}\">Cancel</a></p>\n\
         </form>",
        title = escape(recipe_title),
        picture = picture_fieldset(choice, link),
    );
    layout("Change picture", notice, &body)
}

fn picture_fieldset(choice: &str, link: &str) -> String {
    let choice = if choice.is_empty() { "none" } else { choice };
    let checked = |value: &str| if choice == value { " checked" } else { "" };
    format!(
        "<fieldset>\n\
         <legend>Picture</legend>\n\
         <p><label><input type=\"radio\" name=\"image_choice\" value=\"none\"{none}> No picture</label></p>\n\
         <p><label><input type=\"radio\" name=\"image_choice\" value=\"link\"{link_checked}> Link\n\
         <input type=\"url\" name=\"image_link\" value=\"{link}\"></label></p>\n\
         <p><label><input type=\"radio\" name=\"image_choice\" value=\"upload\"{upload}> Upload\n\
         <input type=\"file\" name=\"image_upload\" accept=\"image/*\"></label></p>\n\
         </fieldset>\n",
        none = checked("none"),
        link_checked = checked("link"),
        upload = checked("upload"),
        link = escape(link),
    )
}

/// Edit form for a single recipe field.
pub fn edit_field(id: RecipeId, field: RecipeField, content: &str, notice: Option<&str>) -> String {
    let control = if field.is_multi_line() {
        format!(
            "<textarea name=\"content\" rows=\"10\">{}</textarea>",
            escape(content)
        )
    } else {
        format!(
            "<input type=\"text\" name=\"content\" value=\"{}\">",
            escape(content)
        )
    };
    let body = format!(
        "<h1>Edit {label}</h1>\n\
         <form method=\"post\" action=\"/edit/{id}/{segment}\">\n\
         <p><label>{label}<br>{control}</label></p>\n\
         <p><button type=\"submit\">Save</button> <a href=\"/recipe/{id}\">Cancel</a></p>\n\
         </form>",
        label = field.label(),
        segment = field.as_str(),
    );
    layout(&format!("Edit {}", field.label()), notice, &body)
}

/// Generic page for failures the visitor cannot fix.
pub fn failure() -> String {
    layout(
        "Something went wrong",
        None,
        "<h1>Something went wrong</h1>\n\
         <p>Your change was not saved. Please try again in a moment.</p>\n\
         <p><a href=\"/recipes\">Back to recipes</a></p>",
    )
}
