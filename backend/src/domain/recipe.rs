//! Recipe data model.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, fields};

/// Identifier of a recipe within a single user's collection.
///
/// Ids are small positive integers handed out sequentially per user; they are
/// not unique across users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(u64);

impl RecipeId {
    /// Wrap a raw id taken from a route segment or a stored key.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Underlying integer value.
    pub fn value(self) -> u64 {
        self.0
    }

    /// The id following this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a recipe shows as its picture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageDescriptor {
    /// The recipe has no picture.
    #[default]
    None,
    /// An external address rendered directly by the browser.
    Link(String),
    /// A file stored in the owner's image directory, named `<id>.<ext>`.
    Upload(String),
}

impl ImageDescriptor {
    /// Whether the recipe has no picture at all.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// A stored recipe.
///
/// Field content is validated on the way in (see [`crate::domain::fields`]),
/// so a stored title is never blank and the list fields never hold blank
/// lines. Notes may be empty: the add form accepts a recipe without them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    title: String,
    ingredients: Vec<String>,
    instructions: Vec<String>,
    notes: String,
    #[serde(default)]
    image: ImageDescriptor,
}

impl Recipe {
    /// Assemble a recipe from already-validated parts.
    pub fn new(
        title: String,
        ingredients: Vec<String>,
        instructions: Vec<String>,
        notes: String,
        image: ImageDescriptor,
    ) -> Self {
        Self {
            title,
            ingredients,
            instructions,
            notes,
            image,
        }
    }

    /// Normalised display title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// One entry per ingredient line.
    pub fn ingredients(&self) -> &[String] {
        self.ingredients.as_slice()
    }

    /// One entry per preparation step.
    pub fn instructions(&self) -> &[String] {
        self.instructions.as_slice()
    }

    /// Free-form notes; may be empty.
    pub fn notes(&self) -> &str {
        self.notes.as_str()
    }

    /// Current picture, if any.
    pub fn image(&self) -> &ImageDescriptor {
        &self.image
    }

    /// Replace the field addressed by `update` with its validated content.
    pub fn apply(&mut self, update: RecipeUpdate) {
        match update {
            RecipeUpdate::Title(title) => self.title = title,
            RecipeUpdate::Ingredients(ingredients) => self.ingredients = ingredients,
            RecipeUpdate::Instructions(instructions) => self.instructions = instructions,
            RecipeUpdate::Notes(notes) => self.notes = notes,
        }
    }

    /// Swap the recipe's picture descriptor.
    pub fn set_image(&mut self, image: ImageDescriptor) {
        self.image = image;
    }
}

/// One editable recipe field, parsed from the edit route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeField {
    Title,
    Ingredients,
    Instructions,
    Notes,
}

impl RecipeField {
    /// Parse the subject segment of an edit route, case-insensitively.
    ///
    /// Returns [`None`] for segments naming no editable field, which the
    /// caller reports as an unknown page.
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment.to_ascii_lowercase().as_str() {
            "title" => Some(Self::Title),
            "ingredients" => Some(Self::Ingredients),
            "instructions" => Some(Self::Instructions),
            "notes" => Some(Self::Notes),
            _ => None,
        }
    }

    /// Canonical route segment for this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Ingredients => "ingredients",
            Self::Instructions => "instructions",
            Self::Notes => "notes",
        }
    }

    /// Heading shown on the edit form.
    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Ingredients => "Ingredients",
            Self::Instructions => "Instructions",
            Self::Notes => "Notes",
        }
    }

    /// Whether the edit form should offer a multi-line input.
    pub fn is_multi_line(self) -> bool {
        matches!(self, Self::Ingredients | Self::Instructions)
    }

    /// Run this field's validator over raw form input.
    ///
    /// Each field owns exactly one normalisation rule, selected here once so
    /// the rest of the pipeline only ever sees typed, validated content.
    pub fn validate(self, raw: &str) -> Result<RecipeUpdate, DomainError> {
        match self {
            Self::Title => fields::normalize_title(raw).map(RecipeUpdate::Title),
            Self::Ingredients => fields::split_lines(raw).map(RecipeUpdate::Ingredients),
            Self::Instructions => fields::split_lines(raw).map(RecipeUpdate::Instructions),
            Self::Notes => fields::non_empty(raw).map(RecipeUpdate::Notes),
        }
    }
}

impl fmt::Display for RecipeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated replacement content for one recipe field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeUpdate {
    Title(String),
    Ingredients(Vec<String>),
    Instructions(Vec<String>),
    Notes(String),
}

impl RecipeUpdate {
    /// The field this update replaces.
    pub fn field(&self) -> RecipeField {
        match self {
            Self::Title(_) => RecipeField::Title,
            Self::Ingredients(_) => RecipeField::Ingredients,
            Self::Instructions(_) => RecipeField::Instructions,
            Self::Notes(_) => RecipeField::Notes,
        }
    }
}

/// An uploaded file spooled to disk, waiting to be moved into a user's
/// image directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    source: PathBuf,
    original_name: String,
}

impl PendingUpload {
    /// Describe a spooled upload by its temporary path and client file name.
    pub fn new(source: impl Into<PathBuf>, original_name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            original_name: original_name.into(),
        }
    }

    /// Temporary file holding the uploaded bytes.
    pub fn source(&self) -> &Path {
        self.source.as_path()
    }

    /// File name as reported by the client; used only for its extension.
    pub fn original_name(&self) -> &str {
        self.original_name.as_str()
    }
}

/// Raw picture-related form fields, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSelection {
    choice: String,
    link: String,
    upload: Option<PendingUpload>,
}

impl ImageSelection {
    /// Bundle the image radio choice, the link field, and any spooled upload.
    pub fn new(
        choice: impl Into<String>,
        link: impl Into<String>,
        upload: Option<PendingUpload>,
    ) -> Self {
        Self {
            choice: choice.into(),
            link: link.into(),
            upload,
        }
    }
}

/// The image source a form actually asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChoice {
    /// No picture wanted.
    None,
    /// Render the picture from an external address.
    Link(String),
    /// Move the spooled upload into the owner's image directory.
    Upload(PendingUpload),
}

impl ImageChoice {
    /// Classify raw form fields into a single image intent.
    ///
    /// The selected source wins: a `link` choice reads only the link field
    /// and an `upload` choice only the attached file. Choosing no image (or
    /// an unrecognised choice value) while still supplying image data is an
    /// error, so a stray link or file never slips silently into a recipe.
    ///
    /// # Errors
    /// - [`DomainError::missing_link`] when `link` is chosen with a blank
    ///   address.
    /// - [`DomainError::missing_upload`] when `upload` is chosen without a
    ///   file.
    /// - [`DomainError::unexpected_image`] when no image is chosen but image
    ///   data was supplied anyway.
    pub fn classify(selection: ImageSelection) -> Result<Self, DomainError> {
        let ImageSelection {
            choice,
            link,
            upload,
        } = selection;
        match choice.as_str() {
            "link" => {
                let link = link.trim();
                if link.is_empty() {
                    return Err(DomainError::missing_link());
                }
                Ok(Self::Link(link.to_owned()))
            }
            "upload" => upload.map(Self::Upload).ok_or_else(DomainError::missing_upload),
            _ => {
                if !link.trim().is_empty() || upload.is_some() {
                    return Err(DomainError::unexpected_image());
                }
                Ok(Self::None)
            }
        }
    }
}

/// File name under which an upload for `id` is stored.
///
/// The extension is taken from the client file name, lowercased, and reduced
/// to ASCII alphanumerics; a missing or unusable extension yields the bare
/// id. The client name never contributes anything else, so a hostile
/// `file_name` cannot place the file outside the image directory.
///
/// # Examples
/// ```
/// use backend::domain::{RecipeId, upload_filename};
///
/// assert_eq!(upload_filename(RecipeId::new(7), "dinner photo.PNG"), "7.png");
/// assert_eq!(upload_filename(RecipeId::new(7), "snapshot"), "7");
/// ```
pub fn upload_filename(id: RecipeId, original_name: &str) -> String {
    match sanitized_extension(original_name) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

fn sanitized_extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    let cleaned: String = ext
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(10)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Some(cleaned)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{
        ImageChoice, ImageDescriptor, ImageSelection, PendingUpload, Recipe, RecipeField,
        RecipeId, RecipeUpdate, upload_filename,
    };
    use crate::domain::ErrorKind;

    fn sample_recipe() -> Recipe {
        Recipe::new(
            "Shakshuka".to_owned(),
            vec!["Eggs".to_owned(), "Tomatoes".to_owned()],
            vec!["Simmer sauce".to_owned(), "Poach eggs".to_owned()],
            String::new(),
            ImageDescriptor::None,
        )
    }

    fn pending(name: &str) -> PendingUpload {
        PendingUpload::new("/tmp/spooled-upload", name)
    }

    #[rstest]
    #[case(ImageSelection::new("none", "", None), Ok(ImageChoice::None))]
    #[case(
        ImageSelection::new("link", " https://example.test/toast.jpg ", None),
        Ok(ImageChoice::Link("https://example.test/toast.jpg".to_owned()))
    )]
    #[case(ImageSelection::new("link", "   ", None), Err(ErrorKind::MissingLink))]
    #[case(ImageSelection::new("upload", "", None), Err(ErrorKind::MissingUpload))]
    #[case(
        ImageSelection::new("none", "https://example.test/x.jpg", None),
        Err(ErrorKind::UnexpectedImage)
    )]
    #[case(ImageSelection::new("bogus", "", None), Ok(ImageChoice::None))]
    fn classification_follows_the_selected_source(
        #[case] selection: ImageSelection,
        #[case] expected: Result<ImageChoice, ErrorKind>,
    ) {
        let outcome = ImageChoice::classify(selection).map_err(|err| err.kind());
        assert_eq!(outcome, expected);
    }

    #[test]
    fn uploads_classify_to_their_pending_file() {
        let selection = ImageSelection::new("upload", "", Some(pending("soup.png")));
        let choice = ImageChoice::classify(selection).expect("upload should classify");
        assert_eq!(choice, ImageChoice::Upload(pending("soup.png")));
    }

    #[test]
    fn stray_uploads_without_a_choice_are_rejected() {
        let selection = ImageSelection::new("none", "", Some(pending("soup.png")));
        let err = ImageChoice::classify(selection).expect_err("must reject stray upload");
        assert_eq!(err.kind(), ErrorKind::UnexpectedImage);
    }

    #[rstest]
    #[case("dinner photo.PNG", "7.png")]
    #[case("toast.jpeg", "7.jpeg")]
    #[case("archive.tar.gz", "7.gz")]
    #[case("snapshot", "7")]
    #[case(".hidden", "7")]
    #[case("spaced. e x t", "7.ext")]
    #[case("../../sneaky.sh", "7.sh")]
    fn upload_filenames_derive_only_the_extension(#[case] original: &str, #[case] expected: &str) {
        assert_eq!(upload_filename(RecipeId::new(7), original), expected);
    }

    #[rstest]
    #[case("title", Some(RecipeField::Title))]
    #[case("Title", Some(RecipeField::Title))]
    #[case("INGREDIENTS", Some(RecipeField::Ingredients))]
    #[case("instructions", Some(RecipeField::Instructions))]
    #[case("notes", Some(RecipeField::Notes))]
    #[case("rating", None)]
    #[case("", None)]
    fn edit_subjects_parse_case_insensitively(
        #[case] segment: &str,
        #[case] expected: Option<RecipeField>,
    ) {
        assert_eq!(RecipeField::from_segment(segment), expected);
    }

    #[test]
    fn field_validators_produce_typed_updates() {
        let update = RecipeField::Title
            .validate(" weeknight CURRY ")
            .expect("valid title");
        assert_eq!(update, RecipeUpdate::Title("Weeknight Curry".to_owned()));
        assert_eq!(update.field(), RecipeField::Title);

        let update = RecipeField::Ingredients
            .validate("Chickpeas\r\nCoconut milk")
            .expect("valid list");
        assert_eq!(
            update,
            RecipeUpdate::Ingredients(vec!["Chickpeas".to_owned(), "Coconut milk".to_owned()])
        );

        let err = RecipeField::Notes.validate("   ").expect_err("blank notes");
        assert_eq!(err.kind(), ErrorKind::EmptyField);
    }

    #[test]
    fn updates_replace_only_their_field() {
        let mut recipe = sample_recipe();
        recipe.apply(RecipeUpdate::Notes("Serve with flatbread.".to_owned()));
        assert_eq!(recipe.notes(), "Serve with flatbread.");
        assert_eq!(recipe.title(), "Shakshuka");

        recipe.apply(RecipeUpdate::Title("Weekend Shakshuka".to_owned()));
        assert_eq!(recipe.title(), "Weekend Shakshuka");
        assert_eq!(recipe.ingredients(), ["Eggs", "Tomatoes"]);
    }

    #[test]
    fn recipes_round_trip_through_yaml() {
        let mut recipe = sample_recipe();
        recipe.set_image(ImageDescriptor::Upload("3.png".to_owned()));
        let yaml = serde_yaml::to_string(&recipe).expect("serializes");
        let back: Recipe = serde_yaml::from_str(&yaml).expect("deserializes");
        assert_eq!(back, recipe);
    }

    #[test]
    fn missing_image_field_defaults_to_no_picture() {
        let yaml = "title: Toast\ningredients:\n- Bread\ninstructions:\n- Toast it\nnotes: ''\n";
        let recipe: Recipe = serde_yaml::from_str(yaml).expect("deserializes");
        assert!(recipe.image().is_none());
    }

    #[test]
    fn ids_order_and_render_numerically() {
        assert!(RecipeId::new(2) < RecipeId::new(10));
        assert_eq!(RecipeId::new(4).next(), RecipeId::new(5));
        assert_eq!(RecipeId::new(12).to_string(), "12");
    }
}
