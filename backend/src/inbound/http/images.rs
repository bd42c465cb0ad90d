//! Picture management and serving.
//!
//! ```text
//! GET  /image/{id}         picture form for a recipe
//! POST /image/{id}         save a new picture source (multipart)
//! POST /image/{id}/delete  remove the current picture
//! GET  /images/{filename}  serve one of the signed-in user's pictures
//! ```
//!
//! Uploads live in a per-user directory and `/images/{filename}` reads only
//! from the requesting account's directory, so one user can never address
//! another's files.

use actix_multipart::form::MultipartForm;
use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::text::Text;
use actix_web::{HttpResponse, get, post, web};

use crate::domain::{DomainError, ErrorKind, ImageDescriptor, ImageSelection};
use crate::inbound::http::error::PageResult;
use crate::inbound::http::pages;
use crate::inbound::http::recipes::{parse_id, pending_upload};
use crate::inbound::http::respond::{html, see_other, unprocessable};
use crate::inbound::http::session::{CurrentUser, SessionContext};
use crate::inbound::http::state::HttpState;

/// Form prefill for the current picture source.
fn image_values(current: &ImageDescriptor) -> (&'static str, &str) {
    match current {
        ImageDescriptor::None => ("none", ""),
        ImageDescriptor::Link(url) => ("link", url.as_str()),
        ImageDescriptor::Upload(_) => ("upload", ""),
    }
}

#[get("/image/{id}")]
pub async fn image_form(
    state: web::Data<HttpState>,
    user: CurrentUser,
    session: SessionContext,
    path: web::Path<String>,
) -> PageResult {
    let Some(id) = parse_id(&path.into_inner()) else {
        session.set_flash(DomainError::not_found().message());
        return Ok(see_other("/recipes"));
    };
    match state.recipes.get(&user.0, id).await {
        Ok(recipe) => {
            let (choice, link) = image_values(recipe.image());
            Ok(html(pages::image_page(
                id,
                recipe.title(),
                recipe.image(),
                None,
                choice,
                link,
            )))
        }
        Err(error) if error.kind() == ErrorKind::NotFound => {
            session.set_flash(error.message());
            Ok(see_other("/recipes"))
        }
        Err(error) => Err(error.into()),
    }
}

/// Multipart fields of the picture form.
#[derive(MultipartForm)]
pub struct PictureForm {
    image_choice: Option<Text<String>>,
    image_link: Option<Text<String>>,
    #[multipart(limit = "8MiB")]
    image_upload: Option<TempFile>,
}

#[post("/image/{id}")]
pub async fn set_image(
    state: web::Data<HttpState>,
    user: CurrentUser,
    session: SessionContext,
    path: web::Path<String>,
    form: MultipartForm<PictureForm>,
) -> PageResult {
    let Some(id) = parse_id(&path.into_inner()) else {
        session.set_flash(DomainError::not_found().message());
        return Ok(see_other("/recipes"));
    };
    let form = form.into_inner();
    let choice = form.image_choice.map(Text::into_inner).unwrap_or_default();
    let link = form.image_link.map(Text::into_inner).unwrap_or_default();
    let selection = ImageSelection::new(
        choice.clone(),
        link.clone(),
        pending_upload(form.image_upload.as_ref()),
    );
    match state.recipes.set_image(&user.0, id, selection).await {
        Ok(()) => Ok(see_other(&format!("/recipe/{id}"))),
        Err(error) if error.kind() == ErrorKind::NotFound => {
            session.set_flash(error.message());
            Ok(see_other("/recipes"))
        }
        Err(error) if error.kind().is_user_input() => {
            // The re-render needs the recipe back for the heading and the
            // current picture; it can vanish between the two loads.
            match state.recipes.get(&user.0, id).await {
                Ok(recipe) => Ok(unprocessable(pages::image_page(
                    id,
                    recipe.title(),
                    recipe.image(),
                    Some(error.message()),
                    &choice,
                    &link,
                ))),
                Err(gone) if gone.kind() == ErrorKind::NotFound => {
                    session.set_flash(gone.message());
                    Ok(see_other("/recipes"))
                }
                Err(gone) => Err(gone.into()),
            }
        }
        Err(error) => Err(error.into()),
    }
}

#[post("/image/{id}/delete")]
pub async fn delete_image(
    state: web::Data<HttpState>,
    user: CurrentUser,
    session: SessionContext,
    path: web::Path<String>,
) -> PageResult {
    let Some(id) = parse_id(&path.into_inner()) else {
        session.set_flash(DomainError::not_found().message());
        return Ok(see_other("/recipes"));
    };
    match state.recipes.clear_image(&user.0, id).await {
        Ok(()) => Ok(see_other(&format!("/recipe/{id}"))),
        Err(error) if error.kind() == ErrorKind::NotFound => {
            session.set_flash(error.message());
            Ok(see_other("/recipes"))
        }
        Err(error) => Err(error.into()),
    }
}

/// Stored image names start with the recipe id. Anything else, including
/// names with path separators smuggled in via percent-encoding, is not
/// served.
fn is_servable(filename: &str) -> bool {
    filename.starts_with(|ch: char| ch.is_ascii_digit()) && !filename.contains(['/', '\\'])
}

fn content_type_for(filename: &str) -> &'static str {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    match ext {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[get("/images/{filename}")]
pub async fn serve_image(
    state: web::Data<HttpState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> PageResult {
    let filename = path.into_inner();
    if !is_servable(&filename) {
        return Ok(HttpResponse::NotFound().finish());
    }
    match state.recipes.image_bytes(&user.0, &filename).await? {
        Some(bytes) => Ok(HttpResponse::Ok()
            .content_type(content_type_for(&filename))
            .body(bytes)),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test as actix_test, web};
    use rstest::rstest;

    use crate::inbound::http::test_utils::{
        MultipartBody, multipart_request, plain_recipe_form, register_and_sign_in, session_cookie,
        temp_state, test_session_middleware,
    };

    #[rstest]
    #[case("1.png", "image/png")]
    #[case("2.jpeg", "image/jpeg")]
    #[case("3", "application/octet-stream")]
    fn content_types_follow_the_extension(#[case] filename: &str, #[case] expected: &str) {
        assert_eq!(super::content_type_for(filename), expected);
    }

    #[rstest]
    #[case("1.png", true)]
    #[case("12", true)]
    #[case("credentials.yml", false)]
    #[case(".hidden", false)]
    #[case("1/../credentials.yml", false)]
    fn only_id_named_files_are_servable(#[case] filename: &str, #[case] servable: bool) {
        assert_eq!(super::is_servable(filename), servable);
    }

    fn test_app(
        state: crate::inbound::http::state::HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .configure(crate::inbound::http::configure)
    }

    async fn body_text(res: actix_web::dev::ServiceResponse) -> String {
        let body = actix_test::read_body(res).await;
        String::from_utf8(body.to_vec()).expect("utf8 body")
    }

    fn picture_form(choice: &str, link: &str) -> MultipartBody {
        MultipartBody::new()
            .text("image_choice", choice)
            .text("image_link", link)
    }

    #[actix_web::test]
    async fn the_picture_form_prefills_the_current_source() {
        let (state, _data) = temp_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_sign_in(&app, "alice", "tasty-secret").await;

        let form = plain_recipe_form("banana bread")
            .text("image_choice", "link")
            .text("image_link", "https://pics.example/loaf.png");
        let res = actix_test::call_service(&app, multipart_request("/add", cookie.clone(), form)).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/image/1")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let page = body_text(res).await;
        assert!(page.contains("Picture for Banana Bread"));
        assert!(page.contains("value=\"link\" checked"));
        assert!(page.contains("value=\"https://pics.example/loaf.png\""));
    }

    #[actix_web::test]
    async fn linking_a_picture_shows_it_on_the_detail_page() {
        let (state, _data) = temp_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_sign_in(&app, "alice", "tasty-secret").await;

        let res = actix_test::call_service(
            &app,
            multipart_request("/add", cookie.clone(), plain_recipe_form("banana bread")),
        )
        .await;
        let _ = session_cookie(&res);

        let res = actix_test::call_service(
            &app,
            multipart_request(
                "/image/1",
                cookie.clone(),
                picture_form("link", "https://pics.example/loaf.png"),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/recipe/1")
        );

        let detail = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/recipe/1")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let page = body_text(detail).await;
        assert!(page.contains("src=\"https://pics.example/loaf.png\""));
    }

    #[actix_web::test]
    async fn uploading_stores_and_serves_the_picture() {
        let (state, data) = temp_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_sign_in(&app, "alice", "tasty-secret").await;

        let res = actix_test::call_service(
            &app,
            multipart_request("/add", cookie.clone(), plain_recipe_form("banana bread")),
        )
        .await;
        let _ = session_cookie(&res);

        let form = picture_form("upload", "").file("image_upload", "loaf.png", "image/png", b"png bytes");
        let res = actix_test::call_service(&app, multipart_request("/image/1", cookie.clone(), form)).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(data.path().join("images").join("alice").join("1.png").exists());

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/images/1.png")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("image/png")
        );
        let body = actix_test::read_body(res).await;
        assert_eq!(body.as_ref(), b"png bytes");
    }

    #[actix_web::test]
    async fn replacing_an_upload_removes_the_old_file() {
        let (state, data) = temp_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_sign_in(&app, "alice", "tasty-secret").await;

        let form = plain_recipe_form("banana bread")
            .text("image_choice", "upload")
            .file("image_upload", "loaf.png", "image/png", b"old");
        let res = actix_test::call_service(&app, multipart_request("/add", cookie.clone(), form)).await;
        let _ = session_cookie(&res);
        let images = data.path().join("images").join("alice");
        assert!(images.join("1.png").exists());

        let form = picture_form("upload", "").file("image_upload", "photo.jpg", "image/jpeg", b"new");
        let res = actix_test::call_service(&app, multipart_request("/image/1", cookie, form)).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(!images.join("1.png").exists(), "replaced file is removed");
        assert!(images.join("1.jpg").exists());
    }

    #[actix_web::test]
    async fn a_link_choice_without_an_address_re_renders() {
        let (state, _data) = temp_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_sign_in(&app, "alice", "tasty-secret").await;

        let res = actix_test::call_service(
            &app,
            multipart_request("/add", cookie.clone(), plain_recipe_form("banana bread")),
        )
        .await;
        let _ = session_cookie(&res);

        let res = actix_test::call_service(
            &app,
            multipart_request("/image/1", cookie, picture_form("link", "  ")),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let page = body_text(res).await;
        assert!(page.contains("Image link can not be empty."));
        assert!(page.contains("Picture for Banana Bread"));
    }

    #[actix_web::test]
    async fn removing_a_picture_deletes_the_stored_file() {
        let (state, data) = temp_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_sign_in(&app, "alice", "tasty-secret").await;

        let form = plain_recipe_form("banana bread")
            .text("image_choice", "upload")
            .file("image_upload", "loaf.png", "image/png", b"png bytes");
        let res = actix_test::call_service(&app, multipart_request("/add", cookie.clone(), form)).await;
        let _ = session_cookie(&res);
        let stored = data.path().join("images").join("alice").join("1.png");
        assert!(stored.exists());

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/image/1/delete")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(!stored.exists(), "stored upload is deleted");

        let detail = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/recipe/1")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let page = body_text(detail).await;
        assert!(!page.contains("/images/1.png"));
    }

    #[actix_web::test]
    async fn pictures_are_scoped_to_their_owner() {
        let (state, _data) = temp_state();
        let app = actix_test::init_service(test_app(state)).await;
        let alice = register_and_sign_in(&app, "alice", "tasty-secret").await;

        let form = plain_recipe_form("banana bread")
            .text("image_choice", "upload")
            .file("image_upload", "loaf.png", "image/png", b"png bytes");
        let res = actix_test::call_service(&app, multipart_request("/add", alice.clone(), form)).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let bob = register_and_sign_in(&app, "bob", "other-secret").await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/images/1.png")
                .cookie(bob)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/images/1.png")
                .cookie(alice)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn encoded_traversal_names_are_not_served() {
        let (state, _data) = temp_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_sign_in(&app, "alice", "tasty-secret").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/images/..%2Fcredentials.yml")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn non_numeric_picture_ids_bounce_to_the_list() {
        let (state, _data) = temp_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_sign_in(&app, "alice", "tasty-secret").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/image/latest")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/recipes")
        );
    }

    #[actix_web::test]
    async fn missing_pictures_are_not_found() {
        let (state, _data) = temp_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_sign_in(&app, "alice", "tasty-secret").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/images/9.png")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
