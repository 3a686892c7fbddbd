use book_compose::{
    Align, Anchor, Book, BookFile, Color, ComposeError, ImageFormat, ManuscriptFormat, in_to_pt,
    opt_in_to_pt,
};

fn load(yaml: &str, base: &std::path::Path) -> book_compose::Result<Book> {
    let file: BookFile = serde_yaml::from_str(yaml).unwrap();
    Book::from_file(file, base.to_path_buf())
}

#[test]
fn unit_conversion_is_tolerant_of_missing_values() {
    assert_eq!(in_to_pt(1.5), 108.0);
    assert_eq!(opt_in_to_pt(Some(0.25)), 18.0);
    assert_eq!(opt_in_to_pt(None), 0.0);
}

#[test]
fn page_size_includes_bleed_on_both_edges() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = r#"
book:
  trim_size_in: { width: 6.0, height: 9.0 }
  bleed_in: 0.125
  image_folder: images
"#;
    let book = load(yaml, dir.path()).unwrap();
    assert_eq!(book.page_width_pt, (6.0 + 0.25) * 72.0);
    assert_eq!(book.page_height_pt, (9.0 + 0.25) * 72.0);
    assert_eq!(book.bleed_pt, 9.0);
}

#[test]
fn trim_size_defaults_to_six_by_nine() {
    let dir = tempfile::tempdir().unwrap();
    let book = load("book:\n  image_folder: images\n", dir.path()).unwrap();
    assert_eq!(book.page_width_pt, 432.0);
    assert_eq!(book.page_height_pt, 648.0);
}

#[test]
fn missing_image_folder_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load("book: {}\n", dir.path()).unwrap_err();
    assert!(matches!(err, ComposeError::Config(_)));
    assert!(err.to_string().contains("image_folder"));
}

#[test]
fn region_defaults_match_the_documented_values() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = r#"
book:
  image_folder: images
  text_layout:
    bottom: {}
"#;
    let book = load(yaml, dir.path()).unwrap();
    let region = &book.regions["bottom"];
    assert_eq!(region.font_size, 26.0);
    assert_eq!(region.leading, 26.0 * 1.2);
    assert_eq!(region.color, Color { r: 0x11, g: 0x11, b: 0x11 });
    assert_eq!(region.align, Align::Center);
    assert_eq!(region.box_height, 108.0);
    assert_eq!(region.insets.left, 36.0);
    assert_eq!(region.insets.right, 36.0);
    assert_eq!(region.insets.top, 36.0);
    assert_eq!(region.insets.bottom, 36.0);
    assert_eq!(region.insets.inner, None);
    assert_eq!(region.insets.outer, None);
    assert_eq!(region.anchor, Anchor::Bottom);
    assert!(region.folder.is_none());
}

#[test]
fn region_overrides_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = r##"
book:
  image_folder: images
  text_layout:
    top:
      folder: text/top
      font_size_pt: 14
      leading_pt: 18
      color: "#aabbcc"
      align: right
      box_height_in: 2.0
      inset_in: { left: 1.0, inner: 0.75, outer: 0.25, center: 0.5 }
      origin: top
"##;
    let book = load(yaml, dir.path()).unwrap();
    let region = &book.regions["top"];
    assert_eq!(region.font_size, 14.0);
    assert_eq!(region.leading, 18.0);
    assert_eq!(region.color, Color { r: 0xaa, g: 0xbb, b: 0xcc });
    assert_eq!(region.align, Align::Right);
    assert_eq!(region.box_height, 144.0);
    assert_eq!(region.insets.left, 72.0);
    assert_eq!(region.insets.right, 36.0);
    assert_eq!(region.insets.inner, Some(54.0));
    assert_eq!(region.insets.outer, Some(18.0));
    assert_eq!(region.insets.center, 36.0);
    assert_eq!(region.anchor, Anchor::Top);
    let top_folder = dir.path().join("text/top");
    assert_eq!(region.folder.as_deref(), Some(top_folder.as_path()));
    // The folder is created eagerly so file-mode text has somewhere to live.
    assert!(top_folder.is_dir());
}

#[test]
fn invalid_hex_color_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = r#"
book:
  image_folder: images
  text_layout:
    top: { color: "notacolor" }
"#;
    assert!(load(yaml, dir.path()).is_err());
}

#[test]
fn output_toggles_accept_false_or_a_section() {
    let dir = tempfile::tempdir().unwrap();
    let disabled = r#"
book:
  image_folder: images
  image_output: false
  manuscript: false
"#;
    let book = load(disabled, dir.path()).unwrap();
    assert!(book.image_output.is_none());
    assert!(book.manuscript.is_none());

    let enabled = r#"
book:
  image_folder: images
  image_output: { folder: out/pages, format: jpg, dpi: 150 }
  manuscript: { path: out/manuscript.txt, format: txt }
"#;
    let book = load(enabled, dir.path()).unwrap();
    let image_output = book.image_output.as_ref().unwrap();
    assert_eq!(image_output.format, ImageFormat::Jpg);
    assert_eq!(image_output.dpi, 150.0);
    assert_eq!(image_output.folder, dir.path().join("out/pages"));
    let manuscript = book.manuscript.as_ref().unwrap();
    assert_eq!(manuscript.format, ManuscriptFormat::Txt);
    assert_eq!(manuscript.path, dir.path().join("out/manuscript.txt"));
}

#[test]
fn image_output_defaults_are_png_at_300_dpi() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = r#"
book:
  image_folder: images
  image_output: { folder: out/pages }
"#;
    let book = load(yaml, dir.path()).unwrap();
    let image_output = book.image_output.as_ref().unwrap();
    assert_eq!(image_output.format, ImageFormat::Png);
    assert_eq!(image_output.dpi, 300.0);
}

#[test]
fn configured_font_path_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = r#"
book:
  image_folder: images
  font: { name: Lexend, path: fonts/missing.ttf }
"#;
    let err = load(yaml, dir.path()).unwrap_err();
    assert!(matches!(err, ComposeError::MissingResource(_)));
}

#[test]
fn missing_text_library_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = r#"
book:
  image_folder: images
  text_library: nowhere.yaml
"#;
    let err = load(yaml, dir.path()).unwrap_err();
    assert!(matches!(err, ComposeError::MissingResource(_)));
}

#[test]
fn missing_config_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = Book::load(&dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(err, ComposeError::MissingResource(_)));
}

#[test]
fn title_and_output_default() {
    let dir = tempfile::tempdir().unwrap();
    let book = load("book:\n  image_folder: images\n", dir.path()).unwrap();
    assert_eq!(book.title, "Untitled Book");
    assert_eq!(book.output_pdf, dir.path().join("book.pdf"));
}
