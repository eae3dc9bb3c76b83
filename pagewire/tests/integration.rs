#![allow(clippy::expect_used, reason = "Fine in tests")]
use std::fs;

use pagewire::{
  config::Config,
  render::{HIGHLIGHT_STYLESHEET, build_site},
};
use tempfile::tempdir;

const POST: &str = r#"<!DOCTYPE html>
<html>
<head><title>Post</title></head>
<body>
<aside><nav id="toc"></nav></aside>
<article>
  <h1>Post</h1>
  <h2>Setup</h2>
  <p>See <a href="https://example.com">the docs</a> or <a href="/about">about</a>.</p>
  <h3>Install</h3>
  <pre><code class="language-rust">fn main() {}
</code></pre>
  <h2>Usage</h2>
</article>
</body>
</html>"#;

#[test]
fn test_build_processes_pages_and_copies_assets() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let input_dir = temp_dir.path().join("public");
  let output_dir = temp_dir.path().join("build");
  fs::create_dir_all(input_dir.join("posts")).expect("Failed to create dir in test");
  fs::write(input_dir.join("posts/hello.html"), POST).expect("Failed to write page");
  fs::write(input_dir.join("style.css"), "body {}").expect("Failed to write asset");

  let config = Config {
    input_dir: input_dir.clone(),
    output_dir: output_dir.clone(),
    jobs: Some(2),
    highlight_theme: Some("Github".into()),
    ..Config::default()
  };
  let summary = build_site(&config).expect("build succeeds");

  assert_eq!(summary.pages, 1);
  assert_eq!(summary.assets, 1);
  assert_eq!(summary.code_blocks, 1);
  assert_eq!(summary.external_links, 1);
  assert_eq!(summary.toc_pages, 1);
  assert_eq!(summary.stylesheet, Some(output_dir.join(HIGHLIGHT_STYLESHEET)));

  let html = fs::read_to_string(output_dir.join("posts/hello.html"))
    .expect("processed page written");
  assert!(html.contains(r#"<div class="code-group group">"#));
  assert!(html.contains(r#"class="copy-btn""#));
  assert!(html.contains(r#"id="01_Setup""#));
  assert!(html.contains(r##"href="#01.01_Install""##));
  assert!(html.contains(r#"<a href="https://example.com" target="_blank">"#));
  assert!(html.contains(r#"<a href="/about">"#));

  assert_eq!(
    fs::read_to_string(output_dir.join("style.css")).expect("asset copied"),
    "body {}"
  );
  let css = fs::read_to_string(output_dir.join(HIGHLIGHT_STYLESHEET))
    .expect("stylesheet written");
  assert!(!css.is_empty());
}

#[test]
fn test_disabled_passes_leave_markup_alone() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let input_dir = temp_dir.path().join("public");
  let output_dir = temp_dir.path().join("build");
  fs::create_dir_all(&input_dir).expect("Failed to create dir in test");
  fs::write(input_dir.join("index.html"), POST).expect("Failed to write page");

  let config = Config {
    input_dir,
    output_dir: output_dir.clone(),
    highlight_code: false,
    rewrite_links: false,
    generate_toc: false,
    ..Config::default()
  };
  let summary = build_site(&config).expect("build succeeds");
  assert_eq!(summary.external_links, 0);
  assert_eq!(summary.toc_pages, 0);
  assert_eq!(summary.stylesheet, None);

  let html = fs::read_to_string(output_dir.join("index.html")).expect("page written");
  assert!(!html.contains("target=\"_blank\""));
  assert!(!html.contains("01_Setup"));
  assert!(!html.contains("highlighted"));
}

#[test]
fn test_missing_input_directory_is_an_error() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let config = Config {
    input_dir: temp_dir.path().join("nonexistent"),
    output_dir: temp_dir.path().join("build"),
    ..Config::default()
  };
  let err = build_site(&config).expect_err("missing input");
  assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_config_file_discovery_and_loading() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  assert!(Config::find_config_file_in(temp_dir.path()).is_none());

  let path = temp_dir.path().join("pagewire.toml");
  Config::generate_default_config("toml", &path).expect("config written");
  assert_eq!(Config::find_config_file_in(temp_dir.path()), Some(path.clone()));

  let config = Config::from_file(&path).expect("config loads");
  assert_eq!(config.highlight_theme.as_deref(), Some("Github"));
  assert!(config.generate_toc);

  let json = temp_dir.path().join("site.json");
  fs::write(&json, r#"{"input_dir": "dist", "split_lines": true}"#)
    .expect("Failed to write config");
  let config = Config::from_file(&json).expect("json config loads");
  assert_eq!(config.input_dir, std::path::PathBuf::from("dist"));
  assert!(config.split_lines);

  let yaml = temp_dir.path().join("site.yaml");
  fs::write(&yaml, "input_dir: dist").expect("Failed to write config");
  assert!(Config::from_file(&yaml).is_err());
}
