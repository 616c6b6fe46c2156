// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::fs;

use commitmint::config::Settings;
use commitmint::error::Error;
use commitmint::services::templates::{self, TemplateName, TemplateStore};

#[test]
fn embedded_store_is_the_default() {
    let store = TemplateStore::from_settings(&Settings::default());
    assert!(matches!(store, TemplateStore::Embedded));

    let system = store.load(TemplateName::System).unwrap();
    assert!(system.contains("{format_instructions}"));
}

#[test]
fn missing_template_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        prompts_dir: Some(dir.path().to_path_buf()),
        ..Settings::default()
    };
    let store = TemplateStore::from_settings(&settings);

    match store.load(TemplateName::Human) {
        Err(Error::TemplateNotFound { name, path }) => {
            assert_eq!(name, "human_prompt.txt");
            assert_eq!(path, dir.path().join("human_prompt.txt"));
        }
        other => panic!("expected TemplateNotFound, got {other:?}"),
    }
}

#[test]
fn directory_templates_override_embedded_ones() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("system_prompt.txt"), "Be brief.\n").unwrap();

    let store = TemplateStore::Directory(dir.path().to_path_buf());
    assert_eq!(store.load(TemplateName::System).unwrap(), "Be brief.");
}

#[test]
fn render_substitutes_every_placeholder() {
    let out = templates::render(
        "test",
        "{num_files} files, +{additions}",
        &[("num_files", "2".into()), ("additions", "7".into())],
    )
    .unwrap();
    assert_eq!(out, "2 files, +7");
}

#[test]
fn unknown_placeholder_is_an_error() {
    match templates::render("human_prompt.txt", "Hello {nope}", &[]) {
        Err(Error::TemplateRender {
            template,
            placeholder,
        }) => {
            assert_eq!(template, "human_prompt.txt");
            assert_eq!(placeholder, "nope");
        }
        other => panic!("expected TemplateRender, got {other:?}"),
    }
}

#[test]
fn json_braces_in_values_survive() {
    let out = templates::render(
        "test",
        "Schema: {format_instructions} {{literal}}",
        &[("format_instructions", r#"{"options": []}"#.into())],
    )
    .unwrap();
    assert_eq!(out, r#"Schema: {"options": []} {literal}"#);
}
