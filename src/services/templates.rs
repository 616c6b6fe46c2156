// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::Settings;
use crate::error::{Error, Result};

const SYSTEM_PROMPT: &str = include_str!("../../prompts/system_prompt.txt");
const HUMAN_PROMPT: &str = include_str!("../../prompts/human_prompt.txt");

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{([a-z_][a-z0-9_]*)\}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateName {
    System,
    Human,
}

impl TemplateName {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::System => "system_prompt.txt",
            Self::Human => "human_prompt.txt",
        }
    }
}

/// Where prompt templates come from.
#[derive(Debug, Clone)]
pub enum TemplateStore {
    /// Templates compiled into the binary
    Embedded,
    /// `system_prompt.txt` / `human_prompt.txt` read from a directory
    Directory(PathBuf),
}

impl TemplateStore {
    pub fn from_settings(settings: &Settings) -> Self {
        match &settings.prompts_dir {
            Some(dir) => Self::Directory(dir.clone()),
            None => Self::Embedded,
        }
    }

    pub fn load(&self, name: TemplateName) -> Result<Cow<'static, str>> {
        match self {
            Self::Embedded => Ok(Cow::Borrowed(match name {
                TemplateName::System => SYSTEM_PROMPT.trim(),
                TemplateName::Human => HUMAN_PROMPT.trim(),
            })),
            Self::Directory(dir) => {
                let path = dir.join(name.file_name());
                match fs::read_to_string(&path) {
                    Ok(text) => Ok(Cow::Owned(text.trim().to_string())),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        Err(Error::TemplateNotFound {
                            name: name.file_name().into(),
                            path,
                        })
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }
}

/// Substitute `{name}` placeholders in one pass.
///
/// `{{` and `}}` produce literal braces; substituted values are never
/// rescanned. A placeholder with no matching variable is an error.
pub fn render(template_name: &str, template: &str, vars: &[(&str, String)]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER_REGEX.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        match caps.get(1) {
            Some(key) => {
                let value = vars
                    .iter()
                    .find(|(name, _)| *name == key.as_str())
                    .map(|(_, value)| value)
                    .ok_or_else(|| Error::TemplateRender {
                        template: template_name.to_string(),
                        placeholder: key.as_str().to_string(),
                    })?;
                out.push_str(value);
            }
            None => out.push_str(&whole.as_str()[..1]),
        }
    }

    out.push_str(&template[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_templates_name_every_variable() {
        let store = TemplateStore::Embedded;
        let system = store.load(TemplateName::System).unwrap();
        let human = store.load(TemplateName::Human).unwrap();

        assert!(system.contains("{format_instructions}"));
        for key in ["num_files", "additions", "deletions", "file_list", "diff_content"] {
            assert!(human.contains(&format!("{{{key}}}")), "human prompt lacks {key}");
        }
    }

    #[test]
    fn escaped_braces_render_literally() {
        let out = render("t", "{{\"a\": {x}}}", &[("x", "1".into())]).unwrap();
        assert_eq!(out, "{\"a\": 1}");
    }

    #[test]
    fn values_are_not_rescanned() {
        let out = render("t", "{a}", &[("a", "{b}".into())]).unwrap();
        assert_eq!(out, "{b}");
    }
}
