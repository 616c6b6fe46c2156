// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

mod helpers;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use commitmint::config::{Provider, Settings};
use commitmint::domain::DiffSummary;
use commitmint::error::Error;
use commitmint::services::generator::{
    Generator, MAX_DIFF_CHARS, NO_FILES, Overrides, ResolvedModel, TRUNCATION_MARKER,
    truncate_diff,
};
use commitmint::services::summarizer::DiffSummarizer;
use commitmint::services::templates::TemplateStore;
use helpers::{BuildRequest, RecordingFactory, option, reply};

fn summary_for(diff: &str) -> DiffSummary {
    DiffSummarizer::summarize(diff, &[" src/lib.rs | 3 ++-"][..])
}

async fn run(
    settings: &Settings,
    factory: &RecordingFactory,
    diff: &str,
    overrides: &Overrides,
) -> commitmint::Result<commitmint::domain::CandidateSet> {
    let generator = Generator::new(settings, TemplateStore::Embedded, factory);
    let (tx, _rx) = mpsc::channel(64);
    generator
        .generate(
            diff,
            &summary_for(diff),
            overrides,
            tx,
            CancellationToken::new(),
        )
        .await
}

// ─── Truncation ──────────────────────────────────────────────────────────────

#[test]
fn long_diff_is_cut_to_budget_and_marked() {
    let diff = "x".repeat(10_000);
    let truncated = truncate_diff(&diff);

    let kept = truncated.strip_suffix(TRUNCATION_MARKER).unwrap();
    assert_eq!(kept.chars().count(), MAX_DIFF_CHARS);
    assert_eq!(kept, &diff[..3_500]);
}

#[test]
fn diff_at_budget_is_untouched() {
    let diff = "y".repeat(MAX_DIFF_CHARS);
    assert_eq!(truncate_diff(&diff), diff);
}

#[test]
fn truncation_respects_char_boundaries() {
    let diff = "ü".repeat(MAX_DIFF_CHARS + 10);
    let truncated = truncate_diff(&diff);
    let kept = truncated.strip_suffix(TRUNCATION_MARKER).unwrap();
    assert_eq!(kept.chars().count(), MAX_DIFF_CHARS);
}

#[tokio::test]
async fn prompt_carries_truncated_diff() {
    let factory = RecordingFactory::replying(reply(&[option("feat", None, "add", None, 0.5)]));
    let diff = format!("{}TAIL", "z".repeat(10_000));

    run(&Settings::default(), &factory, &diff, &Overrides::default())
        .await
        .unwrap();

    let prompts = factory.prompts();
    let human = &prompts[0].human;
    assert!(human.contains(&format!("{}{TRUNCATION_MARKER}", "z".repeat(MAX_DIFF_CHARS))));
    assert!(!human.contains("TAIL"));
}

// ─── Model resolution ────────────────────────────────────────────────────────

#[test]
fn explicit_model_beats_stored_model() {
    let settings = Settings {
        model: Some("B".into()),
        ..Settings::default()
    };
    let overrides = Overrides {
        model: Some("A".into()),
        ..Overrides::default()
    };
    let resolved = ResolvedModel::resolve(&settings, &overrides).unwrap();
    assert_eq!(resolved.model.as_deref(), Some("A"));
}

#[test]
fn stored_values_apply_without_overrides() {
    let settings = Settings {
        provider: Provider::Anthropic,
        model: Some("claude-opus-4-1".into()),
        temperature: 0.6,
        ..Settings::default()
    };
    let resolved = ResolvedModel::resolve(&settings, &Overrides::default()).unwrap();
    assert_eq!(resolved.provider, Provider::Anthropic);
    assert_eq!(resolved.model_name(), "claude-opus-4-1");
    assert!((resolved.temperature - 0.6).abs() < f32::EPSILON);
}

#[test]
fn switching_provider_drops_stored_model() {
    let settings = Settings {
        provider: Provider::OpenAI,
        model: Some("gpt-5-mini".into()),
        ..Settings::default()
    };
    let overrides = Overrides {
        provider: Some(Provider::Google),
        ..Overrides::default()
    };
    let resolved = ResolvedModel::resolve(&settings, &overrides).unwrap();
    assert_eq!(resolved.model, None);
    assert_eq!(resolved.model_name(), "gemini-2.5-flash");
}

#[test]
fn out_of_range_temperature_override_is_rejected() {
    let overrides = Overrides {
        temperature: Some(1.2),
        ..Overrides::default()
    };
    assert!(matches!(
        ResolvedModel::resolve(&Settings::default(), &overrides),
        Err(Error::Config(_))
    ));
}

#[tokio::test]
async fn factory_receives_resolved_triple() {
    let factory = RecordingFactory::replying(reply(&[option("fix", None, "x", None, 0.5)]));
    let settings = Settings {
        model: Some("B".into()),
        temperature: 0.1,
        ..Settings::default()
    };
    let overrides = Overrides {
        model: Some("A".into()),
        temperature: Some(0.9),
        ..Overrides::default()
    };

    run(&settings, &factory, "diff", &overrides).await.unwrap();

    assert_eq!(
        factory.builds(),
        [BuildRequest {
            provider: Provider::OpenAI,
            model: Some("A".into()),
            temperature: 0.9,
        }]
    );
}

#[tokio::test]
async fn provider_override_reaches_factory() {
    let factory = RecordingFactory::replying(reply(&[option("fix", None, "x", None, 0.5)]));
    let settings = Settings {
        provider: Provider::Anthropic,
        model: Some("claude-opus-4-1".into()),
        ..Settings::default()
    };
    let overrides = Overrides {
        provider: Some(Provider::Google),
        ..Overrides::default()
    };

    run(&settings, &factory, "diff", &overrides).await.unwrap();

    let builds = factory.builds();
    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0].provider, Provider::Google);
    assert_eq!(builds[0].model, None);
}

// ─── Prompt rendering ────────────────────────────────────────────────────────

#[test]
fn prompts_embed_summary_and_schema() {
    let settings = Settings {
        num_options: 3,
        ..Settings::default()
    };
    let factory = RecordingFactory::default();
    let generator = Generator::new(&settings, TemplateStore::Embedded, &factory);

    let diff = "+fn main() {}\n";
    let prompt = generator.render_prompts(diff, &summary_for(diff)).unwrap();

    assert!(prompt.system.contains(r#""options""#));
    assert!(!prompt.system.contains("{format_instructions}"));
    assert!(prompt.human.contains("Generate 3 commit message options"));
    assert!(prompt.human.contains("- src/lib.rs: +2 -1"));
    assert!(prompt.human.contains("1 files changed, +2 -1"));
    assert!(prompt.human.contains(diff.trim()));
}

#[test]
fn requested_options_are_capped_at_five() {
    let settings = Settings {
        num_options: 10,
        ..Settings::default()
    };
    let factory = RecordingFactory::default();
    let generator = Generator::new(&settings, TemplateStore::Embedded, &factory);

    let prompt = generator
        .render_prompts("d", &summary_for("d"))
        .unwrap();
    assert!(prompt.human.contains("Generate 5 commit message options"));
}

#[test]
fn empty_file_list_uses_placeholder() {
    let settings = Settings::default();
    let factory = RecordingFactory::default();
    let generator = Generator::new(&settings, TemplateStore::Embedded, &factory);

    let summary = DiffSummarizer::summarize("d", &Vec::<String>::new());
    let prompt = generator.render_prompts("d", &summary).unwrap();
    assert!(prompt.human.contains(NO_FILES));
}

#[test]
fn missing_template_directory_fails_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::default();
    let factory = RecordingFactory::default();
    let generator = Generator::new(
        &settings,
        TemplateStore::Directory(dir.path().join("absent")),
        &factory,
    );

    assert!(matches!(
        generator.render_prompts("d", &summary_for("d")),
        Err(Error::TemplateNotFound { .. })
    ));
}

// ─── Generation outcomes ─────────────────────────────────────────────────────

#[tokio::test]
async fn valid_reply_becomes_candidates_in_model_order() {
    let factory = RecordingFactory::replying(reply(&[
        option("fix", Some("git"), "low", None, 0.2),
        option("feat", None, "high", None, 0.9),
    ]));

    let set = run(&Settings::default(), &factory, "diff", &Overrides::default())
        .await
        .unwrap();

    let subjects: Vec<_> = set.iter().map(|c| c.subject()).collect();
    assert_eq!(subjects, ["low", "high"]);
}

#[tokio::test]
async fn empty_reply_is_a_generation_error() {
    let factory = RecordingFactory::replying("  \n");
    let err = run(&Settings::default(), &factory, "diff", &Overrides::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Generation(_)), "got {err:?}");
    assert!(err.is_generation_failure());
}

#[tokio::test]
async fn invalid_reply_is_a_parse_error() {
    let factory = RecordingFactory::replying(reply(&[option("wip", None, "x", None, 0.5)]));
    let err = run(&Settings::default(), &factory, "diff", &Overrides::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Parse(_)), "got {err:?}");
}
