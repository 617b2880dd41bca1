//! Schema validation and sanitization of generated articles.
//!
//! The text provider is asked for JSON in the article shape but nothing
//! guarantees it complies. [`sanitize`] turns any parsed value into an
//! [`Article`] that satisfies every length and cardinality bound, falling back
//! to [`fallback_article`] where the draft is unusable.

use crate::models::{Article, Section, SideNote, SideNoteCategory};
use serde_json::Value;
use std::sync::LazyLock;

pub const ARTICLE_TITLE_MAX: usize = 24;
pub const H1_TITLE_MAX: usize = 40;
pub const LEAD_MAX: usize = 140;
pub const H2_TITLE_MAX: usize = 24;
pub const SECTION_HEADING_MAX: usize = 24;
pub const SECTION_BODY_MAX: usize = 140;
pub const SIDE_NOTE_TITLE_MAX: usize = 24;
pub const SIDE_NOTE_BODY_MAX: usize = 60;
pub const SIDE_NOTES_MAX: usize = 3;

static FALLBACK_ARTICLE: LazyLock<Article> = LazyLock::new(|| Article {
    article_title: "20年後のわたし".to_string(),
    h1_title: "未来でかがやく、わたしのチャレンジ".to_string(),
    lead: "好きなことを大切にしながら、みんなの役に立つくふうを続けています。".to_string(),
    h2_titles: ["夢をかなえた日".to_string(), "これからの挑戦".to_string()],
    sections: [
        Section {
            heading: "夢をかなえた日".to_string(),
            body: "20年後のわたしは、得意なことを生かして社会の課題に取り組んでいます。"
                .to_string(),
        },
        Section {
            heading: "これからの挑戦".to_string(),
            body: "これからも周りと協力しながら、新しい価値を生み出していきます。".to_string(),
        },
    ],
    side_notes: vec![SideNote {
        category: SideNoteCategory::FutureWeather,
        title: "火星てんき速報".to_string(),
        body: "火星コロニーは今日も快晴です。".to_string(),
    }],
});

/// The process-wide article used when generated content is unusable.
pub fn fallback_article() -> &'static Article {
    &FALLBACK_ARTICLE
}

/// Whether `draft` has the minimum article shape.
pub fn is_valid_article(draft: &Value) -> bool {
    let Some(obj) = draft.as_object() else {
        return false;
    };

    let is_string = |key: &str| obj.get(key).is_some_and(Value::is_string);
    let array_len = |key: &str| obj.get(key).and_then(Value::as_array).map(Vec::len);

    if !is_string("article_title") || !is_string("h1_title") || !is_string("lead") {
        return false;
    }
    if array_len("h2_titles").unwrap_or(0) < 2 {
        return false;
    }

    let Some(sections) = obj.get("sections").and_then(Value::as_array) else {
        return false;
    };
    if sections.len() < 2 {
        return false;
    }
    let section_ok = |section: &Value| {
        section.get("heading").is_some_and(Value::is_string)
            && section.get("body").is_some_and(Value::is_string)
    };
    if !section_ok(&sections[0]) || !section_ok(&sections[1]) {
        return false;
    }

    array_len("side_notes").is_some()
}

/// Sanitize against the global fallback article.
pub fn sanitize(draft: &Value) -> Article {
    sanitize_article(draft, fallback_article())
}

/// Build a guaranteed-conforming article from an untrusted draft.
///
/// An invalid draft yields `fallback` unchanged. Otherwise each field is
/// coerced to a string and clamped; fields that end up empty take the
/// corresponding fallback value, except side notes which are filtered.
pub fn sanitize_article(draft: &Value, fallback: &Article) -> Article {
    if !is_valid_article(draft) {
        return fallback.clone();
    }

    let h2_titles = draft.get("h2_titles");
    let sections = draft.get("sections");
    let section = |index: usize| sections.and_then(|s| s.get(index));

    let sanitize_section = |index: usize| {
        let source = section(index);
        let field = |key: &str| source.and_then(|s| s.get(key));
        Section {
            heading: clamp_or(
                field("heading"),
                SECTION_HEADING_MAX,
                &fallback.sections[index].heading,
            ),
            body: clamp_or(
                field("body"),
                SECTION_BODY_MAX,
                &fallback.sections[index].body,
            ),
        }
    };

    let side_notes = match draft.get("side_notes").and_then(Value::as_array) {
        Some(notes) => notes
            .iter()
            .take(SIDE_NOTES_MAX)
            .map(sanitize_side_note)
            .filter(|note| !note.title.is_empty() || !note.body.is_empty())
            .collect(),
        None => fallback.side_notes.clone(),
    };

    Article {
        article_title: clamp_or(
            draft.get("article_title"),
            ARTICLE_TITLE_MAX,
            &fallback.article_title,
        ),
        h1_title: clamp_or(draft.get("h1_title"), H1_TITLE_MAX, &fallback.h1_title),
        lead: clamp_or(draft.get("lead"), LEAD_MAX, &fallback.lead),
        h2_titles: [0usize, 1].map(|i| {
            clamp_or(
                h2_titles.and_then(|t| t.get(i)),
                H2_TITLE_MAX,
                &fallback.h2_titles[i],
            )
        }),
        sections: [sanitize_section(0), sanitize_section(1)],
        side_notes,
    }
}

fn sanitize_side_note(note: &Value) -> SideNote {
    let category = note
        .get("category")
        .and_then(Value::as_str)
        .and_then(SideNoteCategory::from_literal)
        .unwrap_or(SideNoteCategory::FutureAd);

    SideNote {
        category,
        title: clamp(note.get("title"), SIDE_NOTE_TITLE_MAX),
        body: clamp(note.get("body"), SIDE_NOTE_BODY_MAX),
    }
}

fn clamp(value: Option<&Value>, max: usize) -> String {
    value
        .map(coerce_to_string)
        .unwrap_or_default()
        .chars()
        .take(max)
        .collect()
}

fn clamp_or(value: Option<&Value>, max: usize, fallback: &str) -> String {
    let clamped = clamp(value, max);
    if clamped.is_empty() {
        fallback.to_string()
    } else {
        clamped
    }
}

/// Loose string conversion; falsy values become the empty string.
pub(crate) fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 0.0 => String::new(),
            // Integral values below 1e21 print as plain digits.
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                Value::Number(n) if n.as_f64() == Some(0.0) => "0".to_string(),
                Value::Bool(false) => "false".to_string(),
                other => coerce_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn valid_draft() -> Value {
        json!({
            "article_title": "宇宙パティシエ",
            "h1_title": "月面カフェで新作ケーキを発表",
            "lead": "重力の少ない月で、ふわふわのケーキを作ることに成功しました。",
            "h2_titles": ["月のキッチン", "次の目標"],
            "sections": [
                { "heading": "月のキッチン", "body": "特別なオーブンを使っています。" },
                { "heading": "次の目標", "body": "火星にもお店を開く予定です。" }
            ],
            "side_notes": [
                { "category": "future_stock", "title": "宇宙おかし株", "body": "今日も上昇中。" }
            ]
        })
    }

    #[test]
    fn test_is_valid_rejects_malformed_drafts() {
        assert!(!is_valid_article(&Value::Null));
        assert!(!is_valid_article(&json!({})));
        assert!(!is_valid_article(&json!([1, 2])));

        let mut missing_sections = valid_draft();
        missing_sections.as_object_mut().unwrap().remove("sections");
        assert!(!is_valid_article(&missing_sections));

        let mut short_h2 = valid_draft();
        short_h2["h2_titles"] = json!(["only one"]);
        assert!(!is_valid_article(&short_h2));

        let mut numeric_title = valid_draft();
        numeric_title["article_title"] = json!(12);
        assert!(!is_valid_article(&numeric_title));

        let mut bad_section = valid_draft();
        bad_section["sections"][1] = json!({ "heading": "h" });
        assert!(!is_valid_article(&bad_section));

        let mut null_section = valid_draft();
        null_section["sections"][0] = Value::Null;
        assert!(!is_valid_article(&null_section));

        let mut object_notes = valid_draft();
        object_notes["side_notes"] = json!({});
        assert!(!is_valid_article(&object_notes));
    }

    #[test]
    fn test_is_valid_accepts_minimum_shape() {
        assert!(is_valid_article(&valid_draft()));

        let mut extra = valid_draft();
        extra["h2_titles"] = json!(["a", "b", "c"]);
        extra["side_notes"] = json!([1, "x", null]);
        assert!(is_valid_article(&extra));
    }

    #[test]
    fn test_invalid_draft_returns_fallback() {
        assert_eq!(sanitize(&json!({ "article_title": "x" })), *fallback_article());
        assert_eq!(sanitize(&Value::Null), *fallback_article());
    }

    #[test]
    fn test_long_title_is_truncated() {
        let draft = json!({
            "article_title": "A".repeat(100),
            "h1_title": "T",
            "lead": "L",
            "h2_titles": ["a", "b"],
            "sections": [{ "heading": "h", "body": "b" }, { "heading": "h2", "body": "b2" }],
            "side_notes": []
        });

        let article = sanitize(&draft);
        assert_eq!(article.article_title, "A".repeat(24));
        assert_eq!(article.h1_title, "T");
        assert_eq!(article.lead, "L");
        assert_eq!(article.h2_titles, ["a".to_string(), "b".to_string()]);
        assert_eq!(
            article.sections,
            [
                Section { heading: "h".to_string(), body: "b".to_string() },
                Section { heading: "h2".to_string(), body: "b2".to_string() },
            ]
        );
        assert!(article.side_notes.is_empty());
    }

    #[test]
    fn test_empty_fields_take_fallback_values() {
        let mut draft = valid_draft();
        draft["lead"] = json!("");
        draft["h2_titles"] = json!([null, "二つ目"]);
        draft["sections"][0]["body"] = json!("");

        let article = sanitize(&draft);
        let fallback = fallback_article();
        assert_eq!(article.lead, fallback.lead);
        assert_eq!(article.h2_titles[0], fallback.h2_titles[0]);
        assert_eq!(article.h2_titles[1], "二つ目");
        assert_eq!(article.sections[0].heading, "月のキッチン");
        assert_eq!(article.sections[0].body, fallback.sections[0].body);
    }

    #[test]
    fn test_whitespace_is_not_replaced() {
        let mut draft = valid_draft();
        draft["h1_title"] = json!("   ");
        assert_eq!(sanitize(&draft).h1_title, "   ");
    }

    #[test]
    fn test_h2_titles_are_coerced() {
        let mut draft = valid_draft();
        draft["h2_titles"] = json!([2040, 0, "ignored"]);
        let article = sanitize(&draft);
        assert_eq!(article.h2_titles[0], "2040");
        assert_eq!(article.h2_titles[1], fallback_article().h2_titles[1]);
    }

    #[test]
    fn test_multibyte_text_is_clamped_by_character() {
        let mut draft = valid_draft();
        draft["sections"][1]["body"] = json!("あ".repeat(200));
        assert_eq!(sanitize(&draft).sections[1].body.chars().count(), 140);
    }

    #[test]
    fn test_side_notes_are_capped_and_filtered() {
        let mut draft = valid_draft();
        draft["side_notes"] = json!([
            { "category": "future_stock", "title": "", "body": "" },
            { "category": "future_weather", "title": "晴れ", "body": "" },
            { "category": "future_ad", "title": "", "body": "新発売" },
            { "category": "future_ad", "title": "四つ目", "body": "x" },
            { "category": "future_ad", "title": "五つ目", "body": "y" }
        ]);

        let article = sanitize(&draft);
        assert_eq!(
            article.side_notes,
            vec![
                SideNote {
                    category: SideNoteCategory::FutureWeather,
                    title: "晴れ".to_string(),
                    body: String::new(),
                },
                SideNote {
                    category: SideNoteCategory::FutureAd,
                    title: String::new(),
                    body: "新発売".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_side_notes_never_exceed_three() {
        let mut draft = valid_draft();
        draft["side_notes"] = json!((0..5)
            .map(|i| json!({ "category": "future_ad", "title": format!("note {}", i), "body": "b" }))
            .collect::<Vec<_>>());
        assert_eq!(sanitize(&draft).side_notes.len(), 3);
    }

    #[test]
    fn test_unknown_category_defaults_to_ad() {
        let mut draft = valid_draft();
        draft["side_notes"] = json!([
            { "category": "unknown", "title": "タイトル", "body": "本文" },
            { "title": "カテゴリなし", "body": "本文" },
            "not an object"
        ]);

        let article = sanitize(&draft);
        assert_eq!(article.side_notes.len(), 2);
        assert_eq!(article.side_notes[0].category, SideNoteCategory::FutureAd);
        assert_eq!(article.side_notes[0].title, "タイトル");
        assert_eq!(article.side_notes[0].body, "本文");
        assert_eq!(article.side_notes[1].category, SideNoteCategory::FutureAd);
    }

    #[test]
    fn test_side_note_fields_are_clamped_without_fallback() {
        let mut draft = valid_draft();
        draft["side_notes"] = json!([
            { "category": "future_stock", "title": "t".repeat(30), "body": "b".repeat(90) }
        ]);
        let note = &sanitize(&draft).side_notes[0];
        assert_eq!(note.title.len(), 24);
        assert_eq!(note.body.len(), 60);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize(&valid_draft());
        let twice = sanitize(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);

        let fallback_json = serde_json::to_value(fallback_article()).unwrap();
        assert_eq!(sanitize(&fallback_json), *fallback_article());
    }

    #[test]
    fn test_sanitize_with_injected_fallback() {
        let mut custom = fallback_article().clone();
        custom.lead = "custom lead".to_string();

        let mut draft = valid_draft();
        draft["lead"] = json!("");
        assert_eq!(sanitize_article(&draft, &custom).lead, "custom lead");
        assert_eq!(sanitize_article(&Value::Null, &custom), custom);
    }

    #[test]
    fn test_coerce_to_string() {
        assert_eq!(coerce_to_string(&json!(null)), "");
        assert_eq!(coerce_to_string(&json!(false)), "");
        assert_eq!(coerce_to_string(&json!(true)), "true");
        assert_eq!(coerce_to_string(&json!(0)), "");
        assert_eq!(coerce_to_string(&json!(3.0)), "3");
        assert_eq!(coerce_to_string(&json!(2.5)), "2.5");
        assert_eq!(coerce_to_string(&json!(1e15)), "1000000000000000");
        assert_eq!(coerce_to_string(&json!(-2e20)), "-200000000000000000000");
        assert_eq!(coerce_to_string(&json!(["a", 1, null])), "a,1,");
        assert_eq!(coerce_to_string(&json!({ "k": "v" })), "[object Object]");
    }
}
