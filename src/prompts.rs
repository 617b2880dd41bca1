use crate::models::{ArticleInput, PromptSet};

pub const ARTICLE_SYSTEM: &str = include_str!("../data/prompts/article_system.txt");
pub const ARTICLE_USER: &str = include_str!("../data/prompts/article_user.txt");
pub const IMAGE_ADULT_REINFORCEMENT: &str =
    include_str!("../data/prompts/image_adult_reinforcement.txt");
pub const IMAGE_NEGATIVE: &str = include_str!("../data/prompts/image_negative.txt");

const DEFAULT_TEMPLATE_TYPE: &str = "nikkei";

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// System and user instructions for one article request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePrompt {
    pub system: String,
    pub user: String,
}

pub fn article_prompt(input: &ArticleInput) -> ArticlePrompt {
    let gender = if input.gender.as_deref() == Some("female") {
        "女の子"
    } else {
        "男の子"
    };
    let template_type = input
        .template_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TEMPLATE_TYPE);

    ArticlePrompt {
        system: ARTICLE_SYSTEM.trim_end().to_string(),
        user: render(
            ARTICLE_USER.trim_end(),
            &[
                ("future_job", input.future_job.as_deref().unwrap_or_default()),
                ("likes", input.likes.as_deref().unwrap_or_default()),
                ("solve_issue", input.solve_issue.as_deref().unwrap_or_default()),
                ("template_type", template_type),
                ("gender", gender),
            ],
        ),
    }
}

/// Full image instruction: the adult preamble, the caller's prompts, and the
/// merged negative list.
pub fn image_prompt(prompts: &PromptSet) -> String {
    let body = [
        prompts.system.as_deref().unwrap_or_default(),
        prompts.user.as_deref().unwrap_or_default(),
    ]
    .join("\n\n");

    let negatives: Vec<&str> = [
        IMAGE_NEGATIVE.trim(),
        prompts.negative.as_deref().unwrap_or_default(),
    ]
    .into_iter()
    .filter(|n| !n.is_empty())
    .collect();

    format!(
        "{} {}\n\nNegative: {}",
        IMAGE_ADULT_REINFORCEMENT.trim(),
        body.trim(),
        negatives.join(". ")
    )
    .trim()
    .to_string()
}
