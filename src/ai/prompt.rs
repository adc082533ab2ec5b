use crate::github::Repository;

/// README characters sent to the model
pub const README_EXCERPT_CHARS: usize = 12_000;

const TRUNCATION_MARKER: &str = "...[truncated]";

/// Generate the summary prompt for a trending repository
pub fn generate_summary_prompt(repo: &Repository, readme: Option<&str>) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are an analyst of trending open-source projects on GitHub.\n\n");

    prompt.push_str("Project:\n");
    prompt.push_str(&format!("- Name: {}\n", repo.full_name));
    prompt.push_str(&format!(
        "- Primary language: {}\n",
        repo.language.as_deref().unwrap_or("not specified")
    ));
    prompt.push_str(&format!("- Stars: {}\n", repo.stars));
    prompt.push_str(&format!(
        "- Description: {}\n",
        repo.description.as_deref().unwrap_or("none")
    ));

    match readme {
        Some(text) => {
            prompt.push_str("\nREADME:\n");
            prompt.push_str(&excerpt(text, README_EXCERPT_CHARS));
            prompt.push('\n');
        }
        None => prompt.push_str("\n(README unavailable, rely on the description.)\n"),
    }

    prompt.push_str("\nAnalyse the project in exactly three points:\n");
    prompt.push_str("1. Core function and the problem it solves\n");
    prompt.push_str("2. Technical highlight or innovation\n");
    prompt.push_str("3. Why it is drawing attention right now\n\n");
    prompt.push_str("Requirements:\n");
    prompt.push_str("- Start every point with \"- \"\n");
    prompt.push_str("- At most 40 words per point\n");
    prompt.push_str("- Precise, concise technical language\n");

    prompt
}

/// First `max_chars` characters of `text`, marked when cut
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Normalise a model reply into `- ` bullet lines.
///
/// Returns `None` for an empty reply.
pub fn parse_response(response: &str) -> Option<String> {
    let bullets: Vec<String> = response
        .lines()
        .map(str::trim)
        .filter_map(strip_bullet)
        .filter(|point| !point.is_empty())
        .map(|point| format!("- {}", point))
        .collect();

    if !bullets.is_empty() {
        return Some(bullets.join("\n"));
    }

    let trimmed = response.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn strip_bullet(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Some(rest.trim());
    }

    // Numbered lists: "1. ", "2. ", etc.
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        return line[digits..].strip_prefix(". ").map(str::trim);
    }

    None
}
