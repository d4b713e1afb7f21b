use color_eyre::Result;
use dialoguer::{Confirm, Input, Password};

/// Prompt for a string value with optional default
pub fn prompt_string(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);

    if let Some(default_value) = default.filter(|d| !d.is_empty()) {
        input = input.default(default_value.to_string());
    }

    input
        .interact_text()
        .map(|s| s.trim().to_string())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
}

/// Prompt for a secret (masked input). Empty input keeps `existing`.
pub fn prompt_secret(prompt: &str, existing: Option<&str>) -> Result<String> {
    let prompt = match existing {
        Some(_) => format!("{} (leave empty to keep current)", prompt),
        None => prompt.to_string(),
    };

    let value = Password::new()
        .with_prompt(prompt)
        .allow_empty_password(existing.is_some())
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read secret: {}", e))?;

    match (value.trim().is_empty(), existing) {
        (true, Some(current)) => Ok(current.to_string()),
        _ => Ok(value.trim().to_string()),
    }
}

/// Prompt for yes/no with optional default
pub fn prompt_yes_no(prompt: &str, default: Option<bool>) -> Result<bool> {
    let mut confirm = Confirm::new().with_prompt(prompt);

    if let Some(default_value) = default {
        confirm = confirm.default(default_value);
    }

    confirm
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read confirmation: {}", e))
}

/// Prompt for a positive number, re-asking until the input parses
pub fn prompt_positive_number(prompt: &str, default: usize) -> Result<usize> {
    Input::<String>::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            parse_positive(input).map(|_| ()).ok_or("Please enter a whole number greater than zero")
        })
        .interact_text()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
        .and_then(|s| parse_positive(&s).ok_or_else(|| color_eyre::eyre::eyre!("Invalid number: {}", s)))
}

fn parse_positive(input: &str) -> Option<usize> {
    input.trim().parse::<usize>().ok().filter(|n| *n > 0)
}
