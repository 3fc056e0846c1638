use std::collections::BTreeMap;

use serde_json::Value;

use super::command_registry::{
    CommandSpec, HISTORY_COMMAND, NO_ARG_COMMANDS, RAW_ARG_COMMANDS, SINGLE_PATH_COMMANDS,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub action: String,
    pub raw: String,
    pub prompt: Option<String>,
    pub command_args: BTreeMap<String, Value>,
}

impl Intent {
    fn new(action: &str, raw: &str) -> Self {
        Self {
            action: action.to_string(),
            raw: raw.to_string(),
            prompt: None,
            command_args: BTreeMap::new(),
        }
    }

    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.command_args
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

fn find_action(command: &str, specs: &[CommandSpec]) -> Option<&'static str> {
    specs
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.action)
}

fn parse_path_args(arg: &str) -> Vec<String> {
    if arg.trim().is_empty() {
        return Vec::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect(),
        Err(_) => arg
            .split_whitespace()
            .map(str::to_string)
            .filter(|value| !value.is_empty())
            .collect(),
    }
}

fn parse_single_path_arg(arg: &str) -> String {
    let parts = parse_path_args(arg);
    match parts.len() {
        0 => String::new(),
        1 => parts[0].clone(),
        _ => parts.join(" "),
    }
}

/// `/history [tier] [oldest|newest]`, in any order.
fn parse_history_args(arg: &str, intent: &mut Intent) {
    for token in arg.split_whitespace() {
        let lowered = token.to_ascii_lowercase();
        match lowered.as_str() {
            "oldest" | "newest" => {
                intent
                    .command_args
                    .insert("order".to_string(), Value::String(lowered));
            }
            "all" => {}
            _ => {
                intent
                    .command_args
                    .insert("quality".to_string(), Value::String(token.to_string()));
            }
        }
    }
}

pub fn parse_intent(text: &str) -> Intent {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return Intent::new("noop", text);
    }

    if let Some(slash_tail) = raw_trimmed.strip_prefix('/') {
        let command_len = slash_tail
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
            .count();
        if command_len > 0 {
            let command = slash_tail[..command_len].to_ascii_lowercase();
            let arg = slash_tail[command_len..].trim();

            if let Some(action) = find_action(&command, RAW_ARG_COMMANDS) {
                let mut intent = Intent::new(action, text);
                intent
                    .command_args
                    .insert("value".to_string(), Value::String(arg.to_string()));
                return intent;
            }

            if let Some(action) = find_action(&command, SINGLE_PATH_COMMANDS) {
                let mut intent = Intent::new(action, text);
                intent.command_args.insert(
                    "path".to_string(),
                    Value::String(parse_single_path_arg(arg)),
                );
                return intent;
            }

            if let Some(action) = find_action(&command, NO_ARG_COMMANDS) {
                return Intent::new(action, text);
            }

            if command == HISTORY_COMMAND.command {
                let mut intent = Intent::new(HISTORY_COMMAND.action, text);
                parse_history_args(arg, &mut intent);
                return intent;
            }

            let mut intent = Intent::new("unknown", text);
            intent
                .command_args
                .insert("command".to_string(), Value::String(command));
            intent
                .command_args
                .insert("arg".to_string(), Value::String(arg.to_string()));
            return intent;
        }
    }

    let mut intent = Intent::new("generate", text);
    intent.prompt = Some(raw_trimmed.to_string());
    intent
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_intent;

    #[test]
    fn bare_text_is_a_generate_prompt() {
        let intent = parse_intent("  matte black bottle on slate  ");
        assert_eq!(intent.action, "generate");
        assert_eq!(intent.prompt.as_deref(), Some("matte black bottle on slate"));
    }

    #[test]
    fn blank_line_is_noop() {
        assert_eq!(parse_intent("   ").action, "noop");
    }

    #[test]
    fn parse_option_commands() {
        let quality = parse_intent("/quality 4k");
        assert_eq!(quality.action, "set_quality");
        assert_eq!(quality.arg_str("value"), Some("4k"));

        let bg = parse_intent("/BG #FF0000");
        assert_eq!(bg.action, "set_background");
        assert_eq!(bg.command_args["value"], json!("#FF0000"));

        let refine = parse_intent("/refine on");
        assert_eq!(refine.action, "set_refine");
        assert_eq!(refine.arg_str("value"), Some("on"));

        let modifier = parse_intent("/mod camera:top down");
        assert_eq!(modifier.action, "apply_modifier");
        assert_eq!(modifier.arg_str("value"), Some("camera:top down"));
    }

    #[test]
    fn parse_reference_quoted_path() {
        let intent = parse_intent("/ref \"/tmp/my product.png\"");
        assert_eq!(intent.action, "attach_reference");
        assert_eq!(intent.command_args["path"], json!("/tmp/my product.png"));

        let download = parse_intent("/download");
        assert_eq!(download.action, "download");
        assert_eq!(download.arg_str("path"), None);
    }

    #[test]
    fn parse_history_filters() {
        let intent = parse_intent("/history oldest 2K");
        assert_eq!(intent.action, "list_history");
        assert_eq!(intent.command_args["order"], json!("oldest"));
        assert_eq!(intent.command_args["quality"], json!("2K"));

        let plain = parse_intent("/history all");
        assert!(plain.command_args.is_empty());
    }

    #[test]
    fn parse_no_arg_commands() {
        assert_eq!(parse_intent("/unref").action, "clear_reference");
        assert_eq!(parse_intent("/analyze").action, "analyze");
        assert_eq!(parse_intent("/quit").action, "exit");
        assert_eq!(parse_intent("/clear_history").action, "clear_history");
    }

    #[test]
    fn parse_unknown_command() {
        let intent = parse_intent("/magic foo bar");
        assert_eq!(intent.action, "unknown");
        assert_eq!(intent.command_args["command"], json!("magic"));
        assert_eq!(intent.command_args["arg"], json!("foo bar"));
    }
}
