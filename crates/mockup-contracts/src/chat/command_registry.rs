#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: &'static str,
}

/// Commands whose argument is kept as a single trimmed string.
pub(crate) const RAW_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "quality",
        action: "set_quality",
    },
    CommandSpec {
        command: "aspect",
        action: "set_aspect",
    },
    CommandSpec {
        command: "model",
        action: "set_model",
    },
    CommandSpec {
        command: "bg",
        action: "set_background",
    },
    CommandSpec {
        command: "refine",
        action: "set_refine",
    },
    CommandSpec {
        command: "preset",
        action: "apply_preset",
    },
    CommandSpec {
        command: "mod",
        action: "apply_modifier",
    },
    CommandSpec {
        command: "load",
        action: "load_history",
    },
    CommandSpec {
        command: "delete",
        action: "delete_history",
    },
];

pub(crate) const SINGLE_PATH_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "ref",
        action: "attach_reference",
    },
    CommandSpec {
        command: "download",
        action: "download",
    },
];

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "help",
        action: "help",
    },
    CommandSpec {
        command: "unref",
        action: "clear_reference",
    },
    CommandSpec {
        command: "analyze",
        action: "analyze",
    },
    CommandSpec {
        command: "generate",
        action: "regenerate",
    },
    CommandSpec {
        command: "clear_history",
        action: "clear_history",
    },
    CommandSpec {
        command: "presets",
        action: "list_presets",
    },
    CommandSpec {
        command: "status",
        action: "status",
    },
    CommandSpec {
        command: "exit",
        action: "exit",
    },
    CommandSpec {
        command: "quit",
        action: "exit",
    },
];

pub(crate) const HISTORY_COMMAND: CommandSpec = CommandSpec {
    command: "history",
    action: "list_history",
};

pub const CHAT_HELP_COMMANDS: &[&str] = &[
    "/quality <HD|FHD|2K|4K|8K>",
    "/aspect <1:1|9:16|16:9|4:3|3:4>",
    "/model <flash|pro>",
    "/bg <#RRGGBB|none>",
    "/refine <on|off>",
    "/ref <path>",
    "/unref",
    "/analyze",
    "/preset <id>",
    "/presets",
    "/mod <[group:]label>",
    "/generate",
    "/history [tier] [oldest]",
    "/load <id>",
    "/delete <id>",
    "/clear_history",
    "/download [dir]",
    "/status",
    "/exit",
];

#[cfg(test)]
mod tests {
    use super::{
        CommandSpec, CHAT_HELP_COMMANDS, HISTORY_COMMAND, NO_ARG_COMMANDS, RAW_ARG_COMMANDS,
        SINGLE_PATH_COMMANDS,
    };

    #[test]
    fn command_names_are_unique() {
        let mut names: Vec<&str> = RAW_ARG_COMMANDS
            .iter()
            .chain(SINGLE_PATH_COMMANDS)
            .chain(NO_ARG_COMMANDS)
            .chain(std::iter::once(&HISTORY_COMMAND))
            .map(|spec: &CommandSpec| spec.command)
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn help_mentions_every_command_except_aliases() {
        for spec in RAW_ARG_COMMANDS.iter().chain(SINGLE_PATH_COMMANDS) {
            let prefix = format!("/{} ", spec.command);
            assert!(
                CHAT_HELP_COMMANDS.iter().any(|line| line.starts_with(&prefix)),
                "missing help for {}",
                spec.command
            );
        }
    }
}
