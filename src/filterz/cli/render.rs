use colored::Colorize;
use filterz::commands::{CmdMessage, MessageLevel};
use filterz::model::{ItemRef, Schema, SchemaOption};
use filterz::tree::{DisplayNode, TreeEntry};
use unicode_width::UnicodeWidthStr;

const INDENT: &str = "  ";
const NO_VALUE: &str = "(no value)";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
        }
    }
}

/// One line per node, indented by depth, with filter types padded to a common width.
pub(super) fn render_tree(nodes: &[DisplayNode]) -> String {
    let type_width = nodes
        .iter()
        .filter_map(|node| match &node.entry {
            TreeEntry::Filter(filter) => Some(filter.filter_type.width()),
            _ => None,
        })
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for node in nodes {
        let indent = INDENT.repeat(node.depth);
        let line = match &node.entry {
            TreeEntry::Group { id, connector, len } => format!(
                "{}{} {} {}",
                indent,
                connector.to_string().bold().cyan(),
                id,
                format!("({} items)", len).dimmed()
            ),
            TreeEntry::Filter(filter) => {
                let padding = " ".repeat(type_width.saturating_sub(filter.filter_type.width()));
                let value = if filter.ref_value.is_empty() {
                    NO_VALUE.dimmed().to_string()
                } else {
                    filter.ref_value.clone()
                };
                format!(
                    "{}{} {}{} {} {}",
                    indent,
                    format!("#{}", filter.id).yellow(),
                    filter.filter_type,
                    padding,
                    filter.predicate.as_str().green(),
                    value
                )
            }
            TreeEntry::Dangling(ItemRef::Filter { id }) => {
                format!("{}{} filter #{}", indent, "missing".red(), id)
            }
            TreeEntry::Dangling(ItemRef::Group { id }) => {
                format!("{}{} group {}", indent, "missing".red(), id)
            }
            TreeEntry::Cycle(id) => format!("{}{} {}", indent, "cycle back to".red(), id),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub(super) fn render_schema(schema: &Schema) -> String {
    let name_width = schema
        .entries()
        .iter()
        .map(|entry| entry.name.width())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for entry in schema.entries() {
        let relations: Vec<&str> = entry.relations.iter().map(|r| r.as_str()).collect();
        let mut line = format!(
            "{}{}  {:<8} {}",
            entry.name.bold(),
            " ".repeat(name_width - entry.name.width()),
            entry.value_type.to_string(),
            relations.join(" ")
        );
        if let Some(options) = &entry.options {
            let shown: Vec<String> = options.iter().map(describe_option).collect();
            line.push_str(&format!("  {}", format!("[{}]", shown.join(", ")).dimmed()));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn describe_option(option: &SchemaOption) -> String {
    if option.value() == option.label() {
        option.value().to_string()
    } else {
        format!("{} ({})", option.value(), option.label())
    }
}
