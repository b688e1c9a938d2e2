use colored::Colorize;
use gaia::commands::{CmdMessage, MessageLevel};
use gaia::config::GaiaConfig;
use gaia::model::{CategoryStats, Entry, Stats, TagStats};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const LABEL_WIDTH: usize = 11;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

/// Full view of each entry, fields first and content last.
pub(super) fn print_entries(entries: &[Entry]) {
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            println!("\n================================\n");
        }
        println!("{} {}", entry.id.yellow(), entry.name.bold());
        print_field("category", &entry.category);
        print_field("tags", &entry.tags_string());
        print_field("desc", &entry.desc);
        if entry.executable {
            print_field("executable", "yes");
            print_field("main", &entry.exec_file);
        }
        println!("--------------------------------");
        println!("{}", entry.content);
    }
}

fn print_field(label: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let label = format!("{:>width$}", label, width = LABEL_WIDTH);
    println!("{}: {}", label.dimmed(), value);
}

/// One line per entry: id, name, tags, then as much description as fits.
pub(super) fn print_entry_list(entries: &[Entry]) {
    let id_width = entries.iter().map(|e| e.id.width()).max().unwrap_or(0);
    let name_width = entries.iter().map(|e| e.name.width()).max().unwrap_or(0);

    for entry in entries {
        let tags = if entry.tags.is_empty() {
            String::new()
        } else {
            format!("[{}]", entry.tags_string())
        };
        let fixed = id_width + name_width + tags.width() + 4;
        let desc = truncate_to_width(&entry.desc, LINE_WIDTH.saturating_sub(fixed));

        let line = format!(
            "{}  {}{}",
            pad(&entry.id, id_width).yellow(),
            pad(&entry.name, name_width),
            if tags.is_empty() {
                String::new()
            } else {
                format!(" {}", tags.cyan())
            }
        );
        if desc.is_empty() {
            println!("{}", line);
        } else {
            println!("{} {}", line, desc.dimmed());
        }
    }
}

pub(super) fn print_tree(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

pub(super) fn print_categories(categories: &[(String, CategoryStats)]) {
    let width = categories.iter().map(|(c, _)| c.width()).max().unwrap_or(0);
    for (category, stats) in categories {
        let tags: Vec<&str> = stats.tags.iter().map(String::as_str).collect();
        println!(
            "{}  {:>4}  {}",
            pad(category, width).bold(),
            stats.entries,
            tags.join(", ").dimmed()
        );
    }
}

pub(super) fn print_tags(tags: &[(String, TagStats)]) {
    let width = tags.iter().map(|(t, _)| t.width()).max().unwrap_or(0);
    for (tag, stats) in tags {
        let categories: Vec<&str> = stats.categories.iter().map(String::as_str).collect();
        println!(
            "{}  {:>4}  {}",
            pad(tag, width).cyan(),
            stats.entries,
            categories.join(", ").dimmed()
        );
    }
}

pub(super) fn print_aliases(aliases: &[(String, String)]) {
    let width = aliases.iter().map(|(from, _)| from.width()).max().unwrap_or(0);
    for (from, to) in aliases {
        println!("{} -> {}", pad(from, width), to.green());
    }
}

pub(super) fn print_stats(stats: &Stats) {
    println!("{:>width$}: {}", "entries", stats.entries, width = LABEL_WIDTH);
    println!(
        "{:>width$}: {}",
        "categories",
        stats.category_count(),
        width = LABEL_WIDTH
    );
    println!("{:>width$}: {}", "tags", stats.tag_count(), width = LABEL_WIDTH);
}

pub(super) fn print_config(config: &GaiaConfig) {
    for key in GaiaConfig::KEYS {
        let value = config.get(key).unwrap_or_default();
        println!("{} = {}", key, value);
    }
}

/// Left-aligns by display width, which `format!` padding does not account for.
fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(fill))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let s = s.lines().next().unwrap_or_default();
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_counts_display_width() {
        assert_eq!(pad("日本", 6), "日本  ");
        assert_eq!(pad("toolong", 3), "toolong");
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("first\nsecond", 10), "first");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語です", 5), "日本…");
    }
}
