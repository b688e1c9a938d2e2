use crate::error::{GaiaError, Result};
use crate::model::{split_tags, Entry};
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;
use uuid::Uuid;

/// Content lines are indented by this much in a document.
const CONTENT_INDENT: &str = "    ";

/// Description continuation lines line up with the text after the labels.
const DESC_INDENT: &str = "            ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Name,
    Tags,
    Executable,
    ExecFile,
    Desc,
    Content,
}

impl Field {
    const ALL: [Field; 7] = [
        Field::Id,
        Field::Name,
        Field::Tags,
        Field::Executable,
        Field::ExecFile,
        Field::Desc,
        Field::Content,
    ];

    fn label(&self) -> &'static str {
        match self {
            Field::Id => "ID:",
            Field::Name => "NAME:",
            Field::Tags => "TAGS:",
            Field::Executable => "EXECUTABLE:",
            Field::ExecFile => "EXECFILE:",
            Field::Desc => "DESC:",
            Field::Content => "CONTENT:",
        }
    }

    /// Splits a trimmed line into its field and the text after the label.
    fn parse(line: &str) -> Option<(Field, &str)> {
        Field::ALL
            .iter()
            .find_map(|f| line.strip_prefix(f.label()).map(|rest| (*f, rest.trim())))
    }
}

/// Renders an entry as the labelled text document shown by `get` and edited
/// by `edit`. Labels are right aligned; content lines are indented.
///
/// ```text
///         ID: 6100
///       NAME: lang-go-sort
///       TAGS: algorithm
/// EXECUTABLE: false
///   EXECFILE:
///       DESC: sort a slice
///    CONTENT:
///     sort.Ints(xs)
/// ```
pub fn to_document(entry: &Entry) -> String {
    let mut doc = String::new();
    let line = |doc: &mut String, field: Field, value: &str| {
        let head = format!("{:>11}", field.label());
        if value.is_empty() {
            doc.push_str(&head);
        } else {
            doc.push_str(&format!("{} {}", head, value));
        }
        doc.push('\n');
    };
    line(&mut doc, Field::Id, &entry.id);
    line(&mut doc, Field::Name, &entry.name);
    line(&mut doc, Field::Tags, &entry.tags_string());
    line(&mut doc, Field::Executable, &entry.executable.to_string());
    line(&mut doc, Field::ExecFile, &entry.exec_file);
    let mut desc_lines = entry.desc.split('\n');
    line(&mut doc, Field::Desc, desc_lines.next().unwrap_or_default());
    for desc_line in desc_lines {
        doc.push_str(DESC_INDENT);
        doc.push_str(desc_line);
        doc.push('\n');
    }
    line(&mut doc, Field::Content, "");

    for content_line in entry.content.split('\n') {
        doc.push_str(CONTENT_INDENT);
        doc.push_str(content_line);
        doc.push('\n');
    }
    doc
}

/// Parses a document back into an entry.
///
/// Unlabelled lines continue the description, or the content once the
/// `CONTENT:` label has been seen. Everything after `CONTENT:` is content.
///
/// Documents written by [`to_document`] parse back to the same fields.
/// Trailing blank lines without the content indent are editor noise and
/// are dropped.
pub fn parse_document(doc: &str) -> Entry {
    let mut entry = Entry::default();
    let mut desc: Vec<String> = Vec::new();
    // (indented, text)
    let mut content: Vec<(bool, String)> = Vec::new();
    let mut current: Option<Field> = None;

    for raw in doc.lines() {
        if current == Some(Field::Content) {
            match raw.strip_prefix(CONTENT_INDENT) {
                Some(text) => content.push((true, text.to_string())),
                None => content.push((false, raw.to_string())),
            }
            continue;
        }

        if current == Some(Field::Desc) {
            if let Some(text) = raw.strip_prefix(DESC_INDENT) {
                desc.push(text.to_string());
                continue;
            }
        }

        let Some((field, value)) = Field::parse(raw.trim()) else {
            if current == Some(Field::Desc) {
                desc.push(raw.trim().to_string());
            }
            continue;
        };
        current = Some(field);
        match field {
            Field::Id => entry.id = value.to_string(),
            Field::Name => entry.name = value.to_string(),
            Field::Tags => entry.tags = split_tags(value),
            Field::Executable => entry.executable = value.eq_ignore_ascii_case("true"),
            Field::ExecFile => entry.exec_file = value.to_string(),
            Field::Desc => desc = vec![value.to_string()],
            Field::Content => {
                if !value.is_empty() {
                    content.push((true, value.to_string()));
                }
            }
        }
    }

    while content
        .last()
        .is_some_and(|(indented, l)| !indented && l.trim().is_empty())
    {
        content.pop();
    }
    entry.desc = desc.join("\n").trim().to_string();
    entry.content = content
        .into_iter()
        .map(|(_, l)| l)
        .collect::<Vec<_>>()
        .join("\n");
    entry
}

/// Lets a user (or a test) rewrite an entry.
pub trait EntryEditor {
    fn edit(&mut self, entry: &Entry) -> Result<Entry>;
}

impl<F> EntryEditor for F
where
    F: FnMut(&Entry) -> Result<Entry>,
{
    fn edit(&mut self, entry: &Entry) -> Result<Entry> {
        (*self)(entry)
    }
}

/// Edits entries as documents in the user's editor.
#[derive(Debug, Clone, Default)]
pub struct ExternalEditor {
    command: Option<String>,
}

impl ExternalEditor {
    /// `command` overrides the environment lookup when set.
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl EntryEditor for ExternalEditor {
    fn edit(&mut self, entry: &Entry) -> Result<Entry> {
        let temp_file = env::temp_dir().join(format!("gaia-{}.txt", Uuid::new_v4()));
        fs::write(&temp_file, to_document(entry)).map_err(GaiaError::Io)?;

        let result = open_in_editor(self.command.as_deref(), &temp_file);
        let _ = fs::remove_file(&temp_file);

        Ok(parse_document(&result?))
    }
}

/// Gets the editor command.
/// Uses the configured command, then $EDITOR, then $VISUAL, then falls back to
/// common editors.
pub fn get_editor(configured: Option<&str>) -> Result<String> {
    if let Some(editor) = configured.filter(|e| !e.trim().is_empty()) {
        return Ok(editor.to_string());
    }

    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.trim().is_empty() {
                return Ok(editor);
            }
        }
    }

    for fallback in &["vim", "vi", "nano"] {
        if Command::new("which")
            .arg(fallback)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
        {
            return Ok((*fallback).to_string());
        }
    }

    Err(GaiaError::Api(
        "No editor found. Set $EDITOR or `gaia config editor <cmd>`.".to_string(),
    ))
}

/// Opens a file in the editor and waits for it to close.
/// Returns the contents of the file after editing.
pub fn open_in_editor<P: AsRef<Path>>(configured: Option<&str>, file_path: P) -> Result<String> {
    let editor = get_editor(configured)?;
    let path = file_path.as_ref();

    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| GaiaError::Api("Empty editor command".to_string()))?;

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|e| GaiaError::Api(format!("Failed to launch editor '{}': {}", editor, e)))?;

    if !status.success() {
        return Err(GaiaError::Api(format!(
            "Editor '{}' exited with non-zero status",
            editor
        )));
    }

    fs::read_to_string(path).map_err(GaiaError::Io)
}
