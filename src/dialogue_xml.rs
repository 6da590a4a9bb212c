/*!
 * String table XML import and export.
 *
 * Dialogue is exchanged as a string table document:
 *
 * ```xml
 * <SSTXMLRessources>
 *   <Params>
 *     <Addon>Skyrim</Addon>
 *     <Source>english</Source>
 *     <Dest>french</Dest>
 *   </Params>
 *   <Content>
 *     <String List="0" sID="000A1B">
 *       <EDID>WhiterunGuardGreeting</EDID>
 *       <Source>Welcome to Whiterun.</Source>
 *       <Dest>Bienvenue à Whiterun.</Dest>
 *     </String>
 *   </Content>
 * </SSTXMLRessources>
 * ```
 *
 * Entries are keyed by `sID`, then `EDID`, then position (`#<index>`).
 * Positional keys only identify an entry inside one file, so they are
 * prefixed with the file they came from before being stored.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fs;
use std::path::Path;

use crate::database::models::{DialogueRecord, NewDialogue};
use crate::errors::DialogueXmlError;

const ROOT: &str = "SSTXMLRessources";
const PARAMS: &str = "Params";
const CONTENT: &str = "Content";
const STRING: &str = "String";
const EDID: &str = "EDID";
const SOURCE: &str = "Source";
const DEST: &str = "Dest";
const SID: &str = "sID";

/// One `<String>` entry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DialogueEntry {
    /// Stable key: sID, EDID or `#<index>`
    pub key: String,
    /// Attributes of the `<String>` element, in document order
    pub attributes: Vec<(String, String)>,
    pub edid: Option<String>,
    pub source: String,
    /// Translation; `None` when the element is absent or empty
    pub dest: Option<String>,
}

impl DialogueEntry {
    /// Value of an attribute of the `<String>` element
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A parsed string table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DialogueDocument {
    /// Children of `<Params>` as `(element, text)`
    pub params: Vec<(String, String)>,
    pub entries: Vec<DialogueEntry>,
}

impl DialogueDocument {
    /// Rows to upsert into the dialogue table.
    ///
    /// `origin` names the file the document was read from; it turns
    /// positional keys into `<origin>#<index>`.
    pub fn to_new_dialogues(&self, origin: &str) -> Vec<NewDialogue> {
        self.entries
            .iter()
            .map(|e| NewDialogue {
                string_key: if e.key.starts_with('#') {
                    format!("{}{}", origin, e.key)
                } else {
                    e.key.clone()
                },
                edid: e.edid.clone(),
                source: e.source.clone(),
                dest: e.dest.clone(),
            })
            .collect()
    }

    /// Build a document from stored records.
    ///
    /// `sID` is written back unless the key was derived from the EDID or
    /// the position.
    pub fn from_records<'a>(
        params: Vec<(String, String)>,
        records: impl IntoIterator<Item = &'a DialogueRecord>,
    ) -> Self {
        let entries = records
            .into_iter()
            .map(|r| {
                let positional = is_positional_key(&r.string_key);
                let from_edid = r.edid.as_deref() == Some(r.string_key.as_str());
                let attributes = if positional || from_edid {
                    Vec::new()
                } else {
                    vec![(SID.to_string(), r.string_key.clone())]
                };
                DialogueEntry {
                    key: r.string_key.clone(),
                    attributes,
                    edid: r.edid.clone(),
                    source: r.source.clone(),
                    dest: r.dest.clone(),
                }
            })
            .collect();

        Self { params, entries }
    }
}

/// Whether a stored key was derived from an entry's position
fn is_positional_key(key: &str) -> bool {
    key.rsplit_once('#')
        .is_some_and(|(_, index)| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}

/// Which leaf element text is being collected for
#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Param,
    Edid,
    Source,
    Dest,
}

fn syntax_error(reader: &Reader<&[u8]>, err: impl std::fmt::Display) -> DialogueXmlError {
    DialogueXmlError::Syntax {
        position: reader.buffer_position() as u64,
        message: err.to_string(),
    }
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

/// Parse a string table document
pub fn read_dialogue_xml(xml: &str) -> Result<DialogueDocument, DialogueXmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut document = DialogueDocument::default();
    let mut stack: Vec<String> = Vec::new();
    let mut entry: Option<DialogueEntry> = None;
    let mut has_source = false;
    let mut field: Option<Field> = None;
    let mut text = String::new();
    let mut seen_root = false;

    loop {
        let event = reader.read_event().map_err(|e| syntax_error(&reader, e))?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = element_name(e.name().as_ref());
                let parent = stack.last().map(String::as_str);

                if !seen_root {
                    if name != ROOT {
                        return Err(DialogueXmlError::Structure(format!(
                            "expected <{}> root element, found <{}>",
                            ROOT, name
                        )));
                    }
                    seen_root = true;
                }

                match (parent, name.as_str()) {
                    (Some(PARAMS), _) => field = Some(Field::Param),
                    (Some(CONTENT), STRING) => {
                        let mut attributes = Vec::new();
                        for attr in e.attributes() {
                            let attr = attr.map_err(|err| syntax_error(&reader, err))?;
                            let value = attr.unescape_value().map_err(|err| syntax_error(&reader, err))?;
                            attributes.push((element_name(attr.key.as_ref()), value.into_owned()));
                        }
                        entry = Some(DialogueEntry {
                            attributes,
                            ..DialogueEntry::default()
                        });
                        has_source = false;
                    }
                    (Some(STRING), EDID) => field = Some(Field::Edid),
                    (Some(STRING), SOURCE) => field = Some(Field::Source),
                    (Some(STRING), DEST) => field = Some(Field::Dest),
                    _ => field = None,
                }
                text.clear();

                if is_empty {
                    finish_element(&name, &mut document, &mut entry, &mut has_source, field.take(), String::new())?;
                } else {
                    stack.push(name);
                }
            }
            Event::Text(t) => {
                if field.is_some() {
                    let unescaped = t.unescape().map_err(|e| syntax_error(&reader, e))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(t) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::End(_) => {
                let Some(name) = stack.pop() else {
                    return Err(DialogueXmlError::Structure("unbalanced closing tag".to_string()));
                };
                let collected = std::mem::take(&mut text);
                finish_element(&name, &mut document, &mut entry, &mut has_source, field.take(), collected)?;
            }
            _ => {}
        }
    }

    if !seen_root {
        return Err(DialogueXmlError::Structure(format!("missing <{}> root element", ROOT)));
    }

    debug!(
        "Parsed string table: {} params, {} entries",
        document.params.len(),
        document.entries.len()
    );
    Ok(document)
}

fn finish_element(
    name: &str,
    document: &mut DialogueDocument,
    entry: &mut Option<DialogueEntry>,
    has_source: &mut bool,
    field: Option<Field>,
    text: String,
) -> Result<(), DialogueXmlError> {
    match (field, entry.as_mut()) {
        (Some(Field::Param), _) => document.params.push((name.to_string(), text)),
        (Some(Field::Edid), Some(current)) => current.edid = non_empty(text),
        (Some(Field::Source), Some(current)) => {
            current.source = text;
            *has_source = true;
        }
        (Some(Field::Dest), Some(current)) => current.dest = non_empty(text),
        (None, _) if name == STRING => {
            if let Some(mut finished) = entry.take() {
                let index = document.entries.len();
                finished.key = finished
                    .attribute(SID)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .or_else(|| finished.edid.clone())
                    .unwrap_or_else(|| format!("#{}", index));
                if !*has_source {
                    return Err(DialogueXmlError::MissingSource(finished.key));
                }
                document.entries.push(finished);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Read and parse a string table file
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<DialogueDocument> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let document =
        read_dialogue_xml(&content).with_context(|| format!("Failed to parse string table: {}", path.display()))?;
    info!("Loaded {} entries from {}", document.entries.len(), path.display());
    Ok(document)
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Serialize a string table document
pub fn write_dialogue_xml(document: &DialogueDocument) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT)))?;

    writer.write_event(Event::Start(BytesStart::new(PARAMS)))?;
    for (name, value) in &document.params {
        write_text_element(&mut writer, name, value)?;
    }
    writer.write_event(Event::End(BytesEnd::new(PARAMS)))?;

    writer.write_event(Event::Start(BytesStart::new(CONTENT)))?;
    for entry in &document.entries {
        let mut start = BytesStart::new(STRING);
        for (key, value) in &entry.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        writer.write_event(Event::Start(start))?;
        if let Some(edid) = &entry.edid {
            write_text_element(&mut writer, EDID, edid)?;
        }
        write_text_element(&mut writer, SOURCE, &entry.source)?;
        write_text_element(&mut writer, DEST, entry.dest.as_deref().unwrap_or(""))?;
        writer.write_event(Event::End(BytesEnd::new(STRING)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(CONTENT)))?;

    writer.write_event(Event::End(BytesEnd::new(ROOT)))?;

    let mut xml = String::from_utf8(writer.into_inner()).context("Serialized XML is not UTF-8")?;
    xml.push('\n');
    Ok(xml)
}

/// Serialize and write a string table file
pub fn save_file<P: AsRef<Path>>(path: P, document: &DialogueDocument) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let xml = write_dialogue_xml(document)?;
    fs::write(path, xml).with_context(|| format!("Failed to write file: {}", path.display()))?;
    info!("Wrote {} entries to {}", document.entries.len(), path.display());
    Ok(())
}
