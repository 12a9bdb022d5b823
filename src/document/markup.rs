/*!
 * WordprocessingML content stream handling.
 *
 * The primary content stream is kept as the ordered list of markup events
 * produced by the reader. Translatable text lives in `w:t` elements; each
 * one with visible text becomes a `Segment` whose `TextAnchor` points back
 * into the event list, so translated text lands exactly where the original
 * came from and everything else is re-emitted untouched.
 */

use std::collections::HashMap;
use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::DocumentError;

const TEXT_TAG: &str = "w:t";
const RUN_TAG: &str = "w:r";
const RUN_PROPERTIES_TAG: &str = "w:rPr";
const RUN_FONTS_TAG: &str = "w:rFonts";
const RUN_STYLE_TAG: &str = "w:rStyle";
const SPACE_ATTRIBUTE: &str = "xml:space";

/// Font slots of `w:rFonts` set by the uniform font rewrite
pub const FONT_ATTRIBUTES: [&str; 4] = ["w:ascii", "w:hAnsi", "w:eastAsia", "w:cs"];

// Theme references override explicit fonts in Word, so they are dropped
const THEME_FONT_ATTRIBUTES: [&str; 4] = ["w:asciiTheme", "w:hAnsiTheme", "w:eastAsiaTheme", "w:cstheme"];

/// Position of a `w:t` element's text inside the event list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextAnchor {
    // @field: index of the `w:t` start event
    element: usize,
    // @field: first text event inside the element
    first: usize,
    // @field: last text event inside the element
    last: usize,
}

impl TextAnchor {
    /// Index of the first text event this anchor writes to
    pub fn position(&self) -> usize {
        self.first
    }
}

/// A translatable text fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Ordinal among all segments of the document
    pub index: usize,
    /// Where the translation is written back
    pub anchor: TextAnchor,
    /// Decoded text as found in the document
    pub original_text: String,
}

/// The parsed primary content stream
#[derive(Debug, Clone)]
pub struct ContentDocument {
    events: Vec<Event<'static>>,
}

impl ContentDocument {
    /// Parse a content stream, rejecting markup that is not well-formed
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        reader.check_end_names(true);

        let mut events = Vec::new();
        let mut depth = 0usize;
        let mut has_root = false;

        loop {
            let event = reader.read_event().map_err(|e| {
                DocumentError::MalformedContent(format!("at byte {}: {}", reader.buffer_position(), e))
            })?;

            match &event {
                Event::Eof => break,
                Event::Start(_) => {
                    depth += 1;
                    has_root = true;
                }
                Event::Empty(_) => has_root = true,
                Event::End(end) => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        DocumentError::MalformedContent(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(end.name().as_ref())
                        ))
                    })?;
                }
                Event::Text(text) if depth == 0 && !is_blank(text) => {
                    return Err(DocumentError::MalformedContent(
                        "text outside of the root element".to_string(),
                    ));
                }
                _ => {}
            }

            events.push(event.into_owned());
        }

        if depth != 0 {
            return Err(DocumentError::MalformedContent(format!(
                "{} element(s) left open at end of content",
                depth
            )));
        }
        if !has_root {
            return Err(DocumentError::MalformedContent("no root element".to_string()));
        }

        Ok(Self { events })
    }

    /// Translatable segments in document order
    ///
    /// Only `w:t` elements whose decoded text has visible characters take part;
    /// empty and whitespace-only text is never sent nor rewritten.
    pub fn segments(&self) -> Result<Vec<Segment>, DocumentError> {
        let mut segments = Vec::new();
        let mut open: Option<TextCollector> = None;

        for (position, event) in self.events.iter().enumerate() {
            match event {
                Event::Start(start) if is_named(start, TEXT_TAG) => {
                    open = Some(TextCollector::new(position));
                }
                Event::End(end) if end.name().as_ref() == TEXT_TAG.as_bytes() => {
                    if let Some(segment) = open.take().and_then(|c| c.finish(segments.len())) {
                        segments.push(segment);
                    }
                }
                Event::Text(text) => {
                    if let Some(collector) = open.as_mut() {
                        let decoded = text.unescape().map_err(|e| {
                            DocumentError::MalformedContent(format!("undecodable text: {}", e))
                        })?;
                        collector.push(position, &decoded);
                    }
                }
                Event::CData(cdata) => {
                    if let Some(collector) = open.as_mut() {
                        collector.push(position, &String::from_utf8_lossy(cdata));
                    }
                }
                _ => {}
            }
        }

        Ok(segments)
    }

    /// Replace the text at an anchor; returns false for an anchor this document does not own
    pub fn set_text(&mut self, anchor: &TextAnchor, text: &str) -> bool {
        if anchor.last >= self.events.len() || anchor.first > anchor.last {
            return false;
        }
        if !matches!(self.events[anchor.first], Event::Text(_) | Event::CData(_)) {
            return false;
        }

        self.events[anchor.first] = Event::Text(BytesText::new(text).into_owned());
        for position in anchor.first + 1..=anchor.last {
            if matches!(self.events[position], Event::Text(_) | Event::CData(_)) {
                self.events[position] = Event::Text(BytesText::from_escaped(""));
            }
        }

        if text.trim() != text {
            self.preserve_space(anchor.element);
        }
        true
    }

    /// Current decoded text at an anchor
    pub fn text_at(&self, anchor: &TextAnchor) -> Option<String> {
        let events = self.events.get(anchor.first..=anchor.last)?;
        let mut text = String::new();
        for event in events {
            match event {
                Event::Text(t) => text.push_str(&t.unescape().ok()?),
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(c)),
                _ => {}
            }
        }
        Some(text)
    }

    /// Force one font family on every run; returns the number of runs touched
    ///
    /// Every `w:r` gets a direct `w:rPr` (first child when created) holding a
    /// `w:rFonts` (after `w:rStyle` when created) whose font slots all name `font`.
    /// Text events are never altered, but event positions shift, so segments
    /// must be extracted after this call.
    pub fn apply_uniform_font(&mut self, font: &str) -> usize {
        let mut edits: HashMap<usize, Edit> = HashMap::new();
        let mut runs = 0;

        for (position, event) in self.events.iter().enumerate() {
            match event {
                Event::Start(run) if is_named(run, RUN_TAG) => {
                    runs += 1;
                    let properties = self.direct_children(position)
                        .into_iter()
                        .find(|&child| self.is_element(child, RUN_PROPERTIES_TAG));
                    match properties {
                        Some(properties) => self.plan_run_fonts(properties, font, &mut edits),
                        None => edits.entry(position).or_default().after.extend(properties_block(font)),
                    }
                }
                Event::Empty(run) if is_named(run, RUN_TAG) => {
                    runs += 1;
                    let mut expanded = vec![Event::Start(run.clone())];
                    expanded.extend(properties_block(font));
                    expanded.push(Event::End(BytesEnd::new(RUN_TAG)));
                    edits.entry(position).or_default().replace = Some(expanded);
                }
                _ => {}
            }
        }

        self.apply_edits(edits);
        runs
    }

    /// Serialize the events back into markup
    pub fn to_xml(&self) -> Result<Vec<u8>, DocumentError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        for event in &self.events {
            writer.write_event(event)
                .map_err(|e| DocumentError::Archive(format!("failed to serialize content: {}", e)))?;
        }
        Ok(writer.into_inner().into_inner())
    }

    fn plan_run_fonts(&self, properties: usize, font: &str, edits: &mut HashMap<usize, Edit>) {
        match &self.events[properties] {
            Event::Empty(props) => {
                edits.entry(properties).or_default().replace = Some(vec![
                    Event::Start(props.clone()),
                    Event::Empty(fonts_element(font)),
                    Event::End(BytesEnd::new(RUN_PROPERTIES_TAG)),
                ]);
            }
            Event::Start(_) => {
                let children = self.direct_children(properties);
                let existing = children.iter().copied().find(|&c| self.is_element(c, RUN_FONTS_TAG));

                if let Some(fonts) = existing {
                    let replacement = match &self.events[fonts] {
                        Event::Start(e) => Event::Start(with_font(e, font)),
                        Event::Empty(e) => Event::Empty(with_font(e, font)),
                        _ => return,
                    };
                    edits.entry(fonts).or_default().replace = Some(vec![replacement]);
                } else {
                    let insert_after = children.iter().copied()
                        .find(|&c| self.is_element(c, RUN_STYLE_TAG))
                        .map(|style| self.element_end(style))
                        .unwrap_or(properties);
                    edits.entry(insert_after).or_default().after.push(Event::Empty(fonts_element(font)));
                }
            }
            _ => {}
        }
    }

    fn apply_edits(&mut self, mut edits: HashMap<usize, Edit>) {
        if edits.is_empty() {
            return;
        }

        let events = std::mem::take(&mut self.events);
        let mut rewritten = Vec::with_capacity(events.len() + edits.len() * 3);
        for (position, event) in events.into_iter().enumerate() {
            match edits.remove(&position) {
                Some(edit) => {
                    match edit.replace {
                        Some(replacement) => rewritten.extend(replacement),
                        None => rewritten.push(event),
                    }
                    rewritten.extend(edit.after);
                }
                None => rewritten.push(event),
            }
        }
        self.events = rewritten;
    }

    // Indices of the start/empty events that are direct children of the element at `start`
    fn direct_children(&self, start: usize) -> Vec<usize> {
        let mut children = Vec::new();
        if !matches!(self.events.get(start), Some(Event::Start(_))) {
            return children;
        }

        let mut depth = 0usize;
        for (offset, event) in self.events[start + 1..].iter().enumerate() {
            let position = start + 1 + offset;
            match event {
                Event::Start(_) => {
                    if depth == 0 {
                        children.push(position);
                    }
                    depth += 1;
                }
                Event::Empty(_) if depth == 0 => children.push(position),
                Event::End(_) => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        children
    }

    // Index of the event closing the element at `position`
    fn element_end(&self, position: usize) -> usize {
        if !matches!(self.events.get(position), Some(Event::Start(_))) {
            return position;
        }

        let mut depth = 0usize;
        for (offset, event) in self.events[position..].iter().enumerate() {
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        return position + offset;
                    }
                }
                _ => {}
            }
        }
        position
    }

    fn is_element(&self, position: usize, name: &str) -> bool {
        match self.events.get(position) {
            Some(Event::Start(e)) | Some(Event::Empty(e)) => is_named(e, name),
            _ => false,
        }
    }

    fn preserve_space(&mut self, element: usize) {
        if let Some(Event::Start(start)) = self.events.get_mut(element) {
            let already_set = start
                .attributes()
                .flatten()
                .any(|attribute| attribute.key.as_ref() == SPACE_ATTRIBUTE.as_bytes());
            if !already_set {
                start.push_attribute((SPACE_ATTRIBUTE, "preserve"));
            }
        }
    }
}

// Pending rewrite of one event position
#[derive(Default)]
struct Edit {
    replace: Option<Vec<Event<'static>>>,
    after: Vec<Event<'static>>,
}

// Accumulates the text events of one open `w:t`
struct TextCollector {
    element: usize,
    first: Option<usize>,
    last: usize,
    text: String,
}

impl TextCollector {
    fn new(element: usize) -> Self {
        Self { element, first: None, last: element, text: String::new() }
    }

    fn push(&mut self, position: usize, text: &str) {
        self.first.get_or_insert(position);
        self.last = position;
        self.text.push_str(text);
    }

    fn finish(self, index: usize) -> Option<Segment> {
        let first = self.first?;
        if self.text.trim().is_empty() {
            return None;
        }
        Some(Segment {
            index,
            anchor: TextAnchor { element: self.element, first, last: self.last },
            original_text: self.text,
        })
    }
}

fn is_named(element: &BytesStart, name: &str) -> bool {
    element.name().as_ref() == name.as_bytes()
}

fn is_blank(text: &BytesText) -> bool {
    text.iter().all(|byte| byte.is_ascii_whitespace())
}

fn fonts_element(font: &str) -> BytesStart<'static> {
    let mut fonts = BytesStart::new(RUN_FONTS_TAG);
    for slot in FONT_ATTRIBUTES {
        fonts.push_attribute((slot, font));
    }
    fonts
}

fn properties_block(font: &str) -> [Event<'static>; 3] {
    [
        Event::Start(BytesStart::new(RUN_PROPERTIES_TAG)),
        Event::Empty(fonts_element(font)),
        Event::End(BytesEnd::new(RUN_PROPERTIES_TAG)),
    ]
}

fn with_font(element: &BytesStart, font: &str) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut rewritten = BytesStart::new(name);

    let mut attributes = element.attributes();
    attributes.with_checks(false);
    for attribute in attributes.flatten() {
        let key = attribute.key.as_ref();
        let replaced = FONT_ATTRIBUTES.iter()
            .chain(THEME_FONT_ATTRIBUTES.iter())
            .any(|slot| slot.as_bytes() == key);
        if !replaced {
            rewritten.push_attribute(attribute);
        }
    }
    for slot in FONT_ATTRIBUTES {
        rewritten.push_attribute((slot, font));
    }
    rewritten
}
