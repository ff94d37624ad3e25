//! Server-Sent Events line demultiplexer.
//!
//! Turns a sequence of text lines into discrete frames. Both MCP transports
//! share this routine and differ only in how the `data:` field value is cut
//! (see [`FieldStyle`]).

use std::fmt;

/// How the value after `data:` is extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStyle {
    /// Remainder is whitespace-trimmed (legacy SSE bootstrap stream).
    Trimmed,
    /// Exactly one leading space is removed, the rest is kept verbatim.
    SingleSpace,
}

impl FieldStyle {
    fn value(self, rest: &str) -> &str {
        match self {
            FieldStyle::Trimmed => rest.trim(),
            FieldStyle::SingleSpace => rest.strip_prefix(' ').unwrap_or(rest),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    pub event_type: Option<String>,
    pub data: String,
}

impl SseFrame {
    pub fn new(event_type: Option<&str>, data: impl Into<String>) -> Self {
        Self {
            event_type: event_type.map(str::to_string),
            data: data.into(),
        }
    }

    pub fn is_event(&self, name: &str) -> bool {
        self.event_type.as_deref() == Some(name)
    }
}

/// Serializes the frame back into wire form, terminated by a blank line.
impl fmt::Display for SseFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(event_type) = &self.event_type {
            writeln!(f, "event: {}", event_type)?;
        }
        if !self.data.is_empty() || self.event_type.is_none() {
            for line in self.data.split('\n') {
                writeln!(f, "data: {}", line)?;
            }
        }
        writeln!(f)
    }
}

/// Incremental frame builder fed one line at a time.
#[derive(Debug)]
pub struct SseDemux {
    style: FieldStyle,
    event_type: Option<String>,
    data_lines: Vec<String>,
}

impl SseDemux {
    pub fn new(style: FieldStyle) -> Self {
        Self {
            style,
            event_type: None,
            data_lines: Vec::new(),
        }
    }

    /// Feed one line (without its `\n`; a trailing `\r` is tolerated).
    /// Returns a frame when the line closes one.
    pub fn push_line(&mut self, line: &str) -> Option<SseFrame> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return self.take_frame();
        }

        if let Some(rest) = line.strip_prefix("event:") {
            self.event_type = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            self.data_lines.push(self.style.value(rest).to_string());
        }
        // comments, id:, retry: and unknown fields carry nothing we need

        None
    }

    /// Flush a frame left open when the stream ends without a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        self.take_frame()
    }

    fn take_frame(&mut self) -> Option<SseFrame> {
        if self.event_type.is_none() && self.data_lines.is_empty() {
            return None;
        }

        Some(SseFrame {
            event_type: self.event_type.take(),
            data: std::mem::take(&mut self.data_lines).join("\n"),
        })
    }
}

/// Parse a complete SSE text into frames.
pub fn parse_frames(text: &str, style: FieldStyle) -> Vec<SseFrame> {
    let mut demux = SseDemux::new(style);
    let mut frames: Vec<SseFrame> = text
        .split('\n')
        .filter_map(|line| demux.push_line(line))
        .collect();
    frames.extend(demux.finish());
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_frame_per_block() {
        let frames = parse_frames(
            "event: endpoint\ndata: /message?sessionId=abc\n\nevent: message\ndata: {}\n\n",
            FieldStyle::Trimmed,
        );
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event_type.as_deref(), Some("endpoint"));
        assert_eq!(frames[0].data, "/message?sessionId=abc");
        assert!(frames[1].is_event("message"));
        assert_eq!(frames[1].data, "{}");
    }

    #[test]
    fn test_multiple_data_lines_are_newline_joined() {
        let frames = parse_frames("data: first\ndata: second\n\n", FieldStyle::SingleSpace);
        assert_eq!(frames, vec![SseFrame::new(None, "first\nsecond")]);
    }

    #[test]
    fn test_keep_alive_blank_lines_ignored() {
        let frames = parse_frames("\n\n\ndata: x\n\n\n", FieldStyle::Trimmed);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_comments_and_unknown_fields_ignored() {
        let frames = parse_frames(
            ": keep-alive\nid: 7\nretry: 1000\nfoo: bar\ndata: payload\n\n",
            FieldStyle::Trimmed,
        );
        assert_eq!(frames, vec![SseFrame::new(None, "payload")]);
    }

    #[test]
    fn test_last_event_line_wins() {
        let frames = parse_frames("event: a\nevent:  b \ndata: x\n\n", FieldStyle::Trimmed);
        assert_eq!(frames[0].event_type.as_deref(), Some("b"));
    }

    #[test]
    fn test_trailing_frame_flushed_at_end() {
        let frames = parse_frames("event: message\ndata: {\"id\":1}", FieldStyle::Trimmed);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"id\":1}");
    }

    #[test]
    fn test_crlf_line_endings() {
        let frames = parse_frames("event: message\r\ndata: ok\r\n\r\n", FieldStyle::Trimmed);
        assert_eq!(frames, vec![SseFrame::new(Some("message"), "ok")]);
    }

    #[test]
    fn test_field_styles_differ_only_in_spacing() {
        let text = "data:   padded  \n\n";
        assert_eq!(parse_frames(text, FieldStyle::Trimmed)[0].data, "padded");
        assert_eq!(
            parse_frames(text, FieldStyle::SingleSpace)[0].data,
            "  padded  "
        );

        let tight = "data:tight\n\n";
        assert_eq!(parse_frames(tight, FieldStyle::Trimmed)[0].data, "tight");
        assert_eq!(parse_frames(tight, FieldStyle::SingleSpace)[0].data, "tight");
    }

    #[test]
    fn test_event_without_data_is_still_a_frame() {
        let frames = parse_frames("event: ping\n\n", FieldStyle::Trimmed);
        assert_eq!(frames, vec![SseFrame::new(Some("ping"), "")]);
    }

    #[test]
    fn test_serialized_frames_parse_back() {
        let frames = vec![
            SseFrame::new(Some("endpoint"), "/message?sessionId=abc"),
            SseFrame::new(None, "line one\nline two"),
            SseFrame::new(Some("ping"), ""),
        ];
        let wire: String = frames.iter().map(|f| f.to_string()).collect();
        assert_eq!(parse_frames(&wire, FieldStyle::SingleSpace), frames);
    }

    #[test]
    fn test_reparsing_parsed_frames_is_stable() {
        let wire = "event: message\ndata:  {\"a\": 1} \n\n";
        let once = parse_frames(wire, FieldStyle::Trimmed);
        let wire_again: String = once.iter().map(|f| f.to_string()).collect();
        assert_eq!(parse_frames(&wire_again, FieldStyle::Trimmed), once);
    }
}
