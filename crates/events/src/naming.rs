//! Event naming helpers.

/// Convert free-form text into PascalCase.
///
/// Non-letters separate words and a lowercase→uppercase transition starts a
/// new word; every word is then capitalised (`"video_processor"` and
/// `"videoProcessor"` both become `"VideoProcessor"`).
pub fn to_pascal_case(s: &str) -> String {
    let mut spaced = String::with_capacity(s.len() + 8);
    let mut prev_lower = false;
    for c in s.chars() {
        if !c.is_ascii_alphabetic() {
            spaced.push(' ');
            prev_lower = false;
            continue;
        }
        if prev_lower && c.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(c);
        prev_lower = c.is_ascii_lowercase();
    }
    spaced.split_whitespace().map(capitalize).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(&chars.as_str().to_ascii_lowercase());
            out
        }
        None => String::new(),
    }
}

/// Full event name: `"[Context] Event"`, or just `"Event"` without a context.
pub fn qualified_event_name(context: Option<&str>, event: &str) -> String {
    match context.map(to_pascal_case).filter(|c| !c.is_empty()) {
        Some(context) => format!("[{context}] {event}"),
        None => event.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_normalises_separators_and_camel_humps() {
        assert_eq!(to_pascal_case("VideoProcessor"), "VideoProcessor");
        assert_eq!(to_pascal_case("video_processor"), "VideoProcessor");
        assert_eq!(to_pascal_case("video-processor v2"), "VideoProcessorV");
        assert_eq!(to_pascal_case("videoProcessor"), "VideoProcessor");
        assert_eq!(to_pascal_case("HTTPServer"), "Httpserver");
        assert_eq!(to_pascal_case("123"), "");
    }

    #[test]
    fn qualified_names_include_context_when_present() {
        assert_eq!(
            qualified_event_name(Some("video processor"), "VideoHasFinishedProcessing"),
            "[VideoProcessor] VideoHasFinishedProcessing"
        );
        assert_eq!(qualified_event_name(None, "CaseOpened"), "CaseOpened");
        assert_eq!(qualified_event_name(Some("__"), "CaseOpened"), "CaseOpened");
    }
}
