//! Line-oriented markdown to Notion block conversion.
//!
//! Only the constructs the note pipeline emits are handled: three heading
//! levels, bullets, fenced code, and paragraphs. Anything else falls through
//! as a paragraph.

use serde_json::{Value, json};

/// Convert markdown text into Notion block objects.
pub fn markdown_to_blocks(content: &str) -> Vec<Value> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut blocks = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if let Some(text) = line.strip_prefix("# ") {
            blocks.push(heading("heading_1", text));
        } else if let Some(text) = line.strip_prefix("## ") {
            blocks.push(heading("heading_2", text));
        } else if let Some(text) = line.strip_prefix("### ") {
            blocks.push(heading("heading_3", text));
        } else if let Some(text) = line.strip_prefix("- ") {
            blocks.push(block("bulleted_list_item", text));
        } else if line.starts_with("```") {
            // Collect to the closing fence; an unterminated fence runs to
            // the end of the input.
            let mut code = Vec::new();
            i += 1;
            while i < lines.len() && !lines[i].starts_with("```") {
                code.push(lines[i]);
                i += 1;
            }
            blocks.push(json!({
                "object": "block",
                "type": "code",
                "code": {
                    "rich_text": [rich_text(&code.join("\n"))],
                    "language": "plain text",
                },
            }));
        } else {
            blocks.push(block("paragraph", line));
        }
        i += 1;
    }

    blocks
}

fn rich_text(content: &str) -> Value {
    json!({ "type": "text", "text": { "content": content } })
}

fn block(kind: &str, text: &str) -> Value {
    json!({
        "object": "block",
        "type": kind,
        kind: { "rich_text": [rich_text(text)] },
    })
}

fn heading(level: &str, text: &str) -> Value {
    block(level, text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, serde_json::json};

    fn kinds(blocks: &[Value]) -> Vec<&str> {
        blocks
            .iter()
            .map(|b| b["type"].as_str().unwrap_or(""))
            .collect()
    }

    fn text_of(block: &Value) -> &str {
        let kind = block["type"].as_str().unwrap_or("");
        block[kind]["rich_text"][0]["text"]["content"]
            .as_str()
            .unwrap_or("")
    }

    #[test]
    fn headings_map_by_depth() {
        let blocks = markdown_to_blocks("# Title\n## Section\n### Detail");
        assert_eq!(kinds(&blocks), vec!["heading_1", "heading_2", "heading_3"]);
        assert_eq!(text_of(&blocks[0]), "Title");
        assert_eq!(text_of(&blocks[2]), "Detail");
    }

    #[test]
    fn bullets_and_paragraphs() {
        let blocks = markdown_to_blocks("intro\n- first\n- second");
        assert_eq!(kinds(&blocks), vec!["paragraph", "bulleted_list_item", "bulleted_list_item"]);
        assert_eq!(text_of(&blocks[1]), "first");
    }

    #[test]
    fn code_fence_collects_verbatim() {
        let blocks = markdown_to_blocks("```\nlet x = 1;\nlet y = 2;\n```\nafter");
        assert_eq!(kinds(&blocks), vec!["code", "paragraph"]);
        assert_eq!(
            blocks[0]["code"]["rich_text"][0]["text"]["content"],
            json!("let x = 1;\nlet y = 2;")
        );
        assert_eq!(blocks[0]["code"]["language"], json!("plain text"));
        assert_eq!(text_of(&blocks[1]), "after");
    }

    #[test]
    fn unterminated_fence_consumes_rest() {
        let blocks = markdown_to_blocks("before\n```\ncode to the end");
        assert_eq!(kinds(&blocks), vec!["paragraph", "code"]);
        assert_eq!(
            blocks[1]["code"]["rich_text"][0]["text"]["content"],
            json!("code to the end")
        );
    }

    #[test]
    fn heading_marker_without_space_is_a_paragraph() {
        let blocks = markdown_to_blocks("#nospace");
        assert_eq!(kinds(&blocks), vec!["paragraph"]);
    }

    #[test]
    fn blank_lines_become_empty_paragraphs() {
        let blocks = markdown_to_blocks("a\n\nb");
        assert_eq!(kinds(&blocks), vec!["paragraph", "paragraph", "paragraph"]);
        assert_eq!(text_of(&blocks[1]), "");
    }
}
