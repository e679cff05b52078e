use crate::graph::Node;

/// Raw descriptions longer than this are cut before refinement
pub const MAX_RAW_CHARS: usize = 5000;

/// Placeholder when no source yields any text
pub const NO_DESCRIPTION: &str = "No description available.";

/// Cut `text` to [`MAX_RAW_CHARS`] characters, marking the cut with `...`
pub fn truncate_raw(text: &str) -> String {
    match text.char_indices().nth(MAX_RAW_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Instruction asking for a short textbook-style definition of `node`
pub fn refine_prompt(node: &Node, description: &str) -> String {
    format!(
        "Summarize the following description in 1-3 lines using clear, scientific language, \
as if taken from a textbook. Retain key biological and medical terms while removing \
unnecessary details, references, or source mentions.

Entity Details:
- Identifier: {identifier}
- Kind: {kind}
- Name: {name}
- Original Description: {description}

Provide only the refined definition, without introductory phrases or extra formatting, \
without mentioning sources or where the data was obtained. If the description is not \
present, write a proper definition of the entity based on the name and kind with the \
initial instructions.",
        identifier = node.identifier,
        kind = node.kind,
        name = node.name,
        description = description,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeData;

    #[test]
    fn test_truncate_long_text() {
        let text = "a".repeat(MAX_RAW_CHARS + 10);
        let cut = truncate_raw(&text);
        assert_eq!(cut.len(), MAX_RAW_CHARS + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate_raw("short"), "short");
        let exact = "b".repeat(MAX_RAW_CHARS);
        assert_eq!(truncate_raw(&exact), exact);
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_RAW_CHARS + 1);
        let cut = truncate_raw(&text);
        assert_eq!(cut.chars().count(), MAX_RAW_CHARS + 3);
    }

    #[test]
    fn test_refine_prompt_contains_entity() {
        let node = Node {
            identifier: "DB00331".to_string(),
            kind: "Compound".to_string(),
            name: "Metformin".to_string(),
            data: NodeData::default(),
        };
        let prompt = refine_prompt(&node, "A biguanide.");
        assert!(prompt.starts_with("Summarize the following description in 1-3 lines"));
        assert!(prompt.contains("- Identifier: DB00331"));
        assert!(prompt.contains("- Kind: Compound"));
        assert!(prompt.contains("- Name: Metformin"));
        assert!(prompt.contains("- Original Description: A biguanide."));
        assert!(prompt.contains("without mentioning sources"));
    }
}
