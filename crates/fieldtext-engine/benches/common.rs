use fieldtext_engine::FieldCatalog;

pub fn catalog() -> FieldCatalog<u32> {
    [(1, "{Customer}"), (2, "{Invoice}"), (3, "{Due}")]
        .into_iter()
        .collect()
}

/// Flat letter text with `paragraphs` paragraphs, each holding three fields
pub fn generate_letter_text(paragraphs: usize) -> String {
    let mut content = String::new();
    for i in 0..paragraphs {
        content.push_str(&format!(
            "Dear {{Customer}}, invoice {{Invoice}} (paragraph {i}) is due on {{Due}}.\n"
        ));
    }
    content
}
