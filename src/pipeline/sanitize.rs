//! XML character filtering for the rich-text output.
//!
//! A `.docx` is a zip of XML parts. OCR engines occasionally emit control
//! characters (form feeds between blocks, stray BELs from noise) that are not
//! legal anywhere in an XML 1.0 document; a single one makes Word refuse the
//! file. The plain-text output never goes through here.

/// `true` if `c` may appear in XML 1.0 character data.
///
/// Valid ranges: `#x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] |
/// [#x10000-#x10FFFF]`.
pub fn is_valid_xml_char(c: char) -> bool {
    let cp = c as u32;
    // ordered by how often each range is hit in OCR output
    (0x20..=0xD7FF).contains(&cp)
        || matches!(cp, 0x9 | 0xA | 0xD)
        || (0xE000..=0xFFFD).contains(&cp)
        || (0x10000..=0x10FFFF).contains(&cp)
}

/// Drop every character that is not valid in XML character data.
pub fn sanitize_xml_text(input: &str) -> String {
    input.chars().filter(|&c| is_valid_xml_char(c)).collect()
}
