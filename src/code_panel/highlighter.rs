use eframe::egui;

const PLAIN: egui::Color32 = egui::Color32::LIGHT_GRAY;
const COMMENT: egui::Color32 = egui::Color32::from_rgb(90, 120, 90);
const LITERAL: egui::Color32 = egui::Color32::from_rgb(206, 145, 120);
const CLASS: egui::Color32 = egui::Color32::from_rgb(215, 186, 125);
const RULE_DEF: egui::Color32 = egui::Color32::from_rgb(86, 156, 214);
const RULE_REF: egui::Color32 = egui::Color32::from_rgb(156, 220, 254);
const DIRECTIVE: egui::Color32 = egui::Color32::from_rgb(197, 134, 192);
const OPERATOR: egui::Color32 = egui::Color32::from_rgb(212, 212, 212);

/// Colorize PEG grammar text into `job`.
///
/// Covers `#` comments, quoted literals, `[...]` classes, `%` directives,
/// rule definitions (an identifier followed by `<-` or `←`), rule
/// references, and rainbow parentheses. Unknown characters stay plain.
pub(crate) fn highlight_grammar(job: &mut egui::text::LayoutJob, code: &str, font_id: &egui::FontId) {
    // Rainbow bracket colors (Pastel/Neon for dark theme)
    let rainbow_colors = [
        egui::Color32::from_rgb(255, 100, 100),
        egui::Color32::from_rgb(255, 200, 0),
        egui::Color32::from_rgb(255, 255, 0),
        egui::Color32::from_rgb(50, 255, 50),
        egui::Color32::from_rgb(50, 200, 255),
        egui::Color32::from_rgb(200, 100, 255),
        egui::Color32::from_rgb(255, 100, 200),
    ];
    let mut paren_depth: usize = 0;

    let mut chars = code.char_indices().peekable();
    let mut last_idx = 0;

    while let Some((idx, c)) = chars.next() {
        let c_end = idx + c.len_utf8();

        // 1. Comments (# ...)
        if c == '#' {
            append_text(job, &code[last_idx..idx], font_id, PLAIN);
            let mut end = c_end;
            while let Some(&(i, next_c)) = chars.peek() {
                if next_c == '\n' {
                    break;
                }
                end = i + next_c.len_utf8();
                chars.next();
            }
            append_text(job, &code[idx..end], font_id, COMMENT);
            last_idx = end;
            continue;
        }

        // 2. Literals ('...' / "...") and classes ([...])
        if c == '\'' || c == '"' || c == '[' {
            append_text(job, &code[last_idx..idx], font_id, PLAIN);
            let close = if c == '[' { ']' } else { c };
            let mut end = c_end;
            let mut escaped = false;
            for (i, next_c) in chars.by_ref() {
                end = i + next_c.len_utf8();
                if escaped {
                    escaped = false;
                } else if next_c == '\\' {
                    escaped = true;
                } else if next_c == close || next_c == '\n' {
                    break;
                }
            }
            // Optional case-insensitive marker: 'abc'i
            if c != '[' {
                if let Some(&(i, 'i')) = chars.peek() {
                    let after = code[i + 1..].chars().next();
                    if !after.is_some_and(is_ident_char) {
                        chars.next();
                        end = i + 1;
                    }
                }
            }
            let color = if c == '[' { CLASS } else { LITERAL };
            append_text(job, &code[idx..end], font_id, color);
            last_idx = end;
            continue;
        }

        // 3. Parentheses (Rainbow)
        if c == '(' || c == ')' {
            append_text(job, &code[last_idx..idx], font_id, PLAIN);
            let color_idx = if c == ')' {
                paren_depth = paren_depth.saturating_sub(1);
                paren_depth
            } else {
                let d = paren_depth;
                paren_depth += 1;
                d
            };
            let color = rainbow_colors[color_idx % rainbow_colors.len()];
            append_text(job, &code[idx..c_end], font_id, color);
            last_idx = c_end;
            continue;
        }

        // 4. Directives (%whitespace, %word, ...) and identifiers
        if c == '%' || c.is_alphabetic() || c == '_' {
            append_text(job, &code[last_idx..idx], font_id, PLAIN);
            let mut end = c_end;
            while let Some(&(i, next_c)) = chars.peek() {
                if is_ident_char(next_c) {
                    end = i + next_c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let color = if c == '%' {
                DIRECTIVE
            } else if is_definition(&code[end..]) {
                RULE_DEF
            } else {
                RULE_REF
            };
            append_text(job, &code[idx..end], font_id, color);
            last_idx = end;
            continue;
        }

        // 5. Operators
        if "<-←/*+?&!.~$^|".contains(c) {
            append_text(job, &code[last_idx..idx], font_id, PLAIN);
            append_text(job, &code[idx..c_end], font_id, OPERATOR);
            last_idx = c_end;
            continue;
        }
    }

    // Flush remaining
    if last_idx < code.len() {
        append_text(job, &code[last_idx..], font_id, PLAIN);
    }
}

/// Plain monospace layout for the input and info editors.
pub(crate) fn plain(job: &mut egui::text::LayoutJob, code: &str, font_id: &egui::FontId) {
    append_text(job, code, font_id, PLAIN);
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when the text after an identifier starts a rule definition.
fn is_definition(rest: &str) -> bool {
    let rest = rest.trim_start_matches(&[' ', '\t'][..]);
    rest.starts_with("<-") || rest.starts_with('←')
}

fn append_text(
    job: &mut egui::text::LayoutJob,
    text: &str,
    font_id: &egui::FontId,
    color: egui::Color32,
) {
    if text.is_empty() {
        return;
    }
    job.append(
        text,
        0.0,
        egui::text::TextFormat {
            font_id: font_id.clone(),
            color,
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colored(code: &str) -> Vec<(String, egui::Color32)> {
        let mut job = egui::text::LayoutJob::default();
        highlight_grammar(&mut job, code, &egui::FontId::monospace(14.0));
        job.sections
            .iter()
            .map(|s| (job.text[s.byte_range.clone()].to_string(), s.format.color))
            .collect()
    }

    fn color_of(sections: &[(String, egui::Color32)], text: &str) -> egui::Color32 {
        sections
            .iter()
            .find(|(t, _)| t == text)
            .map(|(_, c)| *c)
            .unwrap_or_else(|| panic!("no section {text:?} in {sections:?}"))
    }

    #[test]
    fn job_text_is_the_input() {
        let code = "# calc\nEXPR <- TERM ('+' TERM)*\nTERM <- [0-9]+ / 'x'i\n%whitespace <- [ \\t]*\n";
        let mut job = egui::text::LayoutJob::default();
        highlight_grammar(&mut job, code, &egui::FontId::monospace(14.0));
        assert_eq!(job.text, code);
    }

    #[test]
    fn definitions_and_references_differ() {
        let s = colored("EXPR <- TERM\nTERM ← 'a'");
        assert_eq!(s[0], ("EXPR".to_string(), RULE_DEF));
        assert!(s.iter().any(|(t, c)| t == "TERM" && *c == RULE_REF));
        assert!(s.iter().any(|(t, c)| t == "TERM" && *c == RULE_DEF));
    }

    #[test]
    fn literals_classes_comments_and_directives() {
        let s = colored("A <- 'it\\'s'i [a-z] # trailing\n%word <- [a-z]+");
        assert_eq!(color_of(&s, "'it\\'s'i"), LITERAL);
        assert_eq!(color_of(&s, "[a-z]"), CLASS);
        assert_eq!(color_of(&s, "# trailing"), COMMENT);
        assert_eq!(color_of(&s, "%word"), DIRECTIVE);
    }

    #[test]
    fn unterminated_literal_stops_at_line_end() {
        let code = "A <- 'abc\nB <- A";
        let s = colored(code);
        assert_eq!(color_of(&s, "'abc\n"), LITERAL);
        assert_eq!(color_of(&s, "B"), RULE_DEF);
    }
}
