//! Scanner for CSS selector identifiers (`selector:...`, `selectorHtml:...`)
//!
//! Selector text is opaque to the template grammar: brackets, parentheses and
//! quotes may contain characters that would otherwise end a variable. The scan
//! only stops at a template delimiter that sits outside every bracket, paren
//! and quote.

/// Problems found while scanning a selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorIssueKind {
    UnclosedBracket,
    UnclosedParen,
    UnclosedQuote(char),
    UnmatchedBracket,
    UnmatchedParen,
}

/// An issue and the byte offset (relative to the scanned input) it points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorIssue {
    pub kind: SelectorIssueKind,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorScan<'a> {
    /// Selector text with trailing whitespace removed
    pub text: &'a str,
    /// Bytes of input consumed by the selector
    pub consumed: usize,
    pub issues: Vec<SelectorIssue>,
}

/// Template delimiters that end a selector at nesting level zero
fn starts_with_delimiter(rest: &str) -> bool {
    rest.starts_with('|')
        || rest.starts_with("}}")
        || rest.starts_with("%}")
        || rest.starts_with("-}}")
        || rest.starts_with("-%}")
}

fn starts_with_block_end(rest: &str) -> bool {
    rest.starts_with("}}")
        || rest.starts_with("%}")
        || rest.starts_with("-}}")
        || rest.starts_with("-%}")
}

/// Scan selector text starting right after the `selector:` prefix
pub fn scan_selector(input: &str) -> SelectorScan<'_> {
    let mut issues = Vec::new();
    let mut open_brackets: Vec<usize> = Vec::new();
    let mut open_parens: Vec<usize> = Vec::new();
    let mut quote: Option<(char, usize)> = None;
    let mut delimiter_in_quote: Option<usize> = None;
    let mut escaped = false;
    let mut end = None;

    for (index, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }

        let rest = &input[index..];

        if let Some((quote_char, _)) = quote {
            if ch == '\\' {
                escaped = true;
            } else if ch == quote_char {
                quote = None;
                delimiter_in_quote = None;
            } else if delimiter_in_quote.is_none() && starts_with_delimiter(rest) {
                delimiter_in_quote = Some(index);
            }
            continue;
        }

        if open_brackets.is_empty() && open_parens.is_empty() {
            if starts_with_delimiter(rest) {
                end = Some(index);
                break;
            }
        } else if starts_with_block_end(rest) {
            // The block closes while a bracket or paren is still open
            if let Some(&open) = open_brackets.last() {
                issues.push(SelectorIssue {
                    kind: SelectorIssueKind::UnclosedBracket,
                    offset: open,
                });
            }
            if let Some(&open) = open_parens.last() {
                issues.push(SelectorIssue {
                    kind: SelectorIssueKind::UnclosedParen,
                    offset: open,
                });
            }
            end = Some(index);
            break;
        }

        match ch {
            '\\' => escaped = true,
            '"' | '\'' => quote = Some((ch, index)),
            '[' => open_brackets.push(index),
            '(' => open_parens.push(index),
            ']' => {
                if open_brackets.pop().is_none() {
                    issues.push(SelectorIssue {
                        kind: SelectorIssueKind::UnmatchedBracket,
                        offset: index,
                    });
                }
            }
            ')' => {
                if open_parens.pop().is_none() {
                    issues.push(SelectorIssue {
                        kind: SelectorIssueKind::UnmatchedParen,
                        offset: index,
                    });
                }
            }
            _ => {}
        }
    }

    let end = match end {
        Some(end) => end,
        None => {
            if let Some((quote_char, start)) = quote {
                issues.push(SelectorIssue {
                    kind: SelectorIssueKind::UnclosedQuote(quote_char),
                    offset: start,
                });
                // Give the delimiter swallowed by the open quote back to the template
                delimiter_in_quote.unwrap_or(input.len())
            } else {
                if let Some(&open) = open_brackets.last() {
                    issues.push(SelectorIssue {
                        kind: SelectorIssueKind::UnclosedBracket,
                        offset: open,
                    });
                }
                if let Some(&open) = open_parens.last() {
                    issues.push(SelectorIssue {
                        kind: SelectorIssueKind::UnclosedParen,
                        offset: open,
                    });
                }
                input.len()
            }
        }
    };

    SelectorScan {
        text: input[..end].trim_end(),
        consumed: end,
        issues,
    }
}
